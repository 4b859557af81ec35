use std::io;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    manifest::{Str, Symbol, apiversion, kind},
    resource::Resource,
};

/// The KRM function wire format, read from stdin and written to stdout.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    #[serde(default = "default_api_version")]
    pub api_version: Str,
    pub kind: kind::ResourceList,
    #[serde(default)]
    pub items: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_config: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<FnResult>,
}

fn default_api_version() -> Str {
    Str::const_new(apiversion::ConfigV1::VALUE)
}

impl ResourceList {
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: kind::ResourceList,
            items: resources.into_iter().collect(),
            function_config: None,
            results: vec![],
        }
    }

    pub fn with_function_config(mut self, function_config: serde_yaml::Value) -> Self {
        self.function_config = Some(function_config);
        self
    }
}

impl IntoIterator for ResourceList {
    type Item = Resource;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FnResult {
    pub message: String,
    pub severity: Severity,
}

impl FnResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

pub fn read_resource_list(reader: impl io::Read) -> anyhow::Result<ResourceList> {
    serde_yaml::from_reader(reader).context("reading ResourceList")
}

pub fn write_resource_list(mut writer: impl io::Write, list: &ResourceList) -> anyhow::Result<()> {
    serde_yaml::to_writer(&mut writer, list).context("writing ResourceList")?;
    writer.flush().context("flushing ResourceList")?;
    Ok(())
}
