use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::manifest::{Str, TypeMeta};

/// Name the program source is handed to the transformer under.
pub const DEFAULT_PROGRAM_NAME: &str = "prog.k";

/// The `functionConfig` of a krm-kcl invocation.
///
/// ```yaml
/// apiVersion: krm.kcl.dev/v1alpha1
/// kind: KCLRun
/// metadata:
///   name: set-annotations
/// spec:
///   params:
///     annotations:
///       owner: platform
///   source: |
///     items = [item | {metadata.annotations: option("params").annotations} for item in option("items")]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KclRun {
    /// Not checked, any `apiVersion`/`kind` pair carrying a `spec.source` is accepted.
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "ObjectMeta::is_empty")]
    pub metadata: ObjectMeta,
    pub spec: KclRunSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Str>,
}

impl ObjectMeta {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.namespace.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KclRunSpec {
    pub source: String,
    /// Free-form parameters, read by the program from the raw function config.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<Str, serde_json::Value>,
}

impl KclRun {
    pub fn from_value(value: &serde_yaml::Value) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_value(value.clone())?)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.spec.source
    }
}
