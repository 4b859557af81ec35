use std::fmt;

use anyhow::{Context, ensure};
use compact_str::format_compact;
use serde::{Deserialize, Serialize};

use crate::manifest::Str;

pub type AnyObject = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Gvk {
    pub group: Str,
    pub version: Str,
    pub kind: Str,
}

impl Gvk {
    pub fn api_version(&self) -> Str {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format_compact!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.kind, self.version)
        } else {
            write!(f, "{}.{}.{}", self.kind, self.version, self.group)
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResId {
    #[serde(flatten)]
    pub gvk: Gvk,
    pub name: Str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Str>,
}

impl fmt::Debug for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{}/{}.{namespace}", self.gvk, self.name)
        } else {
            write!(f, "{}/{}", self.gvk, self.name)
        }
    }
}

/// A single KRM object. `root` holds every top-level field except `apiVersion` and `kind`,
/// which live in `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    id: ResId,
    root: AnyObject,
}

impl Resource {
    pub fn new(id: ResId, root: AnyObject) -> anyhow::Result<Self> {
        let metadata = root
            .get("metadata")
            .and_then(|v| v.as_object())
            .context("resource root must contain a `metadata` mapping")?;

        ensure!(
            metadata.get("name").and_then(|v| v.as_str()) == Some(id.name.as_str()),
            "`metadata.name` does not match resource id `{id}`"
        );
        ensure!(
            metadata.get("namespace").and_then(|v| v.as_str()) == id.namespace.as_deref(),
            "`metadata.namespace` does not match resource id `{id}`"
        );

        Ok(Resource { id, root })
    }

    pub fn id(&self) -> &ResId {
        &self.id
    }

    pub fn name(&self) -> &Str {
        &self.id.name
    }

    pub fn gvk(&self) -> &Gvk {
        &self.id.gvk
    }

    pub fn kind(&self) -> &Str {
        &self.id.gvk.kind
    }

    pub fn root(&self) -> &AnyObject {
        &self.root
    }

    pub fn into_parts(self) -> (ResId, AnyObject) {
        (self.id, self.root)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Res {
    api_version: Str,
    kind: Str,
    #[serde(flatten)]
    root: AnyObject,
}

#[derive(Debug, Deserialize)]
struct Meta {
    name: Str,
    #[serde(default)]
    namespace: Option<Str>,
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        Res {
            api_version: self.id.gvk.api_version(),
            kind: self.kind().clone(),
            root: self.root.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let res = Res::deserialize(deserializer)
            .map_err(|err| serde::de::Error::custom(format!("parsing resource: {err}")))?;

        let metadata = res
            .root
            .get("metadata")
            .cloned()
            .ok_or_else(|| serde::de::Error::custom("parsing resource: missing `metadata`"))?;
        let meta = serde_json::from_value::<Meta>(metadata).map_err(|err| {
            serde::de::Error::custom(format!("parsing resource metadata: {err}"))
        })?;

        let (group, version) = res
            .api_version
            .split_once('/')
            .map_or(("".into(), res.api_version.clone()), |(g, v)| {
                (g.into(), v.into())
            });

        let id = ResId {
            gvk: Gvk {
                group,
                version,
                kind: res.kind,
            },
            name: meta.name,
            namespace: meta.namespace,
        };

        Resource::new(id, res.root).map_err(serde::de::Error::custom)
    }
}
