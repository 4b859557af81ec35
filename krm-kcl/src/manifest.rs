use core::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

pub type Str = CompactString;

/// `apiVersion` and `kind` as written, without checking them against any known type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<Str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Str>,
}

pub mod kind {
    use super::define_symbol;

    define_symbol!(ResourceList = "ResourceList");
}

pub mod apiversion {
    use super::define_symbol;

    define_symbol!(ConfigV1 = "config.kubernetes.io/v1");
}

// A unit type that (de)serializes as exactly one string.
macro_rules! define_symbol {
    ($name:ident = $value:literal) => {
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name;

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($value)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str($value)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let found: $crate::manifest::Str = ::serde::Deserialize::deserialize(deserializer)?;
                if found != $value {
                    return Err(::serde::de::Error::custom(format!(
                        "expected `{}`, found `{found}`",
                        $value
                    )));
                }
                Ok($name)
            }
        }

        impl $crate::manifest::Symbol for $name {
            const VALUE: &'static str = $value;
        }
    };
}

use define_symbol;

pub trait Symbol: fmt::Debug + Send + Sync {
    const VALUE: &'static str;
}
