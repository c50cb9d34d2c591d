use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of an address or residential unit
#[derive(Debug, Default, Clone, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash)]
#[serde(transparent)]
pub struct OriginId(pub String);

impl OriginId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OriginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OriginId {
    fn from(value: &str) -> Self {
        OriginId(value.to_string())
    }
}

impl From<String> for OriginId {
    fn from(value: String) -> Self {
        OriginId(value)
    }
}
