use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of a single destination feature
#[derive(Debug, Default, Clone, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash)]
#[serde(transparent)]
pub struct DestinationId(pub String);

impl DestinationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DestinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DestinationId {
    fn from(value: &str) -> Self {
        DestinationId(value.to_string())
    }
}

impl From<String> for DestinationId {
    fn from(value: String) -> Self {
        DestinationId(value)
    }
}
