use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of a spatial partition (typically a hex cell)
#[derive(Debug, Default, Clone, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash)]
#[serde(transparent)]
pub struct PartitionId(pub String);

impl PartitionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PartitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartitionId {
    fn from(value: &str) -> Self {
        PartitionId(value.to_string())
    }
}

impl From<String> for PartitionId {
    fn from(value: String) -> Self {
        PartitionId(value)
    }
}
