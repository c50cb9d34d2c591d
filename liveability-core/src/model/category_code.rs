use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of a destination category such as `supermarket`
#[derive(Debug, Default, Clone, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash)]
#[serde(transparent)]
pub struct CategoryCode(pub String);

impl CategoryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CategoryCode {
    fn from(value: &str) -> Self {
        CategoryCode(value.to_string())
    }
}

impl From<String> for CategoryCode {
    fn from(value: String) -> Self {
        CategoryCode(value)
    }
}
