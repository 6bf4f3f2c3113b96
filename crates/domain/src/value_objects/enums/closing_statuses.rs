use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClosingStatus {
    Open,
    Closed,
}

impl ClosingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosingStatus::Open => "open",
            ClosingStatus::Closed => "closed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "open" => Some(ClosingStatus::Open),
            "closed" => Some(ClosingStatus::Closed),
            _ => None,
        }
    }
}

impl Display for ClosingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
