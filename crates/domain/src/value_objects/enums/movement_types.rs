use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Income,
    Expense,
    Opening,
    Closing,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Income => "income",
            MovementType::Expense => "expense",
            MovementType::Opening => "opening",
            MovementType::Closing => "closing",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "income" => Some(MovementType::Income),
            "expense" => Some(MovementType::Expense),
            "opening" => Some(MovementType::Opening),
            "closing" => Some(MovementType::Closing),
            _ => None,
        }
    }
}

impl Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
