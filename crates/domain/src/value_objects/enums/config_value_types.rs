use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfigValueType {
    #[default]
    String,
    Number,
    Decimal,
    Boolean,
    Date,
}

impl ConfigValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigValueType::String => "string",
            ConfigValueType::Number => "number",
            ConfigValueType::Decimal => "decimal",
            ConfigValueType::Boolean => "boolean",
            ConfigValueType::Date => "date",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "string" => Some(ConfigValueType::String),
            "number" => Some(ConfigValueType::Number),
            "decimal" => Some(ConfigValueType::Decimal),
            "boolean" => Some(ConfigValueType::Boolean),
            "date" => Some(ConfigValueType::Date),
            _ => None,
        }
    }
}

impl Display for ConfigValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
