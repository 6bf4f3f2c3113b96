use std::fmt::Display;

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Local,
    Development,
    Production,
}

impl Stage {
    /// Cookies are only marked `Secure` outside local runs.
    pub fn secure_cookies(&self) -> bool {
        !matches!(self, Stage::Local)
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Stage::Local => "Local",
            Stage::Development => "Development",
            Stage::Production => "Production",
        };
        f.write_str(stage)
    }
}

impl TryFrom<&String> for Stage {
    type Error = anyhow::Error;

    fn try_from(value: &String) -> Result<Self> {
        match value.trim() {
            "Local" | "local" => Ok(Stage::Local),
            "Development" | "development" => Ok(Stage::Development),
            "Production" | "production" => Ok(Stage::Production),
            other => Err(anyhow!("unknown stage `{other}`")),
        }
    }
}
