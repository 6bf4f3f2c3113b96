use anyhow::{Context, Result};

use super::{
    config_model::{AuthSecret, BackendServer, Database, DotEnvyConfig},
    stage::Stage,
};

const DEFAULT_SESSION_TTL_MINUTES: i64 = 8 * 60;
const DEFAULT_REMEMBER_ME_TTL_DAYS: i64 = 30;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT")?
            .parse::<u16>()
            .context("SERVER_PORT is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse::<u64>()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse::<u64>()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional("DATABASE_MAX_CONNECTIONS")
            .map(|raw| raw.parse::<u32>())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth_secret: get_auth_secret()?,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_auth_secret() -> Result<AuthSecret> {
    dotenvy::dotenv().ok();

    Ok(AuthSecret {
        jwt_secret: required("JWT_AUTH_SECRET")?,
        session_ttl_minutes: optional("AUTH_SESSION_TTL_MINUTES")
            .map(|raw| raw.parse::<i64>())
            .transpose()
            .context("AUTH_SESSION_TTL_MINUTES is invalid")?
            .unwrap_or(DEFAULT_SESSION_TTL_MINUTES),
        remember_me_ttl_days: optional("AUTH_REMEMBER_ME_TTL_DAYS")
            .map(|raw| raw.parse::<i64>())
            .transpose()
            .context("AUTH_REMEMBER_ME_TTL_DAYS is invalid")?
            .unwrap_or(DEFAULT_REMEMBER_ME_TTL_DAYS),
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
