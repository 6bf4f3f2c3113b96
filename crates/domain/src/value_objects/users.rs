use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::app_users::AppUserEntity;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub remember_me: Option<String>,
    pub return_url: Option<String>,
}

impl LoginForm {
    pub fn remember(&self) -> bool {
        matches!(self.remember_me.as_deref(), Some("on" | "true" | "1"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub document: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub document: String,
    pub email: Option<String>,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AppUserEntity> for UserDto {
    fn from(value: AppUserEntity) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            document: value.document,
            email: value.email,
            username: value.username,
            role: value.role,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}
