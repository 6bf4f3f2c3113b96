use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::entities::app_users::{AppUserEntity, InsertAppUserEntity};

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn find_active_by_username(&self, username: String) -> Result<Option<AppUserEntity>>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<AppUserEntity>>;
    async fn count(&self) -> Result<i64>;
    async fn create(&self, insert_user_entity: InsertAppUserEntity) -> Result<AppUserEntity>;
    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<()>;
}
