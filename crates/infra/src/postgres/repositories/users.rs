use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::{errors::into_repository_error, postgres_connection::PgPoolSquad};
use domain::{
    entities::app_users::{AppUserEntity, InsertAppUserEntity},
    repositories::users::UserRepository,
    schema::app_users,
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_active_by_username(&self, username: String) -> Result<Option<AppUserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = app_users::table
            .filter(app_users::username.eq(username))
            .filter(app_users::is_active.eq(true))
            .select(AppUserEntity::as_select())
            .first::<AppUserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<AppUserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = app_users::table
            .find(user_id)
            .select(AppUserEntity::as_select())
            .first::<AppUserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = app_users::table.count().get_result::<i64>(&mut conn)?;

        Ok(total)
    }

    async fn create(&self, insert_user_entity: InsertAppUserEntity) -> Result<AppUserEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = insert_into(app_users::table)
            .values(&insert_user_entity)
            .returning(AppUserEntity::as_returning())
            .get_result::<AppUserEntity>(&mut conn)
            .map_err(into_repository_error)?;

        Ok(created)
    }

    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(app_users::table.find(user_id))
            .set(app_users::last_login_at.eq(Some(at)))
            .execute(&mut conn)?;

        Ok(())
    }
}
