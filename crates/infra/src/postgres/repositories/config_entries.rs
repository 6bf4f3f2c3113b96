use anyhow::Result;
use async_trait::async_trait;
use diesel::{Connection, RunQueryDsl, delete, insert_into, prelude::*, update, upsert::excluded};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::{errors::into_repository_error, postgres_connection::PgPoolSquad};
use domain::{
    entities::config_entries::{
        ConfigEntryEntity, InsertConfigEntryEntity, UpdateConfigEntryEntity,
    },
    repositories::config_entries::ConfigEntryRepository,
    schema::config_entries,
};

pub struct ConfigEntryPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ConfigEntryPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ConfigEntryRepository for ConfigEntryPostgres {
    async fn list(&self, category: Option<String>) -> Result<Vec<ConfigEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = config_entries::table
            .select(ConfigEntryEntity::as_select())
            .into_boxed();

        if let Some(category) = category {
            let prefix = format!("{category}.%");
            query = query.filter(
                config_entries::key
                    .eq(category)
                    .or(config_entries::key.like(prefix)),
            );
        }

        let results = query
            .order(config_entries::key.asc())
            .load::<ConfigEntryEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_by_id(&self, entry_id: Uuid) -> Result<Option<ConfigEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = config_entries::table
            .find(entry_id)
            .select(ConfigEntryEntity::as_select())
            .first::<ConfigEntryEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create(
        &self,
        insert_entry_entity: InsertConfigEntryEntity,
    ) -> Result<ConfigEntryEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = insert_into(config_entries::table)
            .values(&insert_entry_entity)
            .returning(ConfigEntryEntity::as_returning())
            .get_result::<ConfigEntryEntity>(&mut conn)
            .map_err(into_repository_error)?;

        Ok(created)
    }

    async fn update(
        &self,
        entry_id: Uuid,
        update_entry_entity: UpdateConfigEntryEntity,
    ) -> Result<Option<ConfigEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(config_entries::table.find(entry_id))
            .set(&update_entry_entity)
            .returning(ConfigEntryEntity::as_returning())
            .get_result::<ConfigEntryEntity>(&mut conn)
            .optional()
            .map_err(into_repository_error)?;

        Ok(updated)
    }

    async fn delete(&self, entry_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(config_entries::table.find(entry_id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }

    async fn upsert_many(&self, entries: Vec<InsertConfigEntryEntity>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<(), diesel::result::Error, _>(|tx| {
            for entry in &entries {
                insert_into(config_entries::table)
                    .values(entry)
                    .on_conflict(config_entries::key)
                    .do_update()
                    .set((
                        config_entries::value.eq(excluded(config_entries::value)),
                        config_entries::value_type.eq(excluded(config_entries::value_type)),
                        config_entries::updated_at.eq(Some(entry.created_at)),
                        config_entries::updated_by.eq(excluded(config_entries::updated_by)),
                    ))
                    .execute(tx)?;
            }
            Ok(())
        })
        .map_err(into_repository_error)?;

        Ok(())
    }
}
