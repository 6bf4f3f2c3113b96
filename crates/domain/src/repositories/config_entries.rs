use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::config_entries::{
    ConfigEntryEntity, InsertConfigEntryEntity, UpdateConfigEntryEntity,
};

#[async_trait]
#[automock]
pub trait ConfigEntryRepository {
    /// All entries ordered by key, or those whose category matches.
    async fn list(&self, category: Option<String>) -> Result<Vec<ConfigEntryEntity>>;
    async fn find_by_id(&self, entry_id: Uuid) -> Result<Option<ConfigEntryEntity>>;
    async fn create(&self, insert_entry_entity: InsertConfigEntryEntity)
    -> Result<ConfigEntryEntity>;
    async fn update(
        &self,
        entry_id: Uuid,
        update_entry_entity: UpdateConfigEntryEntity,
    ) -> Result<Option<ConfigEntryEntity>>;
    /// `false` when no row had that id.
    async fn delete(&self, entry_id: Uuid) -> Result<bool>;
    /// Insert-or-update by key, all in one transaction.
    async fn upsert_many(&self, entries: Vec<InsertConfigEntryEntity>) -> Result<()>;
}
