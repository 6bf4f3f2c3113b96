use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::config_entries;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = config_entries)]
pub struct ConfigEntryEntity {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub value_type: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = config_entries)]
pub struct InsertConfigEntryEntity {
    pub key: String,
    pub value: String,
    pub value_type: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

/// `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = config_entries, treat_none_as_null = true)]
pub struct UpdateConfigEntryEntity {
    pub key: String,
    pub value: String,
    pub value_type: Option<String>,
    pub description: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
}
