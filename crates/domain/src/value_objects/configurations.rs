use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::config_entries::ConfigEntryEntity,
    value_objects::{money::from_minor, rates::RateCard},
};

pub const MAX_KEY_LEN: usize = 100;
pub const MAX_VALUE_LEN: usize = 500;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Category of a key: the part before the first `.`, or the whole key.
pub fn category_of(key: &str) -> &str {
    key.split_once('.').map_or(key, |(category, _)| category)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigEntryForm {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    pub value_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesForm {
    #[serde(default)]
    pub car_per_hour: String,
    #[serde(default)]
    pub motorcycle_per_hour: String,
    #[serde(default)]
    pub car_per_minute: String,
    #[serde(default)]
    pub motorcycle_per_minute: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigEntryDto {
    pub id: Uuid,
    pub key: String,
    pub category: String,
    pub value: String,
    pub value_type: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
}

impl From<ConfigEntryEntity> for ConfigEntryDto {
    fn from(value: ConfigEntryEntity) -> Self {
        Self {
            id: value.id,
            category: category_of(&value.key).to_string(),
            key: value.key,
            value: value.value,
            value_type: value.value_type,
            description: value.description,
            created_at: value.created_at,
            updated_at: value.updated_at,
            updated_by: value.updated_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigListDto {
    pub category: Option<String>,
    pub categories: Vec<String>,
    pub entries: Vec<ConfigEntryDto>,
}

/// Rates in pesos, as shown on the rates form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatesDto {
    pub car_per_hour: Decimal,
    pub motorcycle_per_hour: Decimal,
    pub car_per_minute: Decimal,
    pub motorcycle_per_minute: Decimal,
}

impl From<RateCard> for RatesDto {
    fn from(value: RateCard) -> Self {
        Self {
            car_per_hour: from_minor(value.car.per_hour_minor),
            motorcycle_per_hour: from_minor(value.motorcycle.per_hour_minor),
            car_per_minute: from_minor(value.car.per_minute_minor),
            motorcycle_per_minute: from_minor(value.motorcycle.per_minute_minor),
        }
    }
}
