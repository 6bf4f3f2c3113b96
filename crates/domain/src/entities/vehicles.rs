use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::vehicles;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = vehicles)]
pub struct VehicleEntity {
    pub id: Uuid,
    pub plate: String,
    pub category: String,
    pub total_visits: i32,
    pub first_visit_at: Option<DateTime<Utc>>,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vehicles)]
pub struct InsertVehicleEntity {
    pub plate: String,
    pub category: String,
    pub total_visits: i32,
    pub first_visit_at: Option<DateTime<Utc>>,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
