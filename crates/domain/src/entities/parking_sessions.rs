use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::parking_sessions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = parking_sessions)]
pub struct ParkingSessionEntity {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub barcode: String,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub parked_minutes: Option<i32>,
    pub gross_amount_minor: Option<i64>,
    pub discount_minor: i64,
    pub final_amount_minor: Option<i64>,
    pub is_active: bool,
    pub entry_user_id: Option<Uuid>,
    pub exit_user_id: Option<Uuid>,
    pub entry_notes: Option<String>,
    pub exit_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ParkingSessionEntity {
    /// Amount the driver owes: the final amount once closed, otherwise the gross amount.
    pub fn amount_due_minor(&self) -> i64 {
        self.final_amount_minor
            .or(self.gross_amount_minor)
            .unwrap_or_default()
    }
}

/// `vehicle_id` is filled in by the repository inside the entry transaction.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parking_sessions)]
pub struct InsertParkingSessionEntity {
    pub vehicle_id: Uuid,
    pub barcode: String,
    pub entered_at: DateTime<Utc>,
    pub discount_minor: i64,
    pub is_active: bool,
    pub entry_user_id: Option<Uuid>,
    pub entry_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = parking_sessions)]
pub struct CloseParkingSessionEntity {
    pub exited_at: Option<DateTime<Utc>>,
    pub parked_minutes: Option<i32>,
    pub gross_amount_minor: Option<i64>,
    pub discount_minor: i64,
    pub final_amount_minor: Option<i64>,
    pub is_active: bool,
    pub exit_user_id: Option<Uuid>,
    pub exit_notes: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
