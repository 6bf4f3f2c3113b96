use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::cash_movements;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = cash_movements)]
pub struct CashMovementEntity {
    pub id: Uuid,
    pub movement_type: String,
    pub concept: String,
    pub amount_minor: i64,
    pub method: Option<String>,
    pub payment_id: Option<Uuid>,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub moved_at: DateTime<Utc>,
}

/// `payment_id` of an income movement is set by the repository once the payment row exists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cash_movements)]
pub struct InsertCashMovementEntity {
    pub movement_type: String,
    pub concept: String,
    pub amount_minor: i64,
    pub method: Option<String>,
    pub payment_id: Option<Uuid>,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub moved_at: DateTime<Utc>,
}
