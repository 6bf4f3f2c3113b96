use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::cash_closings;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = cash_closings)]
pub struct CashClosingEntity {
    pub id: Uuid,
    pub closing_date: NaiveDate,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub opening_amount_minor: i64,
    pub expected_cash_minor: i64,
    pub expected_card_minor: i64,
    pub expected_transfer_minor: i64,
    pub expected_total_minor: i64,
    pub cash_amount_minor: i64,
    pub card_amount_minor: i64,
    pub transfer_amount_minor: i64,
    pub total_amount_minor: i64,
    pub variance_minor: i64,
    pub total_sessions: i32,
    pub total_cars: i32,
    pub total_motorcycles: i32,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cash_closings)]
pub struct InsertCashClosingEntity {
    pub closing_date: NaiveDate,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub opening_amount_minor: i64,
    pub expected_cash_minor: i64,
    pub expected_card_minor: i64,
    pub expected_transfer_minor: i64,
    pub expected_total_minor: i64,
    pub cash_amount_minor: i64,
    pub card_amount_minor: i64,
    pub transfer_amount_minor: i64,
    pub total_amount_minor: i64,
    pub variance_minor: i64,
    pub total_sessions: i32,
    pub total_cars: i32,
    pub total_motorcycles: i32,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
