use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub parking_session_id: Uuid,
    pub amount_minor: i64,
    pub method: String,
    pub reference: Option<String>,
    pub status: String,
    pub paid_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub parking_session_id: Uuid,
    pub amount_minor: i64,
    pub method: String,
    pub reference: Option<String>,
    pub status: String,
    pub paid_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
