use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::{
    entities::{
        cash_movements::{CashMovementEntity, InsertCashMovementEntity},
        payments::{InsertPaymentEntity, PaymentEntity},
    },
    value_objects::payments::{PaymentFilter, PaymentWithVehicle},
};

#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>>;
    async fn find_completed_for_session(&self, session_id: Uuid)
    -> Result<Option<PaymentEntity>>;
    /// Inserts the payment and its income movement in one transaction; the
    /// movement's `payment_id` is set to the new payment's id.
    async fn record_payment(
        &self,
        insert_payment_entity: InsertPaymentEntity,
        insert_movement_entity: InsertCashMovementEntity,
    ) -> Result<PaymentEntity>;
    async fn list_movements_for_payment(&self, payment_id: Uuid)
    -> Result<Vec<CashMovementEntity>>;
    async fn list_history(&self, filter: PaymentFilter) -> Result<Vec<PaymentWithVehicle>>;
    /// Completed payments with `from <= paid_at < until`.
    async fn list_completed_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<PaymentEntity>>;
}
