use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::entities::{
    cash_closings::{CashClosingEntity, InsertCashClosingEntity},
    cash_movements::InsertCashMovementEntity,
};

#[async_trait]
#[automock]
pub trait CashRegisterRepository {
    async fn find_closing_by_date(&self, date: NaiveDate) -> Result<Option<CashClosingEntity>>;
    async fn find_closing(&self, closing_id: Uuid) -> Result<Option<CashClosingEntity>>;
    /// Inserts the closing and its closing movement in one transaction.
    async fn close_register(
        &self,
        insert_closing_entity: InsertCashClosingEntity,
        insert_movement_entity: InsertCashMovementEntity,
    ) -> Result<CashClosingEntity>;
    /// Newest first; both bounds inclusive. `limit` of `None` returns every match.
    async fn list_closings(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: Option<i64>,
    ) -> Result<Vec<CashClosingEntity>>;
}
