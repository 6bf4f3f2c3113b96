use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::{errors::into_repository_error, postgres_connection::PgPoolSquad};
use domain::{
    entities::{
        cash_closings::{CashClosingEntity, InsertCashClosingEntity},
        cash_movements::InsertCashMovementEntity,
    },
    repositories::cash_register::CashRegisterRepository,
    schema::{cash_closings, cash_movements},
};

pub struct CashRegisterPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CashRegisterPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CashRegisterRepository for CashRegisterPostgres {
    async fn find_closing_by_date(&self, date: NaiveDate) -> Result<Option<CashClosingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = cash_closings::table
            .filter(cash_closings::closing_date.eq(date))
            .select(CashClosingEntity::as_select())
            .first::<CashClosingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_closing(&self, closing_id: Uuid) -> Result<Option<CashClosingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = cash_closings::table
            .find(closing_id)
            .select(CashClosingEntity::as_select())
            .first::<CashClosingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn close_register(
        &self,
        insert_closing_entity: InsertCashClosingEntity,
        insert_movement_entity: InsertCashMovementEntity,
    ) -> Result<CashClosingEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let closing = conn
            .transaction::<CashClosingEntity, diesel::result::Error, _>(|tx| {
                let closing = insert_into(cash_closings::table)
                    .values(&insert_closing_entity)
                    .returning(CashClosingEntity::as_returning())
                    .get_result::<CashClosingEntity>(tx)?;

                insert_into(cash_movements::table)
                    .values(&insert_movement_entity)
                    .execute(tx)?;

                Ok(closing)
            })
            .map_err(into_repository_error)?;

        Ok(closing)
    }

    async fn list_closings(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: Option<i64>,
    ) -> Result<Vec<CashClosingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = cash_closings::table
            .select(CashClosingEntity::as_select())
            .into_boxed();

        if let Some(from) = from {
            query = query.filter(cash_closings::closing_date.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(cash_closings::closing_date.le(to));
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let results = query
            .order(cash_closings::closing_date.desc())
            .load::<CashClosingEntity>(&mut conn)?;

        Ok(results)
    }
}
