use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::{errors::into_repository_error, postgres_connection::PgPoolSquad};
use domain::{
    entities::{
        cash_movements::{CashMovementEntity, InsertCashMovementEntity},
        payments::{InsertPaymentEntity, PaymentEntity},
        vehicles::VehicleEntity,
    },
    repositories::payments::PaymentRepository,
    schema::{cash_movements, parking_sessions, payments, vehicles},
    value_objects::{
        enums::payment_statuses::PaymentStatus,
        payments::{PaymentFilter, PaymentWithVehicle},
    },
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .find(payment_id)
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_completed_for_session(
        &self,
        session_id: Uuid,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .filter(payments::parking_session_id.eq(session_id))
            .filter(payments::status.eq(PaymentStatus::Completed.to_string()))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn record_payment(
        &self,
        insert_payment_entity: InsertPaymentEntity,
        mut insert_movement_entity: InsertCashMovementEntity,
    ) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = conn
            .transaction::<PaymentEntity, diesel::result::Error, _>(|tx| {
                let payment = insert_into(payments::table)
                    .values(&insert_payment_entity)
                    .returning(PaymentEntity::as_returning())
                    .get_result::<PaymentEntity>(tx)?;

                insert_movement_entity.payment_id = Some(payment.id);
                insert_into(cash_movements::table)
                    .values(&insert_movement_entity)
                    .execute(tx)?;

                Ok(payment)
            })
            .map_err(into_repository_error)?;

        Ok(payment)
    }

    async fn list_movements_for_payment(
        &self,
        payment_id: Uuid,
    ) -> Result<Vec<CashMovementEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = cash_movements::table
            .filter(cash_movements::payment_id.eq(payment_id))
            .order(cash_movements::moved_at.asc())
            .select(CashMovementEntity::as_select())
            .load::<CashMovementEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_history(&self, filter: PaymentFilter) -> Result<Vec<PaymentWithVehicle>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = payments::table
            .inner_join(parking_sessions::table.inner_join(vehicles::table))
            .select((PaymentEntity::as_select(), VehicleEntity::as_select()))
            .into_boxed();

        if let Some(paid_from) = filter.paid_from {
            query = query.filter(payments::paid_at.ge(paid_from));
        }
        if let Some(paid_until) = filter.paid_until {
            query = query.filter(payments::paid_at.lt(paid_until));
        }
        if let Some(method) = filter.method {
            query = query.filter(payments::method.eq(method));
        }
        if let Some(status) = filter.status {
            query = query.filter(payments::status.eq(status));
        }

        let rows = query
            .order(payments::paid_at.desc())
            .load::<(PaymentEntity, VehicleEntity)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(payment, vehicle)| PaymentWithVehicle { payment, vehicle })
            .collect())
    }

    async fn list_completed_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .filter(payments::status.eq(PaymentStatus::Completed.to_string()))
            .filter(payments::paid_at.ge(from))
            .filter(payments::paid_at.lt(until))
            .order(payments::paid_at.asc())
            .select(PaymentEntity::as_select())
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }
}
