use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::{errors::into_repository_error, postgres_connection::PgPoolSquad};
use domain::{
    entities::{
        parking_sessions::{
            CloseParkingSessionEntity, InsertParkingSessionEntity, ParkingSessionEntity,
        },
        vehicles::{InsertVehicleEntity, VehicleEntity},
    },
    repositories::parking::ParkingRepository,
    schema::{parking_sessions, payments, vehicles},
    value_objects::{
        enums::payment_statuses::PaymentStatus,
        parking::{SessionWithVehicle, VehicleEntryModel},
    },
};

pub struct ParkingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ParkingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn into_rows(rows: Vec<(ParkingSessionEntity, VehicleEntity)>) -> Vec<SessionWithVehicle> {
    rows.into_iter()
        .map(|(session, vehicle)| SessionWithVehicle { session, vehicle })
        .collect()
}

#[async_trait]
impl ParkingRepository for ParkingPostgres {
    async fn find_active_by_plate(&self, plate: String) -> Result<Option<SessionWithVehicle>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = parking_sessions::table
            .inner_join(vehicles::table)
            .filter(vehicles::plate.eq(plate))
            .filter(parking_sessions::is_active.eq(true))
            .select((ParkingSessionEntity::as_select(), VehicleEntity::as_select()))
            .first::<(ParkingSessionEntity, VehicleEntity)>(&mut conn)
            .optional()?;

        Ok(row.map(|(session, vehicle)| SessionWithVehicle { session, vehicle }))
    }

    async fn find_active_by_barcode(
        &self,
        barcode: String,
    ) -> Result<Option<SessionWithVehicle>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = parking_sessions::table
            .inner_join(vehicles::table)
            .filter(parking_sessions::barcode.eq(barcode))
            .filter(parking_sessions::is_active.eq(true))
            .select((ParkingSessionEntity::as_select(), VehicleEntity::as_select()))
            .first::<(ParkingSessionEntity, VehicleEntity)>(&mut conn)
            .optional()?;

        Ok(row.map(|(session, vehicle)| SessionWithVehicle { session, vehicle }))
    }

    async fn record_entry(
        &self,
        vehicle: VehicleEntryModel,
        mut insert_session_entity: InsertParkingSessionEntity,
    ) -> Result<SessionWithVehicle> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn
            .transaction::<SessionWithVehicle, diesel::result::Error, _>(|tx| {
                let existing = vehicles::table
                    .filter(vehicles::plate.eq(&vehicle.plate))
                    .select(VehicleEntity::as_select())
                    .for_update()
                    .first::<VehicleEntity>(tx)
                    .optional()?;

                let vehicle_entity = match existing {
                    Some(found) => update(vehicles::table.find(found.id))
                        .set((
                            vehicles::category.eq(vehicle.category.to_string()),
                            vehicles::total_visits.eq(vehicles::total_visits + 1),
                            vehicles::last_visit_at.eq(Some(vehicle.visited_at)),
                            vehicles::updated_at.eq(Some(vehicle.visited_at)),
                        ))
                        .returning(VehicleEntity::as_returning())
                        .get_result::<VehicleEntity>(tx)?,
                    None => insert_into(vehicles::table)
                        .values(&InsertVehicleEntity {
                            plate: vehicle.plate.clone(),
                            category: vehicle.category.to_string(),
                            total_visits: 1,
                            first_visit_at: Some(vehicle.visited_at),
                            last_visit_at: Some(vehicle.visited_at),
                            created_at: vehicle.visited_at,
                        })
                        .returning(VehicleEntity::as_returning())
                        .get_result::<VehicleEntity>(tx)?,
                };

                insert_session_entity.vehicle_id = vehicle_entity.id;
                let session = insert_into(parking_sessions::table)
                    .values(&insert_session_entity)
                    .returning(ParkingSessionEntity::as_returning())
                    .get_result::<ParkingSessionEntity>(tx)?;

                Ok(SessionWithVehicle {
                    session,
                    vehicle: vehicle_entity,
                })
            })
            .map_err(into_repository_error)?;

        Ok(result)
    }

    async fn close_session(
        &self,
        session_id: Uuid,
        close_session_entity: CloseParkingSessionEntity,
    ) -> Result<Option<ParkingSessionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let closed = update(
            parking_sessions::table
                .filter(parking_sessions::id.eq(session_id))
                .filter(parking_sessions::is_active.eq(true)),
        )
        .set(&close_session_entity)
        .returning(ParkingSessionEntity::as_returning())
        .get_result::<ParkingSessionEntity>(&mut conn)
        .optional()?;

        Ok(closed)
    }

    async fn find_session(&self, session_id: Uuid) -> Result<Option<SessionWithVehicle>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = parking_sessions::table
            .inner_join(vehicles::table)
            .filter(parking_sessions::id.eq(session_id))
            .select((ParkingSessionEntity::as_select(), VehicleEntity::as_select()))
            .first::<(ParkingSessionEntity, VehicleEntity)>(&mut conn)
            .optional()?;

        Ok(row.map(|(session, vehicle)| SessionWithVehicle { session, vehicle }))
    }

    async fn list_active(&self) -> Result<Vec<SessionWithVehicle>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = parking_sessions::table
            .inner_join(vehicles::table)
            .filter(parking_sessions::is_active.eq(true))
            .order(parking_sessions::entered_at.desc())
            .select((ParkingSessionEntity::as_select(), VehicleEntity::as_select()))
            .load::<(ParkingSessionEntity, VehicleEntity)>(&mut conn)?;

        Ok(into_rows(rows))
    }

    async fn list_exited_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SessionWithVehicle>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = parking_sessions::table
            .inner_join(vehicles::table)
            .filter(parking_sessions::is_active.eq(false))
            .filter(parking_sessions::exited_at.ge(from))
            .filter(parking_sessions::exited_at.lt(until))
            .order(parking_sessions::exited_at.asc())
            .select((ParkingSessionEntity::as_select(), VehicleEntity::as_select()))
            .load::<(ParkingSessionEntity, VehicleEntity)>(&mut conn)?;

        Ok(into_rows(rows))
    }

    async fn list_unpaid_closed(&self) -> Result<Vec<SessionWithVehicle>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let paid_sessions = payments::table
            .filter(payments::status.eq(PaymentStatus::Completed.to_string()))
            .select(payments::parking_session_id);

        let rows = parking_sessions::table
            .inner_join(vehicles::table)
            .filter(parking_sessions::is_active.eq(false))
            .filter(parking_sessions::id.ne_all(paid_sessions))
            .order(parking_sessions::exited_at.asc())
            .select((ParkingSessionEntity::as_select(), VehicleEntity::as_select()))
            .load::<(ParkingSessionEntity, VehicleEntity)>(&mut conn)?;

        Ok(into_rows(rows))
    }

    async fn list_vehicles(&self) -> Result<Vec<VehicleEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = vehicles::table
            .order(vehicles::last_visit_at.desc().nulls_last())
            .select(VehicleEntity::as_select())
            .load::<VehicleEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_vehicle_by_plate(&self, plate: String) -> Result<Option<VehicleEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = vehicles::table
            .filter(vehicles::plate.eq(plate))
            .select(VehicleEntity::as_select())
            .first::<VehicleEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_vehicle_sessions(&self, vehicle_id: Uuid) -> Result<Vec<SessionWithVehicle>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = parking_sessions::table
            .inner_join(vehicles::table)
            .filter(parking_sessions::vehicle_id.eq(vehicle_id))
            .order(parking_sessions::entered_at.desc())
            .select((ParkingSessionEntity::as_select(), VehicleEntity::as_select()))
            .load::<(ParkingSessionEntity, VehicleEntity)>(&mut conn)?;

        Ok(into_rows(rows))
    }
}
