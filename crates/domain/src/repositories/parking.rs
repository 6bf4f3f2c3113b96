use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::{
    entities::{
        parking_sessions::{
            CloseParkingSessionEntity, InsertParkingSessionEntity, ParkingSessionEntity,
        },
        vehicles::VehicleEntity,
    },
    value_objects::parking::{SessionWithVehicle, VehicleEntryModel},
};

#[async_trait]
#[automock]
pub trait ParkingRepository {
    async fn find_active_by_plate(&self, plate: String) -> Result<Option<SessionWithVehicle>>;
    async fn find_active_by_barcode(&self, barcode: String)
    -> Result<Option<SessionWithVehicle>>;
    /// Upserts the vehicle and inserts the session in one transaction.
    async fn record_entry(
        &self,
        vehicle: VehicleEntryModel,
        insert_session_entity: InsertParkingSessionEntity,
    ) -> Result<SessionWithVehicle>;
    /// Closes the session only while it is still active; `None` when it was not.
    async fn close_session(
        &self,
        session_id: Uuid,
        close_session_entity: CloseParkingSessionEntity,
    ) -> Result<Option<ParkingSessionEntity>>;
    async fn find_session(&self, session_id: Uuid) -> Result<Option<SessionWithVehicle>>;
    async fn list_active(&self) -> Result<Vec<SessionWithVehicle>>;
    /// Sessions with `from <= exited_at < until`.
    async fn list_exited_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SessionWithVehicle>>;
    /// Closed sessions without a completed payment, oldest exit first.
    async fn list_unpaid_closed(&self) -> Result<Vec<SessionWithVehicle>>;
    async fn list_vehicles(&self) -> Result<Vec<VehicleEntity>>;
    async fn find_vehicle_by_plate(&self, plate: String) -> Result<Option<VehicleEntity>>;
    async fn list_vehicle_sessions(&self, vehicle_id: Uuid) -> Result<Vec<SessionWithVehicle>>;
}
