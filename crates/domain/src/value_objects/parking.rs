use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::{parking_sessions::ParkingSessionEntity, vehicles::VehicleEntity},
    value_objects::{
        enums::vehicle_categories::VehicleCategory,
        fees::format_elapsed,
        money::format_cop,
        rates::RateCard,
    },
};

pub const MAX_NOTES_LEN: usize = 500;

/// A session row joined with its vehicle.
#[derive(Debug, Clone)]
pub struct SessionWithVehicle {
    pub session: ParkingSessionEntity,
    pub vehicle: VehicleEntity,
}

impl SessionWithVehicle {
    pub fn category(&self) -> VehicleCategory {
        category_of(&self.vehicle)
    }
}

/// Stored categories are written by this service; anything unreadable bills as a car.
pub fn category_of(vehicle: &VehicleEntity) -> VehicleCategory {
    VehicleCategory::from_str(&vehicle.category).unwrap_or(VehicleCategory::Car)
}

/// Data the repository needs to find-or-create the vehicle at entry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleEntryModel {
    pub plate: String,
    pub category: VehicleCategory,
    pub visited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordEntryForm {
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub category: String,
    pub barcode: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordExitForm {
    pub plate: Option<String>,
    pub barcode: Option<String>,
    pub discount: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionLookupQuery {
    pub plate: Option<String>,
    pub barcode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleHistoryQuery {
    pub plate: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryReceiptDto {
    pub session_id: Uuid,
    pub plate: String,
    pub category: VehicleCategory,
    pub entered_at: DateTime<Utc>,
    pub barcode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExitReceiptDto {
    pub session_id: Uuid,
    pub plate: String,
    pub category: VehicleCategory,
    pub barcode: String,
    pub entered_at: DateTime<Utc>,
    pub exited_at: DateTime<Utc>,
    pub elapsed: String,
    pub parked_minutes: i32,
    pub gross_amount_minor: i64,
    pub discount_minor: i64,
    pub final_amount_minor: i64,
    pub amount_due: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParkingSessionDto {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub plate: String,
    pub category: VehicleCategory,
    pub barcode: String,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub parked_minutes: Option<i32>,
    pub gross_amount_minor: Option<i64>,
    pub discount_minor: i64,
    pub final_amount_minor: Option<i64>,
    pub is_active: bool,
    pub entry_notes: Option<String>,
    pub exit_notes: Option<String>,
}

impl From<&SessionWithVehicle> for ParkingSessionDto {
    fn from(row: &SessionWithVehicle) -> Self {
        Self::from_parts(&row.session, &row.vehicle)
    }
}

impl ParkingSessionDto {
    pub fn from_parts(session: &ParkingSessionEntity, vehicle: &VehicleEntity) -> Self {
        Self {
            id: session.id,
            vehicle_id: vehicle.id,
            plate: vehicle.plate.clone(),
            category: category_of(vehicle),
            barcode: session.barcode.clone(),
            entered_at: session.entered_at,
            exited_at: session.exited_at,
            parked_minutes: session.parked_minutes,
            gross_amount_minor: session.gross_amount_minor,
            discount_minor: session.discount_minor,
            final_amount_minor: session.final_amount_minor,
            is_active: session.is_active,
            entry_notes: session.entry_notes.clone(),
            exit_notes: session.exit_notes.clone(),
        }
    }
}

/// An active session with the amount it would be billed right now.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSessionDto {
    pub session_id: Uuid,
    pub plate: String,
    pub category: VehicleCategory,
    pub barcode: String,
    pub entered_at: DateTime<Utc>,
    pub elapsed: String,
    pub estimated_amount_minor: i64,
    pub estimated_amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveVehiclesDto {
    pub sessions: Vec<ActiveSessionDto>,
    pub rates: RateCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupSessionDto {
    pub id: Uuid,
    pub plate: String,
    pub category: VehicleCategory,
    /// Local time, `yyyy-MM-dd HH:mm:ss`.
    pub entered_at: String,
    pub elapsed: String,
    pub estimated_amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionLookupDto {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<LookupSessionDto>,
}

impl SessionLookupDto {
    pub fn found(session: LookupSessionDto) -> Self {
        Self {
            success: true,
            message: None,
            session: Some(session),
        }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            session: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleDto {
    pub id: Uuid,
    pub plate: String,
    pub category: VehicleCategory,
    pub total_visits: i32,
    pub first_visit_at: Option<DateTime<Utc>>,
    pub last_visit_at: Option<DateTime<Utc>>,
}

impl From<&VehicleEntity> for VehicleDto {
    fn from(value: &VehicleEntity) -> Self {
        Self {
            id: value.id,
            plate: value.plate.clone(),
            category: category_of(value),
            total_visits: value.total_visits,
            first_visit_at: value.first_visit_at,
            last_visit_at: value.last_visit_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleHistoryDto {
    pub searched_plate: Option<String>,
    pub vehicle: Option<VehicleDto>,
    pub vehicles: Vec<VehicleDto>,
    pub sessions: Vec<ParkingSessionDto>,
    pub total_visits: usize,
    pub total_collected_minor: i64,
    pub total_parked_minutes: i64,
}

impl ActiveSessionDto {
    pub fn new(row: &SessionWithVehicle, now: DateTime<Utc>, estimated_amount_minor: i64) -> Self {
        Self {
            session_id: row.session.id,
            plate: row.vehicle.plate.clone(),
            category: row.category(),
            barcode: row.session.barcode.clone(),
            entered_at: row.session.entered_at,
            elapsed: format_elapsed(now - row.session.entered_at),
            estimated_amount_minor,
            estimated_amount: format_cop(estimated_amount_minor),
        }
    }
}
