use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::{payments::PaymentEntity, vehicles::VehicleEntity},
    value_objects::{
        cash_register::CashMovementDto, enums::payment_methods::PaymentMethod,
        money::format_cop, parking::ParkingSessionDto,
    },
};

pub const MAX_REFERENCE_LEN: usize = 100;

/// Concept written on the income movement of a parking payment.
pub fn payment_concept(plate: &str, method: PaymentMethod) -> String {
    format!("Parking payment - {plate} - {}", method.label())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPaymentForm {
    #[serde(default)]
    pub parking_session_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentHistoryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub method: Option<String>,
    pub status: Option<String>,
}

/// Repository-level filter: UTC bounds and stored enum strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub paid_from: Option<DateTime<Utc>>,
    pub paid_until: Option<DateTime<Utc>>,
    pub method: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentWithVehicle {
    pub payment: PaymentEntity,
    pub vehicle: VehicleEntity,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentDto {
    pub id: Uuid,
    pub parking_session_id: Uuid,
    pub amount_minor: i64,
    pub amount: String,
    pub method: String,
    pub reference: Option<String>,
    pub status: String,
    pub paid_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl From<PaymentEntity> for PaymentDto {
    fn from(value: PaymentEntity) -> Self {
        Self {
            id: value.id,
            parking_session_id: value.parking_session_id,
            amount_minor: value.amount_minor,
            amount: format_cop(value.amount_minor),
            method: value.method,
            reference: value.reference,
            status: value.status,
            paid_at: value.paid_at,
            user_id: value.user_id,
            notes: value.notes,
        }
    }
}

/// What the payment form needs: the closed session and the amount to prefill.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentFormDto {
    pub session: ParkingSessionDto,
    pub suggested_amount_minor: i64,
    pub existing_payment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentDetailDto {
    pub payment: PaymentDto,
    pub session: ParkingSessionDto,
    pub movements: Vec<CashMovementDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentHistoryRowDto {
    pub payment: PaymentDto,
    pub plate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentHistoryDto {
    pub payments: Vec<PaymentHistoryRowDto>,
    pub total_payments: usize,
    /// Completed payments only.
    pub total_collected_minor: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingPaymentsDto {
    pub sessions: Vec<ParkingSessionDto>,
    pub total_pending_minor: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_names_plate_and_method() {
        assert_eq!(
            payment_concept("ABC123", PaymentMethod::Transfer),
            "Parking payment - ABC123 - Transfer"
        );
    }
}
