use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    entities::{
        cash_closings::CashClosingEntity, cash_movements::CashMovementEntity,
        payments::PaymentEntity,
    },
    value_objects::{
        enums::{
            payment_methods::PaymentMethod, payment_statuses::PaymentStatus,
            vehicle_categories::VehicleCategory,
        },
        money::format_cop,
        parking::{ParkingSessionDto, SessionWithVehicle},
    },
};

/// Amounts per payment method, in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodTotals {
    pub cash_minor: i64,
    pub card_minor: i64,
    pub transfer_minor: i64,
}

impl MethodTotals {
    pub fn new(cash_minor: i64, card_minor: i64, transfer_minor: i64) -> Self {
        Self {
            cash_minor,
            card_minor,
            transfer_minor,
        }
    }

    pub fn add(&mut self, method: PaymentMethod, amount_minor: i64) {
        match method {
            PaymentMethod::Cash => self.cash_minor = self.cash_minor.saturating_add(amount_minor),
            PaymentMethod::Card => self.card_minor = self.card_minor.saturating_add(amount_minor),
            PaymentMethod::Transfer => {
                self.transfer_minor = self.transfer_minor.saturating_add(amount_minor)
            }
        }
    }

    pub fn total_minor(&self) -> i64 {
        self.cash_minor
            .saturating_add(self.card_minor)
            .saturating_add(self.transfer_minor)
    }

    /// Sums completed payments by method. Rows with another status are ignored.
    pub fn from_payments<'a>(payments: impl IntoIterator<Item = &'a PaymentEntity>) -> Self {
        let completed = PaymentStatus::Completed.as_str();
        let mut totals = Self::default();

        for payment in payments.into_iter().filter(|p| p.status == completed) {
            match PaymentMethod::from_str(&payment.method) {
                Some(method) => totals.add(method, payment.amount_minor),
                None => warn!(
                    payment_id = %payment.id,
                    method = %payment.method,
                    "cash_register: completed payment with unknown method left out of totals"
                ),
            }
        }

        totals
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub expected: MethodTotals,
    pub counted: MethodTotals,
    pub expected_total_minor: i64,
    pub counted_total_minor: i64,
    /// Counted minus expected: positive means surplus in the drawer.
    pub variance_minor: i64,
}

pub fn reconcile(expected: MethodTotals, counted: MethodTotals) -> Reconciliation {
    let expected_total_minor = expected.total_minor();
    let counted_total_minor = counted.total_minor();

    Reconciliation {
        expected,
        counted,
        expected_total_minor,
        counted_total_minor,
        variance_minor: counted_total_minor.saturating_sub(expected_total_minor),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounts {
    pub total: i32,
    pub cars: i32,
    pub motorcycles: i32,
}

impl SessionCounts {
    pub fn from_sessions(sessions: &[SessionWithVehicle]) -> Self {
        let mut counts = Self::default();
        for row in sessions {
            counts.total += 1;
            match row.category() {
                VehicleCategory::Car => counts.cars += 1,
                VehicleCategory::Motorcycle => counts.motorcycles += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseRegisterForm {
    #[serde(default)]
    pub cash_actual: String,
    #[serde(default)]
    pub card_actual: String,
    #[serde(default)]
    pub transfer_actual: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClosingHistoryFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashClosingDto {
    pub id: Uuid,
    pub closing_date: NaiveDate,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub opening_amount_minor: i64,
    pub expected: MethodTotals,
    pub expected_total_minor: i64,
    pub counted: MethodTotals,
    pub counted_total_minor: i64,
    pub variance_minor: i64,
    pub variance: String,
    pub total_sessions: i32,
    pub total_cars: i32,
    pub total_motorcycles: i32,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub status: String,
}

impl From<CashClosingEntity> for CashClosingDto {
    fn from(value: CashClosingEntity) -> Self {
        Self {
            id: value.id,
            closing_date: value.closing_date,
            opened_at: value.opened_at,
            closed_at: value.closed_at,
            opening_amount_minor: value.opening_amount_minor,
            expected: MethodTotals::new(
                value.expected_cash_minor,
                value.expected_card_minor,
                value.expected_transfer_minor,
            ),
            expected_total_minor: value.expected_total_minor,
            counted: MethodTotals::new(
                value.cash_amount_minor,
                value.card_amount_minor,
                value.transfer_amount_minor,
            ),
            counted_total_minor: value.total_amount_minor,
            variance_minor: value.variance_minor,
            variance: format_cop(value.variance_minor),
            total_sessions: value.total_sessions,
            total_cars: value.total_cars,
            total_motorcycles: value.total_motorcycles,
            user_id: value.user_id,
            notes: value.notes,
            status: value.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosingPreviewDto {
    pub date: NaiveDate,
    /// `false` once today's closing has been recorded.
    pub register_open: bool,
    pub current_closing: Option<CashClosingDto>,
    pub expected: MethodTotals,
    pub expected_total_minor: i64,
    /// Form defaults: the counted amounts start out equal to the expected ones.
    pub suggested_counted: MethodTotals,
    pub counts: SessionCounts,
    pub sessions: Vec<ParkingSessionDto>,
    pub recent_closings: Vec<CashClosingDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosingDetailDto {
    pub closing: CashClosingDto,
    pub sessions: Vec<ParkingSessionDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashMovementDto {
    pub id: Uuid,
    pub movement_type: String,
    pub concept: String,
    pub amount_minor: i64,
    pub method: Option<String>,
    pub payment_id: Option<Uuid>,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub moved_at: DateTime<Utc>,
}

impl From<CashMovementEntity> for CashMovementDto {
    fn from(value: CashMovementEntity) -> Self {
        Self {
            id: value.id,
            movement_type: value.movement_type,
            concept: value.concept,
            amount_minor: value.amount_minor,
            method: value.method,
            payment_id: value.payment_id,
            user_id: value.user_id,
            notes: value.notes,
            moved_at: value.moved_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn payment(method: &str, amount_minor: i64, status: PaymentStatus) -> PaymentEntity {
        PaymentEntity {
            id: Uuid::new_v4(),
            parking_session_id: Uuid::new_v4(),
            amount_minor,
            method: method.to_string(),
            reference: None,
            status: status.to_string(),
            paid_at: Utc::now(),
            user_id: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn completed_payments_are_summed_per_method() {
        let payments = vec![
            payment("cash", 315_000, PaymentStatus::Completed),
            payment("card", 540_000, PaymentStatus::Completed),
            payment("cash", 10_000, PaymentStatus::Completed),
            payment("transfer", 99_000, PaymentStatus::Pending),
            payment("cash", 5_000, PaymentStatus::Canceled),
        ];

        let totals = MethodTotals::from_payments(&payments);
        assert_eq!(totals, MethodTotals::new(325_000, 540_000, 0));
        assert_eq!(totals.total_minor(), 865_000);
    }

    #[test]
    fn totals_saturate_instead_of_wrapping() {
        let mut totals = MethodTotals::new(i64::MAX - 1, 0, 0);
        totals.add(PaymentMethod::Cash, 10);
        totals.add(PaymentMethod::Card, i64::MAX);

        assert_eq!(totals.cash_minor, i64::MAX);
        assert_eq!(totals.total_minor(), i64::MAX);
    }

    #[test]
    fn matching_counts_reconcile_to_zero_variance() {
        let payments = vec![
            payment("cash", 315_000, PaymentStatus::Completed),
            payment("card", 540_000, PaymentStatus::Completed),
            payment("cash", 0, PaymentStatus::Completed),
        ];
        let expected = MethodTotals::from_payments(&payments);

        let result = reconcile(expected, MethodTotals::new(315_000, 540_000, 0));
        assert_eq!(result.expected_total_minor, 855_000);
        assert_eq!(result.counted_total_minor, 855_000);
        assert_eq!(result.variance_minor, 0);
    }

    #[test]
    fn variance_is_counted_minus_expected() {
        let expected = MethodTotals::new(100_000, 50_000, 0);

        let short = reconcile(expected, MethodTotals::new(90_000, 50_000, 0));
        assert_eq!(short.variance_minor, -10_000);

        let over = reconcile(expected, MethodTotals::new(100_000, 50_000, 2_500));
        assert_eq!(over.variance_minor, 2_500);
    }
}
