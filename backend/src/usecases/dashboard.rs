use axum::http::StatusCode;
use chrono::Utc;
use domain::{
    repositories::{
        config_entries::ConfigEntryRepository, parking::ParkingRepository,
        payments::PaymentRepository,
    },
    value_objects::{
        business_days::{business_date, day_bounds, month_to_date_bounds},
        cash_register::MethodTotals,
        dashboard::DashboardDto,
        enums::vehicle_categories::VehicleCategory,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::{
    axum_http::error_responses::UseCaseError,
    usecases::{parking::estimate_active, rate_cards::RateCardResolver},
};

const RECENT_ACTIVE: usize = 5;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError for DashboardError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub struct DashboardUseCase<P, Pay, C>
where
    P: ParkingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    parking_repo: Arc<P>,
    payment_repo: Arc<Pay>,
    rate_cards: Arc<RateCardResolver<C>>,
}

impl<P, Pay, C> DashboardUseCase<P, Pay, C>
where
    P: ParkingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    pub fn new(
        parking_repo: Arc<P>,
        payment_repo: Arc<Pay>,
        rate_cards: Arc<RateCardResolver<C>>,
    ) -> Self {
        Self {
            parking_repo,
            payment_repo,
            rate_cards,
        }
    }

    pub async fn summary(&self) -> Result<DashboardDto, DashboardError> {
        let now = Utc::now();
        let today = business_date(now);

        let mut active = self.parking_repo.list_active().await.map_err(|err| {
            error!(db_error = ?err, "dashboard: failed to list active sessions");
            DashboardError::Internal(err)
        })?;

        let (day_start, day_end) = day_bounds(today);
        let (month_start, month_end) = month_to_date_bounds(today);
        let month_payments = self
            .payment_repo
            .list_completed_between(month_start, month_end)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "dashboard: failed to load month income");
                DashboardError::Internal(err)
            })?;
        let today_payments = month_payments
            .iter()
            .filter(|payment| payment.paid_at >= day_start && payment.paid_at < day_end);

        let pending = self.parking_repo.list_unpaid_closed().await.map_err(|err| {
            error!(db_error = ?err, "dashboard: failed to list pending payments");
            DashboardError::Internal(err)
        })?;

        let rate_card = self.rate_cards.current().await.map_err(|err| {
            error!(db_error = ?err, "dashboard: failed to resolve rates");
            DashboardError::Internal(err)
        })?;

        let active_cars = active
            .iter()
            .filter(|row| row.category() == VehicleCategory::Car)
            .count();
        let active_vehicles = active.len();

        active.sort_by(|a, b| b.session.entered_at.cmp(&a.session.entered_at));
        let recent_active = active
            .iter()
            .take(RECENT_ACTIVE)
            .map(|row| estimate_active(row, &rate_card, now))
            .collect();

        Ok(DashboardDto {
            active_vehicles,
            active_cars,
            active_motorcycles: active_vehicles - active_cars,
            income_today_minor: MethodTotals::from_payments(today_payments).total_minor(),
            income_month_minor: MethodTotals::from_payments(&month_payments).total_minor(),
            pending_payments: pending.len(),
            pending_amount_minor: pending
                .iter()
                .map(|row| row.session.amount_due_minor())
                .sum(),
            recent_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use domain::{
        entities::{
            parking_sessions::ParkingSessionEntity, payments::PaymentEntity,
            vehicles::VehicleEntity,
        },
        repositories::{
            config_entries::MockConfigEntryRepository, parking::MockParkingRepository,
            payments::MockPaymentRepository,
        },
        value_objects::parking::SessionWithVehicle,
    };
    use uuid::Uuid;

    fn session(
        plate: &str,
        category: &str,
        entered_at: DateTime<Utc>,
        final_amount_minor: Option<i64>,
    ) -> SessionWithVehicle {
        let vehicle_id = Uuid::new_v4();
        SessionWithVehicle {
            session: ParkingSessionEntity {
                id: Uuid::new_v4(),
                vehicle_id,
                barcode: format!("PARQ{plate}"),
                entered_at,
                exited_at: final_amount_minor.map(|_| entered_at + Duration::minutes(45)),
                parked_minutes: final_amount_minor.map(|_| 45),
                gross_amount_minor: final_amount_minor,
                discount_minor: 0,
                final_amount_minor,
                is_active: final_amount_minor.is_none(),
                entry_user_id: None,
                exit_user_id: None,
                entry_notes: None,
                exit_notes: None,
                created_at: entered_at,
                updated_at: None,
            },
            vehicle: VehicleEntity {
                id: vehicle_id,
                plate: plate.to_string(),
                category: category.to_string(),
                total_visits: 1,
                first_visit_at: Some(entered_at),
                last_visit_at: Some(entered_at),
                created_at: entered_at,
                updated_at: None,
            },
        }
    }

    fn completed(amount_minor: i64, paid_at: DateTime<Utc>) -> PaymentEntity {
        PaymentEntity {
            id: Uuid::new_v4(),
            parking_session_id: Uuid::new_v4(),
            amount_minor,
            method: "cash".to_string(),
            reference: None,
            status: "completed".to_string(),
            paid_at,
            user_id: None,
            notes: None,
            created_at: paid_at,
        }
    }

    #[tokio::test]
    async fn summary_counts_active_income_and_pending() {
        let now = Utc::now();
        let mut parking_repo = MockParkingRepository::new();
        let mut payment_repo = MockPaymentRepository::new();
        let mut config_repo = MockConfigEntryRepository::new();

        parking_repo.expect_list_active().returning(move || {
            let rows = (0..7)
                .map(|i| {
                    let category = if i % 3 == 0 { "motorcycle" } else { "car" };
                    session(
                        &format!("ABC{i:03}"),
                        category,
                        now - Duration::minutes(10 * (i + 1)),
                        None,
                    )
                })
                .collect::<Vec<_>>();
            Box::pin(async move { Ok(rows) })
        });
        parking_repo.expect_list_unpaid_closed().returning(move || {
            let rows = vec![
                session("XYZ001", "car", now - Duration::hours(2), Some(315_000)),
                session("XYZ002", "car", now - Duration::hours(3), Some(540_000)),
            ];
            Box::pin(async move { Ok(rows) })
        });
        payment_repo
            .expect_list_completed_between()
            .returning(|_, until| {
                // The month total includes payments from before today.
                let rows = vec![
                    completed(100_000, until - Duration::days(40)),
                    completed(315_000, until - Duration::hours(1)),
                ];
                Box::pin(async move { Ok(rows) })
            });
        config_repo
            .expect_list()
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));

        let usecase = DashboardUseCase::new(
            Arc::new(parking_repo),
            Arc::new(payment_repo),
            Arc::new(RateCardResolver::new(Arc::new(config_repo))),
        );
        let dashboard = usecase.summary().await.unwrap();

        assert_eq!(dashboard.active_vehicles, 7);
        assert_eq!(dashboard.active_motorcycles, 3);
        assert_eq!(dashboard.active_cars, 4);
        assert_eq!(dashboard.income_today_minor, 315_000);
        assert_eq!(dashboard.income_month_minor, 415_000);
        assert_eq!(dashboard.pending_payments, 2);
        assert_eq!(dashboard.pending_amount_minor, 855_000);
        assert_eq!(dashboard.recent_active.len(), 5);
        assert_eq!(dashboard.recent_active[0].plate, "ABC000");
    }
}
