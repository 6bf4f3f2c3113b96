use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use domain::{
    entities::{
        cash_closings::{CashClosingEntity, InsertCashClosingEntity},
        cash_movements::InsertCashMovementEntity,
    },
    repositories::{
        cash_register::CashRegisterRepository,
        errors::{CLOSING_DATE_KEY, duplicate_constraint},
        parking::ParkingRepository,
        payments::PaymentRepository,
    },
    value_objects::{
        business_days::{business_date, day_bounds},
        cash_register::{
            CashClosingDto, ClosingDetailDto, ClosingHistoryFilter, ClosingPreviewDto,
            CloseRegisterForm, MethodTotals, SessionCounts, reconcile,
        },
        enums::{closing_statuses::ClosingStatus, movement_types::MovementType},
        parking::{MAX_NOTES_LEN, ParkingSessionDto, SessionWithVehicle},
        validation::{FieldErrors, optional_text, parse_amount},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::UseCaseError;

const RECENT_CLOSINGS: i64 = 10;

#[derive(Debug, Error)]
pub enum CashRegisterError {
    #[error("please correct the highlighted fields")]
    Validation(FieldErrors),
    #[error("the cash register for {date} has already been closed")]
    AlreadyClosed { date: NaiveDate },
    #[error("cash closing not found")]
    ClosingNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError for CashRegisterError {
    fn status_code(&self) -> StatusCode {
        match self {
            CashRegisterError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CashRegisterError::AlreadyClosed { .. } => StatusCode::CONFLICT,
            CashRegisterError::ClosingNotFound => StatusCode::NOT_FOUND,
            CashRegisterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            CashRegisterError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CashRegisterError>;

struct CountedAmounts {
    counted: MethodTotals,
    notes: Option<String>,
}

fn validate_counts(form: &CloseRegisterForm) -> UseCaseResult<CountedAmounts> {
    let mut errors = FieldErrors::new();

    let cash = parse_amount("cash_actual", &form.cash_actual, &mut errors);
    let card = parse_amount("card_actual", &form.card_actual, &mut errors);
    let transfer = parse_amount("transfer_actual", &form.transfer_actual, &mut errors);
    let notes = optional_text("notes", form.notes.as_deref(), MAX_NOTES_LEN, &mut errors);

    match (cash, card, transfer) {
        (Some(cash), Some(card), Some(transfer)) if errors.is_empty() => Ok(CountedAmounts {
            counted: MethodTotals::new(cash, card, transfer),
            notes,
        }),
        _ => Err(CashRegisterError::Validation(errors)),
    }
}

pub struct CashRegisterUseCase<R, Pay, P>
where
    R: CashRegisterRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    cash_register_repo: Arc<R>,
    payment_repo: Arc<Pay>,
    parking_repo: Arc<P>,
}

impl<R, Pay, P> CashRegisterUseCase<R, Pay, P>
where
    R: CashRegisterRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    pub fn new(cash_register_repo: Arc<R>, payment_repo: Arc<Pay>, parking_repo: Arc<P>) -> Self {
        Self {
            cash_register_repo,
            payment_repo,
            parking_repo,
        }
    }

    async fn expected_for(&self, date: NaiveDate) -> UseCaseResult<MethodTotals> {
        let (from, until) = day_bounds(date);
        let payments = self
            .payment_repo
            .list_completed_between(from, until)
            .await
            .map_err(|err| {
                error!(%date, db_error = ?err, "cash_register: failed to load day payments");
                CashRegisterError::Internal(err)
            })?;
        Ok(MethodTotals::from_payments(&payments))
    }

    async fn sessions_closed_on(
        &self,
        date: NaiveDate,
    ) -> UseCaseResult<Vec<SessionWithVehicle>> {
        let (from, until) = day_bounds(date);
        self.parking_repo
            .list_exited_between(from, until)
            .await
            .map_err(|err| {
                error!(%date, db_error = ?err, "cash_register: failed to load day sessions");
                CashRegisterError::Internal(err)
            })
    }

    async fn closing_for(&self, date: NaiveDate) -> UseCaseResult<Option<CashClosingEntity>> {
        self.cash_register_repo
            .find_closing_by_date(date)
            .await
            .map_err(|err| {
                error!(%date, db_error = ?err, "cash_register: failed to check existing closing");
                CashRegisterError::Internal(err)
            })
    }

    pub async fn preview(&self) -> UseCaseResult<ClosingPreviewDto> {
        let date = business_date(Utc::now());

        let current_closing = self.closing_for(date).await?;
        let expected = self.expected_for(date).await?;
        let sessions = self.sessions_closed_on(date).await?;
        let recent_closings = self
            .cash_register_repo
            .list_closings(None, None, Some(RECENT_CLOSINGS))
            .await
            .map_err(|err| {
                error!(db_error = ?err, "cash_register: failed to list recent closings");
                CashRegisterError::Internal(err)
            })?;

        Ok(ClosingPreviewDto {
            date,
            register_open: current_closing.is_none(),
            current_closing: current_closing.map(CashClosingDto::from),
            expected,
            expected_total_minor: expected.total_minor(),
            suggested_counted: expected,
            counts: SessionCounts::from_sessions(&sessions),
            sessions: sessions.iter().map(ParkingSessionDto::from).collect(),
            recent_closings: recent_closings
                .into_iter()
                .map(CashClosingDto::from)
                .collect(),
        })
    }

    pub async fn close_register(
        &self,
        user_id: Uuid,
        form: &CloseRegisterForm,
    ) -> UseCaseResult<CashClosingDto> {
        let now = Utc::now();
        let date = business_date(now);

        if self.closing_for(date).await?.is_some() {
            warn!(
                %user_id,
                %date,
                status = StatusCode::CONFLICT.as_u16(),
                "cash_register: closing refused, day already closed"
            );
            return Err(CashRegisterError::AlreadyClosed { date });
        }

        let CountedAmounts { counted, notes } = validate_counts(form)?;
        let expected = self.expected_for(date).await?;
        let counts = SessionCounts::from_sessions(&self.sessions_closed_on(date).await?);
        let reconciliation = reconcile(expected, counted);
        let (opened_at, _) = day_bounds(date);

        let insert_closing_entity = InsertCashClosingEntity {
            closing_date: date,
            opened_at,
            closed_at: now,
            opening_amount_minor: 0,
            expected_cash_minor: expected.cash_minor,
            expected_card_minor: expected.card_minor,
            expected_transfer_minor: expected.transfer_minor,
            expected_total_minor: reconciliation.expected_total_minor,
            cash_amount_minor: counted.cash_minor,
            card_amount_minor: counted.card_minor,
            transfer_amount_minor: counted.transfer_minor,
            total_amount_minor: reconciliation.counted_total_minor,
            variance_minor: reconciliation.variance_minor,
            total_sessions: counts.total,
            total_cars: counts.cars,
            total_motorcycles: counts.motorcycles,
            user_id,
            notes: notes.clone(),
            status: ClosingStatus::Closed.to_string(),
            created_at: now,
        };
        let insert_movement_entity = InsertCashMovementEntity {
            movement_type: MovementType::Closing.to_string(),
            concept: format!("Cash register closing - {date}"),
            amount_minor: reconciliation.counted_total_minor,
            method: None,
            payment_id: None,
            user_id,
            notes,
            moved_at: now,
        };

        let closing = self
            .cash_register_repo
            .close_register(insert_closing_entity, insert_movement_entity)
            .await
            .map_err(|err| match duplicate_constraint(&err) {
                Some(CLOSING_DATE_KEY) => {
                    warn!(%user_id, %date, "cash_register: concurrent closing for the same day");
                    CashRegisterError::AlreadyClosed { date }
                }
                _ => {
                    error!(%user_id, %date, db_error = ?err, "cash_register: failed to close register");
                    CashRegisterError::Internal(err)
                }
            })?;

        info!(
            %user_id,
            %date,
            closing_id = %closing.id,
            expected_total_minor = closing.expected_total_minor,
            counted_total_minor = closing.total_amount_minor,
            variance_minor = closing.variance_minor,
            "cash_register: register closed"
        );

        Ok(CashClosingDto::from(closing))
    }

    pub async fn list_closings(
        &self,
        filter: &ClosingHistoryFilter,
    ) -> UseCaseResult<Vec<CashClosingDto>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(CashRegisterError::Validation(FieldErrors::single(
                    "to",
                    "must not be before the start date",
                )));
            }
        }

        let closings = self
            .cash_register_repo
            .list_closings(filter.from, filter.to, None)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "cash_register: failed to list closings");
                CashRegisterError::Internal(err)
            })?;

        Ok(closings.into_iter().map(CashClosingDto::from).collect())
    }

    pub async fn closing_detail(&self, closing_id: Uuid) -> UseCaseResult<ClosingDetailDto> {
        let closing = self
            .cash_register_repo
            .find_closing(closing_id)
            .await
            .map_err(|err| {
                error!(%closing_id, db_error = ?err, "cash_register: failed to load closing");
                CashRegisterError::Internal(err)
            })?
            .ok_or(CashRegisterError::ClosingNotFound)?;

        let sessions = self.sessions_closed_on(closing.closing_date).await?;

        Ok(ClosingDetailDto {
            closing: CashClosingDto::from(closing),
            sessions: sessions.iter().map(ParkingSessionDto::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use domain::{
        entities::payments::PaymentEntity,
        repositories::{
            cash_register::MockCashRegisterRepository, errors::DuplicateRecord,
            parking::MockParkingRepository, payments::MockPaymentRepository,
        },
    };
    use mockall::predicate::eq;

    fn completed(method: &str, amount_minor: i64, paid_at: DateTime<Utc>) -> PaymentEntity {
        PaymentEntity {
            id: Uuid::new_v4(),
            parking_session_id: Uuid::new_v4(),
            amount_minor,
            method: method.to_string(),
            reference: None,
            status: "completed".to_string(),
            paid_at,
            user_id: None,
            notes: None,
            created_at: paid_at,
        }
    }

    fn stored_closing(closing: InsertCashClosingEntity) -> CashClosingEntity {
        CashClosingEntity {
            id: Uuid::new_v4(),
            closing_date: closing.closing_date,
            opened_at: closing.opened_at,
            closed_at: closing.closed_at,
            opening_amount_minor: closing.opening_amount_minor,
            expected_cash_minor: closing.expected_cash_minor,
            expected_card_minor: closing.expected_card_minor,
            expected_transfer_minor: closing.expected_transfer_minor,
            expected_total_minor: closing.expected_total_minor,
            cash_amount_minor: closing.cash_amount_minor,
            card_amount_minor: closing.card_amount_minor,
            transfer_amount_minor: closing.transfer_amount_minor,
            total_amount_minor: closing.total_amount_minor,
            variance_minor: closing.variance_minor,
            total_sessions: closing.total_sessions,
            total_cars: closing.total_cars,
            total_motorcycles: closing.total_motorcycles,
            user_id: closing.user_id,
            notes: closing.notes,
            status: closing.status,
            created_at: closing.created_at,
        }
    }

    fn close_form(cash: &str, card: &str, transfer: &str) -> CloseRegisterForm {
        CloseRegisterForm {
            cash_actual: cash.to_string(),
            card_actual: card.to_string(),
            transfer_actual: transfer.to_string(),
            notes: None,
        }
    }

    fn day_of_payments(
        payment_repo: &mut MockPaymentRepository,
        parking_repo: &mut MockParkingRepository,
    ) {
        payment_repo
            .expect_list_completed_between()
            .returning(|from, _| {
                let payments = vec![
                    completed("cash", 315_000, from),
                    completed("card", 540_000, from),
                ];
                Box::pin(async move { Ok(payments) })
            });
        parking_repo
            .expect_list_exited_between()
            .returning(|_, _| Box::pin(async { Ok(Vec::new()) }));
    }

    #[tokio::test]
    async fn matching_counts_close_with_zero_variance() {
        let user_id = Uuid::new_v4();
        let mut register_repo = MockCashRegisterRepository::new();
        let mut payment_repo = MockPaymentRepository::new();
        let mut parking_repo = MockParkingRepository::new();

        register_repo
            .expect_find_closing_by_date()
            .returning(|_| Box::pin(async { Ok(None) }));
        day_of_payments(&mut payment_repo, &mut parking_repo);
        register_repo
            .expect_close_register()
            .withf(move |closing, movement| {
                closing.expected_total_minor == 855_000
                    && closing.total_amount_minor == 855_000
                    && closing.variance_minor == 0
                    && closing.status == "closed"
                    && movement.movement_type == "closing"
                    && movement.amount_minor == 855_000
                    && movement.user_id == user_id
            })
            .times(1)
            .returning(|closing, _| {
                let stored = stored_closing(closing);
                Box::pin(async move { Ok(stored) })
            });

        let usecase = CashRegisterUseCase::new(
            Arc::new(register_repo),
            Arc::new(payment_repo),
            Arc::new(parking_repo),
        );
        let closing = usecase
            .close_register(user_id, &close_form("3150", "5400", "0"))
            .await
            .unwrap();

        assert_eq!(closing.variance_minor, 0);
        assert_eq!(closing.expected, MethodTotals::new(315_000, 540_000, 0));
        assert_eq!(closing.counted_total_minor, 855_000);
    }

    #[tokio::test]
    async fn shortfall_is_negative_variance() {
        let mut register_repo = MockCashRegisterRepository::new();
        let mut payment_repo = MockPaymentRepository::new();
        let mut parking_repo = MockParkingRepository::new();

        register_repo
            .expect_find_closing_by_date()
            .returning(|_| Box::pin(async { Ok(None) }));
        day_of_payments(&mut payment_repo, &mut parking_repo);
        register_repo.expect_close_register().returning(|closing, _| {
            let stored = stored_closing(closing);
            Box::pin(async move { Ok(stored) })
        });

        let usecase = CashRegisterUseCase::new(
            Arc::new(register_repo),
            Arc::new(payment_repo),
            Arc::new(parking_repo),
        );
        let closing = usecase
            .close_register(Uuid::new_v4(), &close_form("3000", "5400", "0"))
            .await
            .unwrap();

        assert_eq!(closing.variance_minor, -15_000);
    }

    #[tokio::test]
    async fn second_closing_for_the_day_is_refused() {
        let mut register_repo = MockCashRegisterRepository::new();

        register_repo.expect_find_closing_by_date().returning(|date| {
            let now = Utc::now();
            let existing = stored_closing(InsertCashClosingEntity {
                closing_date: date,
                opened_at: now,
                closed_at: now,
                opening_amount_minor: 0,
                expected_cash_minor: 0,
                expected_card_minor: 0,
                expected_transfer_minor: 0,
                expected_total_minor: 0,
                cash_amount_minor: 0,
                card_amount_minor: 0,
                transfer_amount_minor: 0,
                total_amount_minor: 0,
                variance_minor: 0,
                total_sessions: 0,
                total_cars: 0,
                total_motorcycles: 0,
                user_id: Uuid::new_v4(),
                notes: None,
                status: "closed".to_string(),
                created_at: now,
            });
            Box::pin(async move { Ok(Some(existing)) })
        });
        register_repo.expect_close_register().never();

        let usecase = CashRegisterUseCase::new(
            Arc::new(register_repo),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockParkingRepository::new()),
        );
        let result = usecase
            .close_register(Uuid::new_v4(), &close_form("0", "0", "0"))
            .await;

        match result {
            Err(err @ CashRegisterError::AlreadyClosed { .. }) => {
                assert_eq!(err.status_code(), StatusCode::CONFLICT);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_closing_is_reported_as_conflict() {
        let mut register_repo = MockCashRegisterRepository::new();
        let mut payment_repo = MockPaymentRepository::new();
        let mut parking_repo = MockParkingRepository::new();

        register_repo
            .expect_find_closing_by_date()
            .returning(|_| Box::pin(async { Ok(None) }));
        day_of_payments(&mut payment_repo, &mut parking_repo);
        register_repo.expect_close_register().returning(|_, _| {
            Box::pin(async { Err(anyhow::Error::new(DuplicateRecord::new(CLOSING_DATE_KEY))) })
        });

        let usecase = CashRegisterUseCase::new(
            Arc::new(register_repo),
            Arc::new(payment_repo),
            Arc::new(parking_repo),
        );
        let result = usecase
            .close_register(Uuid::new_v4(), &close_form("3150", "5400", "0"))
            .await;

        assert!(matches!(result, Err(CashRegisterError::AlreadyClosed { .. })));
    }

    #[tokio::test]
    async fn negative_counts_are_rejected() {
        let mut register_repo = MockCashRegisterRepository::new();
        register_repo
            .expect_find_closing_by_date()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = CashRegisterUseCase::new(
            Arc::new(register_repo),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockParkingRepository::new()),
        );

        match usecase
            .close_register(Uuid::new_v4(), &close_form("-1", "", "0"))
            .await
        {
            Err(CashRegisterError::Validation(errors)) => {
                assert!(errors.get("cash_actual").is_some());
                assert!(errors.get("card_actual").is_some());
                assert!(errors.get("transfer_actual").is_none());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn preview_prefills_counts_with_expected() {
        let mut register_repo = MockCashRegisterRepository::new();
        let mut payment_repo = MockPaymentRepository::new();
        let mut parking_repo = MockParkingRepository::new();

        register_repo
            .expect_find_closing_by_date()
            .returning(|_| Box::pin(async { Ok(None) }));
        register_repo
            .expect_list_closings()
            .with(eq(None::<NaiveDate>), eq(None::<NaiveDate>), eq(Some(RECENT_CLOSINGS)))
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(Vec::new()) }));
        day_of_payments(&mut payment_repo, &mut parking_repo);

        let usecase = CashRegisterUseCase::new(
            Arc::new(register_repo),
            Arc::new(payment_repo),
            Arc::new(parking_repo),
        );
        let preview = usecase.preview().await.unwrap();

        assert!(preview.register_open);
        assert_eq!(preview.expected_total_minor, 855_000);
        assert_eq!(preview.suggested_counted, preview.expected);
        assert_eq!(preview.counts, SessionCounts::default());
    }

    #[tokio::test]
    async fn unknown_closing_is_not_found() {
        let mut register_repo = MockCashRegisterRepository::new();
        register_repo
            .expect_find_closing()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = CashRegisterUseCase::new(
            Arc::new(register_repo),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockParkingRepository::new()),
        );

        assert!(matches!(
            usecase.closing_detail(Uuid::new_v4()).await,
            Err(CashRegisterError::ClosingNotFound)
        ));
    }

    #[tokio::test]
    async fn inverted_history_range_is_rejected() {
        let usecase = CashRegisterUseCase::new(
            Arc::new(MockCashRegisterRepository::new()),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockParkingRepository::new()),
        );
        let filter = ClosingHistoryFilter {
            from: NaiveDate::from_ymd_opt(2026, 4, 10),
            to: NaiveDate::from_ymd_opt(2026, 4, 1),
        };

        assert!(matches!(
            usecase.list_closings(&filter).await,
            Err(CashRegisterError::Validation(_))
        ));
    }
}
