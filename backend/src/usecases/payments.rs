use axum::http::StatusCode;
use chrono::Utc;
use domain::{
    entities::{cash_movements::InsertCashMovementEntity, payments::InsertPaymentEntity},
    repositories::{
        errors::{ONE_COMPLETED_PAYMENT_PER_SESSION, duplicate_constraint},
        parking::ParkingRepository,
        payments::PaymentRepository,
    },
    value_objects::{
        business_days::day_bounds,
        cash_register::CashMovementDto,
        enums::{
            movement_types::MovementType, payment_methods::PaymentMethod,
            payment_statuses::PaymentStatus,
        },
        parking::{MAX_NOTES_LEN, ParkingSessionDto, SessionWithVehicle},
        payments::{
            MAX_REFERENCE_LEN, PaymentDetailDto, PaymentDto, PaymentFilter, PaymentFormDto,
            PaymentHistoryDto, PaymentHistoryQuery, PaymentHistoryRowDto, PendingPaymentsDto,
            RecordPaymentForm, payment_concept,
        },
        validation::{FieldErrors, optional_text, parse_amount},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::UseCaseError;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("please correct the highlighted fields")]
    Validation(FieldErrors),
    #[error("parking session not found")]
    SessionNotFound,
    #[error("the vehicle has not exited yet")]
    SessionStillActive(FieldErrors),
    #[error("this parking session has already been paid")]
    AlreadyPaid(FieldErrors),
    #[error("payment not found")]
    PaymentNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError for PaymentError {
    fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Validation(_) | PaymentError::SessionStillActive(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PaymentError::SessionNotFound | PaymentError::PaymentNotFound => {
                StatusCode::NOT_FOUND
            }
            PaymentError::AlreadyPaid(_) => StatusCode::CONFLICT,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            PaymentError::Validation(errors)
            | PaymentError::SessionStillActive(errors)
            | PaymentError::AlreadyPaid(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

fn already_paid() -> PaymentError {
    PaymentError::AlreadyPaid(FieldErrors::single(
        "parking_session_id",
        "this parking session has already been paid",
    ))
}

fn still_active() -> PaymentError {
    PaymentError::SessionStillActive(FieldErrors::single(
        "parking_session_id",
        "the vehicle has not exited yet",
    ))
}

struct ValidatedPayment {
    session_id: Uuid,
    amount_minor: i64,
    method: PaymentMethod,
    reference: Option<String>,
    notes: Option<String>,
}

fn validate_payment(form: &RecordPaymentForm) -> UseCaseResult<ValidatedPayment> {
    let mut errors = FieldErrors::new();

    let session_id = Uuid::parse_str(form.parking_session_id.trim()).ok();
    if session_id.is_none() {
        errors.add("parking_session_id", "choose a parking session");
    }
    let amount_minor = parse_amount("amount", &form.amount, &mut errors);
    let method = PaymentMethod::from_str(&form.method.trim().to_lowercase());
    if method.is_none() {
        errors.add("method", "choose cash, card or transfer");
    }
    let reference = optional_text(
        "reference",
        form.reference.as_deref(),
        MAX_REFERENCE_LEN,
        &mut errors,
    );
    let notes = optional_text("notes", form.notes.as_deref(), MAX_NOTES_LEN, &mut errors);

    match (session_id, amount_minor, method) {
        (Some(session_id), Some(amount_minor), Some(method)) if errors.is_empty() => {
            Ok(ValidatedPayment {
                session_id,
                amount_minor,
                method,
                reference,
                notes,
            })
        }
        _ => Err(PaymentError::Validation(errors)),
    }
}

fn history_filter(query: &PaymentHistoryQuery) -> UseCaseResult<PaymentFilter> {
    let mut errors = FieldErrors::new();

    let method = match query.method.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match PaymentMethod::from_str(&raw.to_lowercase()) {
            Some(method) => Some(method.to_string()),
            None => {
                errors.add("method", "unknown payment method");
                None
            }
        },
        _ => None,
    };
    let status = match query.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match PaymentStatus::from_str(&raw.to_lowercase()) {
            Some(status) => Some(status.to_string()),
            None => {
                errors.add("status", "unknown payment status");
                None
            }
        },
        _ => None,
    };
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            errors.add("to", "must not be before the start date");
        }
    }
    errors.into_result().map_err(PaymentError::Validation)?;

    Ok(PaymentFilter {
        paid_from: query.from.map(|from| day_bounds(from).0),
        paid_until: query.to.map(|to| day_bounds(to).1),
        method,
        status,
    })
}

pub struct PaymentUseCase<Pay, P>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
    parking_repo: Arc<P>,
}

impl<Pay, P> PaymentUseCase<Pay, P>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<Pay>, parking_repo: Arc<P>) -> Self {
        Self {
            payment_repo,
            parking_repo,
        }
    }

    async fn load_session(&self, session_id: Uuid) -> UseCaseResult<SessionWithVehicle> {
        self.parking_repo
            .find_session(session_id)
            .await
            .map_err(|err| {
                error!(%session_id, db_error = ?err, "payments: failed to load session");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::SessionNotFound)
    }

    async fn completed_payment_id(&self, session_id: Uuid) -> UseCaseResult<Option<Uuid>> {
        let existing = self
            .payment_repo
            .find_completed_for_session(session_id)
            .await
            .map_err(|err| {
                error!(%session_id, db_error = ?err, "payments: failed to check existing payment");
                PaymentError::Internal(err)
            })?;
        Ok(existing.map(|payment| payment.id))
    }

    pub async fn record_payment(
        &self,
        user_id: Uuid,
        form: &RecordPaymentForm,
    ) -> UseCaseResult<PaymentDto> {
        let payment = validate_payment(form)?;
        let session_id = payment.session_id;

        let row = self.load_session(session_id).await?;
        if row.session.is_active {
            info!(%user_id, %session_id, "payments: payment refused, session still active");
            return Err(still_active());
        }

        if let Some(payment_id) = self.completed_payment_id(session_id).await? {
            warn!(
                %user_id,
                %session_id,
                %payment_id,
                status = StatusCode::CONFLICT.as_u16(),
                "payments: session already has a completed payment"
            );
            return Err(already_paid());
        }

        let now = Utc::now();
        let insert_payment_entity = InsertPaymentEntity {
            parking_session_id: session_id,
            amount_minor: payment.amount_minor,
            method: payment.method.to_string(),
            reference: payment.reference,
            status: PaymentStatus::Completed.to_string(),
            paid_at: now,
            user_id: Some(user_id),
            notes: payment.notes.clone(),
            created_at: now,
        };
        let insert_movement_entity = InsertCashMovementEntity {
            movement_type: MovementType::Income.to_string(),
            concept: payment_concept(&row.vehicle.plate, payment.method),
            amount_minor: payment.amount_minor,
            method: Some(payment.method.to_string()),
            payment_id: None,
            user_id,
            notes: payment.notes,
            moved_at: now,
        };

        let recorded = self
            .payment_repo
            .record_payment(insert_payment_entity, insert_movement_entity)
            .await
            .map_err(|err| match duplicate_constraint(&err) {
                Some(ONE_COMPLETED_PAYMENT_PER_SESSION) => {
                    warn!(%session_id, "payments: concurrent payment for the same session");
                    already_paid()
                }
                _ => {
                    error!(%user_id, %session_id, db_error = ?err, "payments: failed to record payment");
                    PaymentError::Internal(err)
                }
            })?;

        info!(
            %user_id,
            %session_id,
            payment_id = %recorded.id,
            amount_minor = recorded.amount_minor,
            method = %recorded.method,
            "payments: payment recorded"
        );

        Ok(PaymentDto::from(recorded))
    }

    pub async fn payment_form(&self, session_id: Uuid) -> UseCaseResult<PaymentFormDto> {
        let row = self.load_session(session_id).await?;
        if row.session.is_active {
            return Err(still_active());
        }
        let existing_payment_id = self.completed_payment_id(session_id).await?;

        Ok(PaymentFormDto {
            suggested_amount_minor: row.session.amount_due_minor(),
            session: ParkingSessionDto::from(&row),
            existing_payment_id,
        })
    }

    pub async fn payment_detail(&self, payment_id: Uuid) -> UseCaseResult<PaymentDetailDto> {
        let payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to load payment");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::PaymentNotFound)?;

        let row = self.load_session(payment.parking_session_id).await?;
        let movements = self
            .payment_repo
            .list_movements_for_payment(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to load movements");
                PaymentError::Internal(err)
            })?;

        Ok(PaymentDetailDto {
            payment: PaymentDto::from(payment),
            session: ParkingSessionDto::from(&row),
            movements: movements.into_iter().map(CashMovementDto::from).collect(),
        })
    }

    pub async fn history(&self, query: &PaymentHistoryQuery) -> UseCaseResult<PaymentHistoryDto> {
        let filter = history_filter(query)?;
        let rows = self
            .payment_repo
            .list_history(filter)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "payments: failed to load payment history");
                PaymentError::Internal(err)
            })?;

        let completed = PaymentStatus::Completed.to_string();
        let total_collected_minor = rows
            .iter()
            .filter(|row| row.payment.status == completed)
            .map(|row| row.payment.amount_minor)
            .sum();

        let payments: Vec<PaymentHistoryRowDto> = rows
            .into_iter()
            .map(|row| PaymentHistoryRowDto {
                plate: row.vehicle.plate,
                payment: PaymentDto::from(row.payment),
            })
            .collect();

        Ok(PaymentHistoryDto {
            total_payments: payments.len(),
            payments,
            total_collected_minor,
        })
    }

    pub async fn pending(&self) -> UseCaseResult<PendingPaymentsDto> {
        let rows = self.parking_repo.list_unpaid_closed().await.map_err(|err| {
            error!(db_error = ?err, "payments: failed to list pending payments");
            PaymentError::Internal(err)
        })?;

        Ok(PendingPaymentsDto {
            total_pending_minor: rows.iter().map(|row| row.session.amount_due_minor()).sum(),
            sessions: rows.iter().map(ParkingSessionDto::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate};
    use domain::{
        entities::{
            parking_sessions::ParkingSessionEntity, payments::PaymentEntity,
            vehicles::VehicleEntity,
        },
        repositories::{
            errors::DuplicateRecord, parking::MockParkingRepository,
            payments::MockPaymentRepository,
        },
    };
    use mockall::predicate::eq;

    fn closed_row(session_id: Uuid, final_amount_minor: i64) -> SessionWithVehicle {
        let exited_at = Utc::now();
        let entered_at = exited_at - Duration::minutes(45);
        let vehicle_id = Uuid::new_v4();
        SessionWithVehicle {
            session: ParkingSessionEntity {
                id: session_id,
                vehicle_id,
                barcode: "PARQ202604020900001234".to_string(),
                entered_at,
                exited_at: Some(exited_at),
                parked_minutes: Some(45),
                gross_amount_minor: Some(final_amount_minor),
                discount_minor: 0,
                final_amount_minor: Some(final_amount_minor),
                is_active: false,
                entry_user_id: None,
                exit_user_id: None,
                entry_notes: None,
                exit_notes: None,
                created_at: entered_at,
                updated_at: Some(exited_at),
            },
            vehicle: VehicleEntity {
                id: vehicle_id,
                plate: "ABC123".to_string(),
                category: "car".to_string(),
                total_visits: 3,
                first_visit_at: Some(entered_at),
                last_visit_at: Some(entered_at),
                created_at: entered_at,
                updated_at: None,
            },
        }
    }

    fn payment_entity(session_id: Uuid, amount_minor: i64, paid_at: DateTime<Utc>) -> PaymentEntity {
        PaymentEntity {
            id: Uuid::new_v4(),
            parking_session_id: session_id,
            amount_minor,
            method: "cash".to_string(),
            reference: None,
            status: PaymentStatus::Completed.to_string(),
            paid_at,
            user_id: None,
            notes: None,
            created_at: paid_at,
        }
    }

    fn payment_form(session_id: Uuid) -> RecordPaymentForm {
        RecordPaymentForm {
            parking_session_id: session_id.to_string(),
            amount: "3150".to_string(),
            method: "cash".to_string(),
            reference: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn payment_is_recorded_with_income_movement() {
        let session_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let mut parking_repo = MockParkingRepository::new();
        let mut payment_repo = MockPaymentRepository::new();

        parking_repo
            .expect_find_session()
            .with(eq(session_id))
            .returning(move |id| {
                let row = closed_row(id, 315_000);
                Box::pin(async move { Ok(Some(row)) })
            });
        payment_repo
            .expect_find_completed_for_session()
            .returning(|_| Box::pin(async { Ok(None) }));
        payment_repo
            .expect_record_payment()
            .withf(move |payment, movement| {
                payment.parking_session_id == session_id
                    && payment.amount_minor == 315_000
                    && payment.status == "completed"
                    && movement.movement_type == "income"
                    && movement.concept == "Parking payment - ABC123 - Cash"
                    && movement.user_id == user_id
                    && movement.amount_minor == 315_000
            })
            .times(1)
            .returning(|payment, _| {
                let recorded = payment_entity(payment.parking_session_id, payment.amount_minor, payment.paid_at);
                Box::pin(async move { Ok(recorded) })
            });

        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(parking_repo));
        let payment = usecase
            .record_payment(user_id, &payment_form(session_id))
            .await
            .unwrap();

        assert_eq!(payment.amount_minor, 315_000);
        assert_eq!(payment.amount, "$ 3.150,00");
    }

    #[tokio::test]
    async fn second_payment_for_session_is_rejected() {
        let session_id = Uuid::new_v4();
        let mut parking_repo = MockParkingRepository::new();
        let mut payment_repo = MockPaymentRepository::new();

        parking_repo.expect_find_session().returning(|id| {
            let row = closed_row(id, 315_000);
            Box::pin(async move { Ok(Some(row)) })
        });
        payment_repo
            .expect_find_completed_for_session()
            .returning(|id| {
                let existing = payment_entity(id, 315_000, Utc::now());
                Box::pin(async move { Ok(Some(existing)) })
            });
        payment_repo.expect_record_payment().never();

        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(parking_repo));
        let result = usecase
            .record_payment(Uuid::new_v4(), &payment_form(session_id))
            .await;

        match result {
            Err(err @ PaymentError::AlreadyPaid(_)) => {
                assert_eq!(err.status_code(), StatusCode::CONFLICT);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_duplicate_payment_is_reported_as_conflict() {
        let mut parking_repo = MockParkingRepository::new();
        let mut payment_repo = MockPaymentRepository::new();

        parking_repo.expect_find_session().returning(|id| {
            let row = closed_row(id, 315_000);
            Box::pin(async move { Ok(Some(row)) })
        });
        payment_repo
            .expect_find_completed_for_session()
            .returning(|_| Box::pin(async { Ok(None) }));
        payment_repo.expect_record_payment().returning(|_, _| {
            Box::pin(async {
                Err(anyhow::Error::new(DuplicateRecord::new(
                    ONE_COMPLETED_PAYMENT_PER_SESSION,
                )))
            })
        });

        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(parking_repo));
        let result = usecase
            .record_payment(Uuid::new_v4(), &payment_form(Uuid::new_v4()))
            .await;

        assert!(matches!(result, Err(PaymentError::AlreadyPaid(_))));
    }

    #[tokio::test]
    async fn active_session_cannot_be_paid() {
        let mut parking_repo = MockParkingRepository::new();
        let payment_repo = MockPaymentRepository::new();

        parking_repo.expect_find_session().returning(|id| {
            let mut row = closed_row(id, 0);
            row.session.is_active = true;
            row.session.exited_at = None;
            Box::pin(async move { Ok(Some(row)) })
        });

        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(parking_repo));
        let result = usecase
            .record_payment(Uuid::new_v4(), &payment_form(Uuid::new_v4()))
            .await;

        assert!(matches!(result, Err(PaymentError::SessionStillActive(_))));
    }

    #[tokio::test]
    async fn invalid_form_reports_fields() {
        let usecase = PaymentUseCase::new(
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockParkingRepository::new()),
        );
        let form = RecordPaymentForm {
            parking_session_id: "not-a-uuid".to_string(),
            amount: "-5".to_string(),
            method: "cheque".to_string(),
            reference: None,
            notes: None,
        };

        match usecase.record_payment(Uuid::new_v4(), &form).await {
            Err(PaymentError::Validation(errors)) => {
                assert!(errors.get("parking_session_id").is_some());
                assert!(errors.get("amount").is_some());
                assert!(errors.get("method").is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn payment_form_suggests_final_amount() {
        let session_id = Uuid::new_v4();
        let mut parking_repo = MockParkingRepository::new();
        let mut payment_repo = MockPaymentRepository::new();

        parking_repo.expect_find_session().returning(|id| {
            let row = closed_row(id, 540_000);
            Box::pin(async move { Ok(Some(row)) })
        });
        payment_repo
            .expect_find_completed_for_session()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(parking_repo));
        let form = usecase.payment_form(session_id).await.unwrap();

        assert_eq!(form.suggested_amount_minor, 540_000);
        assert!(form.existing_payment_id.is_none());
    }

    #[test]
    fn history_filter_covers_whole_days() {
        let from = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        let filter = history_filter(&PaymentHistoryQuery {
            from: Some(from),
            to: Some(to),
            method: Some("Card".to_string()),
            status: None,
        })
        .unwrap();

        assert_eq!(filter.paid_from, Some(day_bounds(from).0));
        assert_eq!(filter.paid_until, Some(day_bounds(to).1));
        assert_eq!(filter.method.as_deref(), Some("card"));
        assert!(filter.status.is_none());
    }

    #[test]
    fn history_filter_rejects_unknown_method() {
        let result = history_filter(&PaymentHistoryQuery {
            method: Some("cheque".to_string()),
            ..PaymentHistoryQuery::default()
        });
        assert!(matches!(result, Err(PaymentError::Validation(_))));
    }
}
