use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::payments::PaymentUseCase,
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use domain::{
    repositories::{parking::ParkingRepository, payments::PaymentRepository},
    value_objects::payments::{PaymentHistoryQuery, RecordPaymentForm},
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{parking::ParkingPostgres, payments::PaymentPostgres},
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let parking_repository = ParkingPostgres::new(Arc::clone(&db_pool));

    let usecase = PaymentUseCase::new(Arc::new(payment_repository), Arc::new(parking_repository));

    Router::new()
        .route("/", post(record_payment::<PaymentPostgres, ParkingPostgres>))
        .route(
            "/history",
            get(payment_history::<PaymentPostgres, ParkingPostgres>),
        )
        .route(
            "/pending",
            get(pending_payments::<PaymentPostgres, ParkingPostgres>),
        )
        .route(
            "/new/:session_id",
            get(payment_form::<PaymentPostgres, ParkingPostgres>),
        )
        .route("/:id", get(payment_detail::<PaymentPostgres, ParkingPostgres>))
        .with_state(Arc::new(usecase))
}

pub async fn record_payment<Pay, P>(
    State(usecase): State<Arc<PaymentUseCase<Pay, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Form(form): Form<RecordPaymentForm>,
) -> impl IntoResponse
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.record_payment(user_id, &form).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(err) => AppError::from_usecase(err).with_values(&form).into_response(),
    }
}

pub async fn payment_form<Pay, P>(
    State(usecase): State<Arc<PaymentUseCase<Pay, P>>>,
    _auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.payment_form(session_id).await {
        Ok(form) => Json(form).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn payment_detail<Pay, P>(
    State(usecase): State<Arc<PaymentUseCase<Pay, P>>>,
    _auth: AuthUser,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.payment_detail(payment_id).await {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn payment_history<Pay, P>(
    State(usecase): State<Arc<PaymentUseCase<Pay, P>>>,
    _auth: AuthUser,
    Query(query): Query<PaymentHistoryQuery>,
) -> impl IntoResponse
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.history(&query).await {
        Ok(history) => Json(history).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn pending_payments<Pay, P>(
    State(usecase): State<Arc<PaymentUseCase<Pay, P>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.pending().await {
        Ok(pending) => Json(pending).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
