use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::cash_register::CashRegisterUseCase,
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use domain::{
    repositories::{
        cash_register::CashRegisterRepository, parking::ParkingRepository,
        payments::PaymentRepository,
    },
    value_objects::cash_register::{ClosingHistoryFilter, CloseRegisterForm},
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{
        cash_register::CashRegisterPostgres, parking::ParkingPostgres, payments::PaymentPostgres,
    },
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let cash_register_repository = CashRegisterPostgres::new(Arc::clone(&db_pool));
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let parking_repository = ParkingPostgres::new(Arc::clone(&db_pool));

    let usecase = CashRegisterUseCase::new(
        Arc::new(cash_register_repository),
        Arc::new(payment_repository),
        Arc::new(parking_repository),
    );

    Router::new()
        .route(
            "/",
            get(preview::<CashRegisterPostgres, PaymentPostgres, ParkingPostgres>),
        )
        .route(
            "/closings",
            get(list_closings::<CashRegisterPostgres, PaymentPostgres, ParkingPostgres>)
                .post(close_register::<CashRegisterPostgres, PaymentPostgres, ParkingPostgres>),
        )
        .route(
            "/closings/:id",
            get(closing_detail::<CashRegisterPostgres, PaymentPostgres, ParkingPostgres>),
        )
        .with_state(Arc::new(usecase))
}

pub async fn preview<R, Pay, P>(
    State(usecase): State<Arc<CashRegisterUseCase<R, Pay, P>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    R: CashRegisterRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.preview().await {
        Ok(preview) => Json(preview).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn close_register<R, Pay, P>(
    State(usecase): State<Arc<CashRegisterUseCase<R, Pay, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Form(form): Form<CloseRegisterForm>,
) -> impl IntoResponse
where
    R: CashRegisterRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.close_register(user_id, &form).await {
        Ok(closing) => (StatusCode::CREATED, Json(closing)).into_response(),
        Err(err) => AppError::from_usecase(err).with_values(&form).into_response(),
    }
}

pub async fn list_closings<R, Pay, P>(
    State(usecase): State<Arc<CashRegisterUseCase<R, Pay, P>>>,
    _auth: AuthUser,
    Query(filter): Query<ClosingHistoryFilter>,
) -> impl IntoResponse
where
    R: CashRegisterRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.list_closings(&filter).await {
        Ok(closings) => Json(closings).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn closing_detail<R, Pay, P>(
    State(usecase): State<Arc<CashRegisterUseCase<R, Pay, P>>>,
    _auth: AuthUser,
    Path(closing_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: CashRegisterRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    P: ParkingRepository + Send + Sync + 'static,
{
    match usecase.closing_detail(closing_id).await {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
