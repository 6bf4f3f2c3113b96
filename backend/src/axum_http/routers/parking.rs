use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{parking::ParkingUseCase, rate_cards::RateCardResolver},
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use domain::{
    repositories::{config_entries::ConfigEntryRepository, parking::ParkingRepository},
    value_objects::parking::{
        RecordEntryForm, RecordExitForm, SessionLookupQuery, VehicleHistoryQuery,
    },
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{config_entries::ConfigEntryPostgres, parking::ParkingPostgres},
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let parking_repository = ParkingPostgres::new(Arc::clone(&db_pool));
    let config_entry_repository = ConfigEntryPostgres::new(Arc::clone(&db_pool));

    let usecase = ParkingUseCase::new(
        Arc::new(parking_repository),
        Arc::new(RateCardResolver::new(Arc::new(config_entry_repository))),
    );

    Router::new()
        .route(
            "/entries",
            post(record_entry::<ParkingPostgres, ConfigEntryPostgres>),
        )
        .route(
            "/entries/:id/receipt",
            get(entry_receipt::<ParkingPostgres, ConfigEntryPostgres>),
        )
        .route(
            "/exits",
            post(record_exit::<ParkingPostgres, ConfigEntryPostgres>),
        )
        .route(
            "/exits/:id/receipt",
            get(exit_receipt::<ParkingPostgres, ConfigEntryPostgres>),
        )
        .route(
            "/lookup",
            get(lookup_active::<ParkingPostgres, ConfigEntryPostgres>),
        )
        .route(
            "/active",
            get(list_active::<ParkingPostgres, ConfigEntryPostgres>),
        )
        .route(
            "/history",
            get(vehicle_history::<ParkingPostgres, ConfigEntryPostgres>),
        )
        .with_state(Arc::new(usecase))
}

pub async fn record_entry<P, C>(
    State(usecase): State<Arc<ParkingUseCase<P, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Form(form): Form<RecordEntryForm>,
) -> impl IntoResponse
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.record_entry(user_id, &form).await {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(err) => AppError::from_usecase(err).with_values(&form).into_response(),
    }
}

pub async fn record_exit<P, C>(
    State(usecase): State<Arc<ParkingUseCase<P, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Form(form): Form<RecordExitForm>,
) -> impl IntoResponse
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.record_exit(user_id, &form).await {
        Ok(receipt) => Json(receipt).into_response(),
        Err(err) => AppError::from_usecase(err).with_values(&form).into_response(),
    }
}

pub async fn entry_receipt<P, C>(
    State(usecase): State<Arc<ParkingUseCase<P, C>>>,
    _auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.entry_receipt(session_id).await {
        Ok(receipt) => Json(receipt).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn exit_receipt<P, C>(
    State(usecase): State<Arc<ParkingUseCase<P, C>>>,
    _auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.exit_receipt(session_id).await {
        Ok(receipt) => Json(receipt).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn lookup_active<P, C>(
    State(usecase): State<Arc<ParkingUseCase<P, C>>>,
    _auth: AuthUser,
    Query(query): Query<SessionLookupQuery>,
) -> impl IntoResponse
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.lookup_active(&query).await {
        Ok(lookup) => Json(lookup).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn list_active<P, C>(
    State(usecase): State<Arc<ParkingUseCase<P, C>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.list_active().await {
        Ok(active) => Json(active).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn vehicle_history<P, C>(
    State(usecase): State<Arc<ParkingUseCase<P, C>>>,
    _auth: AuthUser,
    Query(query): Query<VehicleHistoryQuery>,
) -> impl IntoResponse
where
    P: ParkingRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.vehicle_history(&query).await {
        Ok(history) => Json(history).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
