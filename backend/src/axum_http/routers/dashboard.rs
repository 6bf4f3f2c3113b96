use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{dashboard::DashboardUseCase, rate_cards::RateCardResolver},
};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use domain::repositories::{
    config_entries::ConfigEntryRepository, parking::ParkingRepository, payments::PaymentRepository,
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{
        config_entries::ConfigEntryPostgres, parking::ParkingPostgres, payments::PaymentPostgres,
    },
};
use std::sync::Arc;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let parking_repository = ParkingPostgres::new(Arc::clone(&db_pool));
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let config_entry_repository = ConfigEntryPostgres::new(Arc::clone(&db_pool));

    let usecase = DashboardUseCase::new(
        Arc::new(parking_repository),
        Arc::new(payment_repository),
        Arc::new(RateCardResolver::new(Arc::new(config_entry_repository))),
    );

    Router::new()
        .route(
            "/",
            get(summary::<ParkingPostgres, PaymentPostgres, ConfigEntryPostgres>),
        )
        .with_state(Arc::new(usecase))
}

pub async fn summary<P, Pay, C>(
    State(usecase): State<Arc<DashboardUseCase<P, Pay, C>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    P: ParkingRepository + Send + Sync + 'static,
    Pay: PaymentRepository + Send + Sync + 'static,
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.summary().await {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
