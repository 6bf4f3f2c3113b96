use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::configurations::ConfigurationUseCase,
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use domain::{
    repositories::config_entries::ConfigEntryRepository,
    value_objects::configurations::{ConfigEntryForm, ConfigListQuery, RatesForm},
};
use infra::postgres::{
    postgres_connection::PgPoolSquad, repositories::config_entries::ConfigEntryPostgres,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let config_entry_repository = ConfigEntryPostgres::new(Arc::clone(&db_pool));
    let usecase = ConfigurationUseCase::new(Arc::new(config_entry_repository));

    Router::new()
        .route(
            "/",
            get(list_entries::<ConfigEntryPostgres>).post(create_entry::<ConfigEntryPostgres>),
        )
        .route("/categories", get(list_categories::<ConfigEntryPostgres>))
        .route(
            "/rates",
            get(get_rates::<ConfigEntryPostgres>).put(update_rates::<ConfigEntryPostgres>),
        )
        .route(
            "/:id",
            get(get_entry::<ConfigEntryPostgres>)
                .put(update_entry::<ConfigEntryPostgres>)
                .delete(delete_entry::<ConfigEntryPostgres>),
        )
        .with_state(Arc::new(usecase))
}

pub async fn list_entries<C>(
    State(usecase): State<Arc<ConfigurationUseCase<C>>>,
    _auth: AuthUser,
    Query(query): Query<ConfigListQuery>,
) -> impl IntoResponse
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.list(&query).await {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn list_categories<C>(
    State(usecase): State<Arc<ConfigurationUseCase<C>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.categories().await {
        Ok(categories) => Json(categories).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn get_entry<C>(
    State(usecase): State<Arc<ConfigurationUseCase<C>>>,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.get(entry_id).await {
        Ok(entry) => Json(entry).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn create_entry<C>(
    State(usecase): State<Arc<ConfigurationUseCase<C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Form(form): Form<ConfigEntryForm>,
) -> impl IntoResponse
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.create(user_id, &form).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(err) => AppError::from_usecase(err).with_values(&form).into_response(),
    }
}

pub async fn update_entry<C>(
    State(usecase): State<Arc<ConfigurationUseCase<C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(entry_id): Path<Uuid>,
    Form(form): Form<ConfigEntryForm>,
) -> impl IntoResponse
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.update(user_id, entry_id, &form).await {
        Ok(entry) => Json(entry).into_response(),
        Err(err) => AppError::from_usecase(err).with_values(&form).into_response(),
    }
}

pub async fn delete_entry<C>(
    State(usecase): State<Arc<ConfigurationUseCase<C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.delete(user_id, entry_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn get_rates<C>(
    State(usecase): State<Arc<ConfigurationUseCase<C>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.rates().await {
        Ok(rates) => Json(rates).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn update_rates<C>(
    State(usecase): State<Arc<ConfigurationUseCase<C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Form(form): Form<RatesForm>,
) -> impl IntoResponse
where
    C: ConfigEntryRepository + Send + Sync + 'static,
{
    match usecase.update_rates(user_id, &form).await {
        Ok(rates) => Json(rates).into_response(),
        Err(err) => AppError::from_usecase(err).with_values(&form).into_response(),
    }
}
