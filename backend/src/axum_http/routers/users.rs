use crate::{
    auth::MaybeAuthUser,
    axum_http::error_responses::AppError,
    config::config_model::AuthSecret,
    usecases::accounts::AccountUseCase,
};
use axum::{
    Form, Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use domain::{repositories::users::UserRepository, value_objects::users::CreateUserForm};
use infra::postgres::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres};
use std::sync::Arc;

pub fn routes(db_pool: Arc<PgPoolSquad>, auth_secret: AuthSecret) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let usecase = AccountUseCase::new(Arc::new(user_repository), auth_secret);

    Router::new()
        .route("/", post(create_user::<UserPostgres>))
        .with_state(Arc::new(usecase))
}

/// Open while no user exists; afterwards administrators only.
pub async fn create_user<U>(
    State(usecase): State<Arc<AccountUseCase<U>>>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Form(form): Form<CreateUserForm>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match usecase.create_user(caller.as_ref(), &form).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => AppError::from_usecase(err).with_values(&form).into_response(),
    }
}
