use crate::{
    auth::{AUTH_COOKIE, LOGIN_PATH, safe_return_url},
    axum_http::error_responses::AppError,
    config::{config_loader, config_model::AuthSecret},
    usecases::accounts::AccountUseCase,
};
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use domain::{repositories::users::UserRepository, value_objects::users::LoginForm};
use infra::postgres::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    return_url: Option<String>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, auth_secret: AuthSecret) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let usecase = AccountUseCase::new(Arc::new(user_repository), auth_secret);

    Router::new()
        .route("/login", get(login_page).post(sign_in::<UserPostgres>))
        .route("/logout", post(sign_out))
        .with_state(Arc::new(usecase))
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn login_html(return_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<form method="post" action="/account/login">
<input type="hidden" name="return_url" value="{return_url}">
<label>Username <input name="username" autocomplete="username" required></label>
<label>Password <input type="password" name="password" autocomplete="current-password" required></label>
<label><input type="checkbox" name="remember_me" value="on"> Remember me</label>
<button type="submit">Sign in</button>
</form>
</body>
</html>"#,
        return_url = escape_attribute(return_url)
    )
}

pub async fn login_page(Query(query): Query<LoginPageQuery>) -> impl IntoResponse {
    Html(login_html(&safe_return_url(query.return_url.as_deref())))
}

pub async fn sign_in<U>(
    State(usecase): State<Arc<AccountUseCase<U>>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    let signed_in = match usecase.sign_in(&form).await {
        Ok(signed_in) => signed_in,
        Err(err) => return AppError::from_usecase(err).with_values(&form).into_response(),
    };

    let mut auth_cookie = Cookie::build((AUTH_COOKIE, signed_in.token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(config_loader::get_stage().secure_cookies());
    if signed_in.persistent {
        let max_age = signed_in.expires_at - Utc::now();
        auth_cookie = auth_cookie.max_age(cookie::time::Duration::seconds(max_age.num_seconds()));
    }

    (jar.add(auth_cookie), Redirect::to(&signed_in.return_url)).into_response()
}

pub async fn sign_out(jar: CookieJar) -> impl IntoResponse {
    info!("account: signed out");
    (
        jar.remove(Cookie::build(AUTH_COOKIE).path("/")),
        Redirect::to(LOGIN_PATH),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_keeps_return_url_escaped() {
        let html = login_html("/api/v1/parking/history?plate=ABC123&x=\"y\"");
        assert!(html.contains(
            r#"value="/api/v1/parking/history?plate=ABC123&amp;x=&quot;y&quot;""#
        ));
    }
}
