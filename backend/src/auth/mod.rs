use std::convert::Infallible;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use domain::{entities::app_users::AppUserEntity, value_objects::enums::user_roles::UserRole};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::config_loader;

pub const AUTH_COOKIE: &str = "parking_auth";
pub const LOGIN_PATH: &str = "/account/login";
pub const DEFAULT_RETURN_URL: &str = "/api/v1/dashboard";

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthClaims {
    pub sub: String,
    pub username: String,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrator
    }
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn issue_token(
    user: &AppUserEntity,
    expires_at: DateTime<Utc>,
    secret: &str,
) -> anyhow::Result<String> {
    let claims = AuthClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        name: user.full_name(),
        role: user.role.clone(),
        exp: usize::try_from(expires_at.timestamp())?,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn validate_token(token: &str, secret: &str) -> Result<AuthClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

    let token_data = decode::<AuthClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

fn auth_user_from_claims(claims: AuthClaims) -> Result<AuthUser, AuthError> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| anyhow::anyhow!("Invalid user ID in token"))?;
    let role = UserRole::from_str(&claims.role)
        .ok_or_else(|| anyhow::anyhow!("Unknown role in token"))?;

    Ok(AuthUser {
        user_id,
        username: claims.username,
        display_name: claims.name,
        role,
    })
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// `false` for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            warn!(error = %err, "auth: stored password hash is not a valid PHC string");
            false
        }
    }
}

/// Only same-site absolute paths are followed after sign-in.
pub fn safe_return_url(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => DEFAULT_RETURN_URL.to_string(),
    }
}

pub fn login_redirect_target(return_url: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(return_url.as_bytes()).collect();
    format!("{LOGIN_PATH}?return_url={encoded}")
}

/// Rejection for protected routes: 303 to the login page.
#[derive(Debug)]
pub struct AuthRedirect {
    pub return_url: String,
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to(&login_redirect_target(&self.return_url)).into_response()
    }
}

fn authenticate(parts: &Parts) -> Result<AuthUser, AuthError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing auth cookie"))?;

    let secret = config_loader::get_auth_secret()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    let claims = validate_token(&token, &secret.jwt_secret)?;
    auth_user_from_claims(claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts).map_err(|err| {
            let return_url = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_RETURN_URL.to_string());
            debug!(error = %err, %return_url, "auth: redirecting to sign-in");
            AuthRedirect { return_url }
        })
    }
}

/// Signed-in user when there is one; never rejects.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(authenticate(parts).ok()))
    }
}
