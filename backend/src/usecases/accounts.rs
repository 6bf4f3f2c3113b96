use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use domain::{
    entities::app_users::InsertAppUserEntity,
    repositories::{
        errors::{USER_DOCUMENT_KEY, USERNAME_KEY, duplicate_constraint},
        users::UserRepository,
    },
    value_objects::{
        enums::user_roles::UserRole,
        users::{CreateUserForm, LoginForm, UserDto},
        validation::{FieldErrors, optional_text, required_text},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    auth::{AuthUser, hash_password, issue_token, safe_return_url, verify_password},
    axum_http::error_responses::UseCaseError,
    config::config_model::AuthSecret,
};

const MAX_NAME_LEN: usize = 100;
const MAX_DOCUMENT_LEN: usize = 20;
const MAX_USERNAME_LEN: usize = 50;
const MAX_CONTACT_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("please correct the highlighted fields")]
    Validation(FieldErrors),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("only an administrator can create users")]
    Forbidden,
    #[error("a user with that username or document already exists")]
    DuplicateUser(FieldErrors),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError for AccountError {
    fn status_code(&self) -> StatusCode {
        match self {
            // The login form is re-rendered with the generic message.
            AccountError::Validation(_) | AccountError::InvalidCredentials => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AccountError::Forbidden => StatusCode::FORBIDDEN,
            AccountError::DuplicateUser(_) => StatusCode::CONFLICT,
            AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AccountError::Validation(errors) | AccountError::DuplicateUser(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AccountError>;

/// A successful sign-in: the token to put in the auth cookie and where to go next.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Remember me: the cookie outlives the browser session.
    pub persistent: bool,
    pub return_url: String,
    pub user: UserDto,
}

fn validate_user(form: &CreateUserForm) -> UseCaseResult<(InsertAppUserEntity, String)> {
    let mut errors = FieldErrors::new();

    let first_name = required_text("first_name", &form.first_name, MAX_NAME_LEN, &mut errors);
    let last_name = required_text("last_name", &form.last_name, MAX_NAME_LEN, &mut errors);
    let document = required_text("document", &form.document, MAX_DOCUMENT_LEN, &mut errors);
    let email = optional_text("email", form.email.as_deref(), MAX_CONTACT_LEN, &mut errors);
    if email.as_deref().is_some_and(|email| !email.contains('@')) {
        errors.add("email", "must be a valid email address");
    }
    let phone = optional_text("phone", form.phone.as_deref(), MAX_CONTACT_LEN, &mut errors);
    let username = required_text("username", &form.username, MAX_USERNAME_LEN, &mut errors)
        .map(|username| username.to_lowercase());
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
    let role = match form.role.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match UserRole::from_str(&raw.to_lowercase()) {
            Some(role) => role,
            None => {
                errors.add("role", "choose administrator or employee");
                UserRole::default()
            }
        },
        _ => UserRole::default(),
    };

    match (first_name, last_name, document, username) {
        (Some(first_name), Some(last_name), Some(document), Some(username))
            if errors.is_empty() =>
        {
            Ok((
                InsertAppUserEntity {
                    first_name,
                    last_name,
                    document,
                    email,
                    phone,
                    username,
                    password_hash: String::new(),
                    role: role.to_string(),
                    is_active: true,
                    created_at: Utc::now(),
                },
                form.password.clone(),
            ))
        }
        _ => Err(AccountError::Validation(errors)),
    }
}

pub struct AccountUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    auth_secret: AuthSecret,
}

impl<U> AccountUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, auth_secret: AuthSecret) -> Self {
        Self {
            user_repo,
            auth_secret,
        }
    }

    pub async fn sign_in(&self, form: &LoginForm) -> UseCaseResult<SignedIn> {
        let auth = &self.auth_secret;
        let username = form.username.trim().to_lowercase();
        if username.is_empty() || form.password.is_empty() {
            return Err(AccountError::InvalidCredentials);
        }

        let user = self
            .user_repo
            .find_active_by_username(username.clone())
            .await
            .map_err(|err| {
                error!(%username, db_error = ?err, "accounts: failed to load user");
                AccountError::Internal(err)
            })?;

        let user = match user {
            Some(user) if verify_password(&form.password, &user.password_hash) => user,
            _ => {
                warn!(%username, "accounts: sign-in refused");
                return Err(AccountError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        let persistent = form.remember();
        let expires_at = if persistent {
            now + Duration::days(auth.remember_me_ttl_days)
        } else {
            now + Duration::minutes(auth.session_ttl_minutes)
        };

        let token = issue_token(&user, expires_at, &auth.jwt_secret)?;

        if let Err(err) = self.user_repo.touch_last_login(user.id, now).await {
            // Sign-in still succeeds.
            warn!(user_id = %user.id, db_error = ?err, "accounts: failed to record last login");
        }

        info!(user_id = %user.id, %username, persistent, "accounts: signed in");

        Ok(SignedIn {
            token,
            expires_at,
            persistent,
            return_url: safe_return_url(form.return_url.as_deref()),
            user: UserDto::from(user),
        })
    }

    /// The first user may be created anonymously; after that only administrators can.
    pub async fn create_user(
        &self,
        caller: Option<&AuthUser>,
        form: &CreateUserForm,
    ) -> UseCaseResult<UserDto> {
        let is_admin = caller.is_some_and(AuthUser::is_admin);
        if !is_admin {
            let existing = self.user_repo.count().await.map_err(|err| {
                error!(db_error = ?err, "accounts: failed to count users");
                AccountError::Internal(err)
            })?;
            if existing > 0 {
                warn!(
                    caller = ?caller.map(|user| user.username.as_str()),
                    status = StatusCode::FORBIDDEN.as_u16(),
                    "accounts: user creation refused"
                );
                return Err(AccountError::Forbidden);
            }
        }

        let (mut insert_user_entity, password) = validate_user(form)?;
        insert_user_entity.password_hash = hash_password(&password)?;

        let created = self
            .user_repo
            .create(insert_user_entity)
            .await
            .map_err(|err| match duplicate_constraint(&err) {
                Some(USERNAME_KEY) => AccountError::DuplicateUser(FieldErrors::single(
                    "username",
                    "this username is already taken",
                )),
                Some(USER_DOCUMENT_KEY) => AccountError::DuplicateUser(FieldErrors::single(
                    "document",
                    "a user with this document already exists",
                )),
                _ => {
                    error!(db_error = ?err, "accounts: failed to create user");
                    AccountError::Internal(err)
                }
            })?;

        info!(
            user_id = %created.id,
            username = %created.username,
            role = %created.role,
            created_by = ?caller.map(|user| user.username.as_str()),
            "accounts: user created"
        );

        Ok(UserDto::from(created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::validate_token;
    use domain::{
        entities::app_users::AppUserEntity,
        repositories::{errors::DuplicateRecord, users::MockUserRepository},
    };
    use uuid::Uuid;

    const SECRET: &str = "supersecretjwtsecretforunittesting123";

    fn auth_secret() -> AuthSecret {
        AuthSecret {
            jwt_secret: SECRET.to_string(),
            session_ttl_minutes: 480,
            remember_me_ttl_days: 30,
        }
    }

    fn stored_user(password: &str, role: UserRole) -> AppUserEntity {
        AppUserEntity {
            id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: "Gomez".to_string(),
            document: "1020304050".to_string(),
            email: None,
            phone: None,
            username: "agomez".to_string(),
            password_hash: hash_password(password).unwrap(),
            role: role.to_string(),
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    fn login(username: &str, password: &str, remember_me: Option<&str>) -> LoginForm {
        LoginForm {
            username: username.to_string(),
            password: password.to_string(),
            remember_me: remember_me.map(str::to_string),
            return_url: Some("/api/v1/payments/pending".to_string()),
        }
    }

    fn user_form() -> CreateUserForm {
        CreateUserForm {
            first_name: "Luis".to_string(),
            last_name: "Perez".to_string(),
            document: "99887766".to_string(),
            email: Some("luis@example.com".to_string()),
            phone: None,
            username: "LPerez".to_string(),
            password: "caja-2026".to_string(),
            role: Some("employee".to_string()),
        }
    }

    fn admin() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            username: "admin".to_string(),
            display_name: "Admin".to_string(),
            role: UserRole::Administrator,
        }
    }

    #[tokio::test]
    async fn sign_in_issues_token_for_valid_credentials() {
        let mut user_repo = MockUserRepository::new();
        let user = stored_user("caja-2026", UserRole::Employee);
        let user_id = user.id;
        user_repo
            .expect_find_active_by_username()
            .withf(|username| username == "agomez")
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        user_repo
            .expect_touch_last_login()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase = AccountUseCase::new(Arc::new(user_repo), auth_secret());
        let signed_in = usecase
            .sign_in(&login(" AGomez ", "caja-2026", None))
            .await
            .unwrap();

        let claims = validate_token(&signed_in.token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "employee");
        assert!(!signed_in.persistent);
        assert_eq!(signed_in.return_url, "/api/v1/payments/pending");
        assert!(signed_in.expires_at <= Utc::now() + Duration::minutes(480));
    }

    #[tokio::test]
    async fn remember_me_extends_expiry() {
        let mut user_repo = MockUserRepository::new();
        let user = stored_user("caja-2026", UserRole::Employee);
        user_repo.expect_find_active_by_username().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });
        user_repo
            .expect_touch_last_login()
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase = AccountUseCase::new(Arc::new(user_repo), auth_secret());
        let signed_in = usecase
            .sign_in(&login("agomez", "caja-2026", Some("on")))
            .await
            .unwrap();

        assert!(signed_in.persistent);
        assert!(signed_in.expires_at > Utc::now() + Duration::days(29));
    }

    #[tokio::test]
    async fn wrong_password_is_generic_failure() {
        let mut user_repo = MockUserRepository::new();
        let user = stored_user("caja-2026", UserRole::Employee);
        user_repo.expect_find_active_by_username().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });
        user_repo.expect_touch_last_login().never();

        let usecase = AccountUseCase::new(Arc::new(user_repo), auth_secret());
        let result = usecase
            .sign_in(&login("agomez", "caja-2025", None))
            .await;

        match result {
            Err(err @ AccountError::InvalidCredentials) => {
                assert_eq!(err.to_string(), "invalid username or password");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_user_is_generic_failure() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_active_by_username()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = AccountUseCase::new(Arc::new(user_repo), auth_secret());
        let result = usecase
            .sign_in(&login("nobody", "caja-2026", None))
            .await;

        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn first_user_can_be_created_without_sign_in() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_count()
            .returning(|| Box::pin(async { Ok(0) }));
        user_repo
            .expect_create()
            .withf(|user| {
                user.username == "lperez"
                    && user.password_hash.starts_with("$argon2id$")
                    && user.role == "employee"
            })
            .times(1)
            .returning(|user| {
                let created = AppUserEntity {
                    id: Uuid::new_v4(),
                    first_name: user.first_name,
                    last_name: user.last_name,
                    document: user.document,
                    email: user.email,
                    phone: user.phone,
                    username: user.username,
                    password_hash: user.password_hash,
                    role: user.role,
                    is_active: user.is_active,
                    created_at: user.created_at,
                    last_login_at: None,
                };
                Box::pin(async move { Ok(created) })
            });

        let usecase = AccountUseCase::new(Arc::new(user_repo), auth_secret());
        let user = usecase.create_user(None, &user_form()).await.unwrap();

        assert_eq!(user.username, "lperez");
    }

    #[tokio::test]
    async fn employees_cannot_create_users_once_bootstrapped() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_count()
            .returning(|| Box::pin(async { Ok(1) }));
        user_repo.expect_create().never();

        let employee = AuthUser {
            role: UserRole::Employee,
            ..admin()
        };
        let usecase = AccountUseCase::new(Arc::new(user_repo), auth_secret());
        let result = usecase.create_user(Some(&employee), &user_form()).await;

        match result {
            Err(err @ AccountError::Forbidden) => {
                assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_count().never();
        user_repo.expect_create().returning(|_| {
            Box::pin(async { Err(anyhow::Error::new(DuplicateRecord::new(USERNAME_KEY))) })
        });

        let usecase = AccountUseCase::new(Arc::new(user_repo), auth_secret());
        let result = usecase.create_user(Some(&admin()), &user_form()).await;

        match result {
            Err(AccountError::DuplicateUser(errors)) => {
                assert!(errors.get("username").is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let usecase = AccountUseCase::new(Arc::new(MockUserRepository::new()), auth_secret());
        let form = CreateUserForm {
            password: "123".to_string(),
            ..user_form()
        };

        match usecase.create_user(Some(&admin()), &form).await {
            Err(AccountError::Validation(errors)) => {
                assert!(errors.get("password").is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
