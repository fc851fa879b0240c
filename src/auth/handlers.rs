use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterAdminRequest, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::repo_types::{PublicUser, User, UserRole, UserStatus},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/register-admin", post(register_admin))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = create_account(
        &state,
        &payload.username,
        &payload.email,
        &payload.password,
        UserRole::User,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
pub async fn register_admin(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAdminRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    // Secret gate comes before any validation or storage access.
    if payload.secret_key != state.config.admin_secret_key {
        warn!("admin registration with wrong secret");
        return Err(ApiError::Forbidden("invalid admin secret key".into()));
    }

    let response = create_account(
        &state,
        &payload.username,
        &payload.email,
        &payload.password,
        UserRole::Admin,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn create_account(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
    role: UserRole,
) -> Result<AuthResponse, ApiError> {
    let username = username.trim();
    let email = email.trim().to_lowercase();

    validate_username(username)?;
    validate_email(&email)?;
    validate_password(password)?;

    // Advisory pre-check; the unique indexes catch concurrent duplicates
    // and surface as Conflict through the sqlx error mapping.
    if User::username_or_email_taken(&state.db, username, &email).await? {
        warn!(%username, %email, "registration conflict");
        return Err(ApiError::Conflict("username or email already in use".into()));
    }

    let hash = hash_password(password)?;
    let user = User::create(&state.db, username, &email, &hash, role).await?;

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, role = ?user.role, "user registered");
    Ok(AuthResponse {
        user: user.into(),
        token,
    })
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(%email, "login with unknown email");
            ApiError::InvalidCredentials
        })?;

    if user.status != UserStatus::Active {
        warn!(user_id = %user.id, status = %user.status, "login on disabled account");
        return Err(ApiError::AccountDisabled);
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let record = PublicUser::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(record))
}

// --- input validation ---

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 6;

fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if len < USERNAME_MIN || len > USERNAME_MAX {
        return Err(ApiError::validation(
            "username",
            format!("username must be {USERNAME_MIN} to {USERNAME_MAX} characters"),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ApiError::validation("email", "invalid email address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(ApiError::validation(
            "password",
            format!("password must be at least {PASSWORD_MIN} characters"),
        ));
    }
    Ok(())
}
