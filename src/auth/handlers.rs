use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{Credentials, MessageResponse, SigninRequest, SigninResponse, SignupRequest},
        password::{hash_password, verify_password},
        repo_types::UserRecord,
    },
    error::AppError,
    extractors::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

fn invalid_credentials() -> AppError {
    AppError::Auth("Invalid credentials".into())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(new_user) = payload.into_new_user() else {
        warn!("signup with missing fields");
        return Err(AppError::Validation("Missing fields".into()));
    };

    // Cheap early exit before paying for the hash; `create` re-checks under the lock.
    if state.users.find_by_email(&new_user.email).await.is_some() {
        warn!(email = %new_user.email, "email already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let hash = hash_password(&new_user.password).await?;
    let user = state
        .users
        .create(
            &new_user.email,
            UserRecord::new(new_user.name, hash, new_user.role),
        )
        .await
        .inspect_err(|_| warn!(email = %new_user.email, "email registered concurrently"))?;

    info!(
        user_id = %user.id,
        email = %new_user.email,
        role = %user.role,
        created_at = %user.created_at,
        "user registered"
    );
    Ok(Json(MessageResponse {
        message: "User registered successfully".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SigninRequest>,
) -> Result<Json<SigninResponse>, AppError> {
    let Credentials {
        email,
        password,
        role,
    } = payload.into();

    let (Some(email), Some(password)) = (email, password) else {
        warn!("signin without email or password");
        return Err(invalid_credentials());
    };

    let Some(user) = state.users.find_by_email(&email).await else {
        warn!(email = %email, "signin unknown email");
        return Err(invalid_credentials());
    };

    if !verify_password(&password, &user.password_hash).await? {
        warn!(email = %email, user_id = %user.id, "signin invalid password");
        return Err(invalid_credentials());
    }

    if role.as_deref() != Some(user.role.as_str()) {
        warn!(email = %email, user_id = %user.id, "signin role mismatch");
        return Err(invalid_credentials());
    }

    info!(user_id = %user.id, email = %email, "user signed in");
    Ok(Json(SigninResponse {
        message: "Sign in successful".into(),
        name: user.name,
        role: user.role,
    }))
}
