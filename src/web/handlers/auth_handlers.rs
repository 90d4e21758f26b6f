// src/web/handlers/auth_handlers.rs
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::{hash_password, verify_password, LoginRequest, RegisterRequest};
use crate::domain::DomainError;
use crate::repository::{User, UserRepository};
use crate::web::types::*;
use crate::web::AppState;

fn invalid_credentials() -> ApiError {
    api_error(
        Status::Unauthorized,
        "Invalid email or password",
        "INVALID_CREDENTIALS",
        &["Check your email and password"],
    )
}

fn session(state: &AppState, user: User) -> ApiResult<AuthPayload> {
    let token = state
        .auth
        .issue_token(&user)
        .map_err(|e| internal_error("issue session token", e))?;
    Ok(AuthPayload { token, user })
}

pub async fn register_handler(
    request: Json<RegisterRequest>,
    state: &State<AppState>,
) -> ApiResult<Custom<Json<DataResponse<AuthPayload>>>> {
    request.validate()?;

    let users = UserRepository::new(state.db.pool());
    let existing = users
        .find_by_email(&request.email)
        .await
        .map_err(|e| internal_error("look up user", e))?;
    if existing.is_some() {
        return Err(DomainError::EmailTaken.into());
    }

    let password_hash = hash_password(&request.password)
        .await
        .map_err(|e| internal_error("hash password", e))?;
    let user = users
        .create(&request.email, request.name.trim(), &password_hash)
        .await
        .map_err(|e| internal_error("create user", e))?;

    app_log!(info, "Registered user {}", user.email);
    let payload = session(state, user)?;
    Ok(Custom(
        Status::Created,
        Json(DataResponse::success("Account created", payload)),
    ))
}

pub async fn login_handler(
    request: Json<LoginRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<AuthPayload>>> {
    let user = UserRepository::new(state.db.pool())
        .find_by_email(&request.email)
        .await
        .map_err(|e| internal_error("look up user", e))?
        .ok_or_else(invalid_credentials)?;

    let valid = verify_password(&request.password, &user.password_hash)
        .await
        .map_err(|e| internal_error("verify password", e))?;
    if !valid {
        app_log!(warn, "Failed login for {}", user.email);
        return Err(invalid_credentials());
    }

    app_log!(info, "User {} logged in", user.email);
    Ok(Json(DataResponse::success("Logged in", session(state, user)?)))
}
