use axum::extract::State;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, hash_password, verify_password};
use crate::database::models::NewUser;
use crate::database::record::required_string;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonObject};
use crate::state::AppState;

/// POST /users - Register an author and receive a token
///
/// Expected Input:
/// ```json
/// { "username": "kevin", "password": "...", "first_name": "...", "last_name": "...", "email": "..." }
/// ```
///
/// Responds 201 `{ "token": "..." }`; 409 if the username is taken.
pub async fn signup(State(state): State<AppState>, JsonObject(body): JsonObject) -> ApiResult<Value> {
    let mut new_user = NewUser::from_fields(&body)?;
    new_user.password = hash_password(&new_user.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Unable to create user")
    })?;

    let user = state.users.create_user(new_user).await?;
    let token = generate_jwt(&state.config.security, &user.username)?;

    tracing::info!("Registered user '{}'", user.username);
    Ok(ApiResponse::created(json!({ "token": token })))
}

/// POST /login - Exchange credentials for a token
///
/// Unknown users and wrong passwords get the same 400 so the response does
/// not reveal which usernames exist.
pub async fn login(State(state): State<AppState>, JsonObject(body): JsonObject) -> ApiResult<Value> {
    let username = required_string(&body, "username")?;
    let password = required_string(&body, "password")?;

    match state.users.find_user(&username).await? {
        Some(user) if verify_password(&password, &user.password) => {
            let token = generate_jwt(&state.config.security, &user.username)?;
            tracing::debug!("User '{}' logged in", user.username);
            Ok(ApiResponse::success(json!({ "token": token })))
        }
        _ => {
            tracing::warn!("Failed login attempt for '{}'", username);
            Err(ApiError::bad_request("Invalid username/password"))
        }
    }
}
