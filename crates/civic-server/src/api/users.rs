use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use civic_shared::password::{hash_password, verify_password};
use civic_shared::profile::{is_valid_email, normalize_phone, INVALID_EMAIL, INVALID_PHONE};
use civic_shared::{CitizenProfile, PasswordError, Role};
use civic_store::NewUser;

use super::{found, optional, parse_id, required, AppState};
use crate::error::ApiError;

const USER_NOT_FOUND: &str = "User not found.";
const AGENCY_NOT_FOUND: &str = "Agency not found.";
const BAD_CREDENTIALS: &str = "Invalid email or password.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisterRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    password: Option<String>,
    address: Option<String>,
    city: Option<String>,
    district: Option<String>,
    role: Option<String>,
    agency_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// `POST /api/users/register`
pub(super) async fn register_user(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;

    let (Some(first_name), Some(last_name), Some(email), Some(phone), Some(password)) = (
        required(&req.first_name),
        required(&req.last_name),
        required(&req.email),
        required(&req.phone),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "firstName, lastName, email, phone and password are required.",
        ));
    };

    if !is_valid_email(email) {
        return Err(ApiError::bad_request(INVALID_EMAIL));
    }
    let phone = normalize_phone(phone).ok_or_else(|| ApiError::bad_request(INVALID_PHONE))?;
    let role = match required(&req.role) {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|_| ApiError::bad_request("Invalid role."))?,
        None => Role::default(),
    };
    let agency_id = match required(&req.agency_id) {
        Some(raw) => Some(parse_id(raw).ok_or_else(|| ApiError::not_found(AGENCY_NOT_FOUND))?),
        None => None,
    };

    let password_hash = hash_in_background(password.to_string()).await?;

    let new = NewUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone,
        address: optional(req.address),
        city: optional(req.city),
        district: optional(req.district),
        password_hash,
        role,
        agency_id,
    };

    let user = state
        .db
        .call(move |db| {
            if let Some(agency_id) = new.agency_id {
                if !db.agency_exists(agency_id)? {
                    return Err(ApiError::not_found(AGENCY_NOT_FOUND));
                }
            }
            Ok(db.create_user(&new)?)
        })
        .await?;

    info!(id = %user.id, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created.", "user": user })),
    ))
}

/// `POST /api/auth/login`
pub(super) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let (Some(email), Some(password)) = (
        required(&req.email).map(str::to_string),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("email and password are required."));
    };

    let user = state
        .db
        .call(move |db| Ok(db.find_user_by_email(&email)?))
        .await?
        .ok_or_else(|| ApiError::Unauthorized(BAD_CREDENTIALS.into()))?;

    let stored = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(format!("password task panicked: {e}")))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if !matches {
        debug!(id = %user.id, "Rejected login");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    info!(id = %user.id, "User logged in");
    Ok(Json(json!({ "message": "Login successful.", "user": user })))
}

/// `GET /api/users/:id`
pub(super) async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    let user = state
        .db
        .call(move |db| found(db.get_user(id), USER_NOT_FOUND))
        .await?;
    Ok(Json(json!({ "user": user })))
}

/// `GET /api/users/:id/profile`
pub(super) async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    let user = state
        .db
        .call(move |db| found(db.get_user(id), USER_NOT_FOUND))
        .await?;
    Ok(Json(json!({ "profile": user.profile() })))
}

/// `PUT /api/users/:id/profile`
///
/// Runs the same field checks as the profile form and answers a failure
/// with every field error at once.
pub(super) async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CitizenProfile>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(profile) = body?;
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    let profile = profile.validate().map_err(|fields| ApiError::Validation {
        message: "Validation failed.".into(),
        fields,
    })?;

    let user = state
        .db
        .call(move |db| found(db.update_user_profile(id, &profile), USER_NOT_FOUND))
        .await?;

    info!(id = %user.id, "Profile updated");
    Ok(Json(json!({ "message": "Profile updated.", "profile": user.profile() })))
}

/// `DELETE /api/admin/users/:id`
pub(super) async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    let deleted = state.db.call(move |db| Ok(db.delete_user(id)?)).await?;
    if !deleted {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }
    info!(id = %id, "User deleted");
    Ok(Json(json!({ "message": "User deleted." })))
}

/// Hash on the blocking pool. A too-short password is the caller's fault.
async fn hash_in_background(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password task panicked: {e}")))?
        .map_err(|e| match e {
            PasswordError::TooShort { .. } => ApiError::bad_request(format!("{e}.")),
            other => ApiError::Internal(other.to_string()),
        })
}
