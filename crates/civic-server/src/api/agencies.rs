use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use civic_store::{AgencyUpdate, NewAgency};

use super::{found, optional, parse_id, required, AppState};
use crate::error::ApiError;

const AGENCY_NOT_FOUND: &str = "Agency not found.";

#[derive(Deserialize)]
pub(super) struct AgencyRequest {
    name: Option<String>,
    description: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

/// `POST /api/admin/agencies/create`
pub(super) async fn create_agency(
    State(state): State<AppState>,
    body: Result<Json<AgencyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;
    let name = required(&req.name)
        .ok_or_else(|| ApiError::bad_request("name is required."))?
        .to_string();

    let new = NewAgency {
        name,
        description: optional(req.description),
        email: optional(req.email),
        phone: optional(req.phone),
        address: optional(req.address),
    };
    let agency = state.db.call(move |db| Ok(db.create_agency(&new)?)).await?;

    info!(id = %agency.id, name = %agency.name, "Agency created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Agency created.", "agency": agency })),
    ))
}

/// `GET /api/agencies`
pub(super) async fn list_agencies(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let agencies = state.db.call(|db| Ok(db.list_agencies()?)).await?;
    Ok(Json(json!({ "agencies": agencies })))
}

/// `GET /api/agencies/:id`
pub(super) async fn get_agency(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(AGENCY_NOT_FOUND))?;
    let agency = state
        .db
        .call(move |db| found(db.get_agency(id), AGENCY_NOT_FOUND))
        .await?;
    Ok(Json(json!({ "agency": agency })))
}

/// `PUT /api/admin/agencies/:id`
///
/// Fields left out of the body keep their stored value. An empty string
/// clears an optional field.
pub(super) async fn update_agency(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AgencyRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    if req.name.is_some() && required(&req.name).is_none() {
        return Err(ApiError::bad_request("name cannot be empty."));
    }
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(AGENCY_NOT_FOUND))?;

    let changes = AgencyUpdate {
        name: optional(req.name),
        description: req.description.map(clearable),
        email: req.email.map(clearable),
        phone: req.phone.map(clearable),
        address: req.address.map(clearable),
    };
    let agency = state
        .db
        .call(move |db| found(db.update_agency(id, &changes), AGENCY_NOT_FOUND))
        .await?;

    info!(id = %agency.id, "Agency updated");
    Ok(Json(json!({ "message": "Agency updated.", "agency": agency })))
}

fn clearable(value: String) -> Option<String> {
    optional(Some(value))
}

/// `DELETE /api/admin/agencies/:id`
pub(super) async fn delete_agency(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(AGENCY_NOT_FOUND))?;
    let deleted = state.db.call(move |db| Ok(db.delete_agency(id)?)).await?;
    if !deleted {
        return Err(ApiError::not_found(AGENCY_NOT_FOUND));
    }
    info!(id = %id, "Agency deleted");
    Ok(Json(json!({ "message": "Agency deleted." })))
}
