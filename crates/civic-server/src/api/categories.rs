use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{found, parse_id, required, AppState};
use crate::error::ApiError;

const AGENCY_NOT_FOUND: &str = "Agency not found.";
const CATEGORY_NOT_FOUND: &str = "Category not found.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateCategoryRequest {
    name: Option<String>,
    agency_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct UpdateCategoryRequest {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListCategoriesQuery {
    agency_id: Option<String>,
}

/// `POST /api/admin/categories/create`
pub(super) async fn create_category(
    State(state): State<AppState>,
    body: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;

    let (Some(name), Some(agency_id)) = (required(&req.name), required(&req.agency_id)) else {
        return Err(ApiError::bad_request("name and agencyId are required."));
    };
    let name = name.to_string();
    let agency_id = parse_id(agency_id);

    let category = state
        .db
        .call(move |db| {
            let agency_id = agency_id.ok_or_else(|| ApiError::not_found(AGENCY_NOT_FOUND))?;
            if !db.agency_exists(agency_id)? {
                return Err(ApiError::not_found(AGENCY_NOT_FOUND));
            }
            Ok(db.create_category(&name, agency_id)?)
        })
        .await?;

    info!(id = %category.id, agency = %category.agency_id, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Category created.", "category": category })),
    ))
}

/// `GET /api/categories?agencyId=`
pub(super) async fn list_categories(
    State(state): State<AppState>,
    query: Result<Query<ListCategoriesQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;

    let filter = match required(&query.agency_id) {
        Some(raw) => match parse_id(raw) {
            Some(id) => Some(id),
            // no agency can have this id, so nothing matches
            None => return Ok(Json(json!({ "categories": [] }))),
        },
        None => None,
    };

    let categories = state.db.call(move |db| Ok(db.list_categories(filter)?)).await?;
    Ok(Json(json!({ "categories": categories })))
}

/// `GET /api/categories/:id`
pub(super) async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(CATEGORY_NOT_FOUND))?;
    let category = state
        .db
        .call(move |db| found(db.get_category(id), CATEGORY_NOT_FOUND))
        .await?;
    Ok(Json(json!({ "category": category })))
}

/// `PUT /api/admin/categories/:id`
pub(super) async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let name = required(&req.name)
        .ok_or_else(|| ApiError::bad_request("name is required."))?
        .to_string();
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(CATEGORY_NOT_FOUND))?;

    let category = state
        .db
        .call(move |db| found(db.rename_category(id, &name), CATEGORY_NOT_FOUND))
        .await?;

    info!(id = %category.id, "Category updated");
    Ok(Json(json!({ "message": "Category updated.", "category": category })))
}

/// `DELETE /api/admin/categories/:id`
pub(super) async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(CATEGORY_NOT_FOUND))?;
    let deleted = state.db.call(move |db| Ok(db.delete_category(id)?)).await?;
    if !deleted {
        return Err(ApiError::not_found(CATEGORY_NOT_FOUND));
    }
    info!(id = %id, "Category deleted");
    Ok(Json(json!({ "message": "Category deleted." })))
}
