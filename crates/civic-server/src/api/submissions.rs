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
use uuid::Uuid;

use civic_shared::{SubmissionStatus, SubmissionType};
use civic_store::{NewSubmission, SubmissionFilter};

use super::{found, optional, parse_id, required, AppState};
use crate::error::ApiError;

const SUBMISSION_NOT_FOUND: &str = "Submission not found.";
const USER_NOT_FOUND: &str = "User not found.";
const CATEGORY_NOT_FOUND: &str = "Category not found.";
const AGENCY_NOT_FOUND: &str = "Agency not found.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateSubmissionRequest {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "type")]
    submission_type: Option<String>,
    user_id: Option<String>,
    category_id: Option<String>,
    agency_id: Option<String>,
    location: Option<String>,
    attachment_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListSubmissionsQuery {
    user_id: Option<String>,
    agency_id: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct StatusRequest {
    status: Option<String>,
}

/// `POST /api/submissions/create`
///
/// The agency is taken from the category. A caller that also sends
/// `agencyId` must name that same agency.
pub(super) async fn create_submission(
    State(state): State<AppState>,
    body: Result<Json<CreateSubmissionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;

    let (Some(title), Some(description), Some(kind), Some(user_id), Some(category_id)) = (
        required(&req.title),
        required(&req.description),
        required(&req.submission_type),
        required(&req.user_id),
        required(&req.category_id),
    ) else {
        return Err(ApiError::bad_request(
            "title, description, type, userId and categoryId are required.",
        ));
    };

    let submission_type: SubmissionType = kind
        .parse()
        .map_err(|_| ApiError::bad_request("type must be COMPLAINT or FEEDBACK."))?;
    let user_id = parse_id(user_id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    let category_id =
        parse_id(category_id).ok_or_else(|| ApiError::not_found(CATEGORY_NOT_FOUND))?;
    let requested_agency = match required(&req.agency_id) {
        Some(raw) => Some(parse_id(raw).ok_or_else(|| ApiError::not_found(AGENCY_NOT_FOUND))?),
        None => None,
    };

    let title = title.to_string();
    let description = description.to_string();
    let location = optional(req.location);
    let attachment_url = optional(req.attachment_url);

    let submission = state
        .db
        .call(move |db| {
            if !db.user_exists(user_id)? {
                return Err(ApiError::not_found(USER_NOT_FOUND));
            }
            let category = found(db.get_category(category_id), CATEGORY_NOT_FOUND)?;
            let agency_id = category_agency(db, category.agency_id, requested_agency)?;

            Ok(db.create_submission(&NewSubmission {
                title,
                description,
                submission_type,
                location,
                attachment_url,
                user_id,
                category_id,
                agency_id,
            })?)
        })
        .await?;

    info!(
        id = %submission.id,
        user = %submission.user_id,
        agency = %submission.agency_id,
        "Submission created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Submission created.", "submission": submission })),
    ))
}

fn category_agency(
    db: &civic_store::Database,
    owner: Uuid,
    requested: Option<Uuid>,
) -> Result<Uuid, ApiError> {
    match requested {
        None => Ok(owner),
        Some(id) if id == owner => Ok(owner),
        Some(id) if !db.agency_exists(id)? => Err(ApiError::not_found(AGENCY_NOT_FOUND)),
        Some(_) => Err(ApiError::bad_request(
            "Category does not belong to the given agency.",
        )),
    }
}

/// `GET /api/submissions?userId=&agencyId=&status=`
pub(super) async fn list_submissions(
    State(state): State<AppState>,
    query: Result<Query<ListSubmissionsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;

    let status = required(&query.status)
        .map(str::parse::<SubmissionStatus>)
        .transpose()
        .map_err(|_| ApiError::bad_request("Invalid status."))?;

    // An id that does not parse cannot match any row.
    let (user_id, agency_id) = match (
        id_filter(&query.user_id),
        id_filter(&query.agency_id),
    ) {
        (Some(user_id), Some(agency_id)) => (user_id, agency_id),
        _ => return Ok(Json(json!({ "submissions": [] }))),
    };

    let filter = SubmissionFilter {
        user_id,
        agency_id,
        status,
    };
    let submissions = state
        .db
        .call(move |db| Ok(db.list_submissions(&filter)?))
        .await?;
    Ok(Json(json!({ "submissions": submissions })))
}

/// `Some(None)` when the filter is absent, `None` when it cannot match.
fn id_filter(raw: &Option<String>) -> Option<Option<Uuid>> {
    match required(raw) {
        Some(raw) => parse_id(raw).map(Some),
        None => Some(None),
    }
}

/// `GET /api/submissions/:id`
pub(super) async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(SUBMISSION_NOT_FOUND))?;
    let submission = state
        .db
        .call(move |db| found(db.get_submission(id), SUBMISSION_NOT_FOUND))
        .await?;
    Ok(Json(json!({ "submission": submission })))
}

/// `PUT /api/admin/submissions/:id/status`
pub(super) async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let status: SubmissionStatus = required(&req.status)
        .ok_or_else(|| ApiError::bad_request("status is required."))?
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid status."))?;
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(SUBMISSION_NOT_FOUND))?;

    let submission = state
        .db
        .call(move |db| found(db.update_submission_status(id, status), SUBMISSION_NOT_FOUND))
        .await?;

    info!(id = %submission.id, status = %submission.status, "Submission status updated");
    Ok(Json(json!({
        "message": "Submission status updated.",
        "submission": submission,
    })))
}

/// `DELETE /api/admin/submissions/:id`
pub(super) async fn delete_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(SUBMISSION_NOT_FOUND))?;
    let deleted = state.db.call(move |db| Ok(db.delete_submission(id)?)).await?;
    if !deleted {
        return Err(ApiError::not_found(SUBMISSION_NOT_FOUND));
    }
    info!(id = %id, "Submission deleted");
    Ok(Json(json!({ "message": "Submission deleted." })))
}
