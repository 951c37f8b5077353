use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{parse_id, required, AppState};
use crate::error::ApiError;

const SUBMISSION_NOT_FOUND: &str = "Submission not found.";
const RESPONDER_NOT_FOUND: &str = "Responder not found.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateResponseRequest {
    message: Option<String>,
    responder_id: Option<String>,
}

/// `POST /api/admin/submissions/:id/responses`
pub(super) async fn create_response(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CreateResponseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;
    let (Some(message), Some(responder_id)) =
        (required(&req.message), required(&req.responder_id))
    else {
        return Err(ApiError::bad_request("message and responderId are required."));
    };
    let message = message.to_string();
    let submission_id =
        parse_id(&id).ok_or_else(|| ApiError::not_found(SUBMISSION_NOT_FOUND))?;
    let responder_id =
        parse_id(responder_id).ok_or_else(|| ApiError::not_found(RESPONDER_NOT_FOUND))?;

    let response = state
        .db
        .call(move |db| {
            if !db.submission_exists(submission_id)? {
                return Err(ApiError::not_found(SUBMISSION_NOT_FOUND));
            }
            if !db.user_exists(responder_id)? {
                return Err(ApiError::not_found(RESPONDER_NOT_FOUND));
            }
            Ok(db.create_admin_response(submission_id, responder_id, &message)?)
        })
        .await?;

    info!(
        id = %response.id,
        submission = %response.submission_id,
        responder = %response.responder_id,
        "Response created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Response created.", "response": response })),
    ))
}

/// `GET /api/submissions/:id/responses`
pub(super) async fn list_responses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let submission_id =
        parse_id(&id).ok_or_else(|| ApiError::not_found(SUBMISSION_NOT_FOUND))?;
    let responses = state
        .db
        .call(move |db| {
            if !db.submission_exists(submission_id)? {
                return Err(ApiError::not_found(SUBMISSION_NOT_FOUND));
            }
            Ok(db.list_responses_for_submission(submission_id)?)
        })
        .await?;
    Ok(Json(json!({ "responses": responses })))
}
