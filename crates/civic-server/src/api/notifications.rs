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

use civic_shared::NotificationType;
use civic_store::NewNotification;

use super::{found, parse_id, required, AppState};
use crate::error::ApiError;

const NOTIFICATION_NOT_FOUND: &str = "Notification not found.";
const USER_NOT_FOUND: &str = "User not found.";
const SUBMISSION_NOT_FOUND: &str = "Submission not found.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateNotificationRequest {
    message: Option<String>,
    #[serde(rename = "type")]
    notification_type: Option<String>,
    user_id: Option<String>,
    submission_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct NotificationsQuery {
    #[serde(default)]
    unread: bool,
}

/// `POST /api/admin/notifications/create`
pub(super) async fn create_notification(
    State(state): State<AppState>,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;
    let (Some(message), Some(kind), Some(user_id)) = (
        required(&req.message),
        required(&req.notification_type),
        required(&req.user_id),
    ) else {
        return Err(ApiError::bad_request("message, type and userId are required."));
    };

    let notification_type: NotificationType = kind
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid notification type."))?;
    let user_id = parse_id(user_id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    let submission_id = match required(&req.submission_id) {
        Some(raw) => Some(parse_id(raw).ok_or_else(|| ApiError::not_found(SUBMISSION_NOT_FOUND))?),
        None => None,
    };

    let new = NewNotification {
        message: message.to_string(),
        notification_type,
        user_id,
        submission_id,
    };

    let notification = state
        .db
        .call(move |db| {
            if !db.user_exists(new.user_id)? {
                return Err(ApiError::not_found(USER_NOT_FOUND));
            }
            if let Some(submission_id) = new.submission_id {
                if !db.submission_exists(submission_id)? {
                    return Err(ApiError::not_found(SUBMISSION_NOT_FOUND));
                }
            }
            Ok(db.create_notification(&new)?)
        })
        .await?;

    info!(
        id = %notification.id,
        user = %notification.user_id,
        kind = %notification.notification_type,
        "Notification created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Notification created.", "notification": notification })),
    ))
}

/// `GET /api/users/:id/notifications?unread=true`
pub(super) async fn list_user_notifications(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<NotificationsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let user_id = parse_id(&id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    let notifications = state
        .db
        .call(move |db| {
            if !db.user_exists(user_id)? {
                return Err(ApiError::not_found(USER_NOT_FOUND));
            }
            Ok(db.list_notifications_for_user(user_id, query.unread)?)
        })
        .await?;
    Ok(Json(json!({ "notifications": notifications })))
}

/// `PUT /api/notifications/:id/read`
pub(super) async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(NOTIFICATION_NOT_FOUND))?;
    let notification = state
        .db
        .call(move |db| found(db.mark_notification_read(id), NOTIFICATION_NOT_FOUND))
        .await?;
    Ok(Json(json!({
        "message": "Notification marked as read.",
        "notification": notification,
    })))
}

/// `DELETE /api/notifications/:id`
pub(super) async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(NOTIFICATION_NOT_FOUND))?;
    let deleted = state.db.call(move |db| Ok(db.delete_notification(id)?)).await?;
    if !deleted {
        return Err(ApiError::not_found(NOTIFICATION_NOT_FOUND));
    }
    Ok(Json(json!({ "message": "Notification deleted." })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::Router;
    use serde_json::json;

    use crate::api::test_util::*;

    async fn notify(app: &Router, user_id: &str, message: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/admin/notifications/create",
            Some(json!({ "message": message, "type": "SYSTEM", "userId": user_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["notification"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_and_read_flow() {
        let app = test_app();
        let user = register(&app, "citizen@example.com").await;
        let first = notify(&app, &user, "Welcome to the portal").await;
        notify(&app, &user, "Scheduled maintenance tonight").await;

        let uri = format!("/api/users/{user}/notifications");
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let all = body["notifications"].as_array().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|n| n["isRead"] == false));

        let (status, body) =
            send(&app, "PUT", &format!("/api/notifications/{first}/read"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Notification marked as read.");
        assert_eq!(body["notification"]["isRead"], true);

        let (_, body) = send(&app, "GET", &format!("{uri}?unread=true"), None).await;
        let unread = body["notifications"].as_array().unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0]["message"], "Scheduled maintenance tonight");

        let (status, _) = send(&app, "DELETE", &format!("/api/notifications/{first}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) =
            send(&app, "DELETE", &format!("/api/notifications/{first}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Notification not found.");
    }

    #[tokio::test]
    async fn test_create_for_submission() {
        let app = test_app();
        let agency = create_agency(&app, "Public Works").await;
        let category = create_category(&app, "Potholes", &agency).await;
        let user = register(&app, "citizen@example.com").await;
        let submission = create_submission(&app, &user, &category).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/notifications/create",
            Some(json!({
                "message": "Your complaint is in progress",
                "type": "SUBMISSION_UPDATE",
                "userId": user,
                "submissionId": submission["id"],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["notification"]["type"], "SUBMISSION_UPDATE");
        assert_eq!(body["notification"]["submissionId"], submission["id"]);

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/notifications/create",
            Some(json!({
                "message": "Orphan",
                "type": "SUBMISSION_UPDATE",
                "userId": user,
                "submissionId": uuid::Uuid::new_v4().to_string(),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Submission not found.");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let app = test_app();
        let user = register(&app, "citizen@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/notifications/create",
            Some(json!({ "type": "SYSTEM", "userId": user })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "message, type and userId are required.");

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/notifications/create",
            Some(json!({ "message": "Hi", "type": "EMAIL", "userId": user })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid notification type.");

        let stranger = uuid::Uuid::new_v4();
        let (status, _) = send(
            &app,
            "POST",
            "/api/admin/notifications/create",
            Some(json!({ "message": "Hi", "type": "SYSTEM", "userId": stranger.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) =
            send(&app, "GET", &format!("/api/users/{stranger}/notifications"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found.");
    }
}
