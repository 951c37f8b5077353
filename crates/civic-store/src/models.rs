//! Domain model structs persisted in the portal database.
//!
//! Every struct derives `Serialize` so it can be returned directly as an API
//! response body. Field names go out in camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use civic_shared::{NotificationType, Role, SubmissionStatus, SubmissionType};

// ---------------------------------------------------------------------------
// Agency
// ---------------------------------------------------------------------------

/// A government department that owns categories and receives submissions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting an agency.
#[derive(Debug, Clone, Default)]
pub struct NewAgency {
    pub name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial agency update. `None` leaves the column unchanged; for the
/// optional columns `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct AgencyUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A portal account: citizen, admin or agency staff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    /// Argon2id PHC string. Never serialized.
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub agency_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub agency_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A department-level grouping of submissions, owned by one agency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub agency_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// A complaint or feedback item filed by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub submission_type: SubmissionType,
    pub status: SubmissionStatus,
    pub location: Option<String>,
    pub attachment_url: Option<String>,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub agency_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub title: String,
    pub description: String,
    pub submission_type: SubmissionType,
    pub location: Option<String>,
    pub attachment_url: Option<String>,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub agency_id: Uuid,
}

/// Optional filters for listing submissions; all set filters must match.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub user_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub status: Option<SubmissionStatus>,
}

// ---------------------------------------------------------------------------
// AdminResponse
// ---------------------------------------------------------------------------

/// A staff or admin reply attached to a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: Uuid,
    pub message: String,
    pub submission_id: Uuid,
    pub responder_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// An in-app message to a user, optionally tied to a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub is_read: bool,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub user_id: Uuid,
    pub submission_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub message: String,
    pub notification_type: NotificationType,
    pub user_id: Uuid,
    pub submission_id: Option<Uuid>,
}
