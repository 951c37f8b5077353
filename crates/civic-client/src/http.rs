//! HTTP client for the portal API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use civic_shared::{CitizenProfile, FieldErrors};

use crate::error::ClientError;
use crate::form::ProfileBackend;

/// Error body every non-2xx portal response carries.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    fields: FieldErrors,
}

#[derive(Deserialize)]
struct ProfileEnvelope {
    profile: CitizenProfile,
}

/// Talks to one portal server on behalf of one signed-in user.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn profile_url(&self) -> String {
        format!("{}/api/users/{}/profile", self.base_url, self.user_id)
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let bytes = resp.bytes().await?;
        let err = api_error(status.as_u16(), &bytes);
        debug!(status = status.as_u16(), error = %err, "Portal request refused");
        Err(err)
    }
}

/// Build a [`ClientError::Api`] from a failed response body. Bodies that are
/// not the portal's JSON shape fall back to the status line.
fn api_error(status: u16, body: &[u8]) -> ClientError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = if parsed.error.is_empty() {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed")
            .to_string()
    } else {
        parsed.error
    };
    ClientError::Api {
        status,
        message,
        fields: parsed.fields,
    }
}

#[async_trait]
impl ProfileBackend for PortalClient {
    async fn load_profile(&self) -> Result<CitizenProfile, ClientError> {
        let resp = self.http.get(self.profile_url()).send().await?;
        let envelope: ProfileEnvelope = Self::read(resp).await?;
        Ok(envelope.profile)
    }

    async fn save_profile(&self, profile: &CitizenProfile) -> Result<CitizenProfile, ClientError> {
        let resp = self.http.put(self.profile_url()).json(profile).send().await?;
        let envelope: ProfileEnvelope = Self::read(resp).await?;
        Ok(envelope.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_shared::ProfileField;

    #[test]
    fn profile_url_ignores_trailing_slash() {
        let client = PortalClient::new("http://localhost:8080/", "abc");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.profile_url(),
            "http://localhost:8080/api/users/abc/profile"
        );
    }

    #[test]
    fn validation_body_keeps_fields() {
        let body = br#"{"error":"Validation failed.","fields":{"phone":"Phone number must be 10 digits"}}"#;
        let err = api_error(400, body);
        assert_eq!(err.to_string(), "Validation failed.");
        let fields = err.field_errors().unwrap();
        assert_eq!(
            fields.get(&ProfileField::Phone).map(String::as_str),
            Some("Phone number must be 10 digits")
        );
    }

    mod portal_stub {
        use std::sync::{Arc, Mutex};

        use axum::extract::{Path, State};
        use axum::http::StatusCode;
        use axum::response::{IntoResponse, Response};
        use axum::routing::get;
        use axum::{Json, Router};
        use serde_json::json;

        use civic_shared::{CitizenProfile, FieldErrors, ProfileField};

        pub const USER_ID: &str = "7f1c2a9e-0000-4000-8000-000000000001";

        /// City the stub refuses even though it passes local validation.
        pub const UNSERVED_CITY: &str = "Atlantis";

        #[derive(Clone, Default)]
        struct Stub {
            stored: Arc<Mutex<CitizenProfile>>,
        }

        fn not_found() -> Response {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "User not found." })),
            )
                .into_response()
        }

        async fn get_profile(State(stub): State<Stub>, Path(id): Path<String>) -> Response {
            if id != USER_ID {
                return not_found();
            }
            let profile = stub.stored.lock().unwrap().clone();
            Json(json!({ "profile": profile })).into_response()
        }

        async fn put_profile(
            State(stub): State<Stub>,
            Path(id): Path<String>,
            Json(profile): Json<CitizenProfile>,
        ) -> Response {
            if id != USER_ID {
                return not_found();
            }
            let mut fields = match profile.validate() {
                Ok(normalized) if normalized.city != UNSERVED_CITY => {
                    *stub.stored.lock().unwrap() = normalized.clone();
                    return Json(json!({ "message": "Profile updated.", "profile": normalized }))
                        .into_response();
                }
                Ok(_) => FieldErrors::new(),
                Err(fields) => fields,
            };
            if profile.city == UNSERVED_CITY {
                fields.insert(ProfileField::City, "City is not served by this portal".into());
            }
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Validation failed.", "fields": fields })),
            )
                .into_response()
        }

        /// Serve the profile endpoints on an ephemeral port and return the
        /// base URL.
        pub async fn spawn() -> String {
            let app = Router::new()
                .route("/api/users/:id/profile", get(get_profile).put(put_profile))
                .with_state(Stub::default());
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{addr}")
        }
    }

    #[tokio::test]
    async fn form_round_trips_through_portal() {
        use crate::form::{ProfileForm, SubmitOutcome};

        let base = portal_stub::spawn().await;
        let client = PortalClient::new(&base, portal_stub::USER_ID);

        let mut form = ProfileForm::load(&client).await.unwrap();
        assert_eq!(form.values(), &CitizenProfile::default());

        form.set_field(ProfileField::FirstName, "Asha");
        form.set_field(ProfileField::LastName, "Verma");
        form.set_field(ProfileField::Email, "asha@example.com");
        form.set_field(ProfileField::Phone, "987-654-3210");
        form.set_field(ProfileField::Address, "12 Park Street");
        form.set_field(ProfileField::City, "Kolkata");
        form.set_field(ProfileField::District, "Central");

        assert_eq!(form.submit(&client).await, SubmitOutcome::Saved);
        assert_eq!(form.value(ProfileField::Phone), "9876543210");

        let reloaded = ProfileForm::load(&client).await.unwrap();
        assert_eq!(reloaded.values(), form.values());
        assert_eq!(reloaded.value(ProfileField::District), "Central");
    }

    #[tokio::test]
    async fn portal_errors_reach_the_form() {
        use crate::form::{ProfileForm, SubmitOutcome};

        let base = portal_stub::spawn().await;
        let client = PortalClient::new(&base, portal_stub::USER_ID);

        let mut form = ProfileForm::new(CitizenProfile::default());
        form.set_field(ProfileField::FirstName, "Asha");
        form.set_field(ProfileField::LastName, "Verma");
        form.set_field(ProfileField::Email, "asha@example.com");
        form.set_field(ProfileField::Phone, "9876543210");
        form.set_field(ProfileField::Address, "12 Park Street");
        form.set_field(ProfileField::City, portal_stub::UNSERVED_CITY);

        assert_eq!(form.submit(&client).await, SubmitOutcome::Failed);
        assert_eq!(
            form.error(ProfileField::City),
            Some("City is not served by this portal")
        );
        assert!(form.banner().is_none());

        let stranger = PortalClient::new(&base, "someone-else");
        let err = ProfileForm::load(&stranger).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
        assert_eq!(err.to_string(), "User not found.");

        form.set_field(ProfileField::City, "Kolkata");
        assert_eq!(form.submit(&stranger).await, SubmitOutcome::Failed);
        assert_eq!(form.banner(), Some("User not found."));
        assert!(form.errors().is_empty());
    }

    #[tokio::test]
    async fn rejected_save_keeps_every_field_error() {
        let base = portal_stub::spawn().await;
        let client = PortalClient::new(&base, portal_stub::USER_ID);

        let err = client
            .save_profile(&CitizenProfile::default())
            .await
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[&ProfileField::Email], "Email is required");
    }

    #[test]
    fn unknown_body_falls_back_to_status() {
        let err = api_error(502, b"<html>bad gateway</html>");
        assert!(matches!(err, ClientError::Api { status: 502, .. }));
        assert_eq!(err.to_string(), "Bad Gateway");
        assert!(err.field_errors().is_none());
    }
}
