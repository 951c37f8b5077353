//! Citizen profile form.
//!
//! The form moves through `Editing -> Validating -> Saving -> Saved` and
//! back to `Editing`. Validation runs locally with the same rules the server
//! applies, so a profile that fails here is never sent.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use civic_shared::constants::SAVED_DISPLAY_SECS;
use civic_shared::{CitizenProfile, FieldErrors, ProfileField};

use crate::error::ClientError;

/// Where the form loads and saves the profile.
#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn load_profile(&self) -> Result<CitizenProfile, ClientError>;

    /// Persist the profile and return what was stored.
    async fn save_profile(&self, profile: &CitizenProfile) -> Result<CitizenProfile, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Validating,
    Saving,
    /// Showing the saved confirmation until `until`.
    Saved { until: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    /// Local validation failed; nothing was sent.
    Invalid,
    /// The backend refused or could not be reached.
    Failed,
}

#[derive(Debug, Clone)]
pub struct ProfileForm {
    values: CitizenProfile,
    errors: FieldErrors,
    banner: Option<String>,
    state: FormState,
    saved_for: Duration,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self::new(CitizenProfile::default())
    }
}

impl ProfileForm {
    pub fn new(values: CitizenProfile) -> Self {
        Self {
            values,
            errors: FieldErrors::new(),
            banner: None,
            state: FormState::Editing,
            saved_for: Duration::from_secs(SAVED_DISPLAY_SECS),
        }
    }

    /// Fetch the stored profile and start editing it.
    pub async fn load<B: ProfileBackend + ?Sized>(backend: &B) -> Result<Self, ClientError> {
        let profile = backend.load_profile().await?;
        Ok(Self::new(profile))
    }

    pub fn values(&self) -> &CitizenProfile {
        &self.values
    }

    pub fn value(&self, field: ProfileField) -> &str {
        self.values.get(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: ProfileField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Form-level message for failures that belong to no single field.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Change one field. Its error, if any, is cleared.
    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) {
        self.values.set(field, value.into());
        self.errors.remove(&field);
    }

    /// Validate and, if everything passes, save through `backend`.
    pub async fn submit<B: ProfileBackend + ?Sized>(&mut self, backend: &B) -> SubmitOutcome {
        self.submit_at(backend, Instant::now()).await
    }

    async fn submit_at<B: ProfileBackend + ?Sized>(
        &mut self,
        backend: &B,
        now: Instant,
    ) -> SubmitOutcome {
        self.banner = None;
        self.state = FormState::Validating;

        let normalized = match self.values.validate() {
            Ok(profile) => profile,
            Err(errors) => {
                debug!(fields = errors.len(), "Profile form has errors");
                self.errors = errors;
                self.state = FormState::Editing;
                return SubmitOutcome::Invalid;
            }
        };
        self.errors.clear();

        self.state = FormState::Saving;
        match backend.save_profile(&normalized).await {
            Ok(stored) => {
                info!("Profile saved");
                self.values = stored;
                self.state = FormState::Saved {
                    until: now + self.saved_for,
                };
                SubmitOutcome::Saved
            }
            Err(err) => {
                warn!(error = %err, "Profile save failed");
                match err.field_errors() {
                    Some(fields) => self.errors = fields.clone(),
                    None => self.banner = Some(err.to_string()),
                }
                self.state = FormState::Editing;
                SubmitOutcome::Failed
            }
        }
    }

    /// Leave `Saved` once its display time has passed.
    pub fn refresh(&mut self, now: Instant) {
        if let FormState::Saved { until } = self.state {
            if now >= until {
                self.state = FormState::Editing;
            }
        }
    }
}
