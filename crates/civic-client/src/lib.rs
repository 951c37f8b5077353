//! # civic-client
//!
//! Client side of the civic portal: an HTTP client for the portal API and
//! the citizen profile form that drives it.

pub mod error;
pub mod form;
pub mod http;

pub use error::ClientError;
pub use form::{FormState, ProfileBackend, ProfileForm, SubmitOutcome};
pub use http::PortalClient;
