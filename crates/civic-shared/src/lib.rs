//! # civic-shared
//!
//! Types and rules shared by the portal's store, server and client: the
//! domain enums, citizen profile validation and password hashing.

pub mod constants;
pub mod error;
pub mod password;
pub mod profile;
pub mod types;

pub use error::{PasswordError, UnknownVariant};
pub use profile::{CitizenProfile, FieldErrors, ProfileField};
pub use types::{NotificationType, Role, SubmissionStatus, SubmissionType};
