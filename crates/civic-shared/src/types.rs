use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

/// Generates `as_str`, `Display` and `FromStr` for a string-backed enum.
/// The string form is the same one used on the wire and in SQLite.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

// Account role. Carried on every user but not enforced by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Citizen,
    Admin,
    AgencyStaff,
}

string_enum!(Role {
    Citizen => "CITIZEN",
    Admin => "ADMIN",
    AgencyStaff => "AGENCY_STAFF",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionType {
    Complaint,
    Feedback,
}

string_enum!(SubmissionType {
    Complaint => "COMPLAINT",
    Feedback => "FEEDBACK",
});

/// Lifecycle of a submission. New submissions start `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Rejected,
}

string_enum!(SubmissionStatus {
    Open => "OPEN",
    InProgress => "IN_PROGRESS",
    Resolved => "RESOLVED",
    Rejected => "REJECTED",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    System,
    SubmissionUpdate,
    AdminResponse,
}

string_enum!(NotificationType {
    System => "SYSTEM",
    SubmissionUpdate => "SUBMISSION_UPDATE",
    AdminResponse => "ADMIN_RESPONSE",
});
