use thiserror::Error;

/// A string did not name any variant of a domain enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize },

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed")]
    MalformedHash,
}

impl From<argon2::password_hash::Error> for PasswordError {
    fn from(e: argon2::password_hash::Error) -> Self {
        PasswordError::Hash(e.to_string())
    }
}
