use thiserror::Error;

use civic_shared::FieldErrors;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (connect, TLS, decode).
    #[error("Could not reach the portal: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        fields: FieldErrors,
    },
}

impl ClientError {
    /// Per-field errors carried by a 400 response, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Api {
                status: 400,
                fields,
                ..
            } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }
}
