use thiserror::Error;

/// Raised for a 404 on a single-contact endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Contact not found: {id}")]
pub struct ContactNotFoundError {
    pub id: u64,
}

/// Raised for a 409, carrying the server's explanation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Contact conflicts with an existing one: {detail}")]
pub struct ContactConflictError {
    pub detail: String,
}

/// Errors returned by [`ContactsApi`](crate::ContactsApi).
#[derive(Error, Debug)]
pub enum ContactsError {
    #[error(transparent)]
    NotFound(#[from] ContactNotFoundError),

    #[error(transparent)]
    Conflict(#[from] ContactConflictError),

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Connection(connection::Error),
}

impl ContactsError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<connection::Error> for ContactsError {
    fn from(err: connection::Error) -> Self {
        let err = match err.into_domain::<ContactNotFoundError>() {
            Ok(not_found) => return Self::NotFound(not_found),
            Err(other) => other,
        };
        let err = match err.into_domain::<ContactConflictError>() {
            Ok(conflict) => return Self::Conflict(conflict),
            Err(other) => other,
        };
        match err {
            connection::Error::Validation { field, message } => Self::Validation { field, message },
            other => Self::Connection(other),
        }
    }
}

impl From<connection::TransportError> for ContactsError {
    fn from(err: connection::TransportError) -> Self {
        Self::Connection(err.into())
    }
}
