use http::{Method, StatusCode};
use thiserror::Error;

use crate::transport::TransportError;

/// Boxed error produced by an interceptor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a request issued through the connection layer.
#[derive(Error, Debug)]
pub enum Error {
    /// The transport could not complete the call. Carried verbatim.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode {method} {path} response (HTTP {status}): {source}")]
    Decode {
        method: Method,
        path: String,
        status: StatusCode,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
    },

    #[error("failed to encode {method} {path} request body: {source}")]
    Encode {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Typed error raised by a matching interceptor. Use [`Error::domain`] to
    /// get the concrete type back.
    #[error(transparent)]
    Domain(BoxError),

    #[error("{method} {path} failed with HTTP {status}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("no page after page {current_page} of {total_pages}")]
    NoNextPage { current_page: u32, total_pages: u32 },
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Borrow the interceptor-raised error as `E`, if that is what it is.
    pub fn domain<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Domain(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Take the interceptor-raised error out as `E`; any other error comes back unchanged.
    pub fn into_domain<E>(self) -> Result<E, Self>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Domain(err) => err.downcast::<E>().map(|e| *e).map_err(Self::Domain),
            other => Err(other),
        }
    }

    /// HTTP status behind the failure, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Decode { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND) || self.domain::<ResourceNotFoundError>().is_some()
    }
}

/// Reject an empty (or whitespace-only) argument before any request is made.
pub fn ensure_not_empty(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Generic "resource does not exist" error for services without their own type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{resource} '{id}' not found")]
pub struct ResourceNotFoundError {
    pub resource: String,
    pub id: String,
}

impl ResourceNotFoundError {
    pub fn new(resource: impl Into<String>, id: impl ToString) -> Self {
        Self {
            resource: resource.into(),
            id: id.to_string(),
        }
    }
}
