//! Turning a [`RawResponse`] into an envelope, a file or a typed error.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use connection_core::ApiResponseBodyData;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{BoxError, Error};
use crate::transport::RawResponse;

type Predicate = dyn Fn(&RawResponse) -> bool + Send + Sync;
type Factory = dyn Fn(&RawResponse) -> BoxError + Send + Sync;

/// Maps a raw response to a service-specific error.
///
/// Interceptors run in registration order and the first one whose predicate
/// matches produces the error of the call.
#[derive(Clone)]
pub struct Interceptor {
    predicate: Arc<Predicate>,
    factory: Arc<Factory>,
}

impl Interceptor {
    pub fn new<P, F, E>(predicate: P, factory: F) -> Self
    where
        P: Fn(&RawResponse) -> bool + Send + Sync + 'static,
        F: Fn(&RawResponse) -> E + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            factory: Arc::new(move |raw: &RawResponse| -> BoxError { Box::new(factory(raw)) }),
        }
    }

    pub fn on_status<F, E>(status: StatusCode, factory: F) -> Self
    where
        F: Fn(&RawResponse) -> E + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(move |raw| raw.status == status, factory)
    }

    pub fn not_found<F, E>(factory: F) -> Self
    where
        F: Fn(&RawResponse) -> E + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::on_status(StatusCode::NOT_FOUND, factory)
    }

    pub fn conflict<F, E>(factory: F) -> Self
    where
        F: Fn(&RawResponse) -> E + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::on_status(StatusCode::CONFLICT, factory)
    }

    /// Produce the domain error when this interceptor applies.
    pub fn intercept(&self, raw: &RawResponse) -> Option<Error> {
        (self.predicate)(raw).then(|| Error::Domain((self.factory)(raw)))
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor").finish_non_exhaustive()
    }
}

/// A downloaded file body with the metadata the server sent along.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStream {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: Bytes,
}

/// A raw response together with the call that produced it.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    method: Method,
    path: String,
    raw: RawResponse,
}

impl ApiResponse {
    pub fn new(method: Method, path: impl Into<String>, raw: RawResponse) -> Self {
        Self {
            method,
            path: path.into(),
            raw,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> StatusCode {
        self.raw.status
    }

    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    pub fn into_raw(self) -> RawResponse {
        self.raw
    }

    /// Decode the body as JSON. An empty body decodes like `{}`.
    pub fn decode<E: DeserializeOwned>(&self) -> Result<E, Error> {
        let body: &[u8] = if self.raw.body.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &self.raw.body
        };
        let de = &mut serde_json::Deserializer::from_slice(body);
        serde_path_to_error::deserialize(de).map_err(|source| Error::Decode {
            method: self.method.clone(),
            path: self.path.clone(),
            status: self.raw.status,
            source,
        })
    }

    /// First matching interceptor's error, if any.
    pub fn intercept(&self, interceptors: &[Interceptor]) -> Option<Error> {
        interceptors.iter().find_map(|i| i.intercept(&self.raw))
    }

    /// Resolve into the decoded envelope or the error of the call.
    ///
    /// Precedence: interceptor error, then `Error::Status` for any other
    /// non-success status, then the decode error of a success response.
    pub fn into_envelope<T>(self, interceptors: &[Interceptor]) -> Result<ApiResponseBodyData<T>, Error>
    where
        T: DeserializeOwned + Default,
    {
        let decoded = self.decode::<ApiResponseBodyData<T>>();
        self.check(interceptors)?;
        let envelope = decoded?;

        for warning in &envelope.metadata.warnings {
            tracing::warn!(method = %self.method, path = %self.path, warning = %warning, "server warning");
        }
        Ok(envelope)
    }

    /// Resolve into a file download. The body is returned as-is.
    pub fn into_file(self, interceptors: &[Interceptor]) -> Result<FileStream, Error> {
        self.check(interceptors)?;
        Ok(FileStream {
            filename: self.raw.content_disposition_filename(),
            content_type: self.raw.content_type().map(str::to_owned),
            content: self.raw.body,
        })
    }

    fn check(&self, interceptors: &[Interceptor]) -> Result<(), Error> {
        if let Some(err) = self.intercept(interceptors) {
            tracing::debug!(method = %self.method, path = %self.path, status = %self.raw.status, "response intercepted");
            return Err(err);
        }
        if !self.raw.is_success() {
            return Err(Error::Status {
                method: self.method.clone(),
                path: self.path.clone(),
                status: self.raw.status,
                body: self.raw.text().into_owned(),
            });
        }
        Ok(())
    }
}
