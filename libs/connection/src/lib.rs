//! Connection layer shared by every service package of the SDK.
//!
//! Services describe their calls with a path, [`RequestParameters`] and a list
//! of [`Interceptor`]s, and get back decoded [`ApiResponseBodyData`] envelopes,
//! page cursors or typed errors:
//!
//! ```ignore
//! let contact = connection::get::<Contact, _>(
//!     &transport,
//!     "contacts/123",
//!     &RequestParameters::new(),
//!     &[Interceptor::not_found(|_| ContactNotFoundError { id: 123 })],
//! )
//! .await?
//! .into_data();
//! ```

pub mod error;
pub mod http_client;
pub mod pagination;
pub mod response;
pub mod transport;
pub mod verbs;

#[cfg(test)]
mod testing;

pub use ::http::{HeaderMap, Method, StatusCode};
pub use connection_core::{
    ApiResponseBodyData, ApiResponseMetadata, ApiResponseMetadataPagination, Filter,
    FilterOperator, RequestParameters, Sort,
};
pub use error::{ensure_not_empty, BoxError, Error, ResourceNotFoundError};
pub use http_client::HttpTransport;
pub use pagination::{
    get_paginated, invoke_request_all, ListRequest, PageFetcher, PaginatedCollection,
};
pub use response::{ApiResponse, FileStream, Interceptor};
pub use transport::{RawResponse, Transport, TransportError};
pub use verbs::{delete, get, get_file, patch, post, put};
