//! Data types shared by every service package of the SDK.
//!
//! This crate holds the wire-level vocabulary only: query parameters sent with
//! a request and the JSON envelope every endpoint answers with. Behaviour
//! (transport, decoding, pagination) lives in the `connection` crate.

pub mod envelope;
pub mod params;

pub use envelope::{ApiResponseBodyData, ApiResponseMetadata, ApiResponseMetadataPagination};
pub use params::{Filter, FilterOperator, RequestParameters, Sort};
