//! The seam between the connection layer and the wire.
//!
//! Everything above this module works on [`RawResponse`] values and never
//! touches sockets, so services can be tested with an in-memory transport.

use std::borrow::Cow;

use async_trait::async_trait;
use bytes::Bytes;
use connection_core::RequestParameters;
use http::header::{AsHeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use thiserror::Error;

/// Status, headers and undecoded body of one HTTP exchange.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Header value as text; values that are not visible ASCII are ignored.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    pub fn content_disposition_filename(&self) -> Option<String> {
        self.header(CONTENT_DISPOSITION)
            .and_then(parse_content_disposition_filename)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Extract the file name from a `Content-Disposition` value.
///
/// The RFC 5987 form (`filename*=UTF-8''na%20me.pdf`) wins over the plain
/// `filename="name.pdf"` parameter when both are present.
pub(crate) fn parse_content_disposition_filename(value: &str) -> Option<String> {
    let mut plain = None;

    for param in split_parameters(value).into_iter().skip(1) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let raw = raw.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'percent-encoded-value
                let encoded = raw.splitn(3, '\'').nth(2).unwrap_or(raw);
                if let Ok(decoded) = urlencoding::decode(encoded) {
                    if !decoded.is_empty() {
                        return Some(decoded.into_owned());
                    }
                }
            }
            "filename" => {
                let name = unquote(raw);
                if !name.is_empty() {
                    plain = Some(name);
                }
            }
            _ => {}
        }
    }

    plain
}

/// Split a header value on `;`, ignoring separators inside quoted strings.
fn split_parameters(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Strip the surrounding quotes of a quoted-string and resolve `\"` escapes.
fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid request URL for path '{path}': {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid transport configuration: {0}")]
    Config(String),

    /// Escape hatch for custom transports.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

/// Executes HTTP calls relative to the API base URL.
///
/// `path` is relative to the base URL (`"contacts/123"`); `get` appends the
/// encoded [`RequestParameters`] as the query string.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        path: &str,
        params: &RequestParameters,
    ) -> Result<RawResponse, TransportError>;

    async fn post(&self, path: &str, body: Option<Bytes>) -> Result<RawResponse, TransportError>;

    async fn put(&self, path: &str, body: Option<Bytes>) -> Result<RawResponse, TransportError>;

    async fn patch(&self, path: &str, body: Option<Bytes>)
        -> Result<RawResponse, TransportError>;

    async fn delete(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_filename_prefers_extended_form() {
        let value = r#"attachment; filename="report.pdf"; filename*=UTF-8''q3%20report.pdf"#;
        assert_eq!(
            parse_content_disposition_filename(value).as_deref(),
            Some("q3 report.pdf")
        );
    }

    #[test]
    fn test_filename_plain_form() {
        assert_eq!(
            parse_content_disposition_filename(r#"attachment; filename="invoice.csv""#).as_deref(),
            Some("invoice.csv")
        );
        assert_eq!(
            parse_content_disposition_filename("attachment; FILENAME=plain.txt").as_deref(),
            Some("plain.txt")
        );
    }

    #[test]
    fn test_filename_quoted_semicolon_and_escapes() {
        assert_eq!(
            parse_content_disposition_filename(r#"attachment; filename="q3;final.csv""#).as_deref(),
            Some("q3;final.csv")
        );
        assert_eq!(
            parse_content_disposition_filename(r#"attachment; filename="say \"hi\"; ok.txt"; size=10"#)
                .as_deref(),
            Some(r#"say "hi"; ok.txt"#)
        );
    }

    #[test]
    fn test_filename_absent() {
        assert_eq!(parse_content_disposition_filename("inline"), None);
        assert_eq!(parse_content_disposition_filename(r#"attachment; filename="""#), None);
    }

    #[test]
    fn test_raw_response_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"a.csv\""),
        );
        let raw = RawResponse::new(StatusCode::OK, "a,b").with_headers(headers);

        assert!(raw.is_success());
        assert_eq!(raw.content_type(), Some("text/csv"));
        assert_eq!(raw.content_disposition_filename().as_deref(), Some("a.csv"));
        assert_eq!(raw.text(), "a,b");
    }
}
