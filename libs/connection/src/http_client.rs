//! reqwest-backed [`Transport`] with a tracing span per outgoing call.

use async_trait::async_trait;
use bytes::Bytes;
use connection_core::RequestParameters;
use http::header::{self, HeaderMap, HeaderValue};
use http::Method;
use runtime::ApiConfig;
use tracing::{field, Instrument, Level};
use url::Url;

use crate::transport::{RawResponse, Transport, TransportError};

/// HTTP transport that resolves request paths against an API base URL.
#[derive(Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Wrap an already configured client. Auth headers, if any, must be set on it.
    pub fn new(inner: reqwest::Client, base_url: Url) -> Self {
        Self { inner, base_url }
    }

    /// Build a client from API settings: bearer token, user agent and timeout.
    pub fn from_config(cfg: &ApiConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &cfg.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| TransportError::Config("api_key contains invalid characters".into()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let inner = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(cfg.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self::new(inner, cfg.base_url.clone()))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get a reference to the underlying reqwest::Client for advanced usage
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    fn url(&self, path: &str, query: Option<String>) -> Result<Url, TransportError> {
        // A leading slash would replace the base path instead of extending it.
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| TransportError::InvalidUrl {
                path: path.to_string(),
                source,
            })?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.set_query(Some(&query));
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<String>,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url(path, query)?;
        let mut builder = self.inner.request(method, url);
        if let Some(body) = body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        self.execute(builder.build()?).await
    }

    /// Execute a built request inside an `outgoing_http` span and buffer the body.
    pub async fn execute(&self, req: reqwest::Request) -> Result<RawResponse, TransportError> {
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = field::Empty,
            error = field::Empty,
            otel.kind = "client",
        );

        async {
            let response = self.inner.execute(req).await?;
            let status = response.status();

            let span = tracing::Span::current();
            span.record("http.status_code", status.as_u16());
            if status.is_client_error() || status.is_server_error() {
                span.record("error", true);
            }

            let headers = response.headers().clone();
            let body = response.bytes().await?;
            tracing::debug!(bytes = body.len(), "response received");

            Ok::<_, TransportError>(RawResponse {
                status,
                headers,
                body,
            })
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        params: &RequestParameters,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::GET, path, Some(params.encode()), None).await
    }

    async fn post(&self, path: &str, body: Option<Bytes>) -> Result<RawResponse, TransportError> {
        self.send(Method::POST, path, None, body).await
    }

    async fn put(&self, path: &str, body: Option<Bytes>) -> Result<RawResponse, TransportError> {
        self.send(Method::PUT, path, None, body).await
    }

    async fn patch(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::PATCH, path, None, body).await
    }

    async fn delete(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::DELETE, path, None, body).await
    }
}
