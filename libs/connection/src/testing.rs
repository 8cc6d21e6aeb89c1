//! In-memory transport replaying scripted responses.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use connection_core::RequestParameters;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};

use crate::transport::{RawResponse, Transport, TransportError};

/// One recorded transport call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<String>,
}

impl Call {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: None,
            body: None,
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: StatusCode, body: &'static str) -> Self {
        self.push(Ok(RawResponse::new(status, body)))
    }

    pub fn reply_with_headers(
        self,
        status: StatusCode,
        body: &'static str,
        headers: &[(&'static str, &'static str)],
    ) -> Self {
        let mut map = HeaderMap::new();
        for &(name, value) in headers {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        self.push(Ok(RawResponse::new(status, body).with_headers(map)))
    }

    pub fn fail(self, err: TransportError) -> Self {
        self.push(Err(err))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(self, reply: Result<RawResponse, TransportError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    fn record(&self, call: Call) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(call);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted reply left").into()))
    }
}

fn body_text(body: Option<Bytes>) -> Option<String> {
    body.map(|b| String::from_utf8_lossy(&b).into_owned())
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        path: &str,
        params: &RequestParameters,
    ) -> Result<RawResponse, TransportError> {
        self.record(Call::new(Method::GET, path).with_query(&params.encode()))
    }

    async fn post(&self, path: &str, body: Option<Bytes>) -> Result<RawResponse, TransportError> {
        self.record(Call {
            body: body_text(body),
            ..Call::new(Method::POST, path)
        })
    }

    async fn put(&self, path: &str, body: Option<Bytes>) -> Result<RawResponse, TransportError> {
        self.record(Call {
            body: body_text(body),
            ..Call::new(Method::PUT, path)
        })
    }

    async fn patch(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError> {
        self.record(Call {
            body: body_text(body),
            ..Call::new(Method::PATCH, path)
        })
    }

    async fn delete(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError> {
        self.record(Call {
            body: body_text(body),
            ..Call::new(Method::DELETE, path)
        })
    }
}
