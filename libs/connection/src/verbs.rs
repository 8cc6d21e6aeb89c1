//! Typed request verbs.
//!
//! Each verb runs the call through the transport, then resolves the response
//! with [`ApiResponse::into_envelope`]: interceptors first, then the status,
//! then the decoded envelope.

use bytes::Bytes;
use connection_core::{ApiResponseBodyData, RequestParameters};
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use crate::error::Error;
use crate::response::{ApiResponse, FileStream, Interceptor};
use crate::transport::Transport;

#[instrument(name = "connection.get", skip_all, fields(path = %path, query = %params))]
pub async fn get<T, C>(
    transport: &C,
    path: &str,
    params: &RequestParameters,
    interceptors: &[Interceptor],
) -> Result<ApiResponseBodyData<T>, Error>
where
    T: DeserializeOwned + Default,
    C: Transport + ?Sized,
{
    let raw = transport.get(path, params).await?;
    ApiResponse::new(Method::GET, path, raw).into_envelope(interceptors)
}

#[instrument(name = "connection.post", skip_all, fields(path = %path))]
pub async fn post<T, B, C>(
    transport: &C,
    path: &str,
    body: &B,
    interceptors: &[Interceptor],
) -> Result<ApiResponseBodyData<T>, Error>
where
    T: DeserializeOwned + Default,
    B: Serialize + Sync + ?Sized,
    C: Transport + ?Sized,
{
    let body = encode_body(&Method::POST, path, body)?;
    let raw = transport.post(path, Some(body)).await?;
    ApiResponse::new(Method::POST, path, raw).into_envelope(interceptors)
}

#[instrument(name = "connection.put", skip_all, fields(path = %path))]
pub async fn put<T, B, C>(
    transport: &C,
    path: &str,
    body: &B,
    interceptors: &[Interceptor],
) -> Result<ApiResponseBodyData<T>, Error>
where
    T: DeserializeOwned + Default,
    B: Serialize + Sync + ?Sized,
    C: Transport + ?Sized,
{
    let body = encode_body(&Method::PUT, path, body)?;
    let raw = transport.put(path, Some(body)).await?;
    ApiResponse::new(Method::PUT, path, raw).into_envelope(interceptors)
}

#[instrument(name = "connection.patch", skip_all, fields(path = %path))]
pub async fn patch<T, B, C>(
    transport: &C,
    path: &str,
    body: &B,
    interceptors: &[Interceptor],
) -> Result<ApiResponseBodyData<T>, Error>
where
    T: DeserializeOwned + Default,
    B: Serialize + Sync + ?Sized,
    C: Transport + ?Sized,
{
    let body = encode_body(&Method::PATCH, path, body)?;
    let raw = transport.patch(path, Some(body)).await?;
    ApiResponse::new(Method::PATCH, path, raw).into_envelope(interceptors)
}

/// DELETE usually answers without `data`; use `T = ()` unless the endpoint
/// returns the removed record.
#[instrument(name = "connection.delete", skip_all, fields(path = %path))]
pub async fn delete<T, C>(
    transport: &C,
    path: &str,
    interceptors: &[Interceptor],
) -> Result<ApiResponseBodyData<T>, Error>
where
    T: DeserializeOwned + Default,
    C: Transport + ?Sized,
{
    let raw = transport.delete(path, None).await?;
    ApiResponse::new(Method::DELETE, path, raw).into_envelope(interceptors)
}

/// GET a binary download instead of a JSON envelope.
#[instrument(name = "connection.get_file", skip_all, fields(path = %path))]
pub async fn get_file<C>(
    transport: &C,
    path: &str,
    params: &RequestParameters,
    interceptors: &[Interceptor],
) -> Result<FileStream, Error>
where
    C: Transport + ?Sized,
{
    let raw = transport.get(path, params).await?;
    ApiResponse::new(Method::GET, path, raw).into_file(interceptors)
}

fn encode_body<B>(method: &Method, path: &str, body: &B) -> Result<Bytes, Error>
where
    B: Serialize + ?Sized,
{
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(|source| Error::Encode {
            method: method.clone(),
            path: path.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceNotFoundError;
    use crate::testing::{Call, ScriptedTransport};
    use crate::transport::TransportError;
    use http::StatusCode;
    use serde::{Deserialize, Serializer};
    use tracing_test::traced_test;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Contact {
        id: u64,
    }

    #[derive(Serialize)]
    struct NewContact<'a> {
        name: &'a str,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[tokio::test]
    async fn test_get_single_record() {
        let transport = ScriptedTransport::new().reply(StatusCode::OK, r#"{"data":{"id":123}}"#);

        let env = get::<Contact, _>(&transport, "contacts/123", &RequestParameters::new(), &[])
            .await
            .unwrap();

        assert_eq!(env.data, Contact { id: 123 });
        assert_eq!(
            transport.calls(),
            vec![Call::new(Method::GET, "contacts/123").with_query("")]
        );
    }

    #[tokio::test]
    async fn test_get_not_found_interceptor() {
        let transport = ScriptedTransport::new().reply(StatusCode::NOT_FOUND, r#"{"error":"missing"}"#);
        let interceptors = [Interceptor::not_found(|_| ResourceNotFoundError::new("contact", 123))];

        let err = get::<Contact, _>(&transport, "contacts/123", &RequestParameters::new(), &interceptors)
            .await
            .unwrap_err();

        assert_eq!(
            err.into_domain::<ResourceNotFoundError>().unwrap(),
            ResourceNotFoundError::new("contact", 123)
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced_verbatim() {
        let transport = ScriptedTransport::new().fail(TransportError::Config("offline".into()));

        let err = get::<Contact, _>(&transport, "contacts", &RequestParameters::new(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(TransportError::Config(ref m)) if m == "offline"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let transport = ScriptedTransport::new().reply(StatusCode::CREATED, r#"{"data":{"id":9}}"#);

        let env = post::<Contact, _, _>(&transport, "contacts", &NewContact { name: "Ada" }, &[])
            .await
            .unwrap();

        assert_eq!(env.data.id, 9);
        assert_eq!(
            transport.calls(),
            vec![Call::new(Method::POST, "contacts").with_body(r#"{"name":"Ada"}"#)]
        );
    }

    #[tokio::test]
    async fn test_put_and_patch_use_their_methods() {
        let transport = ScriptedTransport::new()
            .reply(StatusCode::OK, r#"{"data":{"id":1}}"#)
            .reply(StatusCode::OK, r#"{"data":{"id":1}}"#);

        put::<Contact, _, _>(&transport, "contacts/1", &NewContact { name: "A" }, &[])
            .await
            .unwrap();
        patch::<Contact, _, _>(&transport, "contacts/1", &serde_json::json!({"name": "B"}), &[])
            .await
            .unwrap();

        let methods: Vec<Method> = transport.calls().into_iter().map(|c| c.method).collect();
        assert_eq!(methods, vec![Method::PUT, Method::PATCH]);
    }

    #[tokio::test]
    async fn test_encode_failure_happens_before_the_call() {
        let transport = ScriptedTransport::new();

        let err = post::<Contact, _, _>(&transport, "contacts", &Unserializable, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Encode { ref method, .. } if *method == Method::POST));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_without_data_is_zero_value() {
        let transport = ScriptedTransport::new().reply(StatusCode::OK, "{}");

        let env = delete::<(), _>(&transport, "contacts/5", &[]).await.unwrap();

        let () = env.data;
        assert_eq!(transport.calls(), vec![Call::new(Method::DELETE, "contacts/5")]);
    }

    #[tokio::test]
    async fn test_get_file_returns_body() {
        let transport = ScriptedTransport::new().reply_with_headers(
            StatusCode::OK,
            "id,name\n1,Ada\n",
            &[
                ("content-type", "text/csv"),
                ("content-disposition", "attachment; filename=\"contacts.csv\""),
            ],
        );

        let file = get_file(&transport, "contacts/export", &RequestParameters::new(), &[])
            .await
            .unwrap();

        assert_eq!(file.filename.as_deref(), Some("contacts.csv"));
        assert_eq!(file.content_type.as_deref(), Some("text/csv"));
        assert_eq!(&file.content[..], b"id,name\n1,Ada\n");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_server_warnings_are_logged() {
        let transport = ScriptedTransport::new().reply(
            StatusCode::OK,
            r#"{"data":{"id":1},"meta":{"warnings":["field 'fax' is deprecated"]}}"#,
        );

        let env = get::<Contact, _>(&transport, "contacts/1", &RequestParameters::new(), &[])
            .await
            .unwrap();

        assert_eq!(env.metadata.warnings.len(), 1);
        assert!(logs_contain("server warning"));
        assert!(logs_contain("field 'fax' is deprecated"));
    }
}
