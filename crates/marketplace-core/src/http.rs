//! Helpers shared by the account and listing routers.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::access::ActorId;
use crate::validation::ValidationError;

/// Raw `Authorization` header value, if it is valid visible ASCII.
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// `{"message": ...}` body with the given status.
pub fn message(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(json!({ "message": text.into() }))).into_response()
}

/// Mutation response carrying a message plus one named payload.
pub fn message_with(status: StatusCode, text: &str, key: &str, payload: Value) -> Response {
    let mut body = serde_json::Map::new();
    body.insert("message".to_string(), Value::String(text.to_string()));
    body.insert(key.to_string(), payload);
    (status, Json(Value::Object(body))).into_response()
}

pub fn validation_failed(error: &ValidationError) -> Response {
    let body = json!({
        "message": error.to_string(),
        "field": error.field,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

/// `Json` extractor whose rejections use the `{"message": ...}` error body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejected(&rejection)),
        }
    }
}

/// Body that may be left empty. A non-empty body must still decode as `T`.
pub struct OptionalJsonBody<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }
        match Json::<T>::from_bytes(&bytes) {
            Ok(Json(value)) => Ok(Self(Some(value))),
            Err(rejection) => Err(json_rejected(&rejection)),
        }
    }
}

/// `Query` extractor whose rejections use the `{"message": ...}` error body.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(query_rejected(&rejection)),
        }
    }
}

fn json_rejected(rejection: &JsonRejection) -> Response {
    message(rejection.status(), rejection.body_text())
}

fn query_rejected(rejection: &QueryRejection) -> Response {
    message(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
}

pub fn parse_actor_id(raw: &str) -> Result<ActorId, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::new("id", "must be a valid identifier"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_authorization_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(authorization(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(authorization(&headers), Some("Bearer abc"));
    }

    #[test]
    fn rejects_non_uuid_ids() {
        assert!(parse_actor_id("42").is_err());
        assert!(parse_actor_id("6f1c1f43-3c0b-4c4d-9a4f-0e7e6b8f2d11").is_ok());
    }
}
