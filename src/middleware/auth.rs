use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::{HeaderMap, Uri},
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::auth::{authenticate, Claims};
use crate::database::record::object_from_bytes;
use crate::error::ApiError;
use crate::state::AppState;

/// Body/query key carrying the token.
pub const TOKEN_FIELD: &str = "_token";

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
        }
    }
}

/// JSON object body of a request whose token has been verified.
///
/// The token is looked for in the body's `_token` field, then the `_token`
/// query parameter, then an `Authorization: Bearer` header. `_token` is
/// removed from `body` before handlers see it.
#[derive(Debug)]
pub struct Authenticated {
    pub user: AuthUser,
    pub body: Map<String, Value>,
}

#[async_trait]
impl FromRequest<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let query_token = extract_jwt_from_query(req.uri());
        let header_token = extract_jwt_from_headers(req.headers());

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let mut parsed = object_from_bytes(&bytes);
        let body_token = parsed.as_mut().ok().and_then(take_body_token);

        // An unparseable body is reported only once the caller is known.
        let token = body_token.or(query_token).or(header_token);
        let user = authenticate(&state.config.security, token.as_deref())?;
        let body = parsed?;

        tracing::debug!("Authenticated request for user '{}'", user.username);
        Ok(Self { user, body })
    }
}

/// Remove `_token` from the body; only a string value counts as a token.
fn take_body_token(body: &mut Map<String, Value>) -> Option<String> {
    match body.remove(TOKEN_FIELD) {
        Some(Value::String(token)) => Some(token),
        _ => None,
    }
}

fn extract_jwt_from_query(uri: &Uri) -> Option<String> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(mut params)| params.remove(TOKEN_FIELD))
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn body_token_is_removed() {
        let mut body = json!({ "_token": "abc", "title": "t" }).as_object().cloned().unwrap();
        assert_eq!(take_body_token(&mut body).as_deref(), Some("abc"));
        assert!(!body.contains_key("_token"));
        assert!(body.contains_key("title"));
    }

    #[test]
    fn non_string_body_token_is_ignored_but_stripped() {
        let mut body = json!({ "_token": 42 }).as_object().cloned().unwrap();
        assert_eq!(take_body_token(&mut body), None);
        assert!(body.is_empty());
    }

    #[test]
    fn reads_query_token() {
        let uri: Uri = "/surveys/1?_token=abc.def".parse().unwrap();
        assert_eq!(extract_jwt_from_query(&uri).as_deref(), Some("abc.def"));
        let uri: Uri = "/surveys/1".parse().unwrap();
        assert_eq!(extract_jwt_from_query(&uri), None);
    }

    #[test]
    fn reads_bearer_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_jwt_from_headers(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_jwt_from_headers(&headers).as_deref(), Some("xyz"));

        headers.insert("authorization", HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_jwt_from_headers(&headers), None);
    }
}
