//! Request correlation ids.
//!
//! Each request carries an `x-request-id`: the upstream proxy's when it is a
//! sane token, a fresh UUID otherwise. The id is recorded on the
//! `http_request` span, tagged on the Sentry scope, exposed to handlers as a
//! [`RequestId`] extension and echoed on the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Request id available to handlers via `Extension<RequestId>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

fn incoming_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let usable = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    usable.then(|| value.to_owned())
}

/// Attach a request id to the request, its span, Sentry, and the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = incoming_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &id));
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
        headers
    }

    #[test]
    fn test_incoming_id_accepted() {
        assert_eq!(
            incoming_id(&headers_with("cf-8a1b2c.3")),
            Some("cf-8a1b2c.3".to_string())
        );
    }

    #[test]
    fn test_incoming_id_rejected() {
        assert_eq!(incoming_id(&HeaderMap::new()), None);
        assert_eq!(incoming_id(&headers_with("has space")), None);
        assert_eq!(incoming_id(&headers_with(&"a".repeat(200))), None);
    }
}
