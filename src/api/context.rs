//! Caller identity and request context taken from headers

use crate::analytics::RequestContext;
use crate::error::AppError;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-session-id";
pub const USER_HEADER: &str = "x-user-id";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn user_id(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, USER_HEADER).and_then(|v| v.parse().ok())
}

/// First hop of `x-forwarded-for`, else the peer address
fn client_ip(parts: &Parts) -> Option<IpAddr> {
    header_str(&parts.headers, FORWARDED_FOR_HEADER)
        .and_then(|v| v.split(',').next())
        .and_then(|hop| hop.trim().parse().ok())
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
}

/// Give every request a session id, echoing it in the response
pub async fn ensure_session(mut request: Request, next: Next) -> Response {
    let session_id = header_str(request.headers(), SESSION_HEADER)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let Ok(value) = HeaderValue::from_str(&session_id) else {
        return next.run(request).await;
    };
    request.headers_mut().insert(SESSION_HEADER, value.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(SESSION_HEADER, value);
    response
}

/// Analytics context of the current request
#[derive(Debug, Clone)]
pub struct RequestMeta(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        Ok(RequestMeta(RequestContext {
            session_id: header_str(headers, SESSION_HEADER)
                .unwrap_or("anonymous")
                .to_string(),
            user_id: user_id(headers),
            user_agent: header_str(headers, header::USER_AGENT.as_str()).map(str::to_string),
            ip: client_ip(parts),
            referrer: header_str(headers, header::REFERER.as_str()).map(str::to_string),
        }))
    }
}

/// User id of a user-scoped request; rejects with 401 when absent
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub u64);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id(&parts.headers)
            .map(RequireUser)
            .ok_or_else(|| AppError::Authentication(format!("Missing or invalid {} header", USER_HEADER)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = HttpRequest::builder().uri("/api/search");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_request_meta_from_headers() {
        let mut parts = parts(&[
            (SESSION_HEADER, "abc"),
            (USER_HEADER, "42"),
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("user-agent", "curl/8"),
        ]);
        let RequestMeta(context) = RequestMeta::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(context.session_id, "abc");
        assert_eq!(context.user_id, Some(42));
        assert_eq!(context.ip, Some("203.0.113.9".parse().unwrap()));
        assert_eq!(context.user_agent.as_deref(), Some("curl/8"));
        assert_eq!(context.referrer, None);
    }

    #[tokio::test]
    async fn test_require_user() {
        let mut anonymous = parts(&[]);
        let err = RequireUser::from_request_parts(&mut anonymous, &()).await.unwrap_err();
        assert_eq!(err.error_code(), "AUTHENTICATION_ERROR");

        let mut garbage = parts(&[(USER_HEADER, "jane")]);
        assert!(RequireUser::from_request_parts(&mut garbage, &()).await.is_err());

        let mut user = parts(&[(USER_HEADER, "7")]);
        let RequireUser(id) = RequireUser::from_request_parts(&mut user, &()).await.unwrap();
        assert_eq!(id, 7);
    }
}
