//! Request identity middleware
//!
//! The remote inventory service authenticates every call itself. This layer
//! only captures the caller's bearer token and tenant so they can be
//! forwarded explicitly; nothing is kept between requests.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::AppError;

/// Header carrying the tenant the caller acts for
pub const TENANT_HEADER: &str = "x-tenant";

/// Identity of the caller, passed to every remote call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    pub token: String,
    pub tenant: Option<String>,
}

impl RequestContext {
    pub fn new(token: impl Into<String>, tenant: Option<String>) -> Self {
        Self {
            token: token.into(),
            tenant,
        }
    }
}

async fn context_from_parts<S>(parts: &mut Parts, state: &S) -> Result<RequestContext, AppError>
where
    S: Send + Sync,
{
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::unauthorized("Missing or invalid Authorization header"))?;

    let token = bearer.token().trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("Empty bearer token"));
    }

    let tenant = parts
        .headers
        .get(TENANT_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(RequestContext::new(token, tenant))
}

/// Rejects requests without a bearer token and stores the context for handlers
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    match context_from_parts(&mut parts, &()).await {
        Ok(context) => {
            parts.extensions.insert(context);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(error) => error.into_response(),
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<RequestContext>() {
            return Ok(context.clone());
        }
        context_from_parts(parts, state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, Request as HttpRequest};

    async fn extract(request: HttpRequest<()>) -> Result<RequestContext, AppError> {
        let (mut parts, _) = request.into_parts();
        RequestContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_context_from_headers() {
        let request = HttpRequest::builder()
            .header(AUTHORIZATION, "Bearer abc123")
            .header(TENANT_HEADER, "vigo")
            .body(())
            .unwrap();

        let context = extract(request).await.unwrap();

        assert_eq!(context, RequestContext::new("abc123", Some("vigo".to_string())));
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let request = HttpRequest::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_tenant_is_optional() {
        let request = HttpRequest::builder()
            .header(AUTHORIZATION, "Bearer abc123")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap().tenant, None);
    }
}
