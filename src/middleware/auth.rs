use crate::{
    error::AppError,
    utils::jwt::{decode_jwt, ADMIN_ROLE},
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Operator identity taken from a verified admin token.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

/// Admin authentication middleware.
///
/// Requires `Authorization: Bearer <jwt>` carrying the admin role and puts
/// an [`AdminUser`] into the request extensions.
pub async fn admin_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let claims = decode_jwt(&token).map_err(|e| {
        tracing::debug!("Rejected admin token: {}", e);
        AppError::Unauthorized
    })?;
    if claims.role != ADMIN_ROLE {
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(AdminUser {
        username: claims.sub,
    });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
