use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::identity::{Identity, Role};

/// Header carrying the authenticated user's id, set by the upstream gateway.
const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user's role, set by the upstream gateway.
const USER_ROLE_HEADER: &str = "x-user-role";

fn extract_identity(request: &Request<Body>) -> Option<Identity> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())?;

    let role = request
        .headers()
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(Role::parse)?;

    Some(Identity { user_id, role })
}

/// A middleware that requires a gateway-asserted identity to be present.
///
/// Session mechanics live in the upstream auth gateway; by the time a request
/// reaches this service the gateway has resolved the session and forwarded
/// the identity headers. Requests without them never came through the
/// gateway.
pub async fn require_auth(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let identity = extract_identity(&request).ok_or_else(|| {
        tracing::warn!("❌ Missing or malformed identity headers");
        StatusCode::UNAUTHORIZED
    })?;

    tracing::debug!("✅ User authenticated: {}", identity.user_id);

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// A middleware that additionally requires the admin role.
///
/// Must run after [`require_auth`] so the identity extension is populated.
pub async fn require_admin(
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if identity.role != Role::Admin {
        tracing::warn!("❌ Admin route denied for user: {}", identity.user_id);
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}
