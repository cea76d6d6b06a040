use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// Extract and validate the JWT bearer token. There is no fallback
/// identity: a missing or invalid token fails closed.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(auth) = auth
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn claims_of(request: &Request) -> AppResult<&Claims> {
    request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))
}

/// Require the organization admin role
pub async fn require_org_admin(request: Request, next: Next) -> AppResult<Response> {
    if claims_of(&request)?.role != UserRole::OrganizationAdmin {
        return Err(AppError::Forbidden(
            "Organization admin access required".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Require the organization driver role
pub async fn require_org_driver(request: Request, next: Next) -> AppResult<Response> {
    if claims_of(&request)?.role != UserRole::OrganizationDriver {
        return Err(AppError::Forbidden("Driver access required".to_string()));
    }

    Ok(next.run(request).await)
}

/// Require any organization member (admin or driver). Used for read-only
/// fleet views that both roles may see.
pub async fn require_org_member(request: Request, next: Next) -> AppResult<Response> {
    let claims = claims_of(&request)?;
    if claims.role == UserRole::Customer {
        return Err(AppError::Forbidden(
            "Organization membership required".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Require the customer role
pub async fn require_customer(request: Request, next: Next) -> AppResult<Response> {
    if claims_of(&request)?.role != UserRole::Customer {
        return Err(AppError::Forbidden("Customer access required".to_string()));
    }

    Ok(next.run(request).await)
}
