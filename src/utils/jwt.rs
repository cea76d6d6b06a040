use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,                     // user id
    pub email: String,
    pub role: UserRole,
    pub organization_id: Option<Uuid>, // only for organization members
    pub exp: i64,                      // expiration timestamp
    pub iat: i64,                      // issued at timestamp
}

impl Claims {
    /// The caller's organization. Organization-scoped handlers fail closed
    /// when the token carries none.
    pub fn organization(&self) -> AppResult<Uuid> {
        self.organization_id.ok_or_else(|| {
            AppError::Forbidden("caller is not attached to an organization".to_string())
        })
    }
}

pub fn create_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    organization_id: Option<Uuid>,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        organization_id,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
