use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use seva_store::app_config::AuthConfig;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

pub fn issue_admin_token(auth: &AuthConfig) -> Result<String, AppError> {
    let claims = Claims {
        sub: auth.admin_username.clone(),
        role: "admin".to_owned(),
        exp: (Utc::now() + Duration::seconds(auth.jwt_expiration_seconds as i64)).timestamp()
            as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("token encoding failed: {}", e)))
}

pub fn verify_admin(auth: &AuthConfig, token: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(e.to_string()))?;

    if data.claims.role != "admin" {
        return Err(AppError::AuthorizationError(
            "admin role required".to_string(),
        ));
    }

    Ok(data.claims)
}
