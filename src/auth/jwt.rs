//! Session token generation and validation
//! The token only references the server-side session; it is never trusted on its own.

use crate::{config::AppConfig, error::AppError, session::Session};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims of a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Session ID
    pub sid: String,

    /// Username
    pub username: String,

    /// Role as stored at login
    pub role: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl Claims {
    pub fn session_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sid).map_err(|_| AppError::Unauthorized)
    }
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_exp_secs: u64,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_exp_secs: config.session.ttl_secs,
        })
    }

    /// Seconds until a freshly issued token expires
    pub fn token_exp_secs(&self) -> u64 {
        self.token_exp_secs
    }

    /// Issue the token handed to the client for `session`
    pub fn issue(&self, session: &Session) -> Result<String, AppError> {
        let claims = Claims {
            sub: session.user_id.to_string(),
            sid: session.session_id.to_string(),
            username: session.username.clone(),
            role: session.role.clone(),
            iat: session.issued_at.timestamp(),
            exp: session.expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {:?}", e);
            AppError::Internal(format!("Failed to encode session token: {}", e))
        })
    }

    /// Validate and decode token
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        Ok(
            decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
                .map_err(|e| {
                    tracing::debug!("Token validation failed: {:?}", e);
                    AppError::Unauthorized
                })?
                .claims,
        )
    }
}
