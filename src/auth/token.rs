//! HS256 bearer tokens.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;

use super::{Principal, TokenVerifier};
use crate::error::{AppError, ConfigError};
use crate::settings::JwtSettings;

pub struct JwtVerifier {
    key: Hmac<Sha256>,
    issuer: String,
}

impl JwtVerifier {
    pub fn new(settings: &JwtSettings) -> Result<Self, ConfigError> {
        let key = Hmac::<Sha256>::new_from_slice(settings.secret.as_bytes()).map_err(|_| ConfigError::Invalid {
            key: "JWT_SECRET",
            value: "<redacted>".into(),
        })?;
        Ok(JwtVerifier {
            key,
            issuer: settings.issuer.clone(),
        })
    }

    /// Sign a token for `subject` valid for `ttl`. Used by tooling and tests; the API never issues tokens.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, jwt::Error> {
        let now = Utc::now();
        let claims = Claims::new(RegisteredClaims {
            issuer: Some(self.issuer.clone()),
            subject: Some(subject.to_string()),
            issued_at: Some(now.timestamp() as u64),
            expiration: Some((now + ttl).timestamp() as u64),
            json_web_token_id: Some(uuid::Uuid::new_v4().to_string()),
            ..Default::default()
        });
        claims.sign_with_key(&self.key)
    }
}

fn timestamp(secs: u64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(i64::try_from(secs).ok()?, 0).single()
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Principal, AppError> {
        let invalid = || AppError::Unauthenticated("invalid token".into());

        let token: Token<Header, Claims, _> = token.verify_with_key(&self.key).map_err(|_| invalid())?;
        let claims = &token.claims().registered;

        if claims.issuer.as_deref() != Some(self.issuer.as_str()) {
            return Err(invalid());
        }

        let now = Utc::now();
        let iat = claims.issued_at.and_then(timestamp).ok_or_else(invalid)?;
        if iat > now {
            return Err(invalid());
        }

        if let Some(nbf) = claims.not_before {
            if timestamp(nbf).ok_or_else(invalid)? > now {
                return Err(AppError::Unauthenticated("token not yet valid".into()));
            }
        }

        let expires_at = claims.expiration.map(|exp| timestamp(exp).ok_or_else(invalid)).transpose()?;
        if expires_at.is_some_and(|exp| exp < now) {
            return Err(AppError::Unauthenticated("token expired".into()));
        }

        let subject = claims.subject.clone().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

        Ok(Principal {
            subject,
            token_id: claims.json_web_token_id.clone(),
            expires_at,
        })
    }
}
