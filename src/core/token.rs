use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::models::TokenClaims;

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, badly signed or expired. Deliberately carries no detail.
    InvalidToken,
    Encoding(String),
    UnsupportedAlgorithm(Algorithm),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::InvalidToken => write!(f, "Could not validate credentials"),
            TokenError::Encoding(msg) => write!(f, "Encoding JWT error: {}", msg),
            TokenError::UnsupportedAlgorithm(alg) => {
                write!(f, "Unsupported signing algorithm {:?}, use HS256, HS384 or HS512", alg)
            }
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues and verifies HMAC-signed JWT access tokens.
///
/// Stateless: validity depends only on the signature and `exp`. Whether the
/// subject still exists is for the caller to decide.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl: Duration) -> Result<Self, TokenError> {
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(TokenError::UnsupportedAlgorithm(algorithm));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            ttl,
        })
    }

    /// HS256 with the default 30 minute lifetime.
    #[cfg(test)]
    pub fn with_secret(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, self.ttl)
    }

    /// A zero or negative `ttl` produces a token that is already expired.
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Encoding(format!("Token lifetime {} out of range", ttl)))?;
        let iat = now.timestamp().max(0) as usize;
        let exp = expires_at.timestamp().max(0) as usize;
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat,
            exp,
        };

        debug!("Issuing token for {} (exp {})", subject, exp);

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                TokenError::InvalidToken
            })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}
