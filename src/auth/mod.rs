// Token minting and verification. The bearer token is the sole authorization
// carrier; the tenant id inside verified claims is authoritative.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::database::models::user::User;
use crate::error::AppError;

pub mod password;

/// Verified identity bundle carried by a bearer token. Immutable after issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub tenant_id: String,
    pub role_id: Option<Uuid>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Mints and parses signed bearer tokens (HS256 with a shared secret).
/// Constructed once at startup; safe for concurrent use.
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Mint a signed bearer token for a verified user
    pub fn mint(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            tenant_id: user.tenant_id.clone().unwrap_or_default(),
            role_id: user.role_id,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::minutes(self.config.ttl_minutes)).timestamp(),
        };

        let key = EncodingKey::from_secret(self.config.secret.as_bytes());
        encode(&Header::default(), &claims, &key)
            .map_err(|e| AppError::wrap(crate::error::ErrorKind::Internal, "failed to sign token", e))
    }

    /// Verify signature, issuer, audience and the [nbf, exp] window.
    /// Every failure mode is `unauthorized`.
    pub fn parse(&self, token: &str) -> Result<Claims, AppError> {
        let key = DecodingKey::from_secret(self.config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AppError::wrap(crate::error::ErrorKind::Unauthorized, "invalid or expired token", e))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(tenant: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ana@terra.eco".to_string(),
            name: "Ana".to_string(),
            password_hash: String::new(),
            tenant_id: tenant.map(str::to_string),
            role_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(secret: &str, ttl_minutes: i64) -> TokenService {
        TokenService::new(TokenConfig {
            secret: secret.to_string(),
            issuer: "phyto-api".to_string(),
            audience: "phyto-api".to_string(),
            ttl_minutes,
        })
    }

    #[test]
    fn mint_parse_round_trip() {
        let tokens = service("k1", 60);
        let user = test_user(Some("tenant-a"));

        let token = tokens.mint(&user).expect("mint");
        let claims = tokens.parse(&token).expect("parse");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.tenant_id, "tenant-a");
        assert_eq!(claims.role_id, user.role_id);
    }

    #[test]
    fn parse_with_wrong_key_is_unauthorized() {
        let minter = service("k1", 60);
        let verifier = service("k2", 60);
        let token = minter.mint(&test_user(Some("t"))).expect("mint");

        let err = verifier.parse(&token).expect_err("must fail");
        assert_eq!(err.kind(), crate::error::ErrorKind::Unauthorized);
    }

    #[test]
    fn parse_expired_token_is_unauthorized() {
        // negative ttl puts exp strictly in the past; leeway is zero
        let tokens = service("k1", -1);
        let token = tokens.mint(&test_user(Some("t"))).expect("mint");

        let err = tokens.parse(&token).expect_err("must fail");
        assert_eq!(err.kind(), crate::error::ErrorKind::Unauthorized);
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let minter = TokenService::new(TokenConfig {
            secret: "k1".to_string(),
            issuer: "someone-else".to_string(),
            audience: "phyto-api".to_string(),
            ttl_minutes: 60,
        });
        let verifier = service("k1", 60);
        let token = minter.mint(&test_user(Some("t"))).expect("mint");

        let err = verifier.parse(&token).expect_err("must fail");
        assert_eq!(err.kind(), crate::error::ErrorKind::Unauthorized);
    }

    #[test]
    fn empty_tenant_survives_round_trip_as_empty() {
        let tokens = service("k1", 60);
        let token = tokens.mint(&test_user(None)).expect("mint");
        let claims = tokens.parse(&token).expect("parse");
        assert!(claims.tenant_id.is_empty());
    }
}
