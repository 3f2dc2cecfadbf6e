//! Bearer-token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// HS256 shared-secret validator.
///
/// Expiry uses the RFC 3339 `issued_at`/`expires_at` claims rather than the
/// numeric `exp`, so the library's own time checks are switched off.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            key: DecodingKey::from_secret(&secret),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use wolfshield_core::{OrganizationId, UserId};

    use crate::Role;

    fn mint(secret: &[u8], claims: &JwtClaims) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            organization_id: OrganizationId::new(),
            roles: vec![Role::ACCOUNTANT],
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn accepts_token_signed_with_the_shared_secret() {
        let now = Utc::now();
        let c = claims(now);
        let validator = Hs256JwtValidator::new(b"s3cret".to_vec());
        assert_eq!(validator.validate(&mint(b"s3cret", &c), now).unwrap(), c);
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(b"s3cret".to_vec());

        let forged = mint(b"other", &claims(now));
        assert!(matches!(
            validator.validate(&forged, now),
            Err(TokenValidationError::Malformed(_))
        ));

        let token = mint(b"s3cret", &claims(now));
        assert_eq!(
            validator.validate(&token, now + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
    }
}
