//! JWT token service implementation.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use quill_core::domain::Role;
use quill_core::ports::{AuthError, TokenClaims, TokenService};

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
            issuer: "quill-api".to_string(),
        }
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    username: String,
    role: String,
    exp: i64,
    iat: i64,
    iss: String,
}

/// HS256 session tokens.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue_token(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let claims = Claims {
            sub: claims.user_id.to_string(),
            username: claims.username.clone(),
            role: claims.role.to_string(),
            exp: claims.expires_at.timestamp(),
            iat: Utc::now().timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            },
        )?;
        let claims = token_data.claims;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|e| AuthError::InvalidToken(format!("subject: {e}")))?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidToken(format!("role: {}", claims.role)))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidToken("expiry out of range".to_string()))?;

        Ok(TokenClaims::new(user_id, claims.username, role, expires_at))
    }

    fn expiration(&self) -> TimeDelta {
        TimeDelta::hours(self.config.expiration_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    fn claims_expiring_in(delta: TimeDelta) -> TokenClaims {
        TokenClaims::new(7, "writer01", Role::Admin, Utc::now() + delta)
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = JwtTokenService::new(test_config());
        let claims = claims_expiring_in(TimeDelta::hours(1));

        let token = service.issue_token(&claims).unwrap();
        let decoded = service.validate_token(&token).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtTokenService::new(test_config());
        let token = service
            .issue_token(&claims_expiring_in(TimeDelta::seconds(-30)))
            .unwrap();

        let result = service.validate_token(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = JwtTokenService::new(test_config());

        let result = service.validate_token("invalid-token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_other_secret_rejected() {
        let issuer = JwtTokenService::new(test_config());
        let verifier = JwtTokenService::new(JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        });
        let token = issuer
            .issue_token(&claims_expiring_in(TimeDelta::hours(1)))
            .unwrap();

        let result = verifier.validate_token(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_validate_wrong_issuer_token() {
        let service1 = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let service2 = JwtTokenService::new(JwtConfig {
            issuer: "issuer2".to_string(),
            ..test_config()
        });

        let token = service1
            .issue_token(&claims_expiring_in(TimeDelta::hours(1)))
            .unwrap();

        assert!(service2.validate_token(&token).is_err());
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let config = test_config();
        let service = JwtTokenService::new(config.clone());
        let claims = Claims {
            sub: "7".to_string(),
            username: "writer01".to_string(),
            role: "admin".to_string(),
            exp: (Utc::now() + TimeDelta::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
            iss: config.issuer.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let config = test_config();
        let service = JwtTokenService::new(config.clone());
        let claims = Claims {
            sub: "7".to_string(),
            username: "writer01".to_string(),
            role: "root".to_string(),
            exp: (Utc::now() + TimeDelta::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
            iss: config.issuer.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expiration() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: 24,
            ..test_config()
        });

        assert_eq!(service.expiration(), TimeDelta::seconds(86400));
    }
}
