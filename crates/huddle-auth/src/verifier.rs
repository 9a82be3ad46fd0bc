//! Token validation for inbound connections.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use huddle_core::config::auth::AuthConfig;
use huddle_core::error::AppError;

use super::claims::{Identity, RealtimeClaims, SessionClaims};

/// Validates connection tokens against both issuance paths.
///
/// The realtime form is tried first; if its signature does not match, the
/// same token is retried as a session token. A failure of both paths is
/// reported as the realtime-path error, which covers the common cases
/// (expired or malformed token) accurately.
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC key for the realtime token.
    realtime_key: DecodingKey,
    /// HMAC key for the session token.
    session_key: DecodingKey,
    /// Validation configuration shared by both paths.
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Self {
            realtime_key: DecodingKey::from_secret(config.realtime_secret.as_bytes()),
            session_key: DecodingKey::from_secret(config.session_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token, accepting either form.
    ///
    /// Checks signature validity and expiration; on success returns the
    /// trusted [`Identity`] to attach to the connection.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let realtime_err =
            match decode::<RealtimeClaims>(token, &self.realtime_key, &self.validation) {
                Ok(data) => return Ok(Identity::from(data.claims)),
                Err(e) => e,
            };

        match decode::<SessionClaims>(token, &self.session_key, &self.validation) {
            Ok(data) => Ok(Identity::from(data.claims)),
            Err(_) => Err(map_jwt_error(realtime_err)),
        }
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AppError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::authentication("Token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidToken => {
            AppError::authentication("Invalid token format")
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::authentication("Invalid token signature")
        }
        _ => AppError::authentication(format!("Token validation failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::TokenKind;

    use jsonwebtoken::{EncodingKey, Header, encode};

    use huddle_core::types::id::UserId;

    fn config() -> AuthConfig {
        AuthConfig {
            realtime_secret: "realtime-test-secret".to_string(),
            session_secret: "session-test-secret".to_string(),
            leeway_seconds: 5,
        }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn mint_realtime(secret: &str, claims: &RealtimeClaims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode token")
    }

    fn realtime_claims(exp: i64) -> RealtimeClaims {
        RealtimeClaims {
            sub: UserId::new(),
            name: "Aiko".to_string(),
            image: None,
            bio: Some("Distributed systems".to_string()),
            industry: Some("Software".to_string()),
            skills: vec!["rust".to_string()],
            networking_available: true,
            iat: now(),
            exp,
        }
    }

    #[test]
    fn test_accepts_realtime_token() {
        let cfg = config();
        let verifier = TokenVerifier::new(&cfg);
        let claims = realtime_claims(now() + 3600);
        let token = mint_realtime(&cfg.realtime_secret, &claims);

        let identity = verifier.verify(&token).expect("valid token");
        assert_eq!(identity.user_id, claims.sub);
        assert_eq!(identity.token_kind, TokenKind::Realtime);
        assert!(identity.networking_available);
        assert_eq!(identity.profile.name, "Aiko");
    }

    #[test]
    fn test_accepts_session_token() {
        let cfg = config();
        let verifier = TokenVerifier::new(&cfg);
        let claims = SessionClaims {
            sub: UserId::new(),
            name: "Ben".to_string(),
            iat: now(),
            exp: now() + 86400,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.session_secret.as_bytes()),
        )
        .expect("encode token");

        let identity = verifier.verify(&token).expect("valid token");
        assert_eq!(identity.token_kind, TokenKind::Session);
        assert!(!identity.networking_available);
        assert_eq!(identity.profile.name, "Ben");
    }

    #[test]
    fn test_rejects_unknown_signature() {
        let cfg = config();
        let verifier = TokenVerifier::new(&cfg);
        let token = mint_realtime("some-other-secret", &realtime_claims(now() + 3600));

        let err = verifier.verify(&token).expect_err("must be rejected");
        assert_eq!(err.kind, huddle_core::error::ErrorKind::Authentication);
    }

    #[test]
    fn test_rejects_expired_token() {
        let cfg = config();
        let verifier = TokenVerifier::new(&cfg);
        let token = mint_realtime(&cfg.realtime_secret, &realtime_claims(now() - 600));

        let err = verifier.verify(&token).expect_err("must be rejected");
        assert_eq!(err.message, "Token has expired");
    }

    #[test]
    fn test_rejects_garbage() {
        let verifier = TokenVerifier::new(&config());
        assert!(verifier.verify("not-a-jwt").is_err());
    }
}
