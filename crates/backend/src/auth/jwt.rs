//! JWT token creation and validation.

use anyhow::Context;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::models::User;

use super::types::{AuthConfig, Claims, TokenError};

/// Create the session cookie value for a user.
///
/// The JWT is sealed with the cookie cipher when one is configured.
pub fn create_token(config: &AuthConfig, user: &User) -> anyhow::Result<String> {
    let claims = Claims::for_user(user, Utc::now(), config.token_duration_days);
    let token = sign(config, &claims).context("Failed to sign session token")?;

    match &config.cookie_cipher {
        Some(cipher) => cipher
            .seal(&token)
            .context("Failed to encrypt session token"),
        None => Ok(token),
    }
}

pub(crate) fn sign(
    config: &AuthConfig,
    claims: &Claims,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Verify a session cookie value and return its claims.
///
/// Opens the envelope (if encryption is configured), then checks signature
/// and expiry with no leeway.
pub fn verify(config: &AuthConfig, value: &str) -> Result<Claims, TokenError> {
    if value.is_empty() {
        return Err(TokenError::Missing);
    }

    let token = match &config.cookie_cipher {
        Some(cipher) => cipher.open(value).map_err(|_| TokenError::Undecryptable)?,
        None => value.to_string(),
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cipher::CookieCipher;
    use chrono::Duration;
    use uuid::Uuid;

    fn test_config() -> AuthConfig {
        AuthConfig::new("test-secret-key-for-testing-only")
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: Some("test@example.com".to_string()),
            name: "Test User".to_string(),
            firstname: None,
            lastname: None,
            provider: "google".to_string(),
            provider_id: "google-1".to_string(),
            profile_picture: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_validate_token() {
        let config = test_config();
        let user = test_user();
        let token = create_token(&config, &user).expect("should create token");

        let claims = verify(&config, &token).expect("should validate token");
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.name, "Test User");
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
        assert_eq!(claims.exp - claims.iat, 14 * 24 * 3600);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let config = test_config();
        assert_eq!(
            verify(&config, "invalid-token").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(verify(&config, "").unwrap_err(), TokenError::Missing);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_config();
        let token = create_token(&config, &test_user()).expect("should create token");

        let mut wrong_config = config;
        wrong_config.jwt_secret = "wrong-secret".to_string();

        assert_eq!(
            verify(&wrong_config, &token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config();
        let issued = Utc::now() - Duration::days(15);
        let claims = Claims::for_user(&test_user(), issued, 14);
        let token = sign(&config, &claims).unwrap();

        assert_eq!(verify(&config, &token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let config = test_config();
        let token = create_token(&config, &test_user()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let other = create_token(&config, &test_user()).unwrap();
        parts[1] = other.split('.').nth(1).unwrap().to_string();
        let forged = parts.join(".");

        assert_eq!(
            verify(&config, &forged).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_sealed_token_round_trip() {
        let cipher = CookieCipher::from_base64_key(&CookieCipher::generate_key()).unwrap();
        let config = test_config().with_cookie_cipher(cipher);
        let user = test_user();

        let sealed = create_token(&config, &user).unwrap();
        assert_eq!(sealed.matches('.').count(), 0);
        assert_eq!(verify(&config, &sealed).unwrap().sub, user.id.to_string());

        // A plain JWT is not accepted once encryption is on
        let plain = sign(&config, &Claims::for_user(&user, Utc::now(), 14)).unwrap();
        assert_eq!(
            verify(&config, &plain).unwrap_err(),
            TokenError::Undecryptable
        );
    }
}
