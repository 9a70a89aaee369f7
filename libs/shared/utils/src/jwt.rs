use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use shared_models::auth::{Identity, JwtClaims, JwtHeader};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of every issued access token.
pub const TOKEN_TTL_SECONDS: i64 = 2 * 60 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Invalid token format")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Invalid claims format")]
    InvalidClaims,

    #[error("Token has no expiry")]
    MissingExpiry,

    #[error("Token expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

fn mac_for(secret: &str) -> Result<HmacSha256, TokenError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| TokenError::Signing("Failed to create HMAC".to_string()))
}

pub fn issue_token(email: &str, jwt_secret: &str) -> Result<String, TokenError> {
    issue_token_at(email, jwt_secret, Utc::now().timestamp())
}

/// Signs an HS256 token for `email` valid from `issued_at` for [`TOKEN_TTL_SECONDS`].
pub fn issue_token_at(email: &str, jwt_secret: &str, issued_at: i64) -> Result<String, TokenError> {
    if jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = JwtClaims {
        email: email.to_string(),
        iat: issued_at,
        exp: Some(issued_at + TOKEN_TTL_SECONDS),
    };

    let header_json = serde_json::to_vec(&header).map_err(|e| TokenError::Signing(e.to_string()))?;
    let claims_json = serde_json::to_vec(&claims).map_err(|e| TokenError::Signing(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    let mut mac = mac_for(jwt_secret)?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Identity, TokenError> {
    validate_token_at(token, jwt_secret, Utc::now().timestamp())
}

pub fn validate_token_at(token: &str, jwt_secret: &str, now: i64) -> Result<Identity, TokenError> {
    if jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed);
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        TokenError::Malformed
    })?;

    let mut mac = mac_for(jwt_secret)?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err(TokenError::InvalidSignature);
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| TokenError::InvalidClaims)?;

    let claims: JwtClaims = serde_json::from_slice(&claims_json).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        TokenError::InvalidClaims
    })?;

    let exp = claims.exp.ok_or(TokenError::MissingExpiry)?;
    if exp < now {
        debug!("Token expired at {} (now: {})", exp, now);
        return Err(TokenError::Expired);
    }

    debug!("Token validated successfully for: {}", claims.email);
    Ok(Identity::from(claims))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-jwt-validation";
    const ISSUED_AT: i64 = 1_704_067_200;

    #[test]
    fn issued_token_round_trips_email() {
        let token = issue_token_at("a@x.com", SECRET, ISSUED_AT).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let identity = validate_token_at(&token, SECRET, ISSUED_AT + 60).unwrap();
        assert_eq!(identity.email, "a@x.com");
    }

    #[test]
    fn token_is_valid_for_two_hours() {
        let token = issue_token_at("a@x.com", SECRET, ISSUED_AT).unwrap();

        assert!(validate_token_at(&token, SECRET, ISSUED_AT + 119 * 60).is_ok());
        assert_eq!(
            validate_token_at(&token, SECRET, ISSUED_AT + 121 * 60),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token_at("a@x.com", SECRET, ISSUED_AT).unwrap();
        assert_eq!(
            validate_token_at(&token, "another-secret", ISSUED_AT),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let token = issue_token_at("a@x.com", SECRET, ISSUED_AT).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            format!(r#"{{"email":"admin@x.com","iat":{},"exp":{}}}"#, ISSUED_AT, ISSUED_AT + 10),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        assert_eq!(
            validate_token_at(&forged, SECRET, ISSUED_AT),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn malformed_tokens_and_missing_secret_fail() {
        assert_eq!(validate_token_at("abc", SECRET, ISSUED_AT), Err(TokenError::Malformed));
        assert_eq!(
            validate_token_at("invalid.token.format!", SECRET, ISSUED_AT),
            Err(TokenError::Malformed)
        );
        assert_eq!(issue_token_at("a@x.com", "", ISSUED_AT), Err(TokenError::MissingSecret));
    }
}
