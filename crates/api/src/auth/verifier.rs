//! Bearer-token verification.
//!
//! Two implementations of [`IdentityVerifier`]:
//!
//! - [`SupabaseAuthVerifier`] asks the identity service who the token
//!   belongs to (`GET /auth/v1/user`).
//! - [`JwtSecretVerifier`] checks HS256 access tokens locally against the
//!   project's JWT secret (signature, expiry, audience).

use async_trait::async_trait;
use corner_core::types::UserId;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Audience the identity service puts in signed-in users' access tokens.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Identity request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity service rejected the token (HTTP {0})")]
    Rejected(u16),

    #[error("Verified token has no subject")]
    MissingSubject,
}

/// Resolves a bearer token to a verified user id.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Short backend name for logs and the debug endpoint.
    fn backend(&self) -> &'static str;

    async fn verify(&self, token: &str) -> Result<UserId, IdentityError>;
}

// ---------------------------------------------------------------------------
// Remote verification
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Option<String>,
}

/// Verifies tokens by calling the Supabase identity service.
pub struct SupabaseAuthVerifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseAuthVerifier {
    pub fn new(client: reqwest::Client, supabase_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: supabase_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseAuthVerifier {
    fn backend(&self) -> &'static str {
        "supabase-auth"
    }

    async fn verify(&self, token: &str) -> Result<UserId, IdentityError> {
        let response = self
            .client
            .get(self.user_url())
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected(status.as_u16()));
        }

        let user: AuthUser = response.json().await?;
        user.id
            .filter(|id| !id.is_empty())
            .ok_or(IdentityError::MissingSubject)
    }
}

// ---------------------------------------------------------------------------
// Local verification
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: Option<String>,
}

/// Verifies HS256 access tokens with the project's JWT secret.
pub struct JwtSecretVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSecretVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtSecretVerifier {
    fn backend(&self) -> &'static str {
        "jwt-secret"
    }

    async fn verify(&self, token: &str) -> Result<UserId, IdentityError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation)?;
        data.claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(IdentityError::MissingSubject)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

    fn token(secret: &str, claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    fn valid_claims(sub: &str) -> serde_json::Value {
        let now = chrono::Utc::now().timestamp();
        json!({
            "sub": sub,
            "aud": AUTHENTICATED_AUDIENCE,
            "role": "authenticated",
            "iat": now,
            "exp": now + 600,
        })
    }

    #[tokio::test]
    async fn valid_token_yields_subject() {
        let verifier = JwtSecretVerifier::new(SECRET);
        let user = verifier
            .verify(&token(SECRET, valid_claims("8d1c9f5e-user")))
            .await
            .unwrap();
        assert_eq!(user, "8d1c9f5e-user");
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_fails() {
        let verifier = JwtSecretVerifier::new(SECRET);
        let result = verifier
            .verify(&token("another-secret", valid_claims("u")))
            .await;
        assert_matches!(result, Err(IdentityError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn expired_token_fails() {
        let verifier = JwtSecretVerifier::new(SECRET);
        let now = chrono::Utc::now().timestamp();
        let mut claims = valid_claims("u");
        // Well beyond the default 60-second leeway.
        claims["exp"] = json!(now - 300);

        let result = verifier.verify(&token(SECRET, claims)).await;
        assert_matches!(result, Err(IdentityError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn service_role_audience_is_not_a_user() {
        let verifier = JwtSecretVerifier::new(SECRET);
        let mut claims = valid_claims("u");
        claims["aud"] = json!("service_role");

        let result = verifier.verify(&token(SECRET, claims)).await;
        assert_matches!(result, Err(IdentityError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn garbage_token_fails() {
        let verifier = JwtSecretVerifier::new(SECRET);
        assert!(verifier.verify("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn empty_subject_is_rejected() {
        let verifier = JwtSecretVerifier::new(SECRET);
        let result = verifier.verify(&token(SECRET, valid_claims(""))).await;
        assert_matches!(result, Err(IdentityError::MissingSubject));
    }

    #[test]
    fn remote_verifier_builds_user_url() {
        let verifier =
            SupabaseAuthVerifier::new(reqwest::Client::new(), "https://demo.supabase.co/", "key");
        assert_eq!(verifier.user_url(), "https://demo.supabase.co/auth/v1/user");
    }
}
