//! Display-only inspection of the configured service credential.
//!
//! The payload is decoded WITHOUT signature verification. The result is
//! only ever echoed by the `/_whoami` debug endpoint; nothing here may feed
//! identity or authorization decisions.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Non-sensitive claims of the service credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceKeyClaims {
    pub iss: Option<String>,
    /// Project reference.
    #[serde(rename = "ref")]
    pub project_ref: Option<String>,
    pub role: Option<String>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
}

/// Decode the credential's claims for display, or `None` if it is not a JWT.
pub fn inspect_service_key(key: &str) -> Option<ServiceKeyClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;

    decode::<ServiceKeyClaims>(key, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}
