//! Best-effort caller identity extractor for Axum handlers.
//!
//! Unlike an authentication gate, [`Caller`] never rejects a request: a
//! missing, malformed, or unverifiable token simply yields an anonymous
//! caller on the lowest tier.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use corner_core::class_mode::SubscriptionTier;
use corner_core::types::UserId;
use corner_db::repositories::SubscriptionRepo;
use corner_db::RowStore;

use crate::auth::verifier::IdentityVerifier;
use crate::state::AppState;

/// Who is calling, as far as we could tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Verified user id, `None` for guests.
    pub user_id: Option<UserId>,
    pub tier: SubscriptionTier,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            tier: SubscriptionTier::Free,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(resolve_caller(state.identity.as_ref(), state.store.as_ref(), &parts.headers).await)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the caller's identity and tier. Never fails.
pub async fn resolve_caller(
    verifier: &dyn IdentityVerifier,
    store: &dyn RowStore,
    headers: &HeaderMap,
) -> Caller {
    let Some(token) = bearer_token(headers) else {
        return Caller::anonymous();
    };

    let user_id = match verifier.verify(token).await {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(
                error = %e,
                verifier = verifier.backend(),
                "Bearer token not verified, continuing as guest",
            );
            return Caller::anonymous();
        }
    };

    let tier = match SubscriptionRepo::find_tier(store, &user_id).await {
        Ok(tier) => tier.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(
                user_id = %user_id,
                error = %e,
                "Subscription lookup failed, assuming free tier",
            );
            SubscriptionTier::Free
        }
    };

    Caller {
        user_id: Some(user_id),
        tier,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use corner_db::models::subscription::SUBSCRIPTIONS_TABLE;
    use corner_db::MemoryStore;
    use serde_json::json;

    use super::*;
    use crate::auth::verifier::IdentityError;

    /// Accepts exactly one token.
    struct OneToken;

    #[async_trait]
    impl IdentityVerifier for OneToken {
        fn backend(&self) -> &'static str {
            "test"
        }

        async fn verify(&self, token: &str) -> Result<UserId, IdentityError> {
            if token == "good" {
                Ok("user-1".to_string())
            } else {
                Err(IdentityError::Rejected(401))
            }
        }
    }

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn missing_header_is_anonymous() {
        let caller = resolve_caller(&OneToken, &MemoryStore::new(), &HeaderMap::new()).await;
        assert_eq!(caller, Caller::anonymous());
    }

    #[tokio::test]
    async fn rejected_token_is_anonymous() {
        let caller = resolve_caller(&OneToken, &MemoryStore::new(), &headers("Bearer bad")).await;
        assert!(caller.is_anonymous());
        assert_eq!(caller.tier, SubscriptionTier::Free);
    }

    #[tokio::test]
    async fn verified_user_gets_stored_tier() {
        let store = MemoryStore::new();
        if let serde_json::Value::Object(row) = json!({"user_id": "user-1", "tier": "pro"}) {
            store.seed(SUBSCRIPTIONS_TABLE, row);
        }

        let caller = resolve_caller(&OneToken, &store, &headers("Bearer good")).await;
        assert_eq!(caller.user_id.as_deref(), Some("user-1"));
        assert_eq!(caller.tier, SubscriptionTier::Pro);
    }

    #[tokio::test]
    async fn tier_lookup_failure_keeps_identity_on_free_tier() {
        let store = MemoryStore::new();
        store.fail_selects(SUBSCRIPTIONS_TABLE, "relation does not exist");

        let caller = resolve_caller(&OneToken, &store, &headers("Bearer good")).await;
        assert_eq!(caller.user_id.as_deref(), Some("user-1"));
        assert_eq!(caller.tier, SubscriptionTier::Free);
    }
}
