//! Repository for the `subscriptions` table.

use corner_core::class_mode::SubscriptionTier;

use crate::error::StoreError;
use crate::models::subscription::{tier_from_row, SUBSCRIPTIONS_TABLE};
use crate::store::RowStore;

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Tier of the user's subscription, or `None` when they have none.
    pub async fn find_tier(
        store: &dyn RowStore,
        user_id: &str,
    ) -> Result<Option<SubscriptionTier>, StoreError> {
        let rows = store
            .select_eq(SUBSCRIPTIONS_TABLE, "user_id", user_id)
            .await?;
        Ok(rows.first().map(tier_from_row))
    }
}
