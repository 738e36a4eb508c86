//! Subscription tiers keyed by user id.

use corner_core::class_mode::SubscriptionTier;
use serde_json::Value;

use crate::store::Row;

pub const SUBSCRIPTIONS_TABLE: &str = "subscriptions";

/// Read the tier column of a subscription row. Unknown values are `free`.
pub fn tier_from_row(row: &Row) -> SubscriptionTier {
    SubscriptionTier::from_stored(row.get("tier").and_then(Value::as_str))
}
