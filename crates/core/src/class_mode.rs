//! Subscription tiers, class modes, and the demo-plan policy.
//!
//! A `demo` class replaces the caller's plan with [`GenerationPlan::demo`].
//! Whether non-paying callers are forced into demo mode is decided by
//! [`DemoPolicy`], which is switched off unless explicitly enabled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::plan::{Difficulty, GenerationPlan, Pace};

// ---------------------------------------------------------------------------
// Demo plan
// ---------------------------------------------------------------------------

pub const DEMO_DIFFICULTY: Difficulty = Difficulty::Beginner;
pub const DEMO_LENGTH_MIN: u32 = 20;
pub const DEMO_PACE: Pace = Pace::Normal;
pub const DEMO_MUSIC: &str = "demo mix";

impl GenerationPlan {
    /// Fixed plan handed to callers in demo mode.
    pub fn demo() -> Self {
        Self {
            difficulty: DEMO_DIFFICULTY,
            length_min: DEMO_LENGTH_MIN,
            pace: DEMO_PACE,
            music: DEMO_MUSIC.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// SubscriptionTier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
}

impl SubscriptionTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    pub fn is_paying(self) -> bool {
        matches!(self, Self::Pro)
    }

    /// Parse a stored tier, treating anything unrecognized as [`Self::Free`].
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for SubscriptionTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            other => Err(CoreError::Validation(format!(
                "Unknown subscription tier '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ClassMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassMode {
    Demo,
    Full,
}

impl ClassMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Full => "full",
        }
    }

    /// The plan actually enqueued for this mode.
    pub fn apply(self, requested: GenerationPlan) -> GenerationPlan {
        match self {
            Self::Demo => GenerationPlan::demo(),
            Self::Full => requested,
        }
    }
}

impl fmt::Display for ClassMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DemoPolicy
// ---------------------------------------------------------------------------

/// Decides which callers are limited to demo classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoPolicy {
    pub enabled: bool,
}

impl DemoPolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Anonymous and non-paying callers get [`ClassMode::Demo`] while the
    /// policy is enabled. Everyone gets [`ClassMode::Full`] otherwise.
    pub fn class_mode(&self, anonymous: bool, tier: SubscriptionTier) -> ClassMode {
        if self.enabled && (anonymous || !tier.is_paying()) {
            ClassMode::Demo
        } else {
            ClassMode::Full
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn disabled_policy_always_grants_full() {
        let policy = DemoPolicy::default();
        assert_eq!(policy.class_mode(true, SubscriptionTier::Free), ClassMode::Full);
        assert_eq!(policy.class_mode(false, SubscriptionTier::Free), ClassMode::Full);
    }

    #[test]
    fn enabled_policy_limits_anonymous_and_free_callers() {
        let policy = DemoPolicy::new(true);
        assert_eq!(policy.class_mode(true, SubscriptionTier::Free), ClassMode::Demo);
        assert_eq!(policy.class_mode(false, SubscriptionTier::Free), ClassMode::Demo);
        assert_eq!(policy.class_mode(false, SubscriptionTier::Pro), ClassMode::Full);
    }

    #[test]
    fn anonymous_caller_stays_demo_even_with_pro_tier() {
        let policy = DemoPolicy::new(true);
        assert_eq!(policy.class_mode(true, SubscriptionTier::Pro), ClassMode::Demo);
    }

    #[test]
    fn demo_mode_replaces_requested_plan() {
        let requested = GenerationPlan::normalize(&json!({
            "difficulty": "advanced", "length": 60, "pace": "Fast", "music": "Rock"
        }));

        assert_eq!(ClassMode::Demo.apply(requested.clone()), GenerationPlan::demo());
        assert_eq!(ClassMode::Full.apply(requested.clone()), requested);
    }

    #[test]
    fn demo_plan_is_already_normalized() {
        let demo = GenerationPlan::demo();
        assert_eq!(GenerationPlan::normalize(&demo.to_value()), demo);
    }

    #[test]
    fn stored_tier_parsing_degrades_to_free() {
        assert_eq!(SubscriptionTier::from_stored(Some("PRO")), SubscriptionTier::Pro);
        assert_eq!(SubscriptionTier::from_stored(Some("platinum")), SubscriptionTier::Free);
        assert_eq!(SubscriptionTier::from_stored(None), SubscriptionTier::Free);
        assert_matches!("gold".parse::<SubscriptionTier>(), Err(CoreError::Validation(_)));
    }
}
