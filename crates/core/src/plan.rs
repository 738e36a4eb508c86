//! Generation plan normalization.
//!
//! [`GenerationPlan::normalize`] turns an arbitrary request payload into a
//! well-formed plan. It never fails: unknown values, wrong JSON types, and
//! missing fields all degrade to the defaults below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Class lengths (minutes) the worker knows how to render.
pub const ALLOWED_LENGTHS_MIN: [u32; 4] = [20, 30, 45, 60];
/// Length used when the requested one is missing or not allowed.
pub const DEFAULT_LENGTH_MIN: u32 = 30;

/// Canonical music value meaning "coach voice only".
pub const NO_MUSIC: &str = "none";
/// Case-insensitive spellings that collapse to [`NO_MUSIC`].
pub const NO_MUSIC_SYNONYMS: &[&str] = &["none", "no", "off", "coach only", "coach-only"];

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(CoreError::Validation(format!(
                "Invalid difficulty '{other}'. Must be one of: beginner, intermediate, advanced"
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pace
// ---------------------------------------------------------------------------

/// Coaching pace. Serialized capitalized (`"Slow"`, `"Normal"`, `"Fast"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pace {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Pace {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
        }
    }
}

impl FromStr for Pace {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Self::Slow),
            "normal" => Ok(Self::Normal),
            "fast" => Ok(Self::Fast),
            other => Err(CoreError::Validation(format!(
                "Invalid pace '{other}'. Must be one of: Slow, Normal, Fast"
            ))),
        }
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GenerationPlan
// ---------------------------------------------------------------------------

/// Normalized parameters for one generated class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPlan {
    pub difficulty: Difficulty,
    pub length_min: u32,
    pub pace: Pace,
    pub music: String,
}

impl Default for GenerationPlan {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            length_min: DEFAULT_LENGTH_MIN,
            pace: Pace::default(),
            music: NO_MUSIC.to_string(),
        }
    }
}

impl GenerationPlan {
    /// Build a plan from an untyped payload.
    ///
    /// Reads `difficulty`, `length_min` (falling back to `length`), `pace`,
    /// and `music`. Non-object payloads produce the default plan.
    pub fn normalize(payload: &Value) -> Self {
        let difficulty = payload
            .get("difficulty")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let length_min = normalize_length(
            payload
                .get("length_min")
                .filter(|v| !v.is_null())
                .or_else(|| payload.get("length")),
        );

        let pace = payload
            .get("pace")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let music = normalize_music(payload.get("music"));

        Self {
            difficulty,
            length_min,
            pace,
            music,
        }
    }

    /// JSON form stored in the job's `plan` column.
    pub fn to_value(&self) -> Value {
        json!({
            "difficulty": self.difficulty.as_str(),
            "length_min": self.length_min,
            "pace": self.pace.as_str(),
            "music": self.music,
        })
    }
}

/// Map a raw length value onto [`ALLOWED_LENGTHS_MIN`].
///
/// Integers, integral floats, and integer strings are accepted; anything else
/// (including out-of-set numbers) yields [`DEFAULT_LENGTH_MIN`].
pub fn normalize_length(value: Option<&Value>) -> u32 {
    value
        .and_then(parse_whole_number)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| ALLOWED_LENGTHS_MIN.contains(n))
        .unwrap_or(DEFAULT_LENGTH_MIN)
}

fn parse_whole_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Trim the music choice and collapse "no music" spellings to [`NO_MUSIC`].
pub fn normalize_music(value: Option<&Value>) -> String {
    let Some(raw) = value.and_then(Value::as_str).map(str::trim) else {
        return NO_MUSIC.to_string();
    };

    let lowered = raw.to_lowercase();
    if raw.is_empty() || NO_MUSIC_SYNONYMS.contains(&lowered.as_str()) {
        NO_MUSIC.to_string()
    } else {
        raw.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(payload: Value) -> GenerationPlan {
        GenerationPlan::normalize(&payload)
    }

    // -- Defaults --

    #[test]
    fn empty_payload_yields_defaults() {
        let p = plan(json!({}));
        assert_eq!(p, GenerationPlan::default());
        assert_eq!(p.difficulty, Difficulty::Beginner);
        assert_eq!(p.length_min, 30);
        assert_eq!(p.pace, Pace::Normal);
        assert_eq!(p.music, "none");
    }

    #[test]
    fn non_object_payloads_yield_defaults() {
        for payload in [json!(null), json!([1, 2, 3]), json!("advanced"), json!(45)] {
            assert_eq!(plan(payload), GenerationPlan::default());
        }
    }

    // -- Difficulty --

    #[test]
    fn difficulty_is_case_insensitive() {
        assert_eq!(plan(json!({"difficulty": "ADVANCED"})).difficulty, Difficulty::Advanced);
        assert_eq!(
            plan(json!({"difficulty": " Intermediate "})).difficulty,
            Difficulty::Intermediate
        );
    }

    #[test]
    fn invalid_difficulty_falls_back_to_beginner() {
        assert_eq!(plan(json!({"difficulty": "expert"})).difficulty, Difficulty::Beginner);
        assert_eq!(plan(json!({"difficulty": 3})).difficulty, Difficulty::Beginner);
    }

    #[test]
    fn difficulty_from_str_reports_validation_error() {
        let err = "expert".parse::<Difficulty>().unwrap_err();
        assert!(err.to_string().contains("Invalid difficulty 'expert'"));
    }

    // -- Length --

    #[test]
    fn allowed_length_is_kept() {
        assert_eq!(plan(json!({"length": 45})).length_min, 45);
        assert_eq!(plan(json!({"length": 20})).length_min, 20);
        assert_eq!(plan(json!({"length": 60})).length_min, 60);
    }

    #[test]
    fn out_of_set_length_falls_back_to_thirty() {
        assert_eq!(plan(json!({"length": 37})).length_min, 30);
        assert_eq!(plan(json!({"length": -20})).length_min, 30);
        assert_eq!(plan(json!({"length": 0})).length_min, 30);
    }

    #[test]
    fn length_accepts_integer_strings_and_integral_floats() {
        assert_eq!(plan(json!({"length": "45"})).length_min, 45);
        assert_eq!(plan(json!({"length": " 60 "})).length_min, 60);
        assert_eq!(plan(json!({"length": 20.0})).length_min, 20);
    }

    #[test]
    fn unparseable_length_falls_back_to_thirty() {
        assert_eq!(plan(json!({"length": "forty"})).length_min, 30);
        assert_eq!(plan(json!({"length": 45.5})).length_min, 30);
        assert_eq!(plan(json!({"length": "45.0"})).length_min, 30);
        assert_eq!(plan(json!({"length": true})).length_min, 30);
        assert_eq!(plan(json!({"length": {"min": 45}})).length_min, 30);
    }

    #[test]
    fn length_min_takes_precedence_over_length() {
        assert_eq!(plan(json!({"length_min": 20, "length": 60})).length_min, 20);
        assert_eq!(plan(json!({"length_min": null, "length": 60})).length_min, 60);
    }

    // -- Pace --

    #[test]
    fn pace_is_canonicalized() {
        assert_eq!(plan(json!({"pace": "fast"})).pace, Pace::Fast);
        assert_eq!(plan(json!({"pace": "SLOW"})).pace, Pace::Slow);
        assert_eq!(plan(json!({"pace": "sprint"})).pace, Pace::Normal);
    }

    // -- Music --

    #[test]
    fn music_synonyms_collapse_to_none() {
        for synonym in ["None", "no", "OFF", "Coach Only", "coach-only"] {
            assert_eq!(plan(json!({"music": synonym})).music, "none", "synonym {synonym}");
        }
    }

    #[test]
    fn music_is_trimmed_and_otherwise_kept() {
        assert_eq!(plan(json!({"music": "  Lo-Fi Beats "})).music, "Lo-Fi Beats");
    }

    #[test]
    fn missing_or_non_string_music_is_none() {
        assert_eq!(plan(json!({"music": ""})).music, "none");
        assert_eq!(plan(json!({"music": null})).music, "none");
        assert_eq!(plan(json!({"music": 7})).music, "none");
    }

    // -- Properties --

    #[test]
    fn normalizing_own_output_is_a_fixed_point() {
        let payloads = [
            json!({}),
            json!({"difficulty": "Advanced", "length": "45", "pace": "fast", "music": "OFF"}),
            json!({"difficulty": "x", "length": 37, "pace": 1, "music": " Jazz "}),
            json!({"length_min": 60, "music": "Coach Only"}),
        ];

        for payload in payloads {
            let once = plan(payload);
            let twice = GenerationPlan::normalize(&once.to_value());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn to_value_matches_serde_representation() {
        let p = plan(json!({"difficulty": "advanced", "length": 45, "pace": "Fast", "music": "Jazz"}));
        let via_serde = serde_json::to_value(&p).unwrap();
        assert_eq!(p.to_value(), via_serde);
        assert_eq!(via_serde["pace"], "Fast");
        assert_eq!(via_serde["difficulty"], "advanced");
    }
}
