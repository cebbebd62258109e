//! Canonical itinerary document
//!
//! The validated, schema-conformant trip document the engine hands to the
//! UI and persists, independent of whatever shape the generation capability
//! returned. Wire format is camelCase JSON; every field the external
//! capability might omit either defaults or is optional, and the repair
//! step fills in the required ones.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier for one generated itinerary
///
/// Derived from generation time, unique per plan, and used as the upsert
/// key for every subsequent edit of that plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
    /// Mint a fresh id from the current time
    pub fn now() -> Self {
        Self(format!("plan-{}", chrono::Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlanId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PlanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The canonical trip document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Itinerary {
    pub destination: String,
    pub description: String,
    pub thumbnail: String,
    pub duration: String,
    pub travelers: i64,
    pub budget: String,
    pub interest: String,
    pub total_cost: String,
    /// Flight suggestions; shape is capability-defined, passed through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flights: Option<Value>,
    /// Hotel suggestion; shape is capability-defined, passed through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel: Option<Value>,
    pub daily_plan: Vec<DayPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Value>,
}

/// One day of the trip
///
/// Invariant (enforced by repair, not assumed from the capability):
/// `activities` and `activities_description` are always the same length,
/// exactly 3 (morning / afternoon / evening).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayPlan {
    pub day: i64,
    pub title: String,
    pub description: String,
    pub activities: Vec<String>,
    pub activities_description: Vec<String>,
    pub travel_tips: Vec<String>,
    pub meals: Meals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<Value>,
}

/// Meal suggestions for one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dinner: Option<String>,
}
