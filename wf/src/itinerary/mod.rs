//! Canonical itinerary document and patch-merge algorithm

mod merge;
mod types;

pub use merge::deep_merge;
pub use types::{DayPlan, Itinerary, Meals, PlanId};
