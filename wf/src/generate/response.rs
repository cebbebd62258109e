//! Response parsing, validation and repair
//!
//! The capability's raw text is never trusted: it may be fenced in Markdown,
//! partial, or the wrong shape entirely. The full-generation pipeline is
//! strict (parse failure is a hard error); the patch path gets a slightly
//! looser extraction because a patch response embedded in prose is common.

use serde_json::Value;
use tracing::debug;

use super::error::GenerationError;
use crate::conversation::SlotStore;
use crate::itinerary::{DayPlan, Itinerary};

/// Strip Markdown code-fence wrappers from raw response text
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", anything) up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a full-generation response into the canonical itinerary
///
/// Pipeline, all steps mandatory and in order: fence strip, JSON parse
/// (InvalidFormat), content/detailedPlan key check (InvalidSchema),
/// canonical mapping, repair. Never attempts silent recovery of broken JSON.
pub fn parse_generation_response(
    raw: &str,
    requested_days: u32,
    slots: &SlotStore,
) -> Result<Itinerary, GenerationError> {
    debug!(raw_len = raw.len(), requested_days, "parse_generation_response: called");

    let body = strip_code_fences(raw);
    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "parse_generation_response: not valid JSON");
        GenerationError::InvalidFormat(e.to_string())
    })?;

    let Some(obj) = parsed.as_object() else {
        return Err(GenerationError::InvalidSchema("top level is not an object".to_string()));
    };
    let content = obj
        .get("content")
        .ok_or_else(|| GenerationError::InvalidSchema("missing 'content' key".to_string()))?;
    let detailed_plan = obj
        .get("detailedPlan")
        .ok_or_else(|| GenerationError::InvalidSchema("missing 'detailedPlan' key".to_string()))?;

    if !content.is_object() {
        return Err(GenerationError::InvalidSchema("'content' is not an object".to_string()));
    }
    if !detailed_plan.is_array() {
        return Err(GenerationError::InvalidSchema("'detailedPlan' is not an array".to_string()));
    }

    // Fold the two halves into the canonical document shape
    let mut doc = content.clone();
    if let Some(doc_obj) = doc.as_object_mut() {
        doc_obj.insert("dailyPlan".to_string(), detailed_plan.clone());
    }

    let mut itinerary: Itinerary = serde_json::from_value(doc).map_err(|e| {
        debug!(error = %e, "parse_generation_response: canonical mapping failed");
        GenerationError::InvalidSchema(e.to_string())
    })?;

    repair(&mut itinerary, requested_days, slots);
    debug!(days = itinerary.daily_plan.len(), "parse_generation_response: success");
    Ok(itinerary)
}

/// Enforce the canonical invariants the capability cannot be trusted with
///
/// dailyPlan length equals the requested day count; activities and
/// activitiesDescription are each exactly 3 entries; the summary fields the
/// capability omitted are backfilled from the slots.
pub fn repair(itinerary: &mut Itinerary, requested_days: u32, slots: &SlotStore) {
    debug!(
        have_days = itinerary.daily_plan.len(),
        requested_days,
        "repair: called"
    );

    if itinerary.destination.is_empty() {
        itinerary.destination = slots.location.clone().unwrap_or_default();
    }
    if itinerary.duration.is_empty() {
        itinerary.duration = format!("{} days", requested_days);
    }
    if itinerary.budget.is_empty() {
        itinerary.budget = slots.budget.clone().unwrap_or_default();
    }
    if itinerary.interest.is_empty() {
        itinerary.interest = slots.interest.clone().unwrap_or_default();
    }
    if itinerary.travelers <= 0 {
        itinerary.travelers = slots
            .travelers
            .as_deref()
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(1);
    }

    let requested = requested_days as usize;
    itinerary.daily_plan.truncate(requested);
    while itinerary.daily_plan.len() < requested {
        let day = itinerary.daily_plan.len() as i64 + 1;
        debug!(day, "repair: padding missing day");
        itinerary.daily_plan.push(DayPlan {
            day,
            title: format!("Day {}", day),
            description: "Free day to explore at your own pace.".to_string(),
            ..Default::default()
        });
    }

    for (i, day) in itinerary.daily_plan.iter_mut().enumerate() {
        if day.day <= 0 {
            day.day = i as i64 + 1;
        }
        fix_triple(&mut day.activities, "Free time");
        fix_triple(&mut day.activities_description, "Explore the area at your own pace.");
    }
}

/// Force a vec to exactly 3 entries (morning / afternoon / evening)
fn fix_triple(items: &mut Vec<String>, filler: &str) {
    items.truncate(3);
    while items.len() < 3 {
        items.push(filler.to_string());
    }
}

/// Looser parse used by the patch path
///
/// Strips fences, and when the whole body still fails to parse, retries on
/// the outermost `{...}` span so a patch wrapped in a line of prose is not
/// lost. Anything beyond that is a rejected edit.
pub fn extract_json_object(raw: &str) -> Option<Value> {
    let body = strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if value.is_object() {
            return Some(value);
        }
    }

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&body[start..=end]).ok()?;
    value.is_object().then_some(value)
}
