//! Prompt construction for generation and patching

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::conversation::SlotStore;
use crate::itinerary::Itinerary;

static RE_FIRST_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static pattern is valid"));

/// Trip length in days, parsed from the free-text date slot
///
/// Takes the first integer found ("5 days in June" -> 5, "June 3rd to the
/// 10th" -> 3). Defaults to 5 when the text has no number at all.
pub fn parse_day_count(date: &str) -> u32 {
    let days = RE_FIRST_INT
        .find(date)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(5);
    debug!(days, "parse_day_count: called");
    days
}

/// Best-effort currency hint for the destination
///
/// A small keyword table, not a geocoder. Unknown destinations get USD so
/// the generated costs are at least denominated consistently.
pub fn currency_hint(location: &str) -> &'static str {
    let lower = location.to_lowercase();
    const TABLE: [(&str, &str); 12] = [
        ("japan", "JPY"),
        ("tokyo", "JPY"),
        ("kyoto", "JPY"),
        ("france", "EUR"),
        ("italy", "EUR"),
        ("greece", "EUR"),
        ("germany", "EUR"),
        ("spain", "EUR"),
        ("portugal", "EUR"),
        ("thailand", "THB"),
        ("indonesia", "IDR"),
        ("switzerland", "CHF"),
    ];
    for (keyword, currency) in TABLE {
        if lower.contains(keyword) {
            return currency;
        }
    }
    "USD"
}

/// Build the full-itinerary generation prompt from a complete slot store
pub fn build_generation_prompt(slots: &SlotStore, days: u32) -> String {
    debug!(days, "build_generation_prompt: called");
    let location = slots.location.as_deref().unwrap_or_default();
    let date = slots.date.as_deref().unwrap_or_default();
    let budget = slots.budget.as_deref().unwrap_or_default();
    let travelers = slots.travelers.as_deref().unwrap_or_default();
    let interest = slots.interest.as_deref().unwrap_or_default();
    let currency = currency_hint(location);

    format!(
        "You are a travel planner. Create a {days}-day itinerary for {location}.\n\
         Travel dates: {date}. Budget: {budget}. Travelers: {travelers}. Interests: {interest}.\n\
         Quote costs in {currency}.\n\n\
         Respond with ONLY a JSON object, no prose, in this exact shape:\n\
         {{\n\
           \"content\": {{\n\
             \"destination\": string, \"description\": string, \"thumbnail\": string,\n\
             \"duration\": string, \"travelers\": number, \"budget\": string,\n\
             \"interest\": string, \"totalCost\": string,\n\
             \"flights\": object, \"hotel\": object, \"weather\": object\n\
           }},\n\
           \"detailedPlan\": [\n\
             {{\n\
               \"day\": number, \"title\": string, \"description\": string,\n\
               \"activities\": [string, string, string],\n\
               \"activitiesDescription\": [string, string, string],\n\
               \"travelTips\": [string],\n\
               \"meals\": {{\"breakfast\": string, \"lunch\": string, \"dinner\": string}},\n\
               \"transport\": string\n\
             }}\n\
           ]\n\
         }}\n\n\
         The detailedPlan array must contain exactly {days} entries, one per day.\n\
         activities and activitiesDescription must each contain exactly 3 entries\n\
         (morning, afternoon, evening)."
    )
}

/// Build the minimal-patch prompt for an edit against an existing plan
///
/// Asks for only the changed fields; the deep merge folds them into the
/// existing document.
pub fn build_edit_prompt(existing: &Itinerary, edit_request: &str) -> String {
    debug!("build_edit_prompt: called");
    let current = serde_json::to_string(existing).unwrap_or_default();
    format!(
        "You are editing an existing travel itinerary. Current plan JSON:\n\
         {current}\n\n\
         Requested change: {edit_request}\n\n\
         Respond with ONLY a JSON object containing the minimal set of changed\n\
         fields, matching the structure of the current plan. Include a field\n\
         only if the change touches it. When a dailyPlan entry changes, return\n\
         the complete replacement array for dailyPlan. No prose."
    )
}

/// Build the whole-plan rebuild prompt for a broad edit
///
/// Unlike the minimal patch, this asks for a complete replacement document;
/// the caller backfills anything the response omits from the current plan.
pub fn build_rebuild_prompt(existing: &Itinerary, edit_request: &str) -> String {
    debug!("build_rebuild_prompt: called");
    let current = serde_json::to_string(existing).unwrap_or_default();
    format!(
        "You are revising a travel itinerary. Current plan JSON:\n\
         {current}\n\n\
         Requested change: {edit_request}\n\n\
         Respond with ONLY the complete revised plan as a single JSON object\n\
         with the same structure as the current plan. No prose."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day_count_takes_first_integer() {
        assert_eq!(parse_day_count("5 days in June"), 5);
        assert_eq!(parse_day_count("June 3rd to the 10th"), 3);
        assert_eq!(parse_day_count("next weekend"), 5);
        assert_eq!(parse_day_count("14 days"), 14);
    }

    #[test]
    fn test_currency_hint() {
        assert_eq!(currency_hint("Kyoto, Japan"), "JPY");
        assert_eq!(currency_hint("Paris, FRANCE"), "EUR");
        assert_eq!(currency_hint("Atlantis"), "USD");
    }

    #[test]
    fn test_generation_prompt_embeds_all_slots() {
        let slots = SlotStore {
            location: Some("Kyoto, Japan".to_string()),
            date: Some("7 days in April".to_string()),
            budget: Some("Mid-range".to_string()),
            travelers: Some("2".to_string()),
            interest: Some("Temples & food".to_string()),
        };

        let prompt = build_generation_prompt(&slots, 7);

        assert!(prompt.contains("Kyoto, Japan"));
        assert!(prompt.contains("7 days in April"));
        assert!(prompt.contains("Mid-range"));
        assert!(prompt.contains("Temples & food"));
        assert!(prompt.contains("JPY"));
        assert!(prompt.contains("exactly 7 entries"));
        assert!(prompt.contains("\"content\""));
        assert!(prompt.contains("\"detailedPlan\""));
    }
}
