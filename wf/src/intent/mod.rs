//! Intent classification
//!
//! A deliberately fast, deterministic pattern matcher, not a statistical
//! classifier. `classify` is pure and total; match priority is fixed:
//! mood families first, then explicit durations, then "surprise me", and
//! finally the generic destination fallback.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::debug;

mod moods;

pub use moods::{Mood, MoodProfile, MOOD_PROFILES, random_surprise_destination};

/// What the classifier recognized in one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// A mood family matched; the shortcut supplies interest + destination
    Mood(Mood),
    /// An explicit trip length, normalized to days
    Duration(u32),
    /// "Surprise me": fixed 5-day trip, destination picked at random
    Surprise,
    /// Fallback: treat the text as a candidate destination
    Other,
}

fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("static intent pattern is valid")
}

static MOOD_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| MOOD_PROFILES.iter().map(|p| ci(p.pattern)).collect());

static RE_TRIP_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| ci(r"(\d+)\s*-?\s*(day|week)s?\s*(?:long\s+)?(trip|vacation|holiday|getaway)"));
static RE_WEEKEND: LazyLock<Regex> = LazyLock::new(|| ci(r"\bweekend\b"));
static RE_QUICK: LazyLock<Regex> = LazyLock::new(|| ci(r"\b(quick|short)\b"));
static RE_LONG: LazyLock<Regex> = LazyLock::new(|| ci(r"\b(long|extended)\b"));
static RE_DISAPPEAR: LazyLock<Regex> = LazyLock::new(|| ci(r"\bdisappear\b\D*(\d+)\s*days?"));
static RE_SURPRISE: LazyLock<Regex> = LazyLock::new(|| ci(r"\b(surprise|random|pick me|choose me|decide)\b"));
static RE_TRAVEL_WORDS: LazyLock<Regex> =
    LazyLock::new(|| ci(r"\b(travel|trip|vacation|holiday|getaway|explore|visit|destination|plan)\b"));

/// Classify one utterance
///
/// Pure, total, case-insensitive. Empty/whitespace input is the caller's
/// responsibility to reject before getting here; this function still returns
/// a value for it (the fallback) rather than panicking.
pub fn classify(text: &str) -> Intent {
    debug!(text_len = text.len(), "classify: called");

    // 1. Mood families, first family in enumeration order wins
    for (profile, re) in MOOD_PROFILES.iter().zip(MOOD_RES.iter()) {
        if re.is_match(text) {
            debug!(mood = %profile.mood, "classify: mood family matched");
            return Intent::Mood(profile.mood);
        }
    }

    // 2. Explicit durations
    if let Some(days) = parse_duration(text) {
        debug!(days, "classify: duration matched");
        return Intent::Duration(days);
    }

    // 3. Surprise keywords
    if RE_SURPRISE.is_match(text) {
        debug!("classify: surprise matched");
        return Intent::Surprise;
    }

    // 4. Fallback: treat the text as a candidate destination. Broad on
    // purpose: travel-intent words or anything place-shaped both land here,
    // and so does everything else, because the slot-filling machine is what
    // decides what to do with it.
    let place_shaped = has_travel_intent(text) || looks_like_place(text);
    debug!(place_shaped, "classify: fallback to Other");
    Intent::Other
}

/// Extract an explicit trip length in days, if the text states one
pub fn parse_duration(text: &str) -> Option<u32> {
    if let Some(caps) = RE_TRIP_LENGTH.captures(text) {
        let n: u32 = caps[1].parse().ok()?;
        let days = if caps[2].eq_ignore_ascii_case("week") { n * 7 } else { n };
        debug!(days, "parse_duration: numeric trip length");
        return Some(days);
    }

    if RE_WEEKEND.is_match(text) {
        debug!("parse_duration: weekend");
        return Some(3);
    }

    if let Some(caps) = RE_DISAPPEAR.captures(text) {
        let n: u32 = caps[1].parse().ok()?;
        debug!(days = n, "parse_duration: disappear form");
        return Some(n);
    }

    // Vague lengths only count when the utterance is about a trip at all,
    // otherwise "a short answer" would read as a 3-day booking.
    if RE_TRAVEL_WORDS.is_match(text) {
        if RE_QUICK.is_match(text) {
            debug!("parse_duration: quick/short");
            return Some(3);
        }
        if RE_LONG.is_match(text) {
            debug!("parse_duration: long/extended");
            return Some(10);
        }
    }

    None
}

/// Check for generic travel-intent vocabulary
pub fn has_travel_intent(text: &str) -> bool {
    RE_TRAVEL_WORDS.is_match(text)
}

/// Check whether text is shaped like a place name
///
/// Alphabetic tokens of length >= 2, optionally comma-separated
/// ("Kyoto", "Bali, Indonesia"). Known to be over-broad; kept as-is.
pub fn looks_like_place(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    trimmed.split(',').all(|segment| {
        let segment = segment.trim();
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '-' || c == '.')
            && segment.split_whitespace().any(|w| w.chars().count() >= 2)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_total() {
        for text in ["", "   ", "???", "12345", "plan me something", "Tokyo"] {
            // Must return a value, never panic
            let _ = classify(text);
        }
    }

    #[test]
    fn test_mood_detection_per_family() {
        assert_eq!(classify("I want a relaxed trip"), Intent::Mood(Mood::Relaxed));
        assert_eq!(classify("something adventurous please"), Intent::Mood(Mood::Adventurous));
        assert_eq!(classify("a romantic honeymoon"), Intent::Mood(Mood::Romantic));
        assert_eq!(classify("best street food anywhere"), Intent::Mood(Mood::Foodie));
        assert_eq!(classify("nightlife and clubs"), Intent::Mood(Mood::Party));
    }

    #[test]
    fn test_mood_is_case_insensitive() {
        assert_eq!(classify("RELAX on a BEACH"), Intent::Mood(Mood::Relaxed));
    }

    #[test]
    fn test_first_mood_family_wins_on_overlap() {
        // "hike" (adventurous) and "beach" (relaxed) both match; adventurous
        // comes first in the enumeration order
        assert_eq!(
            classify("I want to hike and then lie on a beach"),
            Intent::Mood(Mood::Adventurous)
        );
    }

    #[test]
    fn test_mood_takes_priority_over_duration() {
        // Both a mood stem and a duration are present in one utterance;
        // mood is checked first per the match-order table
        assert_eq!(classify("relaxing 5 day trip"), Intent::Mood(Mood::Relaxed));
    }

    #[test]
    fn test_duration_numeric_days() {
        assert_eq!(classify("5 day trip to Japan"), Intent::Duration(5));
        assert_eq!(classify("a 10 days vacation"), Intent::Duration(10));
    }

    #[test]
    fn test_duration_weeks_multiply() {
        assert_eq!(classify("2 week holiday"), Intent::Duration(14));
    }

    #[test]
    fn test_duration_weekend() {
        assert_eq!(classify("weekend getaway somewhere"), Intent::Duration(3));
    }

    #[test]
    fn test_duration_quick_and_long_need_travel_context() {
        assert_eq!(classify("a quick trip"), Intent::Duration(3));
        assert_eq!(classify("an extended vacation"), Intent::Duration(10));
        // No travel vocabulary: falls through to Other
        assert_eq!(classify("a short answer"), Intent::Other);
    }

    #[test]
    fn test_duration_vague_forms_cover_all_trip_words() {
        // Every word the numeric pattern treats as trip vocabulary also
        // counts as travel context for the vague lengths
        assert_eq!(classify("a quick getaway"), Intent::Duration(3));
        assert_eq!(classify("a long holiday"), Intent::Duration(10));
        assert_eq!(classify("a short holiday"), Intent::Duration(3));
        assert_eq!(classify("an extended getaway"), Intent::Duration(10));
    }

    #[test]
    fn test_duration_disappear_form() {
        assert_eq!(classify("I want to disappear for 12 days"), Intent::Duration(12));
    }

    #[test]
    fn test_surprise_keywords() {
        assert_eq!(classify("surprise me!"), Intent::Surprise);
        assert_eq!(classify("just pick me something"), Intent::Surprise);
        assert_eq!(classify("you decide"), Intent::Surprise);
    }

    #[test]
    fn test_plain_place_is_other() {
        assert_eq!(classify("Japan"), Intent::Other);
        assert_eq!(classify("Bali, Indonesia"), Intent::Other);
    }

    #[test]
    fn test_travel_words_without_duration_is_other() {
        assert_eq!(classify("I want to travel somewhere nice"), Intent::Other);
    }

    #[test]
    fn test_looks_like_place() {
        assert!(looks_like_place("Kyoto"));
        assert!(looks_like_place("Rio de Janeiro, Brazil"));
        assert!(looks_like_place("Cote d'Azur"));
        assert!(!looks_like_place("42 days"));
        assert!(!looks_like_place(""));
    }
}
