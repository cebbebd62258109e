//! Smalltalk bypass
//!
//! Greetings, identity questions, pleasantries and farewells are answered
//! with a fixed canned reply before classification or any state transition.
//! Greetings match exactly (so "hi" triggers but "hiking in Chile" does
//! not); identity, pleasantry and farewell phrases match as substrings.

use tracing::debug;

const GREETINGS: [&str; 8] = ["hi", "hello", "hey", "hiya", "yo", "good morning", "good afternoon", "good evening"];

const IDENTITY_PHRASES: [&str; 4] = ["who are you", "your name", "what are you", "are you a bot"];

const PLEASANTRY_PHRASES: [&str; 4] = ["thank", "how are you", "nice to meet", "appreciate it"];

const FAREWELL_PHRASES: [&str; 4] = ["bye", "goodbye", "see you", "good night"];

/// Return the canned reply for a smalltalk utterance, if it is one
///
/// Must be checked first on every turn; a hit mutates nothing.
pub fn canned_reply(text: &str) -> Option<&'static str> {
    let normalized = text.trim().trim_end_matches(['!', '.', '?']).to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    // Exact match for greetings
    if GREETINGS.contains(&normalized.as_str()) {
        debug!("canned_reply: greeting");
        return Some("Hey there! Tell me where you'd like to go, or describe the kind of trip you're after.");
    }

    // Substring match for the rest
    if IDENTITY_PHRASES.iter().any(|p| normalized.contains(p)) {
        debug!("canned_reply: identity");
        return Some("I'm Wayfinder, your trip-planning assistant. Describe a destination or a mood and I'll build an itinerary.");
    }

    if PLEASANTRY_PHRASES.iter().any(|p| normalized.contains(p)) {
        debug!("canned_reply: pleasantry");
        return Some("Happy to help! Anything else you'd like to plan?");
    }

    if FAREWELL_PHRASES.iter().any(|p| normalized.contains(p)) {
        debug!("canned_reply: farewell");
        return Some("Safe travels! Come back whenever you're ready for the next trip.");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greetings_match_exactly() {
        assert!(canned_reply("hi").is_some());
        assert!(canned_reply("Hello!").is_some());
        assert!(canned_reply("  hey  ").is_some());

        // "hi" inside a longer utterance must not trigger the bypass
        assert!(canned_reply("hiking in Chile").is_none());
        assert!(canned_reply("hi, plan me a trip to Oslo").is_none());
    }

    #[test]
    fn test_identity_and_pleasantries_match_as_substrings() {
        assert!(canned_reply("so who are you exactly?").is_some());
        assert!(canned_reply("thanks, thank you so much").is_some());
        assert!(canned_reply("ok goodbye now").is_some());
    }

    #[test]
    fn test_travel_requests_pass_through() {
        assert!(canned_reply("I want a relaxed trip").is_none());
        assert!(canned_reply("Bali, Indonesia").is_none());
        assert!(canned_reply("surprise me").is_none());
    }
}
