//! Mood keyword families and their shortcut data
//!
//! Each mood carries the regex stems that detect it, the interest label it
//! fills into the slot store, and the fixed candidate destinations the
//! shortcut picks from at random. The tables live here as data (not inline
//! literals) so tests can enumerate the full candidate space.

use rand::seq::IndexedRandom;

/// The five disjoint mood families, in match priority order
///
/// When an utterance could match more than one family, the first family in
/// this enumeration wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Adventurous,
    Relaxed,
    Romantic,
    Foodie,
    Party,
}

impl Mood {
    /// All moods in fixed enumeration order
    pub const ALL: [Mood; 5] = [
        Mood::Adventurous,
        Mood::Relaxed,
        Mood::Romantic,
        Mood::Foodie,
        Mood::Party,
    ];

    /// The shortcut data for this mood
    pub fn profile(&self) -> &'static MoodProfile {
        &MOOD_PROFILES[*self as usize]
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mood::Adventurous => "adventurous",
            Mood::Relaxed => "relaxed",
            Mood::Romantic => "romantic",
            Mood::Foodie => "foodie",
            Mood::Party => "party",
        };
        write!(f, "{}", name)
    }
}

/// Keyword family plus shortcut data for one mood
#[derive(Debug)]
pub struct MoodProfile {
    pub mood: Mood,
    /// OR-list of keyword stems, compiled case-insensitively by the classifier
    pub pattern: &'static str,
    /// Interest label written into the slot store by the shortcut
    pub interest: &'static str,
    /// Fixed candidate destinations; the shortcut picks one uniformly
    pub destinations: [&'static str; 4],
}

impl MoodProfile {
    /// Pick a destination uniformly at random from this mood's candidates
    pub fn random_destination(&self) -> &'static str {
        self.destinations
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(self.destinations[0])
    }
}

/// Mood table, indexed by `Mood as usize`
pub static MOOD_PROFILES: [MoodProfile; 5] = [
    MoodProfile {
        mood: Mood::Adventurous,
        pattern: r"\b(adventur\w*|hik\w*|trek\w*|climb\w*|adrenaline|extreme|outdoors?)\b",
        interest: "Adventure & outdoors",
        destinations: [
            "Queenstown, New Zealand",
            "Interlaken, Switzerland",
            "Costa Rica",
            "Patagonia, Argentina",
        ],
    },
    MoodProfile {
        mood: Mood::Relaxed,
        pattern: r"\b(relax\w*|chill\w*|peace\w*|calm\w*|unwind\w*|spa|beach\w*|quiet\w*)\b",
        interest: "Relaxation & spa",
        destinations: ["Maldives", "Bali, Indonesia", "Santorini, Greece", "Seychelles"],
    },
    MoodProfile {
        mood: Mood::Romantic,
        pattern: r"\b(romanti\w*|romance|honeymoon|anniversary|couples?)\b",
        interest: "Romance & fine dining",
        destinations: [
            "Paris, France",
            "Venice, Italy",
            "Kyoto, Japan",
            "Prague, Czech Republic",
        ],
    },
    MoodProfile {
        mood: Mood::Foodie,
        pattern: r"\b(foodie?|culinary|cuisine|gastronom\w*|restaurants?|street food)\b",
        interest: "Food & local cuisine",
        destinations: ["Tokyo, Japan", "Bangkok, Thailand", "Lyon, France", "Bologna, Italy"],
    },
    MoodProfile {
        mood: Mood::Party,
        pattern: r"\b(part(y|ies)|nightlife|clubs?|clubbing|festivals?|rave\w*)\b",
        interest: "Nightlife & entertainment",
        destinations: [
            "Ibiza, Spain",
            "Las Vegas, USA",
            "Berlin, Germany",
            "Rio de Janeiro, Brazil",
        ],
    },
];

/// Pick a destination across every mood's candidates (the "surprise me" path)
pub fn random_surprise_destination() -> &'static str {
    let all: Vec<&'static str> = MOOD_PROFILES.iter().flat_map(|p| p.destinations).collect();
    all.choose(&mut rand::rng()).copied().unwrap_or("Lisbon, Portugal")
}
