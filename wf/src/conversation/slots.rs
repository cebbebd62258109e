//! Slot store: the accumulated trip parameters for one conversation

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DefaultsConfig;

/// The five trip parameters, in the order the dialog asks for them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Location,
    Date,
    Budget,
    Travelers,
    Interest,
}

impl Slot {
    /// Asking order for the full (no-shortcut) dialog path
    pub const ORDER: [Slot; 5] = [Slot::Location, Slot::Date, Slot::Budget, Slot::Travelers, Slot::Interest];
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Slot::Location => "location",
            Slot::Date => "date",
            Slot::Budget => "budget",
            Slot::Travelers => "travelers",
            Slot::Interest => "interest",
        };
        write!(f, "{}", name)
    }
}

/// Mutable record of trip parameters collected so far
///
/// All fields stay optional until filled; the state machine guarantees all
/// five are non-empty before generation is invoked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotStore {
    pub location: Option<String>,
    pub date: Option<String>,
    pub budget: Option<String>,
    pub travelers: Option<String>,
    pub interest: Option<String>,
}

impl SlotStore {
    /// Read one slot
    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Location => self.location.as_deref(),
            Slot::Date => self.date.as_deref(),
            Slot::Budget => self.budget.as_deref(),
            Slot::Travelers => self.travelers.as_deref(),
            Slot::Interest => self.interest.as_deref(),
        }
    }

    /// Write one slot
    ///
    /// Values are trimmed; writing an empty string clears nothing and is
    /// ignored (the caller rejects empty turns before getting here).
    pub fn set(&mut self, slot: Slot, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            debug!(slot = %slot, "set: ignoring empty value");
            return;
        }
        debug!(slot = %slot, "set: called");
        let value = Some(value.to_string());
        match slot {
            Slot::Location => self.location = value,
            Slot::Date => self.date = value,
            Slot::Budget => self.budget = value,
            Slot::Travelers => self.travelers = value,
            Slot::Interest => self.interest = value,
        }
    }

    /// First unfilled slot in asking order, if any
    pub fn first_missing(&self) -> Option<Slot> {
        Slot::ORDER.into_iter().find(|s| self.get(*s).is_none())
    }

    /// True once every slot is non-empty
    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }

    /// Fill budget, travelers and interest with configured defaults where unset
    ///
    /// The shortcut paths call this once location and date are both known.
    pub fn fill_defaults(&mut self, defaults: &DefaultsConfig) {
        debug!("fill_defaults: called");
        if self.budget.is_none() {
            self.budget = Some(defaults.budget.clone());
        }
        if self.travelers.is_none() {
            self.travelers = Some(defaults.travelers.clone());
        }
        if self.interest.is_none() {
            self.interest = Some(defaults.interest.clone());
        }
    }
}
