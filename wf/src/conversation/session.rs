//! Conversation session: one slot store + state machine per conversation
//!
//! A `ConversationSession` is an explicit value object, created on the first
//! user message and torn down on close. There is no ambient singleton; the
//! engine owns sessions in a map keyed by `ConversationId` and hands out
//! `&mut` access, which is what serializes turns within one conversation.

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use super::slots::{Slot, SlotStore};
use super::smalltalk;
use crate::config::DefaultsConfig;
use crate::intent::{self, Intent};
use crate::itinerary::PlanId;

/// Opaque stable identifier for one chat session, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationId(Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dialog position for one conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Initial,
    AwaitingLocation,
    AwaitingDate,
    AwaitingBudget,
    AwaitingTravelers,
    AwaitingInterest,
    Generating,
    Done,
}

/// What the engine should do with the turn the session just consumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPlan {
    /// Smalltalk bypass hit; reply verbatim, nothing was mutated
    Canned { reply: &'static str },
    /// Ask the next slot-filling question
    Ask { question: String, suggestions: Vec<String> },
    /// All five slots are filled; invoke the generation orchestrator
    Generate,
    /// A plan exists; treat the text as an edit request against it
    Edit { request: String },
    /// A generation or edit is already in flight for this conversation
    Busy,
}

/// One conversation's slot store, state machine and in-flight bookkeeping
#[derive(Debug)]
pub struct ConversationSession {
    id: ConversationId,
    state: ConversationState,
    slots: SlotStore,
    defaults: DefaultsConfig,
    /// Set when a shortcut intent was taken; once location and date are both
    /// present the remaining slots are defaulted instead of asked for
    shortcut: bool,
    /// Bumped every time a generation or edit starts; a completed request
    /// whose epoch no longer matches is stale and must be discarded
    epoch: u64,
    current_plan: Option<PlanId>,
}

impl ConversationSession {
    /// Open a fresh session
    pub fn open(defaults: DefaultsConfig) -> Self {
        let id = ConversationId::new();
        debug!(conversation_id = %id, "open: called");
        Self {
            id,
            state: ConversationState::Initial,
            slots: SlotStore::default(),
            defaults,
            shortcut: false,
            epoch: 0,
            current_plan: None,
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn current_plan(&self) -> Option<&PlanId> {
        self.current_plan.as_ref()
    }

    /// Consume one user turn and decide what the engine does next
    ///
    /// The caller rejects empty/whitespace text before calling this.
    pub fn plan_turn(&mut self, text: &str) -> TurnPlan {
        debug!(conversation_id = %self.id, state = ?self.state, "plan_turn: called");

        // Smalltalk bypass first, on every turn, mutating nothing
        if let Some(reply) = smalltalk::canned_reply(text) {
            debug!("plan_turn: smalltalk bypass");
            return TurnPlan::Canned { reply };
        }

        match self.state {
            ConversationState::Generating => {
                debug!("plan_turn: request already in flight");
                TurnPlan::Busy
            }
            ConversationState::Done => {
                debug!("plan_turn: treating turn as edit request");
                self.epoch += 1;
                TurnPlan::Edit {
                    request: text.to_string(),
                }
            }
            ConversationState::Initial => self.consume_initial(text),
            ConversationState::AwaitingLocation => {
                self.slots.set(Slot::Location, text);
                self.advance()
            }
            ConversationState::AwaitingDate => {
                self.slots.set(Slot::Date, text);
                self.advance()
            }
            ConversationState::AwaitingBudget => {
                self.slots.set(Slot::Budget, text);
                self.advance()
            }
            ConversationState::AwaitingTravelers => {
                self.slots.set(Slot::Travelers, text);
                self.advance()
            }
            ConversationState::AwaitingInterest => {
                self.slots.set(Slot::Interest, text);
                self.advance()
            }
        }
    }

    /// First turn of a conversation: classify and take a shortcut if one applies
    fn consume_initial(&mut self, text: &str) -> TurnPlan {
        match intent::classify(text) {
            Intent::Mood(mood) => {
                let profile = mood.profile();
                debug!(mood = %mood, "consume_initial: mood shortcut");
                self.slots.set(Slot::Interest, profile.interest);
                self.slots.set(Slot::Location, profile.random_destination());
                self.shortcut = true;
                self.advance()
            }
            Intent::Duration(days) => {
                debug!(days, "consume_initial: duration shortcut");
                self.slots.set(Slot::Date, &format!("{} days", days));
                self.shortcut = true;
                self.advance()
            }
            Intent::Surprise => {
                debug!("consume_initial: surprise shortcut");
                self.slots
                    .set(Slot::Date, &format!("{} days", self.defaults.surprise_days));
                self.slots.set(Slot::Location, intent::random_surprise_destination());
                self.shortcut = true;
                self.advance()
            }
            Intent::Other => {
                debug!("consume_initial: treating text as destination");
                self.slots.set(Slot::Location, text);
                self.advance()
            }
        }
    }

    /// Move to the next question, or to generation when enough is known
    ///
    /// On a shortcut path only location and date are asked for; the rest is
    /// defaulted. On the full path every unfilled slot gets its question.
    /// The machine never regresses: the next question is always the first
    /// missing slot in asking order.
    fn advance(&mut self) -> TurnPlan {
        if self.shortcut {
            if self.slots.get(Slot::Location).is_none() {
                self.state = ConversationState::AwaitingLocation;
                return Self::ask(Slot::Location);
            }
            if self.slots.get(Slot::Date).is_none() {
                self.state = ConversationState::AwaitingDate;
                return Self::ask(Slot::Date);
            }
            self.slots.fill_defaults(&self.defaults);
        }

        match self.slots.first_missing() {
            Some(slot) => {
                self.state = match slot {
                    Slot::Location => ConversationState::AwaitingLocation,
                    Slot::Date => ConversationState::AwaitingDate,
                    Slot::Budget => ConversationState::AwaitingBudget,
                    Slot::Travelers => ConversationState::AwaitingTravelers,
                    Slot::Interest => ConversationState::AwaitingInterest,
                };
                debug!(next = %slot, "advance: asking next slot");
                Self::ask(slot)
            }
            None => {
                debug!("advance: all slots filled, generating");
                self.state = ConversationState::Generating;
                self.epoch += 1;
                TurnPlan::Generate
            }
        }
    }

    fn ask(slot: Slot) -> TurnPlan {
        let (question, suggestions) = match slot {
            Slot::Location => (
                "Where would you like to go?",
                vec!["Tokyo, Japan", "Lisbon, Portugal", "Bali, Indonesia"],
            ),
            Slot::Date => (
                "When are you travelling, and for how long?",
                vec!["Next weekend", "5 days in June", "2 weeks in September"],
            ),
            Slot::Budget => (
                "What's your budget?",
                vec!["Budget", "Mid-range", "Luxury"],
            ),
            Slot::Travelers => ("How many people are travelling?", vec!["1", "2", "4"]),
            Slot::Interest => (
                "What are you most interested in?",
                vec!["Adventure", "Relaxation", "Culture", "Food"],
            ),
        };
        TurnPlan::Ask {
            question: question.to_string(),
            suggestions: suggestions.into_iter().map(str::to_string).collect(),
        }
    }

    /// Record a finished generation, unless the session has moved on
    ///
    /// Returns false when `epoch` is stale; the caller must discard the result.
    pub fn complete_generation(&mut self, epoch: u64, plan_id: PlanId) -> bool {
        if epoch != self.epoch {
            debug!(stale = epoch, current = self.epoch, "complete_generation: stale result discarded");
            return false;
        }
        debug!(plan_id = %plan_id, "complete_generation: called");
        self.current_plan = Some(plan_id);
        self.state = ConversationState::Done;
        true
    }

    /// Record a failed generation
    ///
    /// The conversation stays re-enterable: slots are kept and the state
    /// returns to the last question so the next turn can retry.
    pub fn fail_generation(&mut self, epoch: u64) {
        if epoch != self.epoch {
            debug!("fail_generation: stale failure ignored");
            return;
        }
        debug!(conversation_id = %self.id, "fail_generation: called");
        self.state = ConversationState::AwaitingInterest;
    }

    /// Record a finished edit; the session stays in Done on the same plan
    ///
    /// Returns false when `epoch` is stale.
    pub fn complete_edit(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            debug!("complete_edit: stale result discarded");
            return false;
        }
        debug!(conversation_id = %self.id, "complete_edit: called");
        self.state = ConversationState::Done;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ConversationSession {
        ConversationSession::open(DefaultsConfig::default())
    }

    #[test]
    fn test_full_slot_filling_path() {
        let mut s = session();

        // Plain place name: becomes the location, next question is the date
        let plan = s.plan_turn("Kyoto");
        assert!(matches!(plan, TurnPlan::Ask { .. }));
        assert_eq!(s.state(), ConversationState::AwaitingDate);

        s.plan_turn("first week of April");
        assert_eq!(s.state(), ConversationState::AwaitingBudget);

        s.plan_turn("mid-range");
        assert_eq!(s.state(), ConversationState::AwaitingTravelers);

        s.plan_turn("2");
        assert_eq!(s.state(), ConversationState::AwaitingInterest);

        let plan = s.plan_turn("temples and food");
        assert_eq!(plan, TurnPlan::Generate);
        assert_eq!(s.state(), ConversationState::Generating);
        assert!(s.slots().is_complete());
    }

    #[test]
    fn test_mood_shortcut_fills_interest_and_location() {
        let mut s = session();

        let plan = s.plan_turn("I want a relaxed trip");

        // Location and interest came from the mood profile; only the date is
        // still needed before generation
        assert!(matches!(plan, TurnPlan::Ask { .. }));
        assert_eq!(s.state(), ConversationState::AwaitingDate);
        assert_eq!(s.slots().interest.as_deref(), Some("Relaxation & spa"));
        let location = s.slots().location.clone().unwrap();
        assert!(
            ["Maldives", "Bali, Indonesia", "Santorini, Greece", "Seychelles"].contains(&location.as_str())
        );

        let plan = s.plan_turn("5 days in June");
        assert_eq!(plan, TurnPlan::Generate);
        assert_eq!(s.slots().budget.as_deref(), Some("Mid-range"));
        assert_eq!(s.slots().travelers.as_deref(), Some("1"));
        assert!(s.slots().is_complete());
    }

    #[test]
    fn test_duration_shortcut_asks_only_location() {
        let mut s = session();

        let plan = s.plan_turn("5 day trip somewhere warm");
        assert!(matches!(plan, TurnPlan::Ask { .. }));
        assert_eq!(s.state(), ConversationState::AwaitingLocation);
        assert_eq!(s.slots().date.as_deref(), Some("5 days"));

        let plan = s.plan_turn("Japan");
        assert_eq!(plan, TurnPlan::Generate);
        assert_eq!(s.slots().interest.as_deref(), Some("Mixed"));
        assert!(s.slots().is_complete());
    }

    #[test]
    fn test_surprise_shortcut_generates_immediately() {
        let mut s = session();

        let plan = s.plan_turn("surprise me!");

        assert_eq!(plan, TurnPlan::Generate);
        assert_eq!(s.slots().date.as_deref(), Some("5 days"));
        assert!(s.slots().location.is_some());
        assert!(s.slots().is_complete());
    }

    #[test]
    fn test_smalltalk_mutates_nothing() {
        let mut s = session();

        let plan = s.plan_turn("hello");

        assert!(matches!(plan, TurnPlan::Canned { .. }));
        assert_eq!(s.state(), ConversationState::Initial);
        assert!(s.slots().location.is_none());
    }

    #[test]
    fn test_turn_during_generation_is_busy() {
        let mut s = session();
        s.plan_turn("surprise me");
        assert_eq!(s.state(), ConversationState::Generating);

        assert_eq!(s.plan_turn("actually make it Rome"), TurnPlan::Busy);
    }

    #[test]
    fn test_failed_generation_keeps_slots_and_allows_retry() {
        let mut s = session();
        s.plan_turn("surprise me");
        let epoch = s.epoch();

        s.fail_generation(epoch);

        assert_eq!(s.state(), ConversationState::AwaitingInterest);
        assert!(s.slots().location.is_some());

        // The next turn re-fills interest and generates again
        let plan = s.plan_turn("beaches please");
        assert_eq!(plan, TurnPlan::Generate);
        assert_eq!(s.slots().interest.as_deref(), Some("beaches please"));
    }

    #[test]
    fn test_stale_generation_result_is_discarded() {
        let mut s = session();
        s.plan_turn("surprise me");
        let stale_epoch = s.epoch();

        // The conversation moves on before the first result lands
        s.fail_generation(stale_epoch);
        s.plan_turn("hiking instead");
        assert_eq!(s.state(), ConversationState::Generating);

        assert!(!s.complete_generation(stale_epoch, PlanId::from("plan-1".to_string())));
        assert_eq!(s.state(), ConversationState::Generating);
        assert!(s.current_plan().is_none());
    }

    #[test]
    fn test_done_state_turns_become_edits() {
        let mut s = session();
        s.plan_turn("surprise me");
        let epoch = s.epoch();
        assert!(s.complete_generation(epoch, PlanId::from("plan-42".to_string())));
        assert_eq!(s.state(), ConversationState::Done);

        let plan = s.plan_turn("make day 2 more food focused");
        assert_eq!(
            plan,
            TurnPlan::Edit {
                request: "make day 2 more food focused".to_string()
            }
        );
    }
}
