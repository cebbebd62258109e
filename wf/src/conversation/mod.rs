//! Conversation state machine and slot filling
//!
//! One `ConversationSession` per conversation drives the dialog: it consumes
//! user text, runs the smalltalk bypass, classifies intent on the opening
//! turn, fills slots, and tells the engine when to generate or edit.

mod session;
mod slots;
mod smalltalk;

pub use session::{ConversationId, ConversationSession, ConversationState, TurnPlan};
pub use slots::{Slot, SlotStore};
pub use smalltalk::canned_reply;
