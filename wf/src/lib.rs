//! Wayfinder - conversational trip planning engine
//!
//! Turns a sequence of free-text user utterances into a structured,
//! machine-generated itinerary, then accepts free-text edit requests
//! against it. The pieces, leaves first:
//!
//! - `intent`: deterministic pattern-matching classifier
//! - `conversation`: slot store and dialog state machine
//! - `generate`: prompt building plus parse/validate/repair of the
//!   capability's untrusted output
//! - `patch`: minimal-patch edits deep-merged into an existing plan
//! - `persist`: dual-write reconciler over the `planstore` cache and
//!   durable store
//! - `engine`: wires it all behind `submit_user_text`

pub mod chat;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod generate;
pub mod intent;
pub mod itinerary;
pub mod llm;
pub mod patch;
pub mod persist;

pub use config::Config;
pub use engine::{Engine, UiEvent};
