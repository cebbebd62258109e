//! PlanStore - dual persistence substrate for the Wayfinder engine
//!
//! Two storage targets with deliberately different guarantees:
//!
//! - **Ephemeral cache** ([`CacheStore`] / [`MemoryCache`]): in-process JSON
//!   key-value store. The fast path the session reads from. No TTL, no
//!   eviction, gone when the process exits.
//! - **Durable store** ([`RemoteStore`] / [`RestStore`]): remote record store
//!   with idempotent upsert and equality-filter queries, timestamps assigned
//!   at write time. Source of truth for cross-session retrieval.
//!
//! This crate is generic over JSON records and knows nothing about trips or
//! itineraries; the engine's reconciler decides what goes where.

mod cache;
mod error;
mod remote;

pub use cache::{CacheStore, MemoryCache};
pub use error::StoreError;
pub use remote::{MemoryStore, RemoteStore, RestConfig, RestStore};
