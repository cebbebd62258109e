//! Persistence reconciler
//!
//! Dual-writes transcripts and itineraries to the ephemeral cache and the
//! durable store. The policies are asymmetric on purpose: the local cache
//! write gates returning control to the UI, while durable writes are
//! fire-and-forget tasks whose failures are logged at warn and swallowed.
//! A lost durable write only risks cross-session durability, never the
//! current session's correctness.

use std::sync::Arc;

use planstore::{CacheStore, RemoteStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::conversation::{ConversationId, SlotStore};
use crate::itinerary::{Itinerary, PlanId};

const TRANSCRIPTS_TABLE: &str = "transcripts";
const ITINERARIES_TABLE: &str = "itineraries";

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One line of a conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub text: String,
    /// Millis since epoch
    pub timestamp: i64,
}

impl TranscriptMessage {
    pub fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

fn transcript_key(conversation_id: ConversationId) -> String {
    format!("transcript:{}", conversation_id)
}

fn itinerary_key(plan_id: &PlanId) -> String {
    format!("itinerary:{}", plan_id)
}

/// The dual-write reconciler
pub struct Reconciler {
    cache: Arc<dyn CacheStore>,
    /// None in cache-only mode (no durable store configured)
    remote: Option<Arc<dyn RemoteStore>>,
}

impl Reconciler {
    pub fn new(cache: Arc<dyn CacheStore>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { cache, remote }
    }

    /// Persist one logical turn: transcript delta plus any produced itinerary
    ///
    /// The local cache writes complete before this returns; durable writes
    /// are spawned and never awaited by the caller. Callers call this once
    /// per logical turn; the reconciler does not deduplicate by content.
    pub fn persist(
        &self,
        conversation_id: ConversationId,
        plan_id: Option<&PlanId>,
        delta: &[TranscriptMessage],
        itinerary: Option<&Itinerary>,
        slots: &SlotStore,
    ) {
        debug!(
            conversation_id = %conversation_id,
            delta_len = delta.len(),
            has_itinerary = itinerary.is_some(),
            "persist: called"
        );

        // 1. Local transcript append: read existing array, append, write
        // back. Safe without atomicity because each conversation has exactly
        // one active writer.
        let key = transcript_key(conversation_id);
        let mut messages = self
            .cache
            .get(&key)
            .and_then(|v| serde_json::from_value::<Vec<TranscriptMessage>>(v).ok())
            .unwrap_or_default();
        messages.extend(delta.iter().cloned());
        let full_transcript = serde_json::to_value(&messages).unwrap_or_else(|_| json!([]));
        self.cache.set(&key, full_transcript.clone());

        // Itineraries are cached under their own key so the UI can re-open
        // a plan without a round trip
        if let (Some(plan_id), Some(itinerary)) = (plan_id, itinerary) {
            if let Ok(value) = serde_json::to_value(itinerary) {
                self.cache.set(&itinerary_key(plan_id), value);
            }
        }

        // 2 + 3. Durable writes, fire and forget
        let Some(remote) = &self.remote else {
            debug!("persist: no durable store configured, cache-only");
            return;
        };

        let transcript_record = Self::transcript_record(full_transcript, plan_id, slots);
        let plan_write = match (plan_id, itinerary) {
            (Some(plan_id), Some(itinerary)) => Some((
                plan_id.as_str().to_string(),
                Self::itinerary_record(conversation_id, itinerary),
            )),
            _ => None,
        };

        let remote = Arc::clone(remote);
        let cid = conversation_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = Self::persist_remote(remote.as_ref(), &cid, transcript_record, plan_write).await {
                warn!(conversation_id = %cid, error = %e, "persist: durable write failed, continuing");
            }
        });
    }

    /// The durable half of `persist`, awaitable for deterministic tests
    pub async fn persist_remote(
        remote: &dyn RemoteStore,
        conversation_id: &str,
        transcript_record: Value,
        plan_write: Option<(String, Value)>,
    ) -> Result<(), StoreError> {
        debug!(%conversation_id, "persist_remote: called");
        remote
            .upsert(TRANSCRIPTS_TABLE, conversation_id, transcript_record)
            .await?;

        if let Some((plan_id, record)) = plan_write {
            remote.upsert(ITINERARIES_TABLE, &plan_id, record).await?;
        }
        Ok(())
    }

    /// Denormalized transcript record: full message array plus the metadata
    /// fields queried without deserializing the transcript
    fn transcript_record(messages: Value, plan_id: Option<&PlanId>, slots: &SlotStore) -> Value {
        let mut record = json!({
            "messages": messages,
            "destination": slots.location,
            "dates": slots.date,
            "budget": slots.budget,
        });
        if let (Some(plan_id), Some(obj)) = (plan_id, record.as_object_mut()) {
            // Cross-link to the durable itinerary record
            obj.insert("itinerary_id".to_string(), json!(plan_id.as_str()));
            obj.insert("plan_id".to_string(), json!(plan_id.as_str()));
        }
        record
    }

    fn itinerary_record(conversation_id: ConversationId, itinerary: &Itinerary) -> Value {
        json!({
            "conversation_id": conversation_id.to_string(),
            "destination": itinerary.destination,
            "duration": itinerary.duration,
            "itinerary": serde_json::to_value(itinerary).unwrap_or(Value::Null),
        })
    }

    /// Read the cached transcript for a conversation
    pub fn cached_transcript(&self, conversation_id: ConversationId) -> Vec<TranscriptMessage> {
        self.cache
            .get(&transcript_key(conversation_id))
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Read a cached itinerary, falling back to the durable store
    pub async fn load_itinerary(&self, plan_id: &PlanId) -> Result<Option<Itinerary>, StoreError> {
        debug!(plan_id = %plan_id, "load_itinerary: called");
        if let Some(value) = self.cache.get(&itinerary_key(plan_id)) {
            if let Ok(itinerary) = serde_json::from_value(value) {
                debug!("load_itinerary: cache hit");
                return Ok(Some(itinerary));
            }
        }

        let Some(remote) = &self.remote else {
            return Ok(None);
        };
        let rows = remote
            .query(ITINERARIES_TABLE, &[("id".to_string(), plan_id.as_str().to_string())])
            .await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let itinerary: Itinerary =
            serde_json::from_value(row.get("itinerary").cloned().unwrap_or(Value::Null))
                .map_err(StoreError::Json)?;
        Ok(Some(itinerary))
    }

    /// List durable itinerary records (id, destination, duration)
    pub async fn list_plans(&self) -> Result<Vec<Value>, StoreError> {
        debug!("list_plans: called");
        let Some(remote) = &self.remote else {
            return Ok(Vec::new());
        };
        remote.query(ITINERARIES_TABLE, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planstore::{MemoryCache, MemoryStore};

    fn slots() -> SlotStore {
        SlotStore {
            location: Some("Lisbon, Portugal".to_string()),
            date: Some("3 days".to_string()),
            budget: Some("Mid-range".to_string()),
            travelers: Some("2".to_string()),
            interest: Some("Food".to_string()),
        }
    }

    fn itinerary() -> Itinerary {
        Itinerary {
            destination: "Lisbon, Portugal".to_string(),
            duration: "3 days".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_local_append_accumulates_turns() {
        let cache = Arc::new(MemoryCache::new());
        let reconciler = Reconciler::new(cache, None);
        let cid = ConversationId::new();

        reconciler.persist(cid, None, &[TranscriptMessage::now(Role::User, "hi")], None, &slots());
        reconciler.persist(
            cid,
            None,
            &[
                TranscriptMessage::now(Role::User, "Lisbon"),
                TranscriptMessage::now(Role::Assistant, "When?"),
            ],
            None,
            &slots(),
        );

        let transcript = reconciler.cached_transcript(cid);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].text, "hi");
        assert_eq!(transcript[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_cache_only_mode_never_panics() {
        let cache = Arc::new(MemoryCache::new());
        let reconciler = Reconciler::new(cache, None);
        let cid = ConversationId::new();
        let plan_id = PlanId::from("plan-1");

        reconciler.persist(
            cid,
            Some(&plan_id),
            &[TranscriptMessage::now(Role::Assistant, "Here's your plan!")],
            Some(&itinerary()),
            &slots(),
        );

        assert_eq!(reconciler.load_itinerary(&plan_id).await.unwrap(), Some(itinerary()));
        assert!(reconciler.list_plans().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_remote_is_idempotent_per_plan() {
        let remote = MemoryStore::new();
        let record = Reconciler::transcript_record(json!([]), Some(&PlanId::from("plan-1")), &slots());
        let plan = (
            "plan-1".to_string(),
            Reconciler::itinerary_record(ConversationId::new(), &itinerary()),
        );

        Reconciler::persist_remote(&remote, "c-1", record.clone(), Some(plan.clone()))
            .await
            .unwrap();
        Reconciler::persist_remote(&remote, "c-1", record, Some(plan)).await.unwrap();

        // Same keys twice: one record each, not two
        assert_eq!(remote.count(TRANSCRIPTS_TABLE), 1);
        assert_eq!(remote.count(ITINERARIES_TABLE), 1);
    }

    #[tokio::test]
    async fn test_transcript_record_carries_metadata_and_cross_link() {
        let record = Reconciler::transcript_record(json!([]), Some(&PlanId::from("plan-7")), &slots());

        assert_eq!(record["destination"], "Lisbon, Portugal");
        assert_eq!(record["dates"], "3 days");
        assert_eq!(record["budget"], "Mid-range");
        assert_eq!(record["itinerary_id"], "plan-7");
        assert_eq!(record["plan_id"], "plan-7");
    }

    #[tokio::test]
    async fn test_load_itinerary_falls_back_to_remote() {
        let cache = Arc::new(MemoryCache::new());
        let remote = Arc::new(MemoryStore::new());
        let cid = ConversationId::new();
        let plan_id = PlanId::from("plan-9");

        remote
            .upsert(
                ITINERARIES_TABLE,
                plan_id.as_str(),
                Reconciler::itinerary_record(cid, &itinerary()),
            )
            .await
            .unwrap();

        let reconciler = Reconciler::new(cache, Some(remote));
        let loaded = reconciler.load_itinerary(&plan_id).await.unwrap();
        assert_eq!(loaded, Some(itinerary()));
    }
}
