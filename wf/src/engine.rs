//! The trip-planning engine
//!
//! Owns the sessions and wires the state machine, generator, patch engine
//! and reconciler together behind one entry point: `submit_user_text`. The
//! UI renders the returned events and never touches slots or state itself.
//! Turns within one conversation are serialized by the `&mut self` receiver.

use std::collections::HashMap;
use std::sync::Arc;

use eyre::{Context, Result};
use planstore::{MemoryCache, RemoteStore, RestConfig, RestStore};
use tracing::{debug, warn};

use crate::config::Config;
use crate::conversation::{ConversationId, ConversationSession, TurnPlan};
use crate::generate::PlanGenerator;
use crate::itinerary::{Itinerary, PlanId};
use crate::llm::{self, InvokeOptions};
use crate::patch::PatchEngine;
use crate::persist::{Reconciler, Role, TranscriptMessage};

/// What the UI should render after one user turn
#[derive(Debug, Clone)]
pub enum UiEvent {
    AskQuestion {
        text: String,
        suggestions: Vec<String>,
    },
    ShowItinerary {
        plan_id: PlanId,
        itinerary: Itinerary,
    },
    ShowError {
        message: String,
    },
}

pub struct Engine {
    generator: PlanGenerator,
    patcher: PatchEngine,
    reconciler: Reconciler,
    defaults: crate::config::DefaultsConfig,
    sessions: HashMap<ConversationId, ConversationSession>,
}

impl Engine {
    pub fn new(
        generator: PlanGenerator,
        patcher: PatchEngine,
        reconciler: Reconciler,
        defaults: crate::config::DefaultsConfig,
    ) -> Self {
        Self {
            generator,
            patcher,
            reconciler,
            defaults,
            sessions: HashMap::new(),
        }
    }

    /// Build a fully wired engine from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        debug!("from_config: called");
        let model = llm::create_model(&config.llm).context("Failed to create model client")?;
        let options = InvokeOptions {
            temperature: config.llm.temperature,
            max_output_tokens: config.llm.max_output_tokens,
        };

        let cache = Arc::new(MemoryCache::new());
        let remote: Option<Arc<dyn RemoteStore>> = match &config.store.rest_url {
            Some(url) => {
                let rest_config = RestConfig {
                    base_url: url.clone(),
                    api_key: config.store.get_api_key()?,
                    timeout: std::time::Duration::from_millis(config.store.timeout_ms),
                };
                let store = RestStore::new(&rest_config).context("Failed to create durable store client")?;
                Some(Arc::new(store))
            }
            None => {
                warn!("from_config: no durable store configured, running cache-only");
                None
            }
        };

        Ok(Self::new(
            PlanGenerator::new(model.clone(), options.clone()),
            PatchEngine::new(model, options),
            Reconciler::new(cache, remote),
            config.defaults.clone(),
        ))
    }

    /// Create a session; the returned id keys every later call
    pub fn open_conversation(&mut self) -> ConversationId {
        let session = ConversationSession::open(self.defaults.clone());
        let id = session.id();
        debug!(conversation_id = %id, "open_conversation: called");
        self.sessions.insert(id, session);
        id
    }

    /// Tear a session down; its transcript stays in the stores
    pub fn close_conversation(&mut self, id: ConversationId) {
        debug!(conversation_id = %id, "close_conversation: called");
        self.sessions.remove(&id);
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Consume one user turn and return the event the UI should render
    pub async fn submit_user_text(&mut self, id: ConversationId, text: &str) -> UiEvent {
        debug!(conversation_id = %id, text_len = text.len(), "submit_user_text: called");

        // Empty input is rejected before classification or any edit
        if text.trim().is_empty() {
            return UiEvent::ShowError {
                message: "Please type a message.".to_string(),
            };
        }

        // Split borrows: the session is mutated while the other fields run
        let Self {
            generator,
            patcher,
            reconciler,
            sessions,
            ..
        } = self;

        let Some(session) = sessions.get_mut(&id) else {
            warn!(conversation_id = %id, "submit_user_text: unknown conversation");
            return UiEvent::ShowError {
                message: "This conversation is no longer open.".to_string(),
            };
        };

        match session.plan_turn(text) {
            TurnPlan::Canned { reply } => {
                reconciler.persist(
                    id,
                    None,
                    &[
                        TranscriptMessage::now(Role::User, text),
                        TranscriptMessage::now(Role::Assistant, reply),
                    ],
                    None,
                    session.slots(),
                );
                UiEvent::AskQuestion {
                    text: reply.to_string(),
                    suggestions: Vec::new(),
                }
            }
            TurnPlan::Ask { question, suggestions } => {
                reconciler.persist(
                    id,
                    None,
                    &[
                        TranscriptMessage::now(Role::User, text),
                        TranscriptMessage::now(Role::Assistant, &question),
                    ],
                    None,
                    session.slots(),
                );
                UiEvent::AskQuestion {
                    text: question,
                    suggestions,
                }
            }
            TurnPlan::Busy => UiEvent::ShowError {
                message: "I'm still working on your itinerary. One moment!".to_string(),
            },
            TurnPlan::Generate => {
                let epoch = session.epoch();
                match generator.generate(session.slots()).await {
                    Ok(plan) => {
                        if !session.complete_generation(epoch, plan.plan_id.clone()) {
                            debug!("submit_user_text: stale generation discarded");
                            return UiEvent::ShowError {
                                message: "That request was superseded by a newer one.".to_string(),
                            };
                        }
                        reconciler.persist(
                            id,
                            Some(&plan.plan_id),
                            &[
                                TranscriptMessage::now(Role::User, text),
                                TranscriptMessage::now(
                                    Role::Assistant,
                                    format!("Here's your trip to {}!", plan.itinerary.destination),
                                ),
                            ],
                            Some(&plan.itinerary),
                            session.slots(),
                        );
                        UiEvent::ShowItinerary {
                            plan_id: plan.plan_id,
                            itinerary: plan.itinerary,
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "submit_user_text: generation failed");
                        session.fail_generation(epoch);
                        let message = e.user_message();
                        reconciler.persist(
                            id,
                            None,
                            &[
                                TranscriptMessage::now(Role::User, text),
                                TranscriptMessage::now(Role::Assistant, &message),
                            ],
                            None,
                            session.slots(),
                        );
                        UiEvent::ShowError { message }
                    }
                }
            }
            TurnPlan::Edit { request } => {
                let epoch = session.epoch();
                let Some(plan_id) = session.current_plan().cloned() else {
                    return UiEvent::ShowError {
                        message: "There's no itinerary to edit yet.".to_string(),
                    };
                };
                let existing = match reconciler.load_itinerary(&plan_id).await {
                    Ok(Some(existing)) => existing,
                    Ok(None) => {
                        return UiEvent::ShowError {
                            message: "I couldn't find that itinerary anymore.".to_string(),
                        };
                    }
                    Err(e) => {
                        warn!(error = %e, "submit_user_text: itinerary load failed");
                        return UiEvent::ShowError {
                            message: "I couldn't load your itinerary. Please try again.".to_string(),
                        };
                    }
                };

                match patcher.apply_edit(&existing, &request).await {
                    Ok(updated) => {
                        if !session.complete_edit(epoch) {
                            debug!("submit_user_text: stale edit discarded");
                            return UiEvent::ShowError {
                                message: "That edit was superseded by a newer one.".to_string(),
                            };
                        }
                        // Update in place under the same plan id
                        reconciler.persist(
                            id,
                            Some(&plan_id),
                            &[
                                TranscriptMessage::now(Role::User, text),
                                TranscriptMessage::now(Role::Assistant, "Done! I've updated your itinerary."),
                            ],
                            Some(&updated),
                            session.slots(),
                        );
                        UiEvent::ShowItinerary {
                            plan_id,
                            itinerary: updated,
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "submit_user_text: edit rejected");
                        UiEvent::ShowError { message: e.user_message() }
                    }
                }
            }
        }
    }

    /// Rebuild the whole plan from a broad edit request (the `/redo` path)
    pub async fn rebuild_plan(&mut self, id: ConversationId, request: &str) -> UiEvent {
        debug!(conversation_id = %id, "rebuild_plan: called");

        if request.trim().is_empty() {
            return UiEvent::ShowError {
                message: "Please describe how I should rework the plan.".to_string(),
            };
        }

        let Self {
            patcher,
            reconciler,
            sessions,
            ..
        } = self;

        let Some(session) = sessions.get_mut(&id) else {
            return UiEvent::ShowError {
                message: "This conversation is no longer open.".to_string(),
            };
        };
        let Some(plan_id) = session.current_plan().cloned() else {
            return UiEvent::ShowError {
                message: "There's no itinerary to rework yet.".to_string(),
            };
        };
        let existing = match reconciler.load_itinerary(&plan_id).await {
            Ok(Some(existing)) => existing,
            _ => {
                return UiEvent::ShowError {
                    message: "I couldn't load your itinerary. Please try again.".to_string(),
                };
            }
        };

        match patcher.rebuild(&existing, request).await {
            Ok(updated) => {
                reconciler.persist(
                    id,
                    Some(&plan_id),
                    &[
                        TranscriptMessage::now(Role::User, request),
                        TranscriptMessage::now(Role::Assistant, "Here's the reworked plan!"),
                    ],
                    Some(&updated),
                    session.slots(),
                );
                UiEvent::ShowItinerary {
                    plan_id,
                    itinerary: updated,
                }
            }
            Err(e) => UiEvent::ShowError { message: e.user_message() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultsConfig;
    use crate::llm::{ModelError, TextModel};
    use async_trait::async_trait;
    use planstore::MemoryStore;
    use std::sync::Mutex;

    struct ScriptedModel {
        responses: Mutex<Vec<Result<String, ModelError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String, ModelError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn invoke(&self, _prompt: &str, _options: &InvokeOptions) -> Result<String, ModelError> {
            *self.calls.lock().unwrap() += 1;
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn engine_with(responses: Vec<Result<String, ModelError>>) -> (Engine, Arc<ScriptedModel>) {
        let model = Arc::new(ScriptedModel::new(responses));
        let options = InvokeOptions::default();
        let cache = Arc::new(MemoryCache::new());
        let remote: Arc<dyn RemoteStore> = Arc::new(MemoryStore::new());
        let engine = Engine::new(
            PlanGenerator::new(model.clone(), options.clone()),
            PatchEngine::new(model.clone(), options),
            Reconciler::new(cache, Some(remote)),
            DefaultsConfig::default(),
        );
        (engine, model)
    }

    fn plan_response(days: usize) -> String {
        let plan: Vec<serde_json::Value> = (1..=days)
            .map(|d| serde_json::json!({"day": d, "title": format!("Day {}", d)}))
            .collect();
        serde_json::json!({
            "content": {"destination": "Santorini, Greece", "totalCost": "€1500"},
            "detailedPlan": plan
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_before_anything() {
        let (mut engine, model) = engine_with(vec![]);
        let id = engine.open_conversation();

        let event = engine.submit_user_text(id, "   ").await;

        assert!(matches!(event, UiEvent::ShowError { .. }));
        assert_eq!(*model.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_surprise_turn_generates_and_shows_itinerary() {
        let (mut engine, _) = engine_with(vec![Ok(plan_response(5))]);
        let id = engine.open_conversation();

        let event = engine.submit_user_text(id, "surprise me!").await;

        match event {
            UiEvent::ShowItinerary { itinerary, .. } => {
                assert_eq!(itinerary.daily_plan.len(), 5);
            }
            other => panic!("expected itinerary, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_conversation_reenterable() {
        let (mut engine, _) = engine_with(vec![
            Ok(r#"{"foo": "bar"}"#.to_string()),
            Ok(plan_response(5)),
        ]);
        let id = engine.open_conversation();

        let event = engine.submit_user_text(id, "surprise me!").await;
        assert!(matches!(event, UiEvent::ShowError { .. }));

        // The retry turn succeeds
        let event = engine.submit_user_text(id, "try something cultural").await;
        assert!(matches!(event, UiEvent::ShowItinerary { .. }));
    }

    #[tokio::test]
    async fn test_edit_after_done_goes_through_patch_engine() {
        let (mut engine, _) = engine_with(vec![
            Ok(plan_response(5)),
            Ok(r#"{"budget": "Luxury"}"#.to_string()),
        ]);
        let id = engine.open_conversation();
        engine.submit_user_text(id, "surprise me!").await;

        let event = engine.submit_user_text(id, "make it luxury").await;

        match event {
            UiEvent::ShowItinerary { itinerary, .. } => {
                assert_eq!(itinerary.budget, "Luxury");
                assert_eq!(itinerary.destination, "Santorini, Greece");
            }
            other => panic!("expected itinerary, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let (mut engine, _) = engine_with(vec![]);
        let id = ConversationId::new();

        let event = engine.submit_user_text(id, "Lisbon").await;
        assert!(matches!(event, UiEvent::ShowError { .. }));
    }
}
