//! Patch engine: free-text edits against an existing itinerary
//!
//! Two paths. The default asks the capability for a minimal partial
//! document and deep-merges it into the existing plan, so untouched fields
//! survive verbatim. The broad path asks for a complete replacement and
//! backfills anything the response omits from the current plan, so the
//! result is never missing a required field. Either way the existing plan
//! is left untouched on any failure: no partial application.

use std::sync::Arc;

use tracing::debug;

use crate::generate::{self, GenerationError};
use crate::itinerary::{deep_merge, Itinerary};
use crate::llm::{InvokeOptions, TextModel};

pub struct PatchEngine {
    model: Arc<dyn TextModel>,
    options: InvokeOptions,
}

impl PatchEngine {
    pub fn new(model: Arc<dyn TextModel>, options: InvokeOptions) -> Self {
        Self { model, options }
    }

    /// Apply a free-text edit as a minimal patch
    ///
    /// Empty edit text is rejected before any capability call.
    pub async fn apply_edit(&self, existing: &Itinerary, edit_text: &str) -> Result<Itinerary, GenerationError> {
        debug!(edit_len = edit_text.len(), "apply_edit: called");

        if edit_text.trim().is_empty() {
            debug!("apply_edit: empty edit rejected");
            return Err(GenerationError::Validation("edit request".to_string()));
        }

        let prompt = generate::build_edit_prompt(existing, edit_text);
        let raw = self.model.invoke(&prompt, &self.options).await?;

        let patch = generate::extract_json_object(&raw).ok_or_else(|| {
            debug!("apply_edit: patch response unparseable, edit rejected");
            GenerationError::InvalidFormat("patch response was not a JSON object".to_string())
        })?;

        let mut merged = serde_json::to_value(existing)
            .map_err(|e| GenerationError::InvalidSchema(e.to_string()))?;
        deep_merge(&mut merged, patch);

        let mut updated: Itinerary = serde_json::from_value(merged).map_err(|e| {
            debug!(error = %e, "apply_edit: merged document failed canonical mapping");
            GenerationError::InvalidSchema(e.to_string())
        })?;

        // A patched dailyPlan replaces the old one wholesale; re-enforce the
        // per-day invariants on whatever came back
        let days = updated.daily_plan.len() as u32;
        generate::repair(&mut updated, days, &crate::conversation::SlotStore::default());

        debug!("apply_edit: success");
        Ok(updated)
    }

    /// Apply a broad edit as a whole-plan rebuild
    ///
    /// The response is treated as a replacement document; fields it omits
    /// are backfilled from the existing plan by merging the response over it.
    pub async fn rebuild(&self, existing: &Itinerary, edit_text: &str) -> Result<Itinerary, GenerationError> {
        debug!(edit_len = edit_text.len(), "rebuild: called");

        if edit_text.trim().is_empty() {
            debug!("rebuild: empty edit rejected");
            return Err(GenerationError::Validation("edit request".to_string()));
        }

        let prompt = generate::build_rebuild_prompt(existing, edit_text);
        let raw = self.model.invoke(&prompt, &self.options).await?;

        let replacement = generate::extract_json_object(&raw).ok_or_else(|| {
            debug!("rebuild: response unparseable, edit rejected");
            GenerationError::InvalidFormat("rebuild response was not a JSON object".to_string())
        })?;

        let mut merged = serde_json::to_value(existing)
            .map_err(|e| GenerationError::InvalidSchema(e.to_string()))?;
        deep_merge(&mut merged, replacement);

        let mut updated: Itinerary = serde_json::from_value(merged).map_err(|e| {
            debug!(error = %e, "rebuild: merged document failed canonical mapping");
            GenerationError::InvalidSchema(e.to_string())
        })?;

        let days = updated.daily_plan.len() as u32;
        generate::repair(&mut updated, days, &crate::conversation::SlotStore::default());

        debug!("rebuild: success");
        Ok(updated)
    }
}
