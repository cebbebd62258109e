//! Generation orchestrator
//!
//! Turns a complete slot store into a canonical itinerary: builds the
//! structured request, invokes the capability once, and runs the response
//! through the parse/validate/repair pipeline. No automatic retry: the
//! caller surfaces failures as chat messages and accepts another attempt on
//! the next user turn, so cost and latency stay visible to the user.

use std::sync::Arc;

use tracing::debug;

mod error;
mod prompt;
mod response;

pub use error::GenerationError;
pub use prompt::{build_edit_prompt, build_generation_prompt, build_rebuild_prompt, currency_hint, parse_day_count};
pub use response::{extract_json_object, parse_generation_response, repair, strip_code_fences};

use crate::conversation::{Slot, SlotStore};
use crate::itinerary::{Itinerary, PlanId};
use crate::llm::{InvokeOptions, TextModel};

/// A freshly generated plan, tagged with its stable id
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan_id: PlanId,
    pub itinerary: Itinerary,
}

/// The generation orchestrator
pub struct PlanGenerator {
    model: Arc<dyn TextModel>,
    options: InvokeOptions,
}

impl PlanGenerator {
    pub fn new(model: Arc<dyn TextModel>, options: InvokeOptions) -> Self {
        Self { model, options }
    }

    pub fn model(&self) -> &Arc<dyn TextModel> {
        &self.model
    }

    pub fn options(&self) -> &InvokeOptions {
        &self.options
    }

    /// Generate a full itinerary from a complete slot store
    pub async fn generate(&self, slots: &SlotStore) -> Result<GeneratedPlan, GenerationError> {
        debug!("generate: called");

        // The state machine guarantees completeness; checked anyway
        for slot in Slot::ORDER {
            if slots.get(slot).is_none_or(str::is_empty) {
                debug!(slot = %slot, "generate: missing slot");
                return Err(GenerationError::Validation(slot.to_string()));
            }
        }

        // Location pre-check before spending a network call
        let location = slots.location.as_deref().unwrap_or_default().trim();
        if location.chars().count() < 2 {
            debug!("generate: location failed validity check");
            return Err(GenerationError::Validation(Slot::Location.to_string()));
        }

        let days = prompt::parse_day_count(slots.date.as_deref().unwrap_or_default());
        let prompt_text = prompt::build_generation_prompt(slots, days);

        let raw = self.model.invoke(&prompt_text, &self.options).await?;
        let itinerary = response::parse_generation_response(&raw, days, slots)?;

        let plan_id = PlanId::now();
        debug!(plan_id = %plan_id, "generate: success");
        Ok(GeneratedPlan { plan_id, itinerary })
    }
}
