//! Deep merge for itinerary patches
//!
//! Asymmetric on purpose: objects merge key-wise (recursing), arrays and
//! scalars are replaced wholesale. A changed day replaces the whole day
//! array entry set, it is never spliced element-by-element.

use serde_json::Value;
use tracing::debug;

/// Merge `patch` into `base` in place
///
/// For every key in the patch: if both sides hold non-array objects the
/// merge recurses, otherwise the patch value wins outright.
pub fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(slot) if slot.is_object() && patch_value.is_object() => {
                        debug!(%key, "deep_merge: recursing into object");
                        deep_merge(slot, patch_value);
                    }
                    _ => {
                        debug!(%key, "deep_merge: replacing value");
                        base_map.insert(key, patch_value);
                    }
                }
            }
        }
        (base, patch) => {
            debug!("deep_merge: non-object base, replacing wholesale");
            *base = patch;
        }
    }
}
