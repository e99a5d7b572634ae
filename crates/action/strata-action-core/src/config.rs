#![allow(dead_code)]
//! Configuration for strata-action-core documents.

use serde::{Deserialize, Serialize};

/// Display name given to slots created while converting legacy Actions.
pub const LEGACY_SLOT_NAME: &str = "Legacy Slot";

/// Name of the layer created on demand for keying and versioning.
pub const DEFAULT_LAYER_NAME: &str = "Layer";

/// Document-wide settings. Not persisted with the document; a loaded
/// document uses whatever `Config` it was opened with.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Limits on how many layers and strips an Action may hold.
    pub structure: StructurePolicy,

    /// Action constraints may target datablocks that are themselves driven by
    /// constraints; evaluation stops following the chain at this depth.
    pub constraint_eval_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            structure: StructurePolicy::default(),
            constraint_eval_depth: 8,
        }
    }
}

/// Structural limits. `None` means unlimited.
///
/// The data model itself allows any number of layers and strips; the
/// default policy allows one of each.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StructurePolicy {
    pub max_layers_per_action: Option<usize>,
    pub max_strips_per_layer: Option<usize>,
}

impl Default for StructurePolicy {
    fn default() -> Self {
        Self {
            max_layers_per_action: Some(1),
            max_strips_per_layer: Some(1),
        }
    }
}

impl StructurePolicy {
    /// No limits at all.
    pub fn unlimited() -> Self {
        Self {
            max_layers_per_action: None,
            max_strips_per_layer: None,
        }
    }

    #[inline]
    pub fn allows_layer(&self, current: usize) -> bool {
        self.max_layers_per_action.map_or(true, |max| current < max)
    }

    #[inline]
    pub fn allows_strip(&self, current: usize) -> bool {
        self.max_strips_per_layer.map_or(true, |max| current < max)
    }
}
