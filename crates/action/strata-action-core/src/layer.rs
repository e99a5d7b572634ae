//! Animation layers. A layer owns an ordered list of strips; how many strips
//! it may hold is decided by the document's [`StructurePolicy`].

use serde::{Deserialize, Serialize};

use crate::config::StructurePolicy;
use crate::error::ActionError;
use crate::ids::{IdSource, LayerId, StripId};
use crate::strip::{Strip, StripType};

fn default_influence() -> f32 {
    1.0
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layer {
    pub(crate) id: LayerId,
    pub name: String,
    #[serde(default = "default_influence")]
    pub influence: f32,
    #[serde(default)]
    pub(crate) strips: Vec<Strip>,
    #[serde(skip)]
    ids: IdSource,
    #[serde(skip)]
    policy: StructurePolicy,
}

impl Layer {
    pub(crate) fn new(ids: &IdSource, policy: StructurePolicy, name: String) -> Self {
        Self {
            id: ids.alloc_layer(),
            name,
            influence: default_influence(),
            strips: Vec::new(),
            ids: IdSource::clone(ids),
            policy,
        }
    }

    pub(crate) fn attach(&mut self, ids: &IdSource, policy: StructurePolicy) {
        ids.observe(self.id.0);
        for strip in &mut self.strips {
            strip.attach(ids);
        }
        self.ids = IdSource::clone(ids);
        self.policy = policy;
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    pub fn strip(&self, id: StripId) -> Option<&Strip> {
        self.strips.iter().find(|s| s.id == id)
    }

    pub fn strip_mut(&mut self, id: StripId) -> Option<&mut Strip> {
        self.strips.iter_mut().find(|s| s.id == id)
    }

    /// Append a strip of `strip_type`, subject to the strip limit.
    pub fn strip_new(&mut self, strip_type: StripType) -> Result<&mut Strip, ActionError> {
        if !self.policy.allows_strip(self.strips.len()) {
            return Err(ActionError::StripLimit {
                limit: self.policy.max_strips_per_layer.unwrap_or(usize::MAX),
            });
        }
        self.strips.push(Strip::new(&self.ids, strip_type));
        let last = self.strips.len() - 1;
        Ok(&mut self.strips[last])
    }

    /// Remove a strip owned by this layer, together with its channelbags.
    pub fn strip_remove(&mut self, id: StripId) -> Result<Strip, ActionError> {
        let pos = self
            .strips
            .iter()
            .position(|s| s.id == id)
            .ok_or(ActionError::StripNotInLayer)?;
        Ok(self.strips.remove(pos))
    }
}
