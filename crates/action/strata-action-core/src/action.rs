//! Actions: slots, layers and (for files from before layered Actions) legacy
//! F-Curves.
//!
//! Slot identity rules live here: handles are allocated monotonically from
//! `last_slot_handle`, identifiers are `code + display name`, unique within
//! the Action and capped at [`IDENTIFIER_LENGTH_MAX`] bytes.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::channelbag::{ChannelGroup, Channelbag};
use crate::config::{StructurePolicy, DEFAULT_LAYER_NAME, LEGACY_SLOT_NAME};
use crate::error::ActionError;
use crate::fcurve::{ChannelCurve, FCurve};
use crate::id_type::IdType;
use crate::ids::{ActionId, FCurveId, IdSource, LayerId, SlotHandle, SlotRef, StripId};
use crate::keyframe::Keyframe;
use crate::layer::Layer;
use crate::legacy::LegacyAnimato;
use crate::naming::{truncate_utf8, unique_name, NAME_MAX};
use crate::slot::{
    compose_identifier, force_prefix, Slot, IDENTIFIER_LENGTH_MAX, IDENTIFIER_LENGTH_MIN,
};
use crate::strip::{Strip, StripType};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Action {
    pub(crate) id: ActionId,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) slots: Vec<Slot>,
    #[serde(default)]
    pub(crate) layers: Vec<Layer>,
    #[serde(default)]
    pub(crate) last_slot_handle: SlotHandle,
    /// Keeps the Action alive without any datablock using it.
    #[serde(default)]
    pub fake_user: bool,
    /// Source library of a linked Action. Linked Actions are read-only:
    /// their untyped slots are never resolved by assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_frame_range: Option<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) legacy: Option<LegacyAnimato>,
    #[serde(skip)]
    ids: IdSource,
    #[serde(skip)]
    policy: StructurePolicy,
}

impl Action {
    pub(crate) fn new(ids: &IdSource, policy: StructurePolicy, name: String) -> Self {
        Self {
            id: ids.alloc_action(),
            name,
            slots: Vec::new(),
            layers: Vec::new(),
            last_slot_handle: SlotHandle::UNASSIGNED,
            fake_user: false,
            library: None,
            manual_frame_range: None,
            legacy: None,
            ids: IdSource::clone(ids),
            policy,
        }
    }

    pub(crate) fn attach(&mut self, ids: &IdSource, policy: StructurePolicy) {
        ids.observe(self.id.0);
        for layer in &mut self.layers {
            layer.attach(ids, policy);
        }
        // Handles must stay unique even if the saved counter lags behind.
        if let Some(max) = self.slots.iter().map(|s| s.handle).max() {
            self.last_slot_handle = self.last_slot_handle.max(max);
        }
        self.ids = IdSource::clone(ids);
        self.policy = policy;
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_linked(&self) -> bool {
        self.library.is_some()
    }

    pub fn legacy(&self) -> Option<&LegacyAnimato> {
        self.legacy.as_ref()
    }

    pub(crate) fn take_legacy(&mut self) -> Option<LegacyAnimato> {
        self.legacy.take()
    }

    fn has_legacy_content(&self) -> bool {
        self.legacy.as_ref().is_some_and(|l| !l.is_empty())
    }

    /// No slots, no layers and no legacy data.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.layers.is_empty() && !self.has_legacy_content()
    }

    /// Empty Actions count as both legacy and layered.
    pub fn is_action_legacy(&self) -> bool {
        self.slots.is_empty() && self.layers.is_empty()
    }

    pub fn is_action_layered(&self) -> bool {
        self.is_empty() || !self.slots.is_empty() || !self.layers.is_empty()
    }

    fn ensure_layered(&self, what: &'static str) -> Result<(), ActionError> {
        if self.is_action_layered() {
            Ok(())
        } else {
            Err(ActionError::LegacyAction {
                action: self.name.clone(),
                what,
            })
        }
    }

    // ----- slots -----

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, handle: SlotHandle) -> Option<&Slot> {
        self.slots.iter().find(|s| s.handle == handle)
    }

    fn slot_index(&self, handle: SlotHandle) -> Result<usize, ActionError> {
        self.slots
            .iter()
            .position(|s| s.handle == handle)
            .ok_or(ActionError::SlotNotFound { handle: handle.0 })
    }

    pub fn slot_by_identifier(&self, identifier: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.identifier == identifier)
    }

    pub fn slot_ref(&self, handle: SlotHandle) -> SlotRef {
        SlotRef::new(self.id, handle)
    }

    pub fn last_slot_handle(&self) -> SlotHandle {
        self.last_slot_handle
    }

    /// `identifier`, or the lowest free `.NNN` variant of it among the other
    /// slots of this Action.
    fn unique_identifier(&self, identifier: &str, exclude: Option<SlotHandle>) -> String {
        unique_name(identifier, IDENTIFIER_LENGTH_MAX, |candidate| {
            self.slots
                .iter()
                .any(|s| Some(s.handle) != exclude && s.identifier == candidate)
        })
    }

    fn slot_push(&mut self, id_type: IdType, name: &str) -> Result<SlotHandle, ActionError> {
        let next = self.last_slot_handle.0.checked_add(1).ok_or_else(|| {
            ActionError::SlotHandlesExhausted {
                action: self.name.clone(),
            }
        })?;
        let identifier = self.unique_identifier(&compose_identifier(id_type, name), None);
        let handle = SlotHandle(next);
        self.last_slot_handle = handle;
        self.slots.push(Slot::new(handle, identifier, id_type));
        Ok(handle)
    }

    /// Create a slot for datablocks of `id_type` called `name`.
    pub fn slot_new(&mut self, id_type: IdType, name: &str) -> Result<&Slot, ActionError> {
        self.ensure_layered("slots")?;
        if !id_type.is_specified() {
            return Err(ActionError::UnspecifiedSlotType);
        }
        if name.is_empty() {
            return Err(ActionError::EmptySlotName {
                name: name.to_string(),
            });
        }
        let handle = self.slot_push(id_type, name)?;
        let last = self.slots.len() - 1;
        debug_assert_eq!(self.slots[last].handle, handle);
        Ok(&self.slots[last])
    }

    /// First slot, or a new untyped `"Legacy Slot"` when there is none.
    pub(crate) fn slot_legacy_ensure(&mut self) -> Result<SlotHandle, ActionError> {
        match self.slots.first() {
            Some(slot) => Ok(slot.handle),
            None => self.slot_push(IdType::Unspecified, LEGACY_SLOT_NAME),
        }
    }

    /// Create the slot a converted legacy Action gets.
    pub(crate) fn slot_new_legacy(&mut self, id_type: IdType) -> Result<SlotHandle, ActionError> {
        self.slot_push(id_type, LEGACY_SLOT_NAME)
    }

    /// Rename a slot. The type code is kept, the result is uniquified.
    pub fn slot_display_name_set(&mut self, handle: SlotHandle, name: &str) -> Result<(), ActionError> {
        if name.is_empty() {
            return Err(ActionError::EmptySlotName {
                name: name.to_string(),
            });
        }
        let idx = self.slot_index(handle)?;
        let wanted = compose_identifier(self.slots[idx].target_id_type, name);
        self.slots[idx].identifier = self.unique_identifier(&wanted, Some(handle));
        Ok(())
    }

    /// Set the full identifier. The prefix is always derived from the slot's
    /// type; a different prefix is replaced (and logged).
    pub fn slot_identifier_set(&mut self, handle: SlotHandle, identifier: &str) -> Result<(), ActionError> {
        if identifier.len() < IDENTIFIER_LENGTH_MIN {
            return Err(ActionError::SlotIdentifierTooShort {
                identifier: identifier.to_string(),
            });
        }
        let idx = self.slot_index(handle)?;
        let id_type = self.slots[idx].target_id_type;
        let (forced, mismatch) = force_prefix(id_type, identifier);
        if mismatch {
            warn!(
                "Attempted to set slot identifier to \"{}\", but the type prefix doesn't match the slot's target_id_type \"{}\". Setting to \"{}\" instead.",
                identifier,
                id_type.code(),
                forced
            );
        }
        self.slots[idx].identifier = self.unique_identifier(&forced, Some(handle));
        Ok(())
    }

    /// Set the target ID type. Only untyped slots can be typed; writes to a
    /// typed slot are logged and ignored.
    pub fn slot_target_id_type_set(&mut self, handle: SlotHandle, id_type: IdType) -> Result<(), ActionError> {
        let idx = self.slot_index(handle)?;
        let slot = &self.slots[idx];
        if slot.target_id_type.is_specified() {
            warn!(
                "ignoring assignment to target_id_type of slot '{}' in Action '{}'; it can only be changed while UNSPECIFIED",
                slot.identifier, self.name
            );
            return Ok(());
        }
        self.slot_idtype_define(handle, id_type)
    }

    /// Give `handle` its type, rewriting the prefix and uniquifying.
    pub(crate) fn slot_idtype_define(&mut self, handle: SlotHandle, id_type: IdType) -> Result<(), ActionError> {
        let idx = self.slot_index(handle)?;
        let wanted = self.slots[idx].identifier_for_type(id_type);
        let identifier = self.unique_identifier(&wanted, Some(handle));
        let slot = &mut self.slots[idx];
        slot.target_id_type = id_type;
        slot.identifier = identifier;
        Ok(())
    }

    /// Remove a slot and every channelbag animating it.
    pub fn slot_remove(&mut self, handle: SlotHandle) -> Result<Slot, ActionError> {
        let idx = self
            .slots
            .iter()
            .position(|s| s.handle == handle)
            .ok_or(ActionError::SlotNotInAction)?;
        for layer in &mut self.layers {
            for strip in &mut layer.strips {
                strip.channelbag_remove_for_slot(handle);
            }
        }
        Ok(self.slots.remove(idx))
    }

    /// Mark one slot active (and every other inactive). `None` clears.
    pub fn slot_active_set(&mut self, handle: Option<SlotHandle>) -> Result<(), ActionError> {
        if let Some(handle) = handle {
            self.slot_index(handle)?;
        }
        for slot in &mut self.slots {
            slot.active = Some(slot.handle) == handle;
        }
        Ok(())
    }

    pub fn slot_active(&self) -> Option<&Slot> {
        self.slots.iter().find(|s| s.active)
    }

    /// Legacy view of the target type: the type of the first slot, or the
    /// `id_root` of unconverted legacy data.
    pub fn id_root(&self) -> IdType {
        if let Some(slot) = self.slots.first() {
            return slot.target_id_type;
        }
        self.legacy.as_ref().map_or(IdType::Unspecified, |l| l.id_root)
    }

    /// Set the legacy `id_root`. On a layered Action this types the first
    /// slot (creating an untyped one if there are none), following the usual
    /// set-once rule.
    pub fn set_id_root(&mut self, id_type: IdType) -> Result<(), ActionError> {
        if !self.is_action_layered() {
            if let Some(legacy) = self.legacy.as_mut() {
                legacy.id_root = id_type;
            }
            return Ok(());
        }
        let handle = self.slot_legacy_ensure()?;
        self.slot_target_id_type_set(handle, id_type)
    }

    // ----- layers & strips -----

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Append a layer, subject to the layer limit.
    pub fn layer_new(&mut self, name: &str) -> Result<&mut Layer, ActionError> {
        self.ensure_layered("layers")?;
        if !self.policy.allows_layer(self.layers.len()) {
            return Err(ActionError::LayerLimit {
                limit: self.policy.max_layers_per_action.unwrap_or(usize::MAX),
            });
        }
        let layer = Layer::new(&self.ids, self.policy, truncate_utf8(name, NAME_MAX).to_string());
        self.layers.push(layer);
        let last = self.layers.len() - 1;
        Ok(&mut self.layers[last])
    }

    pub fn layer_remove(&mut self, id: LayerId) -> Result<Layer, ActionError> {
        let pos = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(ActionError::LayerNotInAction)?;
        Ok(self.layers.remove(pos))
    }

    pub fn strip(&self, id: StripId) -> Option<&Strip> {
        self.layers.iter().find_map(|layer| layer.strip(id))
    }

    pub fn strip_mut(&mut self, id: StripId) -> Option<&mut Strip> {
        self.layers.iter_mut().find_map(|layer| layer.strip_mut(id))
    }

    /// Strip `id` of this Action, after checking that `handle` is one of
    /// its slots.
    fn strip_for_slot(&mut self, id: StripId, handle: SlotHandle) -> Result<&mut Strip, ActionError> {
        self.slot_index(handle)?;
        self.strip_mut(id).ok_or(ActionError::StripNotInAction)
    }

    /// Create an empty channelbag for `handle` in strip `strip`. One
    /// channelbag per slot and strip.
    pub fn channelbag_new(&mut self, strip: StripId, handle: SlotHandle) -> Result<&mut Channelbag, ActionError> {
        self.strip_for_slot(strip, handle)?.channelbag_new(handle)
    }

    pub fn channelbag_ensure(&mut self, strip: StripId, handle: SlotHandle) -> Result<&mut Channelbag, ActionError> {
        Ok(self.strip_for_slot(strip, handle)?.channelbag_ensure(handle))
    }

    /// Channelbag for `handle` in `strip`, created when `ensure` is set.
    pub fn channelbag_for(
        &mut self,
        strip: StripId,
        handle: SlotHandle,
        ensure: bool,
    ) -> Result<&mut Channelbag, ActionError> {
        self.strip_for_slot(strip, handle)?.channelbag_for(handle, ensure)
    }

    /// Channelbag for `handle` in the first keyframe strip, creating the
    /// layer, strip and channelbag as needed.
    pub fn keyframe_channelbag_ensure(&mut self, handle: SlotHandle) -> Result<&mut Channelbag, ActionError> {
        self.slot_index(handle)?;
        Ok(self.keyframe_strip_ensure()?.channelbag_ensure(handle))
    }

    /// The keyframe strip of the first layer, creating the layer and strip
    /// when missing.
    pub fn keyframe_strip_ensure(&mut self) -> Result<&mut Strip, ActionError> {
        self.ensure_layered("layers")?;
        if self.layers.is_empty() {
            self.layer_new(DEFAULT_LAYER_NAME)?;
        }
        let layer = &mut self.layers[0];
        let pos = match layer
            .strips
            .iter()
            .position(|s| s.strip_type() == StripType::Keyframe)
        {
            Some(pos) => pos,
            None => {
                layer.strip_new(StripType::Keyframe)?;
                layer.strips.len() - 1
            }
        };
        Ok(&mut layer.strips[pos])
    }

    // ----- channels -----

    /// Channelbags for `handle`, in layer and strip order.
    pub fn channelbags_for_slot(&self, handle: SlotHandle) -> impl Iterator<Item = &Channelbag> + '_ {
        self.layers
            .iter()
            .flat_map(|layer| layer.strips.iter())
            .filter_map(move |strip| strip.channelbag(handle))
    }

    /// First channelbag for `handle`.
    pub fn channelbag_for_slot(&self, handle: SlotHandle) -> Option<&Channelbag> {
        self.channelbags_for_slot(handle).next()
    }

    pub fn channelbag_for_slot_mut(&mut self, handle: SlotHandle) -> Option<&mut Channelbag> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.strips.iter_mut())
            .find_map(|strip| strip.channelbag_mut(handle))
    }

    pub fn fcurves_for_slot(&self, handle: SlotHandle) -> Vec<&FCurve> {
        self.channelbags_for_slot(handle)
            .flat_map(|bag| bag.fcurves().iter())
            .collect()
    }

    /// Curves that animate `handle`, each paired with the influence of its
    /// layer. Unconverted legacy Actions animate any user with all of their
    /// curves at full influence.
    pub fn channel_curves(&self, handle: SlotHandle) -> Vec<(&dyn ChannelCurve, f32)> {
        if !self.is_action_layered() {
            return self
                .legacy
                .iter()
                .flat_map(|l| l.fcurves.iter())
                .map(|fc| (fc as &dyn ChannelCurve, 1.0))
                .collect();
        }
        let mut curves = Vec::new();
        for layer in &self.layers {
            for strip in &layer.strips {
                if let Some(bag) = strip.channelbag(handle) {
                    curves.extend(
                        bag.fcurves()
                            .iter()
                            .map(|fc| (fc as &dyn ChannelCurve, layer.influence)),
                    );
                }
            }
        }
        curves
    }

    /// Insert a key for `handle` into the first keyframe strip.
    pub fn key_insert(
        &mut self,
        handle: SlotHandle,
        data_path: &str,
        array_index: i32,
        key: Keyframe,
        group_name: Option<&str>,
    ) -> Result<FCurveId, ActionError> {
        self.slot_index(handle)?;
        if data_path.is_empty() {
            return Err(ActionError::EmptyDataPath);
        }
        let strip = self.keyframe_strip_ensure()?;
        Ok(strip
            .key_insert(handle, data_path, array_index, key, group_name)?
            .id())
    }

    // ----- first-slot F-Curve view -----
    //
    // Code written against single-slot Actions sees the F-Curves and groups
    // of the first slot's channelbag.

    /// The first slot's channelbag in the first keyframe strip, if any.
    pub fn first_slot_channelbag(&self) -> Option<&Channelbag> {
        let handle = self.slots.first()?.handle;
        self.layers
            .first()?
            .strips
            .iter()
            .find(|s| s.strip_type() == StripType::Keyframe)?
            .channelbag(handle)
    }

    fn first_slot_channelbag_mut(&mut self) -> Option<&mut Channelbag> {
        let handle = self.slots.first()?.handle;
        self.layers
            .first_mut()?
            .strips
            .iter_mut()
            .find(|s| s.strip_type() == StripType::Keyframe)?
            .channelbag_mut(handle)
    }

    /// The first slot's channelbag, creating an untyped `"Legacy Slot"`,
    /// the layer, the strip and the channelbag when missing.
    pub fn first_slot_channelbag_ensure(&mut self) -> Result<&mut Channelbag, ActionError> {
        self.ensure_layered("F-Curves")?;
        let handle = self.slot_legacy_ensure()?;
        Ok(self.keyframe_strip_ensure()?.channelbag_ensure(handle))
    }

    pub fn fcurves(&self) -> &[FCurve] {
        self.first_slot_channelbag()
            .map(Channelbag::fcurves)
            .unwrap_or_default()
    }

    pub fn groups(&self) -> &[ChannelGroup] {
        self.first_slot_channelbag()
            .map(Channelbag::groups)
            .unwrap_or_default()
    }

    /// Create an F-Curve for the first slot, in `group_name` when given.
    pub fn fcurve_new(
        &mut self,
        data_path: &str,
        array_index: i32,
        group_name: Option<&str>,
    ) -> Result<FCurveId, ActionError> {
        if data_path.is_empty() {
            return Err(ActionError::EmptyDataPath);
        }
        self.ensure_layered("F-Curves")?;
        if self.fcurve_find(data_path, array_index).is_some() {
            return Err(ActionError::DuplicateFCurve {
                data_path: data_path.to_string(),
                array_index,
            });
        }
        Ok(self
            .first_slot_channelbag_ensure()?
            .fcurve_ensure(data_path, array_index, group_name)?
            .id())
    }

    pub fn fcurve_find(&self, data_path: &str, array_index: i32) -> Option<&FCurve> {
        self.first_slot_channelbag()?.fcurve_find(data_path, array_index)
    }

    pub fn fcurve_remove(&mut self, id: FCurveId) -> Result<FCurve, ActionError> {
        self.first_slot_channelbag_mut()
            .ok_or(ActionError::FCurveNotInChannelbag)?
            .fcurve_remove(id)
    }

    pub fn fcurves_clear(&mut self) {
        if let Some(bag) = self.first_slot_channelbag_mut() {
            bag.fcurves_clear();
        }
    }

    /// Manual frame range if set, else the range spanned by all keys.
    pub fn frame_range(&self) -> Option<(f32, f32)> {
        if let Some([start, end]) = self.manual_frame_range {
            return Some((start, end));
        }
        let layered = self
            .layers
            .iter()
            .flat_map(|l| l.strips.iter())
            .flat_map(|s| s.channelbags().iter())
            .flat_map(|b| b.fcurves().iter())
            .filter_map(|fc| fc.frame_range());
        let legacy = self
            .legacy
            .iter()
            .flat_map(|l| l.fcurves.iter())
            .filter_map(|fc| fc.frame_range());
        layered.chain(legacy).reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
    }
}
