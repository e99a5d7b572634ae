//! Strips and their type-specific data.
//!
//! Keyframe strips are the only kind; `StripData` is a tagged enum so new
//! kinds can be added without touching code that only needs the common
//! strip surface. Strips have no frame range of their own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::channelbag::Channelbag;
use crate::error::ActionError;
use crate::fcurve::FCurve;
use crate::ids::{ChannelbagId, IdSource, SlotHandle, StripId};
use crate::keyframe::Keyframe;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StripType {
    #[default]
    Keyframe,
}

impl StripType {
    pub fn as_str(self) -> &'static str {
        match self {
            StripType::Keyframe => "KEYFRAME",
        }
    }
}

impl fmt::Display for StripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StripType {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KEYFRAME" => Ok(StripType::Keyframe),
            other => Err(ActionError::UnsupportedStripType {
                name: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KeyframeStripData {
    #[serde(default)]
    pub(crate) channelbags: Vec<Channelbag>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StripData {
    Keyframe(KeyframeStripData),
}

impl StripData {
    fn new(strip_type: StripType) -> Self {
        match strip_type {
            StripType::Keyframe => StripData::Keyframe(KeyframeStripData::default()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Strip {
    pub(crate) id: StripId,
    pub(crate) data: StripData,
    #[serde(skip)]
    ids: IdSource,
}

impl Strip {
    pub(crate) fn new(ids: &IdSource, strip_type: StripType) -> Self {
        Self {
            id: ids.alloc_strip(),
            data: StripData::new(strip_type),
            ids: IdSource::clone(ids),
        }
    }

    pub(crate) fn attach(&mut self, ids: &IdSource) {
        ids.observe(self.id.0);
        for bag in self.channelbags_mut() {
            bag.attach(ids);
        }
        self.ids = IdSource::clone(ids);
    }

    pub fn id(&self) -> StripId {
        self.id
    }

    pub fn strip_type(&self) -> StripType {
        match self.data {
            StripData::Keyframe(_) => StripType::Keyframe,
        }
    }

    pub fn data(&self) -> &StripData {
        &self.data
    }

    fn bags(&self) -> &Vec<Channelbag> {
        match &self.data {
            StripData::Keyframe(data) => &data.channelbags,
        }
    }

    fn bags_mut(&mut self) -> &mut Vec<Channelbag> {
        match &mut self.data {
            StripData::Keyframe(data) => &mut data.channelbags,
        }
    }

    pub fn channelbags(&self) -> &[Channelbag] {
        self.bags()
    }

    pub(crate) fn channelbags_mut(&mut self) -> impl Iterator<Item = &mut Channelbag> {
        self.bags_mut().iter_mut()
    }

    /// Create an empty channelbag for `slot`. One channelbag per slot.
    /// `slot` must already be checked against the owning Action.
    pub(crate) fn channelbag_new(&mut self, slot: SlotHandle) -> Result<&mut Channelbag, ActionError> {
        if self.channelbag(slot).is_some() {
            return Err(ActionError::DuplicateChannelbag { handle: slot.0 });
        }
        let bag = Channelbag::new(&self.ids, slot);
        let bags = self.bags_mut();
        bags.push(bag);
        let last = bags.len() - 1;
        Ok(&mut bags[last])
    }

    pub fn channelbag(&self, slot: SlotHandle) -> Option<&Channelbag> {
        self.bags().iter().find(|bag| bag.slot_handle == slot)
    }

    pub fn channelbag_mut(&mut self, slot: SlotHandle) -> Option<&mut Channelbag> {
        self.bags_mut().iter_mut().find(|bag| bag.slot_handle == slot)
    }

    pub fn channelbag_by_id(&self, id: ChannelbagId) -> Option<&Channelbag> {
        self.bags().iter().find(|bag| bag.id == id)
    }

    pub fn channelbag_by_id_mut(&mut self, id: ChannelbagId) -> Option<&mut Channelbag> {
        self.bags_mut().iter_mut().find(|bag| bag.id == id)
    }

    pub(crate) fn channelbag_ensure(&mut self, slot: SlotHandle) -> &mut Channelbag {
        let pos = match self.bags().iter().position(|bag| bag.slot_handle == slot) {
            Some(pos) => pos,
            None => {
                let bag = Channelbag::new(&self.ids, slot);
                let bags = self.bags_mut();
                bags.push(bag);
                bags.len() - 1
            }
        };
        &mut self.bags_mut()[pos]
    }

    /// Lookup with optional creation. Without `ensure` a missing channelbag
    /// is reported as not found.
    pub(crate) fn channelbag_for(
        &mut self,
        slot: SlotHandle,
        ensure: bool,
    ) -> Result<&mut Channelbag, ActionError> {
        if ensure {
            return Ok(self.channelbag_ensure(slot));
        }
        self.channelbag_mut(slot)
            .ok_or(ActionError::ChannelbagNotFound { handle: slot.0 })
    }

    /// Remove a channelbag owned by this strip.
    pub fn channelbag_remove(&mut self, id: ChannelbagId) -> Result<Channelbag, ActionError> {
        let bags = self.bags_mut();
        let pos = bags
            .iter()
            .position(|bag| bag.id == id)
            .ok_or(ActionError::ChannelbagNotInStrip)?;
        Ok(bags.remove(pos))
    }

    /// Drop the channelbag of a removed slot, if any.
    pub(crate) fn channelbag_remove_for_slot(&mut self, slot: SlotHandle) {
        self.bags_mut().retain(|bag| bag.slot_handle != slot);
    }

    /// Key `(data_path, array_index)` for `slot`, creating the channelbag and
    /// F-Curve as needed.
    pub(crate) fn key_insert(
        &mut self,
        slot: SlotHandle,
        data_path: &str,
        array_index: i32,
        key: Keyframe,
        group_name: Option<&str>,
    ) -> Result<&mut FCurve, ActionError> {
        if data_path.is_empty() {
            return Err(ActionError::EmptyDataPath);
        }
        let fcurve = self
            .channelbag_ensure(slot)
            .fcurve_ensure(data_path, array_index, group_name)?;
        fcurve.insert_keyframe(key);
        Ok(fcurve)
    }
}
