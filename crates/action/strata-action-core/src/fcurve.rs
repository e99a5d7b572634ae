//! F-Curves: one animated scalar channel inside a channelbag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{FCurveId, GroupId};
use crate::keyframe::{evaluate_keyframes, insert_sorted, Extrapolation, Keyframe};

/// Address of one animated scalar: a property path plus an array index.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelPath {
    pub data_path: String,
    pub array_index: i32,
}

impl ChannelPath {
    pub fn new(data_path: impl Into<String>, array_index: i32) -> Self {
        Self {
            data_path: data_path.into(),
            array_index,
        }
    }
}

impl fmt::Display for ChannelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.data_path, self.array_index)
    }
}

/// Anything evaluation can read a channel value from. Implemented by layered
/// and legacy F-Curves so both feed the same evaluation pipeline.
pub trait ChannelCurve {
    fn data_path(&self) -> &str;
    fn array_index(&self) -> i32;
    fn keyframes(&self) -> &[Keyframe];
    fn extrapolation(&self) -> Extrapolation;
    fn is_muted(&self) -> bool;

    fn channel(&self) -> ChannelPath {
        ChannelPath::new(self.data_path(), self.array_index())
    }

    fn evaluate(&self, frame: f32) -> f32 {
        evaluate_keyframes(self.keyframes(), self.extrapolation(), frame)
    }

    /// `(first, last)` key frame, or `None` without keys.
    fn frame_range(&self) -> Option<(f32, f32)> {
        let keys = self.keyframes();
        Some((keys.first()?.frame(), keys.last()?.frame()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub(crate) id: FCurveId,
    pub(crate) data_path: String,
    pub(crate) array_index: i32,
    /// Group of the owning channelbag this curve belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) group: Option<GroupId>,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub extrapolation: Extrapolation,
    #[serde(default)]
    pub mute: bool,
}

impl FCurve {
    pub(crate) fn new(id: FCurveId, data_path: impl Into<String>, array_index: i32) -> Self {
        Self {
            id,
            data_path: data_path.into(),
            array_index,
            group: None,
            keyframes: Vec::new(),
            extrapolation: Extrapolation::default(),
            mute: false,
        }
    }

    pub fn id(&self) -> FCurveId {
        self.id
    }

    pub fn data_path(&self) -> &str {
        &self.data_path
    }

    pub fn array_index(&self) -> i32 {
        self.array_index
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    #[inline]
    pub fn matches(&self, data_path: &str, array_index: i32) -> bool {
        self.array_index == array_index && self.data_path == data_path
    }

    /// Insert a key, replacing one on the same frame. Returns its index.
    pub fn insert_keyframe(&mut self, key: Keyframe) -> usize {
        insert_sorted(&mut self.keyframes, key)
    }
}

impl ChannelCurve for FCurve {
    fn data_path(&self) -> &str {
        &self.data_path
    }

    fn array_index(&self) -> i32 {
        self.array_index
    }

    fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    fn is_muted(&self) -> bool {
        self.mute
    }
}
