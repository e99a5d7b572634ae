//! Animated datablocks and the places on them that reference an Action:
//! the direct assignment, NLA strips and Action constraints.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::fcurve::ChannelPath;
use crate::id_type::IdType;
use crate::ids::{ActionId, DatablockId, SlotHandle};

/// An (Action, slot) reference, plus the identifier of the slot last used
/// here so a later re-assignment can find it again.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionAssignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionId>,
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub slot_handle: SlotHandle,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_slot_identifier: String,
}

fn is_unassigned(handle: &SlotHandle) -> bool {
    !handle.is_assigned()
}

impl ActionAssignment {
    pub fn uses(&self, action: ActionId) -> bool {
        self.action == Some(action)
    }

    pub fn uses_slot(&self, action: ActionId, handle: SlotHandle) -> bool {
        self.uses(action) && self.slot_handle == handle
    }
}

/// Where on a datablock an assignment lives.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AssignmentSite {
    AnimData,
    NlaStrip { track: usize, strip: usize },
    Constraint(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimData {
    #[serde(flatten)]
    pub assignment: ActionAssignment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nla_tracks: Vec<NlaTrack>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NlaTrack {
    pub name: String,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub strips: Vec<NlaStrip>,
}

fn one() -> f32 {
    1.0
}

/// A legacy NLA strip wrapping a whole Action. Strip time maps onto the
/// Action's `[action_frame_start, action_frame_end]` range, scaled and
/// repeated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NlaStrip {
    pub name: String,
    #[serde(flatten)]
    pub assignment: ActionAssignment,
    pub frame_start: f32,
    pub frame_end: f32,
    pub action_frame_start: f32,
    pub action_frame_end: f32,
    #[serde(default = "one")]
    pub scale: f32,
    #[serde(default = "one")]
    pub repeat: f32,
    #[serde(default = "one")]
    pub influence: f32,
    #[serde(default)]
    pub mute: bool,
}

impl NlaStrip {
    /// A strip playing `action_range` once, starting at `frame_start`.
    pub fn new(name: impl Into<String>, frame_start: f32, action_range: (f32, f32)) -> Self {
        let (action_start, action_end) = action_range;
        Self {
            name: name.into(),
            assignment: ActionAssignment::default(),
            frame_start,
            frame_end: frame_start + (action_end - action_start),
            action_frame_start: action_start,
            action_frame_end: action_end,
            scale: 1.0,
            repeat: 1.0,
            influence: 1.0,
            mute: false,
        }
    }

    /// Frame inside the Action for scene frame `frame`.
    pub fn action_time(&self, frame: f32) -> f32 {
        let action_len = self.action_frame_end - self.action_frame_start;
        let scale = if self.scale.abs() > f32::EPSILON { self.scale } else { 1.0 };
        let repeat = if self.repeat > f32::EPSILON { self.repeat } else { 1.0 };
        if action_len.abs() <= f32::EPSILON {
            return self.action_frame_start;
        }
        let local = (frame - self.frame_start) / scale;
        // The last frame of the strip maps onto the Action's end instead of
        // wrapping back to its start.
        if frame >= self.frame_end || local >= action_len * repeat {
            return self.action_frame_end;
        }
        let local = local.max(0.0) % action_len;
        self.action_frame_start + local
    }

    pub fn contains(&self, frame: f32) -> bool {
        frame >= self.frame_start && frame <= self.frame_end
    }
}

/// Maps a channel of another datablock onto a frame of an Action, and
/// applies that Action's pose to the owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionConstraint {
    pub name: String,
    #[serde(flatten)]
    pub assignment: ActionAssignment,
    /// Datablock whose channel drives the Action; `None` evaluates at
    /// `frame_start`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<DatablockId>,
    pub transform_channel: ChannelPath,
    pub min: f32,
    pub max: f32,
    pub frame_start: f32,
    pub frame_end: f32,
    #[serde(default = "one")]
    pub influence: f32,
    #[serde(default)]
    pub mute: bool,
}

impl ActionConstraint {
    /// Action frame for target channel value `value`.
    pub fn action_frame(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span.abs() <= f32::EPSILON {
            return self.frame_start;
        }
        let t = ((value - self.min) / span).clamp(0.0, 1.0);
        self.frame_start + (self.frame_end - self.frame_start) * t
    }
}

/// Anything an Action can animate: an object, material, camera, ...
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Datablock {
    pub(crate) id: DatablockId,
    pub(crate) name: String,
    pub(crate) id_type: IdType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_data: Option<AnimData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ActionConstraint>,
    /// Un-animated property values, by data path.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, Vec<f32>>,
}

impl Datablock {
    pub(crate) fn new(id: DatablockId, name: String, id_type: IdType) -> Self {
        Self {
            id,
            name,
            id_type,
            animation_data: None,
            constraints: Vec::new(),
            properties: HashMap::new(),
        }
    }

    pub fn id(&self) -> DatablockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_type(&self) -> IdType {
        self.id_type
    }

    /// Name with the type code in front, e.g. `"OBCube"`. Used to find a
    /// matching slot on assignment.
    pub fn prefixed_name(&self) -> String {
        format!("{}{}", self.id_type.code(), self.name)
    }

    pub fn anim_data_ensure(&mut self) -> &mut AnimData {
        self.animation_data.get_or_insert_with(AnimData::default)
    }

    /// The direct Action of this datablock.
    pub fn action(&self) -> Option<ActionId> {
        self.animation_data.as_ref().and_then(|ad| ad.assignment.action)
    }

    pub fn assignment(&self, site: AssignmentSite) -> Option<&ActionAssignment> {
        match site {
            AssignmentSite::AnimData => self.animation_data.as_ref().map(|ad| &ad.assignment),
            AssignmentSite::NlaStrip { track, strip } => self
                .animation_data
                .as_ref()?
                .nla_tracks
                .get(track)?
                .strips
                .get(strip)
                .map(|s| &s.assignment),
            AssignmentSite::Constraint(idx) => self.constraints.get(idx).map(|c| &c.assignment),
        }
    }

    /// Mutable assignment at `site`. The direct site is created on demand.
    pub fn assignment_mut(&mut self, site: AssignmentSite) -> Option<&mut ActionAssignment> {
        match site {
            AssignmentSite::AnimData => Some(&mut self.anim_data_ensure().assignment),
            AssignmentSite::NlaStrip { track, strip } => self
                .animation_data
                .as_mut()?
                .nla_tracks
                .get_mut(track)?
                .strips
                .get_mut(strip)
                .map(|s| &mut s.assignment),
            AssignmentSite::Constraint(idx) => {
                self.constraints.get_mut(idx).map(|c| &mut c.assignment)
            }
        }
    }

    /// Every assignment site on this datablock, direct one first.
    pub fn assignment_sites(&self) -> Vec<AssignmentSite> {
        let mut sites = Vec::new();
        if let Some(ad) = &self.animation_data {
            sites.push(AssignmentSite::AnimData);
            for (t, track) in ad.nla_tracks.iter().enumerate() {
                for s in 0..track.strips.len() {
                    sites.push(AssignmentSite::NlaStrip { track: t, strip: s });
                }
            }
        }
        sites.extend((0..self.constraints.len()).map(AssignmentSite::Constraint));
        sites
    }

    /// Sites currently referencing `action`.
    pub fn sites_using(&self, action: ActionId) -> Vec<AssignmentSite> {
        self.assignment_sites()
            .into_iter()
            .filter(|site| self.assignment(*site).is_some_and(|a| a.uses(action)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn nla_time_mapping_scales_and_repeats() {
        let mut strip = NlaStrip::new("s", 10.0, (1.0, 11.0));
        assert!(approx(strip.action_time(10.0), 1.0));
        assert!(approx(strip.action_time(15.0), 6.0));
        assert!(approx(strip.action_time(20.0), 11.0));

        strip.repeat = 2.0;
        strip.frame_end = 30.0;
        assert!(approx(strip.action_time(25.0), 6.0));
        assert!(approx(strip.action_time(30.0), 11.0));

        strip.repeat = 1.0;
        strip.scale = 2.0;
        strip.frame_end = 30.0;
        assert!(approx(strip.action_time(20.0), 6.0));
    }

    #[test]
    fn constraint_maps_value_range_onto_frames() {
        let c = ActionConstraint {
            name: "Action".into(),
            assignment: ActionAssignment::default(),
            target: None,
            transform_channel: ChannelPath::new("location", 0),
            min: -1.0,
            max: 1.0,
            frame_start: 1.0,
            frame_end: 11.0,
            influence: 1.0,
            mute: false,
        };
        assert!(approx(c.action_frame(0.0), 6.0));
        assert!(approx(c.action_frame(5.0), 11.0));
        assert!(approx(c.action_frame(-5.0), 1.0));
    }

    #[test]
    fn sites_enumerate_direct_nla_and_constraints() {
        let json = r#"{
            "id": 3, "name": "Cube", "id_type": "OBJECT",
            "animation_data": {
                "action": 1,
                "nla_tracks": [{"name": "Track", "strips": [{
                    "name": "s", "action": 1, "frame_start": 1.0, "frame_end": 10.0,
                    "action_frame_start": 1.0, "action_frame_end": 10.0
                }]}]
            }
        }"#;
        let db: Datablock = serde_json::from_str(json).unwrap();
        assert_eq!(db.prefixed_name(), "OBCube");
        assert_eq!(
            db.sites_using(ActionId(1)),
            vec![
                AssignmentSite::AnimData,
                AssignmentSite::NlaStrip { track: 0, strip: 0 }
            ]
        );
    }
}
