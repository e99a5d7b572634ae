//! Pre-layered ("Animato") Action content.
//!
//! A legacy Action stores its F-Curves and groups directly, has no slots and
//! animates whatever datablock it is assigned to. Groups are referenced by
//! name. This content is only ever read: versioning moves it into a layered
//! structure, and evaluation reads it through [`ChannelCurve`].

use serde::{Deserialize, Serialize};

use crate::fcurve::ChannelCurve;
use crate::id_type::IdType;
use crate::keyframe::{Extrapolation, Keyframe};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyAnimato {
    /// Datablock type the Action is meant for; `Unspecified` when unknown.
    #[serde(default)]
    pub id_root: IdType,
    #[serde(default)]
    pub groups: Vec<LegacyGroup>,
    #[serde(default)]
    pub fcurves: Vec<LegacyFCurve>,
}

impl LegacyAnimato {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.fcurves.is_empty()
    }

    /// Group names in collection order, followed by names only referenced by
    /// F-Curves (in first-reference order).
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.iter().map(|g| g.name.as_str()).collect();
        for fcurve in &self.fcurves {
            if let Some(group) = fcurve.group.as_deref() {
                if !names.contains(&group) {
                    names.push(group);
                }
            }
        }
        names
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyGroup {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyFCurve {
    pub data_path: String,
    #[serde(default)]
    pub array_index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub extrapolation: Extrapolation,
    #[serde(default)]
    pub mute: bool,
}

impl ChannelCurve for LegacyFCurve {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_only_groups_are_appended() {
        let json = r#"{
            "id_root": "OBJECT",
            "groups": [{"name": "Object Transforms"}],
            "fcurves": [
                {"data_path": "location", "group": "Extra"},
                {"data_path": "scale", "group": "Object Transforms"},
                {"data_path": "hide", "group": "Extra"}
            ]
        }"#;
        let legacy: LegacyAnimato = serde_json::from_str(json).unwrap();
        assert_eq!(legacy.id_root, IdType::Object);
        assert_eq!(legacy.group_names(), vec!["Object Transforms", "Extra"]);
        assert!(!legacy.is_empty());
    }
}
