//! Datablock types and their two-letter identifier codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// Type of an animatable datablock.
///
/// `Unspecified` is only used for slots that do not yet know what they
/// animate (slots converted from untyped legacy Actions).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum IdType {
    #[serde(rename = "ACTION")]
    Action,
    #[serde(rename = "ARMATURE")]
    Armature,
    #[serde(rename = "BRUSH")]
    Brush,
    #[serde(rename = "CACHEFILE")]
    CacheFile,
    #[serde(rename = "CAMERA")]
    Camera,
    #[serde(rename = "COLLECTION")]
    Collection,
    #[serde(rename = "CURVE")]
    Curve,
    #[serde(rename = "CURVES")]
    Curves,
    #[serde(rename = "FONT")]
    Font,
    #[serde(rename = "GREASEPENCIL")]
    GreasePencil,
    #[serde(rename = "GREASEPENCIL_V3")]
    GreasePencilV3,
    #[serde(rename = "IMAGE")]
    Image,
    #[serde(rename = "KEY")]
    Key,
    #[serde(rename = "LATTICE")]
    Lattice,
    #[serde(rename = "LIBRARY")]
    Library,
    #[serde(rename = "LIGHT")]
    Light,
    #[serde(rename = "LIGHT_PROBE")]
    LightProbe,
    #[serde(rename = "LINESTYLE")]
    LineStyle,
    #[serde(rename = "MASK")]
    Mask,
    #[serde(rename = "MATERIAL")]
    Material,
    #[serde(rename = "MESH")]
    Mesh,
    #[serde(rename = "META")]
    Meta,
    #[serde(rename = "MOVIECLIP")]
    MovieClip,
    #[serde(rename = "NODETREE")]
    NodeTree,
    #[serde(rename = "OBJECT")]
    Object,
    #[serde(rename = "PAINTCURVE")]
    PaintCurve,
    #[serde(rename = "PALETTE")]
    Palette,
    #[serde(rename = "PARTICLE")]
    Particle,
    #[serde(rename = "POINTCLOUD")]
    PointCloud,
    #[serde(rename = "SCENE")]
    Scene,
    #[serde(rename = "SCREEN")]
    Screen,
    #[serde(rename = "SOUND")]
    Sound,
    #[serde(rename = "SPEAKER")]
    Speaker,
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "TEXTURE")]
    Texture,
    #[serde(rename = "VOLUME")]
    Volume,
    #[serde(rename = "WINDOWMANAGER")]
    WindowManager,
    #[serde(rename = "WORKSPACE")]
    Workspace,
    #[serde(rename = "WORLD")]
    World,
    #[default]
    #[serde(rename = "UNSPECIFIED")]
    Unspecified,
}

/// (type, code, enum name). Codes are part of the persisted identifier format.
const ID_TYPE_TABLE: &[(IdType, &str, &str)] = &[
    (IdType::Action, "AC", "ACTION"),
    (IdType::Armature, "AR", "ARMATURE"),
    (IdType::Brush, "BR", "BRUSH"),
    (IdType::CacheFile, "CF", "CACHEFILE"),
    (IdType::Camera, "CA", "CAMERA"),
    (IdType::Collection, "GR", "COLLECTION"),
    (IdType::Curve, "CU", "CURVE"),
    (IdType::Curves, "CV", "CURVES"),
    (IdType::Font, "VF", "FONT"),
    (IdType::GreasePencil, "GD", "GREASEPENCIL"),
    (IdType::GreasePencilV3, "GP", "GREASEPENCIL_V3"),
    (IdType::Image, "IM", "IMAGE"),
    (IdType::Key, "KE", "KEY"),
    (IdType::Lattice, "LT", "LATTICE"),
    (IdType::Library, "LI", "LIBRARY"),
    (IdType::Light, "LA", "LIGHT"),
    (IdType::LightProbe, "LP", "LIGHT_PROBE"),
    (IdType::LineStyle, "LS", "LINESTYLE"),
    (IdType::Mask, "MS", "MASK"),
    (IdType::Material, "MA", "MATERIAL"),
    (IdType::Mesh, "ME", "MESH"),
    (IdType::Meta, "MB", "META"),
    (IdType::MovieClip, "MC", "MOVIECLIP"),
    (IdType::NodeTree, "NT", "NODETREE"),
    (IdType::Object, "OB", "OBJECT"),
    (IdType::PaintCurve, "PC", "PAINTCURVE"),
    (IdType::Palette, "PL", "PALETTE"),
    (IdType::Particle, "PA", "PARTICLE"),
    (IdType::PointCloud, "PT", "POINTCLOUD"),
    (IdType::Scene, "SC", "SCENE"),
    (IdType::Screen, "SR", "SCREEN"),
    (IdType::Sound, "SO", "SOUND"),
    (IdType::Speaker, "SK", "SPEAKER"),
    (IdType::Text, "TX", "TEXT"),
    (IdType::Texture, "TE", "TEXTURE"),
    (IdType::Volume, "VO", "VOLUME"),
    (IdType::WindowManager, "WM", "WINDOWMANAGER"),
    (IdType::Workspace, "WS", "WORKSPACE"),
    (IdType::World, "WO", "WORLD"),
    (IdType::Unspecified, "XX", "UNSPECIFIED"),
];

impl IdType {
    /// Two-letter code used as slot identifier prefix.
    pub fn code(self) -> &'static str {
        Self::entry(self).1
    }

    /// Upper-case enum name (`"OBJECT"`, `"UNSPECIFIED"`, ...).
    pub fn as_str(self) -> &'static str {
        Self::entry(self).2
    }

    pub fn from_code(code: &str) -> Option<IdType> {
        ID_TYPE_TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(t, _, _)| *t)
    }

    #[inline]
    pub fn is_specified(self) -> bool {
        self != IdType::Unspecified
    }

    pub fn all() -> impl Iterator<Item = IdType> {
        ID_TYPE_TABLE.iter().map(|(t, _, _)| *t)
    }

    fn entry(self) -> &'static (IdType, &'static str, &'static str) {
        ID_TYPE_TABLE
            .iter()
            .find(|(t, _, _)| *t == self)
            .unwrap_or(&ID_TYPE_TABLE[ID_TYPE_TABLE.len() - 1])
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdType {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ID_TYPE_TABLE
            .iter()
            .find(|(_, _, name)| *name == s)
            .map(|(t, _, _)| *t)
            .ok_or_else(|| ActionError::UnknownIdType { name: s.to_string() })
    }
}
