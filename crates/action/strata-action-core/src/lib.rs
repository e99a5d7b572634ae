#![allow(dead_code)]
//! Strata Action Core
//!
//! Layered animation data: an [`Action`] owns slots (one per animated
//! datablock identity) and layers; layers own strips; keyframe strips own one
//! [`Channelbag`] per slot; channelbags own F-Curves and channel groups.
//!
//! The [`Document`] owns Actions and the datablocks using them, handles
//! assignment, and converts pre-layered ("legacy") files on load.

pub mod action;
pub mod anim_data;
pub mod channelbag;
pub mod config;
pub mod document;
pub mod error;
pub mod eval;
pub mod fcurve;
pub mod id_type;
pub mod ids;
pub mod keyframe;
pub mod layer;
pub mod legacy;
pub mod naming;
pub mod slot;
pub mod strip;
pub mod versioning;

// Re-exports for consumers
pub use action::Action;
pub use anim_data::{
    ActionAssignment, ActionConstraint, AnimData, AssignmentSite, Datablock, NlaStrip, NlaTrack,
};
pub use channelbag::{ChannelGroup, Channelbag, GroupAssignment, LegacyGroupAssignmentQuirk};
pub use config::{Config, StructurePolicy};
pub use document::{default_channel_group_for_path, Document, DOCUMENT_VERSION};
pub use error::{ActionError, DocumentError, ErrorKind};
pub use eval::ChannelValues;
pub use fcurve::{ChannelCurve, ChannelPath, FCurve};
pub use id_type::IdType;
pub use ids::{
    ActionId, ChannelbagId, DatablockId, FCurveId, GroupId, LayerId, SlotHandle, SlotRef, StripId,
};
pub use keyframe::{Extrapolation, Interpolation, Keyframe};
pub use layer::Layer;
pub use legacy::{LegacyAnimato, LegacyFCurve, LegacyGroup};
pub use slot::Slot;
pub use strip::{Strip, StripData, StripType};
pub use versioning::VersioningReport;
