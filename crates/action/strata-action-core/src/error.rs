//! Error types for Action editing, assignment and document I/O.

use serde::{Deserialize, Serialize};

/// Broad class of an [`ActionError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidArgument,
    Structural,
    Ownership,
    NotFound,
}

/// Failure of an editing or assignment call. A call that returns an error
/// has not modified anything.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("Invalid slot name '{name}': name must not be empty")]
    EmptySlotName { name: String },

    #[error("Slots cannot be created with an unspecified target ID type")]
    UnspecifiedSlotType,

    #[error("Action slot identifiers should be at least three characters, got '{identifier}'")]
    SlotIdentifierTooShort { identifier: String },

    #[error("F-Curve data path empty, invalid argument")]
    EmptyDataPath,

    #[error("Strip type '{name}' is not supported")]
    UnsupportedStripType { name: String },

    #[error("Unknown ID type '{name}'")]
    UnknownIdType { name: String },

    #[error("Cannot add {what} to a legacy Action '{action}'. Convert it to a layered Action first.")]
    LegacyAction { action: String, what: &'static str },

    #[error("An Action may not have more than {limit} layer(s)")]
    LayerLimit { limit: usize },

    #[error("A layer may not have more than {limit} strip(s)")]
    StripLimit { limit: usize },

    #[error("F-Curve '{data_path}[{array_index}]' already exists in this channelbag")]
    DuplicateFCurve { data_path: String, array_index: i32 },

    #[error("A channelbag for slot handle {handle} already exists")]
    DuplicateChannelbag { handle: u32 },

    #[error("This slot does not belong to this Action")]
    SlotNotInAction,

    #[error("This layer does not belong to this Action")]
    LayerNotInAction,

    #[error("This strip does not belong to this layer")]
    StripNotInLayer,

    #[error("This strip does not belong to this Action")]
    StripNotInAction,

    #[error("Action '{action}' has run out of slot handles")]
    SlotHandlesExhausted { action: String },

    #[error("This channelbag does not belong to this strip")]
    ChannelbagNotInStrip,

    #[error("F-Curve not found")]
    FCurveNotInChannelbag,

    #[error("Could not remove the F-Curve Group from the collection because it doesn't exist in the collection")]
    GroupNotInChannelbag,

    #[error("Slot belongs to Action '{slot_action}', but '{datablock}' is animated by '{assigned_action}'")]
    SlotFromOtherAction {
        slot_action: String,
        assigned_action: String,
        datablock: String,
    },

    #[error("Slot '{identifier}' is not suitable for animating {id_type} '{datablock}'")]
    SlotNotSuitable {
        identifier: String,
        id_type: String,
        datablock: String,
    },

    #[error("Action '{action}' is meant for {id_root} datablocks and cannot animate '{datablock}'")]
    ActionNotAssignable {
        action: String,
        id_root: String,
        datablock: String,
    },

    #[error("Assign action \"{action}\" to \"{datablock}\" before calling this function")]
    ActionNotAssigned { action: String, datablock: String },

    #[error("'{datablock}' has no Action to pick a slot from")]
    NoActionAssigned { datablock: String },

    #[error("No slot with handle {handle} in this Action")]
    SlotNotFound { handle: u32 },

    #[error("No channelbag for slot handle {handle}")]
    ChannelbagNotFound { handle: u32 },

    #[error("Action not found")]
    ActionNotFound,

    #[error("Datablock not found")]
    DatablockNotFound,

    #[error("Assignment site not found on '{datablock}'")]
    SiteNotFound { datablock: String },
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptySlotName { .. }
            | Self::UnspecifiedSlotType
            | Self::SlotIdentifierTooShort { .. }
            | Self::EmptyDataPath
            | Self::UnsupportedStripType { .. }
            | Self::UnknownIdType { .. }
            | Self::ActionNotAssigned { .. }
            | Self::NoActionAssigned { .. } => ErrorKind::InvalidArgument,
            Self::LegacyAction { .. }
            | Self::LayerLimit { .. }
            | Self::StripLimit { .. }
            | Self::DuplicateFCurve { .. }
            | Self::DuplicateChannelbag { .. }
            | Self::SlotHandlesExhausted { .. } => ErrorKind::Structural,
            Self::SlotNotInAction
            | Self::LayerNotInAction
            | Self::StripNotInLayer
            | Self::StripNotInAction
            | Self::ChannelbagNotInStrip
            | Self::FCurveNotInChannelbag
            | Self::GroupNotInChannelbag
            | Self::SlotFromOtherAction { .. }
            | Self::SlotNotSuitable { .. }
            | Self::ActionNotAssignable { .. } => ErrorKind::Ownership,
            Self::SlotNotFound { .. }
            | Self::ChannelbagNotFound { .. }
            | Self::ActionNotFound
            | Self::DatablockNotFound
            | Self::SiteNotFound { .. } => ErrorKind::NotFound,
        }
    }
}

/// Errors produced while reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document json parse error: {0}")]
    Parse(String),
    #[error("serialize document: {0}")]
    Serialize(String),
    #[error("document version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("versioning failed: {0}")]
    Versioning(#[from] ActionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(ActionError::EmptyDataPath.kind(), ErrorKind::InvalidArgument);
        assert_eq!(ActionError::LayerLimit { limit: 1 }.kind(), ErrorKind::Structural);
        assert_eq!(ActionError::FCurveNotInChannelbag.kind(), ErrorKind::Ownership);
        assert_eq!(
            ActionError::SlotNotFound { handle: 4 }.kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn messages_name_the_offending_input() {
        let err = ActionError::DuplicateFCurve {
            data_path: "location".into(),
            array_index: 2,
        };
        assert_eq!(
            err.to_string(),
            "F-Curve 'location[2]' already exists in this channelbag"
        );
    }
}
