//! Slots: per-target handles inside an Action.
//!
//! A slot identifier is the two-letter code of its target ID type followed by
//! the display name, e.g. `"OBCube"`. Identifiers are unique within their
//! Action; the Action enforces that, a slot on its own only knows how to
//! split and rebuild its identifier.

use serde::{Deserialize, Serialize};

use crate::id_type::IdType;
use crate::ids::SlotHandle;
use crate::naming::truncate_utf8;

/// Length of the type code at the start of every identifier.
pub const IDENTIFIER_PREFIX_LEN: usize = 2;
/// Maximum display name length, in bytes.
pub const NAME_LENGTH_MAX: usize = 255;
/// Maximum identifier length, in bytes.
pub const IDENTIFIER_LENGTH_MAX: usize = IDENTIFIER_PREFIX_LEN + NAME_LENGTH_MAX;
/// Minimum identifier length: a prefix plus at least one name character.
pub const IDENTIFIER_LENGTH_MIN: usize = IDENTIFIER_PREFIX_LEN + 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub(crate) handle: SlotHandle,
    pub(crate) identifier: String,
    #[serde(default)]
    pub(crate) target_id_type: IdType,
    /// Selected in the editors. At most one slot per Action is active.
    #[serde(default)]
    pub(crate) active: bool,
}

impl Slot {
    pub(crate) fn new(handle: SlotHandle, identifier: String, target_id_type: IdType) -> Self {
        Self {
            handle,
            identifier,
            target_id_type,
            active: false,
        }
    }

    pub fn handle(&self) -> SlotHandle {
        self.handle
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn target_id_type(&self) -> IdType {
        self.target_id_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The identifier without its type code.
    pub fn name_display(&self) -> &str {
        self.identifier.get(IDENTIFIER_PREFIX_LEN..).unwrap_or("")
    }

    pub fn identifier_prefix(&self) -> &str {
        self.identifier.get(..IDENTIFIER_PREFIX_LEN).unwrap_or("")
    }

    /// Whether this slot may animate a datablock of `id_type`. Untyped
    /// slots are suitable for anything.
    pub fn is_suitable_for(&self, id_type: IdType) -> bool {
        !self.target_id_type.is_specified() || self.target_id_type == id_type
    }

    /// Identifier this slot would have with type `id_type`, before
    /// uniquification.
    pub(crate) fn identifier_for_type(&self, id_type: IdType) -> String {
        compose_identifier(id_type, self.name_display())
    }
}

/// `code(id_type) + name`, with the name truncated to [`NAME_LENGTH_MAX`].
pub fn compose_identifier(id_type: IdType, name: &str) -> String {
    let mut identifier = String::with_capacity(IDENTIFIER_PREFIX_LEN + name.len());
    identifier.push_str(id_type.code());
    identifier.push_str(truncate_utf8(name, NAME_LENGTH_MAX));
    identifier
}

/// Replace whatever prefix `identifier` carries with the code of `id_type`.
/// Returns the forced identifier and whether the given prefix differed.
pub(crate) fn force_prefix(id_type: IdType, identifier: &str) -> (String, bool) {
    let (prefix, name) = if identifier.is_char_boundary(IDENTIFIER_PREFIX_LEN) {
        identifier.split_at(IDENTIFIER_PREFIX_LEN)
    } else {
        ("", identifier)
    };
    (compose_identifier(id_type, name), prefix != id_type.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_prefix() {
        let slot = Slot::new(SlotHandle(1), "OBCube".into(), IdType::Object);
        assert_eq!(slot.name_display(), "Cube");
        assert_eq!(slot.identifier_prefix(), "OB");
        assert_eq!(slot.identifier_for_type(IdType::Material), "MACube");
    }

    #[test]
    fn suitability() {
        let typed = Slot::new(SlotHandle(1), "OBCube".into(), IdType::Object);
        let untyped = Slot::new(SlotHandle(2), "XXLegacy Slot".into(), IdType::Unspecified);
        assert!(typed.is_suitable_for(IdType::Object));
        assert!(!typed.is_suitable_for(IdType::Camera));
        assert!(untyped.is_suitable_for(IdType::Camera));
    }

    #[test]
    fn forced_prefix_reports_mismatch() {
        assert_eq!(force_prefix(IdType::Object, "OBKnife"), ("OBKnife".to_string(), false));
        assert_eq!(force_prefix(IdType::Object, "MAKnife"), ("OBKnife".to_string(), true));
    }

    #[test]
    fn long_names_are_truncated() {
        let name = "x".repeat(NAME_LENGTH_MAX + 1);
        let identifier = compose_identifier(IdType::Object, &name);
        assert_eq!(identifier.len(), IDENTIFIER_LENGTH_MAX);
    }
}
