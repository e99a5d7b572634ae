//! The document: owner of every Action and animated datablock, and the
//! registry that keeps Action names unique and hands out ids.
//!
//! Anything that touches both an Action and its users (assignment, slot
//! renames that must reach `last_slot_identifier`, removal) goes through
//! here.

use hashbrown::HashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::anim_data::{ActionAssignment, AssignmentSite, Datablock};
use crate::config::Config;
use crate::error::{ActionError, DocumentError};
use crate::fcurve::ChannelPath;
use crate::id_type::IdType;
use crate::ids::{ActionId, DatablockId, FCurveId, IdSource, SlotHandle, SlotRef};
use crate::naming::{unique_name, NAME_MAX};
use crate::slot::{Slot, IDENTIFIER_PREFIX_LEN};
use crate::versioning::{self, VersioningReport};

/// Format version written by [`Document::to_json`].
pub const DOCUMENT_VERSION: u32 = 2;
/// Format of documents from before layered Actions.
pub const LEGACY_DOCUMENT_VERSION: u32 = 1;

/// Default name for Actions created with an empty name.
pub const DEFAULT_ACTION_NAME: &str = "Action";
/// Group that object transform F-Curves go into by default.
pub const OBJECT_TRANSFORMS_GROUP: &str = "Object Transforms";

fn legacy_version() -> u32 {
    LEGACY_DOCUMENT_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "legacy_version")]
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) actions: Vec<Action>,
    #[serde(default)]
    pub(crate) datablocks: Vec<Datablock>,
    #[serde(skip)]
    config: Config,
    #[serde(skip)]
    ids: IdSource,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            actions: Vec::new(),
            datablocks: Vec::new(),
            config,
            ids: IdSource::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    // ----- I/O -----

    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::Serialize(e.to_string()))
    }

    /// Load a document, converting legacy content to layered Actions.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Self::from_json_with_config(json, Config::default()).map(|(doc, _)| doc)
    }

    /// Load a document with `config`; also returns what versioning did.
    pub fn from_json_with_config(
        json: &str,
        config: Config,
    ) -> Result<(Self, VersioningReport), DocumentError> {
        let mut doc = Self::parse(json, config)?;
        let report = if doc.version < DOCUMENT_VERSION {
            versioning::do_versions(&mut doc)?
        } else {
            VersioningReport::default()
        };
        Ok((doc, report))
    }

    /// Load a document as stored. Legacy Actions stay legacy.
    pub fn from_json_without_versioning(json: &str) -> Result<Self, DocumentError> {
        Self::parse(json, Config::default())
    }

    fn parse(json: &str, config: Config) -> Result<Self, DocumentError> {
        let mut doc: Document =
            serde_json::from_str(json).map_err(|e| DocumentError::Parse(e.to_string()))?;
        if doc.version > DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: doc.version,
                supported: DOCUMENT_VERSION,
            });
        }
        doc.config = config;
        doc.attach();
        debug!(
            "loaded document v{} with {} actions and {} datablocks",
            doc.version,
            doc.actions.len(),
            doc.datablocks.len()
        );
        Ok(doc)
    }

    /// Wire deserialized containers to this document's allocator and policy.
    fn attach(&mut self) {
        let policy = self.config.structure;
        for action in &mut self.actions {
            action.attach(&self.ids, policy);
        }
        for datablock in &self.datablocks {
            self.ids.observe(datablock.id.0);
        }
    }

    // ----- Actions -----

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.id == id)
    }

    pub fn action_by_name(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    fn action_ref(&self, id: ActionId) -> Result<&Action, ActionError> {
        self.action(id).ok_or(ActionError::ActionNotFound)
    }

    fn unique_action_name(&self, name: &str, exclude: Option<ActionId>) -> String {
        let name = if name.is_empty() { DEFAULT_ACTION_NAME } else { name };
        unique_name(name, NAME_MAX, |candidate| {
            self.actions
                .iter()
                .any(|a| Some(a.id) != exclude && a.name == candidate)
        })
    }

    /// Create an empty Action. The name is made unique among all Actions.
    pub fn action_new(&mut self, name: &str) -> ActionId {
        let name = self.unique_action_name(name, None);
        let action = Action::new(&self.ids, self.config.structure, name);
        let id = action.id;
        self.actions.push(action);
        id
    }

    /// Rename an Action; returns the name it actually got.
    pub fn action_rename(&mut self, id: ActionId, name: &str) -> Result<String, ActionError> {
        let name = self.unique_action_name(name, Some(id));
        let action = self.action_mut(id).ok_or(ActionError::ActionNotFound)?;
        action.name = name.clone();
        Ok(name)
    }

    /// Delete an Action. Every reference to it is cleared; the slot
    /// identifiers users had are kept as their `last_slot_identifier`.
    pub fn action_remove(&mut self, id: ActionId) -> Result<Action, ActionError> {
        let pos = self
            .actions
            .iter()
            .position(|a| a.id == id)
            .ok_or(ActionError::ActionNotFound)?;
        let action = self.actions.remove(pos);
        for datablock in &mut self.datablocks {
            for site in datablock.sites_using(id) {
                if let Some(assignment) = datablock.assignment_mut(site) {
                    unassign(&action, assignment);
                    assignment.action = None;
                }
            }
        }
        Ok(action)
    }

    /// Number of references to `action`, counting the fake user.
    pub fn action_users(&self, action: ActionId) -> usize {
        let references: usize = self
            .datablocks
            .iter()
            .map(|db| db.sites_using(action).len())
            .sum();
        let fake = self.action(action).is_some_and(|a| a.fake_user);
        references + usize::from(fake)
    }

    /// Remove every Action without users. Returns the removed ids.
    pub fn purge_unused_actions(&mut self) -> Vec<ActionId> {
        let unused: Vec<ActionId> = self
            .actions
            .iter()
            .map(|a| a.id)
            .filter(|id| self.action_users(*id) == 0)
            .collect();
        self.actions.retain(|a| !unused.contains(&a.id));
        if !unused.is_empty() {
            info!("purged {} unused actions", unused.len());
        }
        unused
    }

    // ----- datablocks -----

    pub fn datablocks(&self) -> &[Datablock] {
        &self.datablocks
    }

    pub fn datablock(&self, id: DatablockId) -> Option<&Datablock> {
        self.datablocks.iter().find(|d| d.id == id)
    }

    pub fn datablock_mut(&mut self, id: DatablockId) -> Option<&mut Datablock> {
        self.datablocks.iter_mut().find(|d| d.id == id)
    }

    pub fn datablock_by_name(&self, id_type: IdType, name: &str) -> Option<&Datablock> {
        self.datablocks
            .iter()
            .find(|d| d.id_type == id_type && d.name == name)
    }

    fn datablock_ref(&self, id: DatablockId) -> Result<&Datablock, ActionError> {
        self.datablock(id).ok_or(ActionError::DatablockNotFound)
    }

    /// Create a datablock. Names are unique per ID type.
    pub fn datablock_new(&mut self, id_type: IdType, name: &str) -> DatablockId {
        let name = unique_name(name, NAME_MAX, |candidate| {
            self.datablocks
                .iter()
                .any(|d| d.id_type == id_type && d.name == candidate)
        });
        let id = self.ids.alloc_datablock();
        self.datablocks.push(Datablock::new(id, name, id_type));
        id
    }

    /// Delete a datablock, releasing its Action references. Constraints
    /// targeting it lose their target.
    pub fn datablock_remove(&mut self, id: DatablockId) -> Result<Datablock, ActionError> {
        let pos = self
            .datablocks
            .iter()
            .position(|d| d.id == id)
            .ok_or(ActionError::DatablockNotFound)?;
        let removed = self.datablocks.remove(pos);
        for datablock in &mut self.datablocks {
            for constraint in &mut datablock.constraints {
                if constraint.target == Some(id) {
                    constraint.target = None;
                }
            }
        }
        Ok(removed)
    }

    // ----- assignment -----

    /// Assign `action` directly to `datablock` (or clear it with `None`).
    pub fn assign_action(
        &mut self,
        datablock: DatablockId,
        action: Option<ActionId>,
    ) -> Result<(), ActionError> {
        self.assign_action_at(datablock, AssignmentSite::AnimData, action)
    }

    /// Assign `action` at `site`, then pick a slot for it.
    ///
    /// The previous slot's identifier is stored as `last_slot_identifier`.
    /// The new slot is, in order of preference: the slot with that
    /// identifier (or its typed/untyped variant), the slot named after the
    /// datablock, or the only slot if it is untyped. No match leaves the
    /// slot unassigned.
    pub fn assign_action_at(
        &mut self,
        datablock: DatablockId,
        site: AssignmentSite,
        action: Option<ActionId>,
    ) -> Result<(), ActionError> {
        let db = self.datablock_ref(datablock)?;
        let id_type = db.id_type;
        let db_name = db.name.clone();
        let prefixed_name = db.prefixed_name();
        let mut assignment = match (site, db.assignment(site)) {
            (_, Some(existing)) => existing.clone(),
            (AssignmentSite::AnimData, None) => ActionAssignment::default(),
            (_, None) => {
                return Err(ActionError::SiteNotFound {
                    datablock: db.name.clone(),
                })
            }
        };

        if let Some(new) = action {
            let target = self.action_ref(new)?;
            if !is_action_assignable_to(target, id_type) {
                return Err(ActionError::ActionNotAssignable {
                    action: target.name.clone(),
                    id_root: target.id_root().to_string(),
                    datablock: db.name.clone(),
                });
            }
            if assignment.action == Some(new) {
                return Ok(());
            }
        }

        if let Some(old) = assignment.action.and_then(|id| self.action(id)) {
            unassign(old, &mut assignment);
        }
        assignment.slot_handle = SlotHandle::UNASSIGNED;
        assignment.action = action;

        let mut resolved = None;
        if let Some(new) = action {
            let target = self.action_ref(new)?;
            if let Some(handle) = slot_for_autoassign(
                target,
                id_type,
                &prefixed_name,
                &assignment.last_slot_identifier,
            ) {
                resolved = Some(self.bind_slot(
                    new,
                    handle,
                    (id_type, &db_name),
                    &mut assignment,
                )?);
            }
        }

        self.write_assignment(datablock, site, assignment)?;
        if let Some(slot) = resolved {
            self.propagate_slot_identifier(slot);
        }
        Ok(())
    }

    /// Assign a slot of the Action already assigned directly to `datablock`.
    pub fn assign_slot(
        &mut self,
        datablock: DatablockId,
        slot: Option<SlotRef>,
    ) -> Result<(), ActionError> {
        self.assign_slot_at(datablock, AssignmentSite::AnimData, slot)
    }

    /// Assign (or with `None`, unassign) a slot at `site`. The slot must
    /// belong to the Action assigned there and suit the datablock's type; an
    /// untyped slot of a local Action takes on that type.
    pub fn assign_slot_at(
        &mut self,
        datablock: DatablockId,
        site: AssignmentSite,
        slot: Option<SlotRef>,
    ) -> Result<(), ActionError> {
        let db = self.datablock_ref(datablock)?;
        let id_type = db.id_type;
        let db_name = db.name.clone();
        let mut assignment = db
            .assignment(site)
            .cloned()
            .ok_or_else(|| ActionError::SiteNotFound {
                datablock: db.name.clone(),
            })?;

        let Some(slot) = slot else {
            if let Some(action) = assignment.action.and_then(|id| self.action(id)) {
                unassign(action, &mut assignment);
            }
            assignment.slot_handle = SlotHandle::UNASSIGNED;
            return self.write_assignment(datablock, site, assignment);
        };

        let Some(assigned) = assignment.action else {
            return Err(ActionError::NoActionAssigned {
                datablock: db.name.clone(),
            });
        };
        if slot.action != assigned {
            let name_of = |id: ActionId| self.action(id).map(|a| a.name.clone()).unwrap_or_default();
            return Err(ActionError::SlotFromOtherAction {
                slot_action: name_of(slot.action),
                assigned_action: name_of(assigned),
                datablock: db.name.clone(),
            });
        }
        if assignment.slot_handle == slot.handle {
            return Ok(());
        }

        let resolved =
            self.bind_slot(assigned, slot.handle, (id_type, &db_name), &mut assignment)?;
        self.write_assignment(datablock, site, assignment)?;
        self.propagate_slot_identifier(resolved);
        Ok(())
    }

    /// Check `handle` against the user's type, resolve it if it is untyped
    /// and the Action is local, and point `assignment` at it.
    fn bind_slot(
        &mut self,
        action: ActionId,
        handle: SlotHandle,
        (id_type, datablock): (IdType, &str),
        assignment: &mut ActionAssignment,
    ) -> Result<SlotRef, ActionError> {
        let target = self.action_mut(action).ok_or(ActionError::ActionNotFound)?;
        let slot = target
            .slot(handle)
            .ok_or(ActionError::SlotNotFound { handle: handle.0 })?;
        if !slot.is_suitable_for(id_type) {
            return Err(ActionError::SlotNotSuitable {
                identifier: slot.identifier.clone(),
                id_type: id_type.to_string(),
                datablock: datablock.to_string(),
            });
        }
        if !slot.target_id_type.is_specified() && !target.is_linked() {
            target.slot_idtype_define(handle, id_type)?;
        }
        let identifier = target
            .slot(handle)
            .map(|s| s.identifier.clone())
            .unwrap_or_default();
        assignment.slot_handle = handle;
        assignment.last_slot_identifier = identifier;
        Ok(SlotRef::new(action, handle))
    }

    fn write_assignment(
        &mut self,
        datablock: DatablockId,
        site: AssignmentSite,
        assignment: ActionAssignment,
    ) -> Result<(), ActionError> {
        let db = self
            .datablock_mut(datablock)
            .ok_or(ActionError::DatablockNotFound)?;
        let name = db.name.clone();
        let slot = db
            .assignment_mut(site)
            .ok_or(ActionError::SiteNotFound { datablock: name })?;
        *slot = assignment;
        Ok(())
    }

    // ----- slots & users -----

    /// Datablocks using `slot` anywhere (direct, NLA or constraint), in
    /// document order, each listed once.
    pub fn slot_users(&self, slot: SlotRef) -> Vec<DatablockId> {
        self.datablocks
            .iter()
            .filter(|db| {
                db.assignment_sites().into_iter().any(|site| {
                    db.assignment(site)
                        .is_some_and(|a| a.uses_slot(slot.action, slot.handle))
                })
            })
            .map(|db| db.id)
            .collect()
    }

    /// Copy the slot's current identifier into the `last_slot_identifier` of
    /// every site using it.
    fn propagate_slot_identifier(&mut self, slot: SlotRef) {
        let Some(identifier) = self
            .action(slot.action)
            .and_then(|a| a.slot(slot.handle))
            .map(|s| s.identifier.clone())
        else {
            return;
        };
        for db in &mut self.datablocks {
            for site in db.assignment_sites() {
                if let Some(assignment) = db.assignment_mut(site) {
                    if assignment.uses_slot(slot.action, slot.handle) {
                        assignment.last_slot_identifier = identifier.clone();
                    }
                }
            }
        }
    }

    /// Rename a slot and update its users' `last_slot_identifier`.
    pub fn slot_rename(&mut self, slot: SlotRef, name: &str) -> Result<(), ActionError> {
        self.action_mut(slot.action)
            .ok_or(ActionError::ActionNotFound)?
            .slot_display_name_set(slot.handle, name)?;
        self.propagate_slot_identifier(slot);
        Ok(())
    }

    /// Set a slot's identifier and update its users' `last_slot_identifier`.
    pub fn slot_identifier_set(&mut self, slot: SlotRef, identifier: &str) -> Result<(), ActionError> {
        self.action_mut(slot.action)
            .ok_or(ActionError::ActionNotFound)?
            .slot_identifier_set(slot.handle, identifier)?;
        self.propagate_slot_identifier(slot);
        Ok(())
    }

    /// Remove a slot. Users keep the Action but lose the slot.
    pub fn slot_remove(&mut self, slot: SlotRef) -> Result<Slot, ActionError> {
        let removed = self
            .action_mut(slot.action)
            .ok_or(ActionError::ActionNotFound)?
            .slot_remove(slot.handle)?;
        for db in &mut self.datablocks {
            for site in db.assignment_sites() {
                if let Some(assignment) = db.assignment_mut(site) {
                    if assignment.uses_slot(slot.action, slot.handle) {
                        assignment.last_slot_identifier = removed.identifier.clone();
                        assignment.slot_handle = SlotHandle::UNASSIGNED;
                    }
                }
            }
        }
        Ok(removed)
    }

    // ----- keying -----

    /// The F-Curve for `(data_path, array_index)` in the slot `datablock`
    /// uses, creating slot, layer, strip, channelbag and F-Curve as needed.
    ///
    /// `action` must be the Action directly assigned to `datablock`. New
    /// F-Curves go into `group_name`, or the default group for the path.
    pub fn fcurve_ensure_for_datablock(
        &mut self,
        action: ActionId,
        datablock: DatablockId,
        data_path: &str,
        array_index: i32,
        group_name: Option<&str>,
    ) -> Result<FCurveId, ActionError> {
        let db = self.datablock_ref(datablock)?;
        let target = self.action_ref(action)?;
        if db.action() != Some(action) {
            return Err(ActionError::ActionNotAssigned {
                action: target.name.clone(),
                datablock: db.name.clone(),
            });
        }
        if data_path.is_empty() {
            return Err(ActionError::EmptyDataPath);
        }
        if !target.is_action_layered() {
            return Err(ActionError::LegacyAction {
                action: target.name.clone(),
                what: "F-Curves",
            });
        }
        let id_type = db.id_type;
        let db_name = db.name.clone();
        let prefixed_name = db.prefixed_name();
        let (current, last_slot_identifier) = db
            .animation_data
            .as_ref()
            .map(|ad| {
                (
                    ad.assignment.slot_handle,
                    ad.assignment.last_slot_identifier.clone(),
                )
            })
            .unwrap_or_default();
        let group = group_name
            .map(str::to_string)
            .or_else(|| default_channel_group_for_path(id_type, data_path));

        let handle = if target.slot(current).is_some() {
            current
        } else if let Some(handle) =
            slot_for_autoassign(target, id_type, &prefixed_name, &last_slot_identifier)
        {
            self.assign_slot(datablock, Some(SlotRef::new(action, handle)))?;
            handle
        } else {
            let target = self.action_mut(action).ok_or(ActionError::ActionNotFound)?;
            let handle = target.slot_new(id_type, &db_name)?.handle;
            debug!(
                "created slot '{}' for '{}'",
                target.slot(handle).map(Slot::identifier).unwrap_or_default(),
                prefixed_name
            );
            self.assign_slot(datablock, Some(SlotRef::new(action, handle)))?;
            handle
        };

        let target = self.action_mut(action).ok_or(ActionError::ActionNotFound)?;
        let fcurve = target
            .keyframe_channelbag_ensure(handle)?
            .fcurve_ensure(data_path, array_index, group.as_deref())?;
        Ok(fcurve.id())
    }

    // ----- evaluation -----

    /// Evaluate every animated channel of `datablock` at `frame`.
    pub fn evaluate(
        &self,
        datablock: DatablockId,
        frame: f32,
    ) -> Result<HashMap<ChannelPath, f32>, ActionError> {
        crate::eval::evaluate_datablock(self, datablock, frame)
    }
}

/// Record the assigned slot's identifier and drop the slot.
fn unassign(action: &Action, assignment: &mut ActionAssignment) {
    if let Some(slot) = action.slot(assignment.slot_handle) {
        assignment.last_slot_identifier = slot.identifier.clone();
    }
    assignment.slot_handle = SlotHandle::UNASSIGNED;
}

/// Layered Actions can go anywhere; legacy ones only onto their `id_root`.
fn is_action_assignable_to(action: &Action, id_type: IdType) -> bool {
    if action.is_action_layered() {
        return true;
    }
    let root = action.id_root();
    !root.is_specified() || root == id_type
}

/// Slot to pick when `action` gets assigned to a datablock of `id_type`
/// called `prefixed_name`.
pub(crate) fn slot_for_autoassign(
    action: &Action,
    id_type: IdType,
    prefixed_name: &str,
    last_slot_identifier: &str,
) -> Option<SlotHandle> {
    let suitable = |identifier: &str| {
        action
            .slot_by_identifier(identifier)
            .filter(|s| s.is_suitable_for(id_type))
            .map(|s| s.handle)
    };

    if last_slot_identifier.len() > IDENTIFIER_PREFIX_LEN
        && last_slot_identifier.is_char_boundary(IDENTIFIER_PREFIX_LEN)
    {
        if let Some(handle) = suitable(last_slot_identifier) {
            return Some(handle);
        }
        let (prefix, name) = last_slot_identifier.split_at(IDENTIFIER_PREFIX_LEN);
        let untyped = IdType::Unspecified.code();
        let variant = if prefix == untyped {
            format!("{}{}", id_type.code(), name)
        } else {
            format!("{untyped}{name}")
        };
        if let Some(handle) = suitable(&variant) {
            return Some(handle);
        }
    }

    if let Some(handle) = suitable(prefixed_name) {
        return Some(handle);
    }

    match action.slots() {
        [only] if !only.target_id_type().is_specified() => Some(only.handle()),
        _ => {
            if !action.slots().is_empty() {
                debug!(
                    "no suitable slot in Action '{}' for '{}'",
                    action.name(),
                    prefixed_name
                );
            }
            None
        }
    }
}

/// Group new F-Curves go into when no group is named: the bone name for
/// pose bone paths, "Object Transforms" for object transforms.
pub fn default_channel_group_for_path(id_type: IdType, data_path: &str) -> Option<String> {
    if let Some(rest) = data_path.strip_prefix("pose.bones[\"") {
        return rest.find("\"]").map(|end| rest[..end].to_string());
    }
    const OBJECT_TRANSFORMS: &[&str] = &[
        "location",
        "rotation_euler",
        "rotation_quaternion",
        "rotation_axis_angle",
        "scale",
        "delta_location",
        "delta_rotation_euler",
        "delta_rotation_quaternion",
        "delta_scale",
    ];
    if id_type == IdType::Object && OBJECT_TRANSFORMS.contains(&data_path) {
        return Some(OBJECT_TRANSFORMS_GROUP.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_are_unique() {
        let mut doc = Document::new();
        let a = doc.action_new("Walk");
        let b = doc.action_new("Walk");
        let c = doc.action_new("");
        assert_eq!(doc.action(a).unwrap().name(), "Walk");
        assert_eq!(doc.action(b).unwrap().name(), "Walk.001");
        assert_eq!(doc.action(c).unwrap().name(), "Action");
        assert_eq!(doc.action_rename(b, "Walk").unwrap(), "Walk.001");
        assert_eq!(doc.action_rename(b, "Run").unwrap(), "Run");
    }

    #[test]
    fn datablock_names_are_unique_per_type() {
        let mut doc = Document::new();
        let ob = doc.datablock_new(IdType::Object, "Cube");
        let ob2 = doc.datablock_new(IdType::Object, "Cube");
        let me = doc.datablock_new(IdType::Mesh, "Cube");
        assert_eq!(doc.datablock(ob).unwrap().name(), "Cube");
        assert_eq!(doc.datablock(ob2).unwrap().name(), "Cube.001");
        assert_eq!(doc.datablock(me).unwrap().name(), "Cube");
    }

    #[test]
    fn default_groups_follow_path() {
        assert_eq!(
            default_channel_group_for_path(IdType::Object, "pose.bones[\"Arm.L\"].location"),
            Some("Arm.L".to_string())
        );
        assert_eq!(
            default_channel_group_for_path(IdType::Object, "location"),
            Some(OBJECT_TRANSFORMS_GROUP.to_string())
        );
        assert_eq!(default_channel_group_for_path(IdType::Material, "location"), None);
        assert_eq!(default_channel_group_for_path(IdType::Object, "hide_render"), None);
    }

    #[test]
    fn newer_versions_are_rejected() {
        let err = Document::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedVersion { found: 99, .. }));
    }
}
