//! Conversion of legacy documents to layered Actions.
//!
//! Runs in two passes over the whole document:
//! 1. every legacy Action gets one slot (`<code>Legacy Slot`), one layer, one
//!    keyframe strip and one channelbag, and its F-Curves and groups move
//!    into that channelbag unchanged;
//! 2. every user of a converted Action (direct assignment, NLA strip,
//!    Action constraint) is pointed at that slot.
//!
//! Evaluated values are the same before and after.

use log::{debug, info, warn};

use crate::action::Action;
use crate::document::{Document, DOCUMENT_VERSION};
use crate::error::ActionError;
use crate::ids::{ActionId, GroupId, SlotHandle};
use crate::legacy::LegacyAnimato;

/// What a versioning run changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VersioningReport {
    pub converted_actions: Vec<ActionId>,
    pub updated_assignments: usize,
    /// Users that could not be given a slot, and curves that could not be
    /// moved.
    pub warnings: Vec<String>,
}

impl VersioningReport {
    pub fn is_empty(&self) -> bool {
        self.converted_actions.is_empty() && self.updated_assignments == 0 && self.warnings.is_empty()
    }
}

/// Bring `doc` up to the current format. Documents already current are left
/// alone.
pub fn do_versions(doc: &mut Document) -> Result<VersioningReport, ActionError> {
    let mut report = VersioningReport::default();
    if doc.version >= DOCUMENT_VERSION {
        return Ok(report);
    }
    convert_legacy_animato_actions(doc, &mut report)?;
    convert_legacy_action_assignments(doc, &mut report);
    doc.version = DOCUMENT_VERSION;
    info!(
        "versioning: converted {} actions, updated {} assignments, {} warnings",
        report.converted_actions.len(),
        report.updated_assignments,
        report.warnings.len()
    );
    Ok(report)
}

/// Move the content of every legacy Action into a layered structure.
pub fn convert_legacy_animato_actions(
    doc: &mut Document,
    report: &mut VersioningReport,
) -> Result<(), ActionError> {
    for action in &mut doc.actions {
        let Some(legacy) = action.take_legacy() else {
            continue;
        };
        if legacy.is_empty() {
            continue;
        }
        if !action.slots.is_empty() || !action.layers.is_empty() {
            warn!(
                "Action '{}' has both legacy and layered data; legacy data dropped",
                action.name
            );
            report.warnings.push(format!(
                "Action '{}': legacy data next to layered data was dropped",
                action.name
            ));
            continue;
        }
        convert_legacy_animato_action(action, legacy, report)?;
        report.converted_actions.push(action.id);
    }
    Ok(())
}

fn convert_legacy_animato_action(
    action: &mut Action,
    legacy: LegacyAnimato,
    report: &mut VersioningReport,
) -> Result<(), ActionError> {
    let handle = action.slot_new_legacy(legacy.id_root)?;
    let action_name = action.name.clone();
    let bag = action.keyframe_channelbag_ensure(handle)?;

    let mut groups: Vec<(&str, GroupId)> = Vec::new();
    for name in legacy.group_names() {
        let id = bag.group_ensure(name);
        groups.push((name, id));
    }

    let fcurve_count = legacy.fcurves.len();
    for legacy_fcurve in &legacy.fcurves {
        if legacy_fcurve.data_path.is_empty() {
            report.warnings.push(format!(
                "Action '{action_name}': F-Curve with empty data path dropped"
            ));
            continue;
        }
        let existing = bag
            .fcurve_find(&legacy_fcurve.data_path, legacy_fcurve.array_index)
            .map(|fc| fc.id());
        let id = match existing {
            Some(id) => {
                // The later duplicate is the one legacy evaluation ends up
                // using, so it wins.
                report.warnings.push(format!(
                    "Action '{action_name}': duplicate F-Curve '{}[{}]' merged",
                    legacy_fcurve.data_path, legacy_fcurve.array_index
                ));
                id
            }
            None => {
                bag.fcurve_new(&legacy_fcurve.data_path, legacy_fcurve.array_index)?
                    .id()
            }
        };
        if let Some(fcurve) = bag.fcurve_mut(id) {
            fcurve.keyframes = legacy_fcurve.keyframes.clone();
            fcurve.extrapolation = legacy_fcurve.extrapolation;
            fcurve.mute = legacy_fcurve.mute;
        }
        let group = legacy_fcurve
            .group
            .as_deref()
            .and_then(|name| groups.iter().find(|(n, _)| *n == name))
            .map(|(_, id)| *id);
        if group.is_some() {
            bag.fcurve_assign_group_strict(id, group)?;
        }
    }

    debug!(
        "converted legacy Action '{}': {} F-Curves, {} groups",
        action_name,
        fcurve_count,
        groups.len()
    );
    Ok(())
}

/// Point every user of a converted Action at its slot.
///
/// The slot of a local Action takes the type of its first user; users of
/// another type are left without a slot and reported. Slots of linked
/// Actions stay untyped.
pub fn convert_legacy_action_assignments(doc: &mut Document, report: &mut VersioningReport) {
    let converted = report.converted_actions.clone();
    let Document {
        actions,
        datablocks,
        ..
    } = doc;

    for db in datablocks.iter_mut() {
        let id_type = db.id_type;
        let db_name = db.name.clone();
        for site in db.assignment_sites() {
            let Some(assignment) = db.assignment_mut(site) else {
                continue;
            };
            let Some(action_id) = assignment.action.filter(|id| converted.contains(id)) else {
                continue;
            };
            if assignment.slot_handle.is_assigned() {
                continue;
            }
            let Some(action) = actions.iter_mut().find(|a| a.id == action_id) else {
                continue;
            };
            let Some(slot) = action.slots.first() else {
                continue;
            };
            let handle: SlotHandle = slot.handle;
            if !slot.is_suitable_for(id_type) {
                let message = format!(
                    "could not assign slot '{}' of Action '{}' to {} '{}' ({:?}): it is meant for {}",
                    slot.identifier, action.name, id_type, db_name, site, slot.target_id_type
                );
                warn!("{message}");
                report.warnings.push(message);
                continue;
            }
            if !slot.target_id_type.is_specified() && !action.is_linked() {
                // Cannot fail: the handle was just read from this Action.
                let _ = action.slot_idtype_define(handle, id_type);
            }
            let identifier = action
                .slot(handle)
                .map(|s| s.identifier.clone())
                .unwrap_or_default();
            assignment.slot_handle = handle;
            assignment.last_slot_identifier = identifier;
            report.updated_assignments += 1;
        }
    }
}
