//! Channelbags: the F-Curves and channel groups that animate one slot within
//! one strip.
//!
//! Ordering invariant: F-Curves are contiguous per group, groups appear in
//! group-collection order, ungrouped F-Curves trail. Every mutation that
//! touches group membership keeps this invariant.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::fcurve::FCurve;
use crate::ids::{ChannelbagId, FCurveId, GroupId, IdSource, SlotHandle};
use crate::naming::{unique_name, NAME_MAX};

/// Name given to groups created with an empty name.
pub const DEFAULT_GROUP_NAME: &str = "Group";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelGroup {
    pub(crate) id: GroupId,
    pub(crate) name: String,
}

impl ChannelGroup {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of [`Channelbag::fcurve_assign_group`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GroupAssignment {
    Assigned,
    /// The F-Curve was already in that group; nothing moved.
    Unchanged,
    Ignored(LegacyGroupAssignmentQuirk),
}

/// Group assignments that older files and scripts rely on being tolerated
/// as no-ops instead of failing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LegacyGroupAssignmentQuirk {
    /// Assigning `None` leaves the F-Curve in its current group.
    NoneDoesNotUngroup,
    /// The group lives in another channelbag.
    ForeignGroup,
    /// The F-Curve lives in another channelbag.
    ForeignFCurve,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Channelbag {
    pub(crate) id: ChannelbagId,
    pub(crate) slot_handle: SlotHandle,
    #[serde(default)]
    fcurves: Vec<FCurve>,
    #[serde(default)]
    groups: Vec<ChannelGroup>,
    #[serde(skip)]
    ids: IdSource,
}

/// Position of `group` in `groups`; ungrouped (or dangling) sorts last.
fn group_rank(groups: &[ChannelGroup], group: Option<GroupId>) -> usize {
    group
        .and_then(|g| groups.iter().position(|grp| grp.id == g))
        .unwrap_or(usize::MAX)
}

impl Channelbag {
    pub(crate) fn new(ids: &IdSource, slot_handle: SlotHandle) -> Self {
        Self {
            id: ids.alloc_channelbag(),
            slot_handle,
            fcurves: Vec::new(),
            groups: Vec::new(),
            ids: IdSource::clone(ids),
        }
    }

    /// Hook a deserialized channelbag up to its document's allocator.
    pub(crate) fn attach(&mut self, ids: &IdSource) {
        ids.observe(self.id.0);
        for fcurve in &self.fcurves {
            ids.observe(fcurve.id.0);
        }
        for group in &self.groups {
            ids.observe(group.id.0);
        }
        self.ids = IdSource::clone(ids);
        self.restore_group_order();
    }

    pub fn id(&self) -> ChannelbagId {
        self.id
    }

    /// Handle of the slot this channelbag animates. Resolve it through
    /// `Action::slot`, which reports removed slots as `None`.
    pub fn slot_handle(&self) -> SlotHandle {
        self.slot_handle
    }

    pub fn fcurves(&self) -> &[FCurve] {
        &self.fcurves
    }

    pub fn groups(&self) -> &[ChannelGroup] {
        &self.groups
    }

    pub fn fcurve(&self, id: FCurveId) -> Option<&FCurve> {
        self.fcurves.iter().find(|fc| fc.id == id)
    }

    /// Mutable access for keys, extrapolation and mute. Identity and group
    /// membership go through the channelbag.
    pub fn fcurve_mut(&mut self, id: FCurveId) -> Option<&mut FCurve> {
        self.fcurves.iter_mut().find(|fc| fc.id == id)
    }

    pub fn fcurve_find(&self, data_path: &str, array_index: i32) -> Option<&FCurve> {
        self.fcurves
            .iter()
            .find(|fc| fc.matches(data_path, array_index))
    }

    fn fcurve_index(&self, id: FCurveId) -> Option<usize> {
        self.fcurves.iter().position(|fc| fc.id == id)
    }

    /// Create an ungrouped F-Curve at the end of the sequence.
    pub fn fcurve_new(&mut self, data_path: &str, array_index: i32) -> Result<&mut FCurve, ActionError> {
        if data_path.is_empty() {
            return Err(ActionError::EmptyDataPath);
        }
        if self.fcurve_find(data_path, array_index).is_some() {
            return Err(ActionError::DuplicateFCurve {
                data_path: data_path.to_string(),
                array_index,
            });
        }
        let fcurve = FCurve::new(self.ids.alloc_fcurve(), data_path, array_index);
        self.fcurves.push(fcurve);
        let last = self.fcurves.len() - 1;
        Ok(&mut self.fcurves[last])
    }

    /// Return the F-Curve for `(data_path, array_index)`, creating it when
    /// missing. A new F-Curve joins the group named `group_name` (created if
    /// absent); an existing one keeps its group.
    pub fn fcurve_ensure(
        &mut self,
        data_path: &str,
        array_index: i32,
        group_name: Option<&str>,
    ) -> Result<&mut FCurve, ActionError> {
        if data_path.is_empty() {
            return Err(ActionError::EmptyDataPath);
        }
        let pos = match self
            .fcurves
            .iter()
            .position(|fc| fc.matches(data_path, array_index))
        {
            Some(pos) => pos,
            None => {
                let id = self.fcurve_new(data_path, array_index)?.id;
                let mut pos = self.fcurves.len() - 1;
                if let Some(name) = group_name.filter(|n| !n.is_empty()) {
                    let group = self.group_ensure(name);
                    pos = self.place(pos, Some(group));
                }
                debug_assert_eq!(self.fcurves[pos].id, id);
                pos
            }
        };
        Ok(&mut self.fcurves[pos])
    }

    /// Remove an F-Curve owned by this channelbag. Its group stays, even
    /// when it ends up empty.
    pub fn fcurve_remove(&mut self, id: FCurveId) -> Result<FCurve, ActionError> {
        let pos = self
            .fcurve_index(id)
            .ok_or(ActionError::FCurveNotInChannelbag)?;
        Ok(self.fcurves.remove(pos))
    }

    pub fn fcurves_clear(&mut self) {
        self.fcurves.clear();
    }

    /// Create a group. Empty names become `"Group"`; names are made unique
    /// within this channelbag.
    pub fn group_new(&mut self, name: &str) -> &ChannelGroup {
        let name = if name.is_empty() { DEFAULT_GROUP_NAME } else { name };
        let name = unique_name(name, NAME_MAX, |candidate| {
            self.groups.iter().any(|g| g.name == candidate)
        });
        self.groups.push(ChannelGroup {
            id: self.ids.alloc_group(),
            name,
        });
        let last = self.groups.len() - 1;
        &self.groups[last]
    }

    pub fn group(&self, id: GroupId) -> Option<&ChannelGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_find(&self, name: &str) -> Option<&ChannelGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Id of the group called `name`, creating it when missing.
    pub fn group_ensure(&mut self, name: &str) -> GroupId {
        match self.group_find(name) {
            Some(group) => group.id,
            None => self.group_new(name).id,
        }
    }

    /// Remove a group owned by this channelbag. Its F-Curves become
    /// ungrouped and move to the start of the ungrouped section.
    pub fn group_remove(&mut self, id: GroupId) -> Result<(), ActionError> {
        let idx = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or(ActionError::GroupNotInChannelbag)?;
        self.groups.remove(idx);
        for fcurve in &mut self.fcurves {
            if fcurve.group == Some(id) {
                fcurve.group = None;
            }
        }
        self.restore_group_order();
        Ok(())
    }

    /// F-Curves of `group`, in channel order.
    pub fn group_fcurves(&self, group: GroupId) -> impl Iterator<Item = &FCurve> + '_ {
        self.fcurves.iter().filter(move |fc| fc.group == Some(group))
    }

    /// Move an F-Curve into `group`, placing it last in that group. An
    /// F-Curve already in `group` stays where it is.
    ///
    /// Keeps the tolerant behaviour scripts depend on: `None` does not
    /// ungroup, and a group or F-Curve from another channelbag is ignored.
    /// Each ignored call is logged. Use [`Self::fcurve_assign_group_strict`]
    /// to get errors instead.
    pub fn fcurve_assign_group(&mut self, fcurve: FCurveId, group: Option<GroupId>) -> GroupAssignment {
        let Some(group) = group else {
            warn!("F-Curve {:?}: assigning no group leaves it in its current group", fcurve);
            return GroupAssignment::Ignored(LegacyGroupAssignmentQuirk::NoneDoesNotUngroup);
        };
        if self.group(group).is_none() {
            warn!(
                "F-Curve {:?} doesn't belong to the same channelbag as group {:?}",
                fcurve, group
            );
            return GroupAssignment::Ignored(LegacyGroupAssignmentQuirk::ForeignGroup);
        }
        let Some(pos) = self.fcurve_index(fcurve) else {
            warn!("F-Curve {:?} is not part of channelbag {:?}", fcurve, self.id);
            return GroupAssignment::Ignored(LegacyGroupAssignmentQuirk::ForeignFCurve);
        };
        if self.fcurves[pos].group == Some(group) {
            return GroupAssignment::Unchanged;
        }
        self.place(pos, Some(group));
        GroupAssignment::Assigned
    }

    /// Like [`Self::fcurve_assign_group`], but `None` ungroups and foreign
    /// arguments are errors.
    pub fn fcurve_assign_group_strict(
        &mut self,
        fcurve: FCurveId,
        group: Option<GroupId>,
    ) -> Result<(), ActionError> {
        let pos = self
            .fcurve_index(fcurve)
            .ok_or(ActionError::FCurveNotInChannelbag)?;
        if let Some(group) = group {
            if self.group(group).is_none() {
                return Err(ActionError::GroupNotInChannelbag);
            }
        }
        if self.fcurves[pos].group == group {
            return Ok(());
        }
        self.place(pos, group);
        Ok(())
    }

    /// Take an F-Curve out of its group and move it to the very end.
    /// Ungrouped F-Curves stay put.
    pub fn fcurve_ungroup(&mut self, fcurve: FCurveId) -> Result<(), ActionError> {
        self.fcurve_assign_group_strict(fcurve, None)
    }

    /// Move the F-Curve at `pos` to the end of `group`'s range (or the end
    /// of the sequence for `None`). Returns its new index.
    fn place(&mut self, pos: usize, group: Option<GroupId>) -> usize {
        let mut fcurve = self.fcurves.remove(pos);
        fcurve.group = group;
        let rank = group_rank(&self.groups, group);
        let groups = &self.groups;
        let at = self
            .fcurves
            .partition_point(|fc| group_rank(groups, fc.group) <= rank);
        self.fcurves.insert(at, fcurve);
        at
    }

    fn restore_group_order(&mut self) {
        let groups = &self.groups;
        self.fcurves
            .sort_by_key(|fc| group_rank(groups, fc.group));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdAllocator;
    use std::sync::Arc;

    fn bag() -> Channelbag {
        let ids: IdSource = Arc::new(IdAllocator::new());
        Channelbag::new(&ids, SlotHandle(1))
    }

    fn paths(bag: &Channelbag) -> Vec<String> {
        bag.fcurves().iter().map(|fc| fc.data_path.clone()).collect()
    }

    #[test]
    fn group_names_are_unique_per_bag() {
        let mut bag = bag();
        assert_eq!(bag.group_new("Foo").name(), "Foo");
        assert_eq!(bag.group_new("Foo").name(), "Foo.001");
        assert_eq!(bag.group_new("").name(), "Group");
    }

    #[test]
    fn fcurve_ensure_groups_new_curves_only() {
        let mut bag = bag();
        bag.fcurve_new("scale", 0).unwrap();
        let id = bag.fcurve_ensure("location", 0, Some("Xform")).unwrap().id;
        let group = bag.group_find("Xform").unwrap().id();
        assert_eq!(bag.fcurve(id).unwrap().group, Some(group));
        assert_eq!(paths(&bag), vec!["location", "scale"]);

        // Repeat call ignores the group name.
        let again = bag.fcurve_ensure("location", 0, Some("Other")).unwrap().id;
        assert_eq!(again, id);
        assert!(bag.group_find("Other").is_none());
    }

    #[test]
    fn group_remove_moves_members_to_start_of_ungrouped() {
        let mut bag = bag();
        let a = bag.fcurve_new("a", 0).unwrap().id;
        bag.fcurve_new("b", 0).unwrap();
        let group = bag.group_new("G").id();
        assert_eq!(bag.fcurve_assign_group(a, Some(group)), GroupAssignment::Assigned);
        bag.fcurve_new("c", 0).unwrap();
        assert_eq!(paths(&bag), vec!["a", "b", "c"]);

        bag.group_remove(group).unwrap();
        assert_eq!(bag.fcurve(a).unwrap().group, None);
        assert_eq!(paths(&bag), vec!["a", "b", "c"]);
        assert_eq!(bag.group_remove(group), Err(ActionError::GroupNotInChannelbag));
    }

    #[test]
    fn strict_assignment_ungroups_and_rejects_foreign() {
        let mut bag = bag();
        let a = bag.fcurve_new("a", 0).unwrap().id;
        bag.fcurve_new("b", 0).unwrap();
        let group = bag.group_new("G").id();
        bag.fcurve_assign_group_strict(a, Some(group)).unwrap();
        bag.fcurve_ungroup(a).unwrap();
        assert_eq!(bag.fcurve(a).unwrap().group, None);
        assert_eq!(paths(&bag), vec!["b", "a"]);
        assert_eq!(
            bag.fcurve_assign_group_strict(a, Some(GroupId(9999))),
            Err(ActionError::GroupNotInChannelbag)
        );
    }

    #[test]
    fn assigning_the_current_group_keeps_the_order() {
        let mut bag = bag();
        let a = bag.fcurve_new("a", 0).unwrap().id;
        let b = bag.fcurve_new("b", 0).unwrap().id;
        let c = bag.fcurve_new("c", 0).unwrap().id;
        let group = bag.group_new("G").id();
        bag.fcurve_assign_group(a, Some(group));
        bag.fcurve_assign_group(b, Some(group));
        assert_eq!(paths(&bag), vec!["a", "b", "c"]);

        assert_eq!(bag.fcurve_assign_group(a, Some(group)), GroupAssignment::Unchanged);
        assert_eq!(paths(&bag), vec!["a", "b", "c"]);
        bag.fcurve_assign_group_strict(a, Some(group)).unwrap();
        assert_eq!(paths(&bag), vec!["a", "b", "c"]);

        // Ungrouping an ungrouped curve does not send it to the end.
        bag.fcurve_new("d", 0).unwrap();
        bag.fcurve_ungroup(c).unwrap();
        assert_eq!(paths(&bag), vec!["a", "b", "c", "d"]);
    }
}
