//! Datablock evaluation.
//!
//! Order, later steps overriding earlier ones per channel:
//! 1. static property values
//! 2. NLA tracks, bottom to top
//! 3. the directly assigned Action
//! 4. Action constraints, in stack order
//!
//! Each source writes with its influence; influence 1 replaces the lower
//! value, lower influences blend linearly towards it. Legacy and layered
//! Actions are read through the same [`ChannelCurve`] path, so converting an
//! Action does not change what it evaluates to.

use hashbrown::HashMap;
use log::warn;

use crate::anim_data::ActionAssignment;
use crate::document::Document;
use crate::error::ActionError;
use crate::fcurve::{ChannelCurve, ChannelPath};
use crate::ids::DatablockId;

pub type ChannelValues = HashMap<ChannelPath, f32>;

/// Evaluate every animated channel of `datablock` at scene frame `frame`.
pub fn evaluate_datablock(
    doc: &Document,
    datablock: DatablockId,
    frame: f32,
) -> Result<ChannelValues, ActionError> {
    evaluate_with_depth(doc, datablock, frame, doc.config().constraint_eval_depth)
}

fn evaluate_with_depth(
    doc: &Document,
    datablock: DatablockId,
    frame: f32,
    depth: usize,
) -> Result<ChannelValues, ActionError> {
    let db = doc
        .datablock(datablock)
        .ok_or(ActionError::DatablockNotFound)?;
    let mut out = ChannelValues::new();

    for (path, values) in &db.properties {
        for (index, value) in values.iter().enumerate() {
            out.insert(ChannelPath::new(path.as_str(), index as i32), *value);
        }
    }

    if let Some(ad) = &db.animation_data {
        for track in ad.nla_tracks.iter().filter(|t| !t.mute) {
            for strip in track.strips.iter().filter(|s| !s.mute && s.contains(frame)) {
                apply_assignment(
                    doc,
                    &strip.assignment,
                    strip.action_time(frame),
                    strip.influence,
                    &mut out,
                );
            }
        }
        apply_assignment(doc, &ad.assignment, frame, 1.0, &mut out);
    }

    for constraint in db.constraints.iter().filter(|c| !c.mute) {
        let value = match constraint.target {
            None => None,
            Some(target) if target == datablock => {
                warn!("constraint '{}' targets its own datablock; skipped", constraint.name);
                continue;
            }
            Some(_) if depth == 0 => {
                warn!(
                    "constraint '{}' exceeds the evaluation depth; skipped",
                    constraint.name
                );
                continue;
            }
            Some(target) => {
                if doc.datablock(target).is_none() {
                    warn!("constraint '{}' has a missing target; skipped", constraint.name);
                    continue;
                }
                let target_values = evaluate_with_depth(doc, target, frame, depth - 1)?;
                Some(
                    target_values
                        .get(&constraint.transform_channel)
                        .copied()
                        .unwrap_or(0.0),
                )
            }
        };
        let action_frame = match value {
            Some(value) => constraint.action_frame(value),
            None => constraint.frame_start,
        };
        apply_assignment(
            doc,
            &constraint.assignment,
            action_frame,
            constraint.influence,
            &mut out,
        );
    }

    Ok(out)
}

/// Write the curves `assignment` selects, evaluated at `action_frame`.
fn apply_assignment(
    doc: &Document,
    assignment: &ActionAssignment,
    action_frame: f32,
    influence: f32,
    out: &mut ChannelValues,
) {
    let Some(action) = assignment.action.and_then(|id| doc.action(id)) else {
        return;
    };
    if action.is_action_layered() && !assignment.slot_handle.is_assigned() {
        return;
    }
    for (curve, layer_influence) in action.channel_curves(assignment.slot_handle) {
        if curve.is_muted() {
            continue;
        }
        blend(
            out,
            curve.channel(),
            curve.evaluate(action_frame),
            influence * layer_influence,
        );
    }
}

fn blend(out: &mut ChannelValues, channel: ChannelPath, value: f32, influence: f32) {
    if influence >= 1.0 {
        out.insert(channel, value);
        return;
    }
    if influence <= 0.0 {
        return;
    }
    let lower = out.get(&channel).copied().unwrap_or(0.0);
    out.insert(channel, lower + (value - lower) * influence);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_replaces_or_mixes() {
        let mut out = ChannelValues::new();
        let ch = ChannelPath::new("location", 0);
        blend(&mut out, ch.clone(), 4.0, 1.0);
        assert_eq!(out[&ch], 4.0);
        blend(&mut out, ch.clone(), 8.0, 0.5);
        assert_eq!(out[&ch], 6.0);
        blend(&mut out, ch.clone(), 100.0, 0.0);
        assert_eq!(out[&ch], 6.0);
    }
}
