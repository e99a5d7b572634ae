use strata_action_core::{
    AssignmentSite, ChannelPath, Config, Document, IdType, StripType, DOCUMENT_VERSION,
};
use strata_test_fixtures::legacy_documents;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn load_both(name: &str) -> (Document, Document) {
    let json = legacy_documents::json(name).expect("load legacy fixture");
    let legacy = Document::from_json_without_versioning(&json).expect("parse legacy");
    let layered = Document::from_json(&json).expect("parse and convert");
    (legacy, layered)
}

/// Evaluate every datablock named in `names` at `frames` in both documents
/// and require identical results.
fn assert_same_evaluation(name: &str, names: &[&str], frames: &[f32]) {
    let (legacy, layered) = load_both(name);
    for db_name in names {
        let before = legacy.datablock_by_name(IdType::Object, db_name).unwrap();
        let after = layered.datablock_by_name(IdType::Object, db_name).unwrap();
        for &frame in frames {
            let expected = legacy.evaluate(before.id(), frame).unwrap();
            let actual = layered.evaluate(after.id(), frame).unwrap();
            assert!(!expected.is_empty(), "{name}/{db_name}: nothing evaluated");
            assert_eq!(expected, actual, "{name}/{db_name} at frame {frame}");
        }
    }
}

#[test]
fn conversion_preserves_evaluation() {
    let frames = [1.0, 5.5, 10.0];
    assert_same_evaluation("simple-object", &["Cube"], &frames);
    assert_same_evaluation("shared-action", &["Ball", "Ball.001"], &frames);
    assert_same_evaluation("action-constraint", &["Controller", "Door"], &frames);
    assert_same_evaluation("armature-bone-groups", &["Rig"], &frames);
    assert_same_evaluation("linked-untyped", &["Hero"], &frames);
    assert_same_evaluation("mixed-user-types", &["Orb"], &frames);
}

#[test]
fn simple_object_gets_one_slot_layer_strip_and_channelbag() {
    let json = legacy_documents::json("simple-object").unwrap();
    let (doc, report) = Document::from_json_with_config(&json, Config::default()).unwrap();
    assert_eq!(doc.version(), DOCUMENT_VERSION);
    assert_eq!(report.converted_actions.len(), 2);
    assert_eq!(report.updated_assignments, 1);
    assert!(report.warnings.is_empty());

    let action = doc.action_by_name("CubeAction").unwrap();
    assert!(action.legacy().is_none());
    assert_eq!(action.slots().len(), 1);
    let slot = &action.slots()[0];
    assert_eq!(slot.identifier(), "OBLegacy Slot");
    assert_eq!(slot.target_id_type(), IdType::Object);

    assert_eq!(action.layers().len(), 1);
    let strips = action.layers()[0].strips();
    assert_eq!(strips.len(), 1);
    assert_eq!(strips[0].strip_type(), StripType::Keyframe);
    assert_eq!(strips[0].channelbags().len(), 1);
    let bag = &strips[0].channelbags()[0];
    assert_eq!(bag.slot_handle(), slot.handle());
    assert_eq!(bag.fcurves().len(), 3);
    let group = bag.group_find("Object Transforms").unwrap();
    assert_eq!(bag.group_fcurves(group.id()).count(), 2);

    let cube = doc.datablock_by_name(IdType::Object, "Cube").unwrap();
    let assignment = cube.assignment(AssignmentSite::AnimData).unwrap();
    assert_eq!(assignment.slot_handle, slot.handle());
    assert_eq!(assignment.last_slot_identifier, "OBLegacy Slot");

    // No users: the slot stays untyped.
    let unused = doc.action_by_name("Unused").unwrap();
    assert_eq!(unused.slots()[0].identifier(), "XXLegacy Slot");
}

#[test]
fn static_properties_underlay_animation() {
    let (_, doc) = load_both("simple-object");
    let cube = doc.datablock_by_name(IdType::Object, "Cube").unwrap();
    let values = doc.evaluate(cube.id(), 10.0).unwrap();
    approx(values[&ChannelPath::new("location", 0)], 5.0, 1e-5);
    approx(values[&ChannelPath::new("location", 1)], 7.0, 1e-5);
    approx(values[&ChannelPath::new("hide_render", 0)], 1.0, 1e-5);
}

#[test]
fn shared_action_slot_is_typed_by_its_first_user() {
    let json = legacy_documents::json("shared-action").unwrap();
    let (doc, report) = Document::from_json_with_config(&json, Config::default()).unwrap();
    assert_eq!(report.updated_assignments, 3);

    let bounce = doc.action_by_name("Bounce").unwrap();
    let slot = &bounce.slots()[0];
    assert_eq!(slot.identifier(), "OBLegacy Slot");
    let users = doc.slot_users(bounce.slot_ref(slot.handle()));
    assert_eq!(users.len(), 2);

    let ball = doc.datablock_by_name(IdType::Object, "Ball.001").unwrap();
    let squash = doc.action_by_name("Squash").unwrap();
    let strip = ball
        .assignment(AssignmentSite::NlaStrip { track: 0, strip: 0 })
        .unwrap();
    assert_eq!(strip.action, Some(squash.id()));
    assert_eq!(strip.slot_handle, squash.slots()[0].handle());
    assert_eq!(doc.action_users(squash.id()), 1);
}

#[test]
fn constraint_users_get_the_slot() {
    let json = legacy_documents::json("action-constraint").unwrap();
    let doc = Document::from_json(&json).unwrap();
    let door = doc.datablock_by_name(IdType::Object, "Door").unwrap();
    let open = doc.action_by_name("DoorOpen").unwrap();
    let constraint = door.assignment(AssignmentSite::Constraint(0)).unwrap();
    assert_eq!(constraint.slot_handle, open.slots()[0].handle());

    let channel = ChannelPath::new("rotation_euler", 2);
    let at_start = doc.evaluate(door.id(), 1.0).unwrap();
    approx(at_start[&channel], 0.0, 1e-5);
    // Controller x = 0.9 at frame 10, so the Action plays frame 19.
    let later = doc.evaluate(door.id(), 10.0).unwrap();
    approx(later[&channel], 1.35, 1e-4);
}

#[test]
fn bone_groups_keep_names_membership_and_order() {
    let (_, doc) = load_both("armature-bone-groups");
    let action = doc.action_by_name("RigPose").unwrap();
    let bag = action.channelbag_for_slot(action.slots()[0].handle()).unwrap();

    let groups: Vec<&str> = bag.groups().iter().map(|g| g.name()).collect();
    assert_eq!(groups, vec!["Arm.L", "Arm.R", "Spine"]);

    let paths: Vec<&str> = bag.fcurves().iter().map(|fc| fc.data_path()).collect();
    assert_eq!(
        paths,
        vec![
            "pose.bones[\"Arm.L\"].location",
            "pose.bones[\"Arm.L\"].scale",
            "pose.bones[\"Arm.R\"].rotation_quaternion",
            "pose.bones[\"Spine\"].rotation_euler",
            "show_in_front",
        ]
    );
    let counts: Vec<usize> = bag
        .groups()
        .iter()
        .map(|g| bag.group_fcurves(g.id()).count())
        .collect();
    assert_eq!(counts, vec![2, 1, 1]);
    assert!(bag.fcurves()[1].mute);
}

#[test]
fn linked_actions_keep_untyped_slots_through_a_round_trip() {
    let (_, doc) = load_both("linked-untyped");
    let action = doc.action_by_name("LibWalk").unwrap();
    assert!(action.is_linked());
    assert_eq!(action.slots()[0].identifier(), "XXLegacy Slot");
    let hero = doc.datablock_by_name(IdType::Object, "Hero").unwrap();
    let handle = hero
        .assignment(AssignmentSite::AnimData)
        .unwrap()
        .slot_handle;
    assert_eq!(handle, action.slots()[0].handle());

    let saved = doc.to_json().unwrap();
    let (reloaded, report) = Document::from_json_with_config(&saved, Config::default()).unwrap();
    assert!(report.is_empty());
    let action = reloaded.action_by_name("LibWalk").unwrap();
    assert_eq!(action.slots()[0].identifier(), "XXLegacy Slot");
    assert_eq!(action.slots()[0].target_id_type(), IdType::Unspecified);
    let hero = reloaded.datablock_by_name(IdType::Object, "Hero").unwrap();
    let assignment = hero.assignment(AssignmentSite::AnimData).unwrap();
    assert_eq!(assignment.slot_handle, handle);
    assert_eq!(assignment.last_slot_identifier, "XXLegacy Slot");

    let before = doc.evaluate(hero.id(), 13.0).unwrap();
    let after = reloaded.evaluate(hero.id(), 13.0).unwrap();
    assert_eq!(before, after);
    approx(after[&ChannelPath::new("location", 1)], 3.0, 1e-5);
}

#[test]
fn users_of_another_type_are_reported_and_left_unassigned() {
    let json = legacy_documents::json("mixed-user-types").unwrap();
    let (doc, report) = Document::from_json_with_config(&json, Config::default()).unwrap();
    assert_eq!(report.updated_assignments, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("Lamp"));

    let pulse = doc.action_by_name("Pulse").unwrap();
    assert_eq!(pulse.slots()[0].identifier(), "OBLegacy Slot");
    let lamp = doc.datablock_by_name(IdType::Light, "Lamp").unwrap();
    let assignment = lamp.assignment(AssignmentSite::AnimData).unwrap();
    assert_eq!(assignment.action, Some(pulse.id()));
    assert!(!assignment.slot_handle.is_assigned());
    assert!(doc.evaluate(lamp.id(), 5.0).unwrap().is_empty());
}

#[test]
fn converted_ids_do_not_collide_with_new_ones() {
    let (_, mut doc) = load_both("armature-bone-groups");
    let rig = doc.datablock_by_name(IdType::Object, "Rig").unwrap().id();
    let extra = doc.datablock_new(IdType::Object, "Extra");
    assert_ne!(rig, extra);
    let action = doc.action_by_name("RigPose").unwrap().id();
    let fcurve = doc
        .fcurve_ensure_for_datablock(action, rig, "pose.bones[\"Arm.L\"].location", 1, None)
        .unwrap();
    let bag = doc
        .action(action)
        .unwrap()
        .channelbag_for_slot(doc.action(action).unwrap().slots()[0].handle())
        .unwrap();
    assert_eq!(bag.fcurves().iter().filter(|fc| fc.id() == fcurve).count(), 1);
    let group = bag.group_find("Arm.L").unwrap().id();
    assert_eq!(bag.group_fcurves(group).count(), 3);
}

#[test]
fn current_documents_are_not_versioned() {
    let mut doc = Document::new();
    let a = doc.action_new("A");
    let cube = doc.datablock_new(IdType::Object, "Cube");
    doc.assign_action(cube, Some(a)).unwrap();
    doc.fcurve_ensure_for_datablock(a, cube, "location", 0, None)
        .unwrap();

    let json = doc.to_json().unwrap();
    let (reloaded, report) = Document::from_json_with_config(&json, Config::default()).unwrap();
    assert!(report.is_empty());
    let action = reloaded.action(a).unwrap();
    assert_eq!(action.slots()[0].identifier(), "OBCube");
    assert_eq!(action.fcurves_for_slot(action.slots()[0].handle()).len(), 1);
}
