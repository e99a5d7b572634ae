use strata_action_core::{
    ActionError, Config, Document, ErrorKind, IdType, StripType, StructurePolicy,
};

#[test]
fn second_layer_and_second_strip_are_rejected() {
    let mut doc = Document::new();
    let a = doc.action_new("Action");
    let action = doc.action_mut(a).unwrap();

    let layer = action.layer_new("Layer").unwrap();
    layer.strip_new(StripType::Keyframe).unwrap();
    let err = layer.strip_new(StripType::Keyframe).unwrap_err();
    assert_eq!(err, ActionError::StripLimit { limit: 1 });
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert_eq!(layer.strips().len(), 1);

    let err = action.layer_new("Layer 2").unwrap_err();
    assert_eq!(err, ActionError::LayerLimit { limit: 1 });
    assert_eq!(action.layers().len(), 1);
}

#[test]
fn unlimited_policy_allows_stacking() {
    let config = Config {
        structure: StructurePolicy::unlimited(),
        ..Config::default()
    };
    let mut doc = Document::with_config(config);
    let a = doc.action_new("Action");
    let action = doc.action_mut(a).unwrap();
    action.layer_new("Base").unwrap();
    let top = action.layer_new("Top").unwrap();
    top.strip_new(StripType::Keyframe).unwrap();
    top.strip_new(StripType::Keyframe).unwrap();
    assert_eq!(top.strips().len(), 2);
    assert_eq!(action.layers().len(), 2);
}

#[test]
fn strip_types_parse_from_their_names() {
    assert_eq!("KEYFRAME".parse::<StripType>().unwrap(), StripType::Keyframe);
    let err = "NLA".parse::<StripType>().unwrap_err();
    assert_eq!(
        err,
        ActionError::UnsupportedStripType {
            name: "NLA".to_string()
        }
    );
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn layer_names_are_truncated() {
    let mut doc = Document::new();
    let a = doc.action_new("Action");
    let action = doc.action_mut(a).unwrap();
    let layer = action.layer_new(&"L".repeat(100)).unwrap();
    assert_eq!(layer.name.len(), 63);
}

#[test]
fn removal_checks_ownership() {
    let mut doc = Document::new();
    let a = doc.action_new("A");
    let b = doc.action_new("B");

    let foreign_layer = doc.action_mut(b).unwrap().layer_new("Layer").unwrap().id();
    let foreign_strip = doc
        .action_mut(b)
        .unwrap()
        .layer_mut(foreign_layer)
        .unwrap()
        .strip_new(StripType::Keyframe)
        .unwrap()
        .id();

    let action = doc.action_mut(a).unwrap();
    let layer = action.layer_new("Layer").unwrap();
    assert_eq!(
        layer.strip_remove(foreign_strip).unwrap_err(),
        ActionError::StripNotInLayer
    );
    let own = layer.strip_new(StripType::Keyframe).unwrap().id();
    layer.strip_remove(own).unwrap();
    assert!(layer.strips().is_empty());

    assert_eq!(
        action.layer_remove(foreign_layer).unwrap_err(),
        ActionError::LayerNotInAction
    );
    assert_eq!(doc.action(b).unwrap().layers().len(), 1);
}

#[test]
fn keyframe_strip_is_created_on_demand() {
    let mut doc = Document::new();
    let a = doc.action_new("Action");
    let action = doc.action_mut(a).unwrap();
    let slot = action.slot_new(IdType::Object, "Cube").unwrap().handle();
    let first = action.keyframe_strip_ensure().unwrap().id();
    let again = action.keyframe_strip_ensure().unwrap().id();
    assert_eq!(first, again);
    assert_eq!(action.layers().len(), 1);
    assert_eq!(action.layers()[0].name, "Layer");
    assert!(action.channelbag_for_slot(slot).is_none());
}

#[test]
fn removing_a_slot_drops_its_channelbags() {
    let mut doc = Document::new();
    let a = doc.action_new("Action");
    let action = doc.action_mut(a).unwrap();
    let cube = action.slot_new(IdType::Object, "Cube").unwrap().handle();
    let lamp = action.slot_new(IdType::Light, "Lamp").unwrap().handle();
    let strip = action.keyframe_strip_ensure().unwrap().id();
    action.channelbag_new(strip, cube).unwrap();
    action.channelbag_new(strip, lamp).unwrap();

    action.slot_remove(cube).unwrap();
    let strip = &action.layers()[0].strips()[0];
    assert!(strip.channelbag(cube).is_none());
    assert!(strip.channelbag(lamp).is_some());
}
