// SPDX-License-Identifier: MIT OR Apache-2.0
//! Coercion invariants over random values.

use matbridge_graph::{AttrSpec, AttrType, AttrValue, MemoryScene, NodeId, NodeTemplate, SceneAdapter};
use matbridge_translate::{
    convert_graph, Coercion, DestinationNodeSchema, DestinationSchema, MappingEntry,
    SchemaRegistry, SourceNodeSchema, SourceSchema, Transform,
};
use proptest::prelude::*;

fn component() -> impl Strategy<Value = f64> {
    -1000.0..1000.0f64
}

fn vector_type() -> impl Strategy<Value = AttrType> {
    prop_oneof![Just(AttrType::Float3), Just(AttrType::Double3)]
}

fn scalar_type() -> impl Strategy<Value = AttrType> {
    prop_oneof![Just(AttrType::Float), Just(AttrType::Double)]
}

/// One `shader` node whose `value` attribute feeds `target` on `Target`
fn scene_with(source: (AttrType, AttrValue), target: AttrSpec) -> (MemoryScene, SchemaRegistry) {
    let mut scene = MemoryScene::new();
    scene.add_template("Target", NodeTemplate::new().with(target));
    let node = scene.add_node("shader1", "shader");
    scene.add_attribute(&node, "value", source.0, source.1).unwrap();

    let mut registry = SchemaRegistry::new();
    registry
        .register_source(
            SourceSchema::new("src")
                .with_node("shader", SourceNodeSchema::new("common").copy("value", "target")),
        )
        .unwrap();
    registry
        .register_destination(
            DestinationSchema::new("dst")
                .with_node("common", DestinationNodeSchema::new("Target").same(&["target"])),
        )
        .unwrap();
    (scene, registry)
}

fn written(source: (AttrType, AttrValue), target: AttrSpec) -> Option<AttrValue> {
    let (mut scene, registry) = scene_with(source, target);
    let report = convert_graph(&mut scene, &registry, &[NodeId::new("shader1")], "src", "dst").unwrap();
    let created = report.converted(&NodeId::new("shader1"))?;
    scene.value(created, "target").cloned()
}

proptest! {
    #[test]
    fn prop_scalar_into_vector_broadcasts(x in component(), vt in vector_type(), st in scalar_type()) {
        let value = written(
            (st, AttrValue::Float(x)),
            AttrSpec::new("target", vt, AttrValue::Vector3([0.0; 3])),
        );
        prop_assert_eq!(value, Some(AttrValue::Vector3([x, x, x])));
    }

    #[test]
    fn prop_vector_into_scalar_uses_first_component(v in proptest::array::uniform3(component())) {
        let value = written(
            (AttrType::Float3, AttrValue::Vector3(v)),
            AttrSpec::new("target", AttrType::Float, AttrValue::Float(0.0)),
        );
        let packed = AttrValue::List(vec![AttrValue::Vector3(v)]);
        prop_assert_eq!(value, Transform::FirstComponent.apply(&packed));
    }

    #[test]
    fn prop_negative_into_bounded_scalar_is_absolute(x in -1000.0..-0.001f64) {
        let value = written(
            (AttrType::Float, AttrValue::Float(x)),
            AttrSpec::new("target", AttrType::Float, AttrValue::Float(1.0)).with_min(0.0),
        );
        prop_assert_eq!(value, Some(AttrValue::Float(x.abs())));
    }

    #[test]
    fn prop_copy_then_coerce_matches_first_component_choice(v in proptest::array::uniform3(component())) {
        let raw = AttrValue::List(vec![AttrValue::Vector3(v)]);
        let copied = MappingEntry::copy("x").resolve(&raw).unwrap();
        let coercion = Coercion::choose(&copied, &AttrType::Float3, &AttrType::Double);

        prop_assert_eq!(coercion.explicit_type(), None);
        prop_assert_eq!(Some(coercion.value().clone()), Transform::FirstComponent.apply(&raw));
    }

    #[test]
    fn prop_exactly_one_fallback(x in component(), vector in any::<bool>(), dest_vector in any::<bool>()) {
        let (value, source_type) = if vector {
            (AttrValue::Vector3([x, 0.0, 0.0]), AttrType::Float3)
        } else {
            (AttrValue::Float(x), AttrType::Float)
        };
        let destination = if dest_vector { AttrType::Float3 } else { AttrType::Float };
        let coercion = Coercion::choose(&value, &source_type, &destination);

        let expected = match (dest_vector, vector) {
            (true, false) => "broadcast",
            (false, true) => "first component",
            (false, false) if x < 0.0 => "absolute value",
            _ => "explicit type",
        };
        prop_assert_eq!(coercion.name(), expected);
    }
}

#[test]
fn test_exhausted_coercion_skips_field_only() {
    // A string cannot become a color by any fallback
    let (mut scene, registry) = scene_with(
        (AttrType::String, AttrValue::String("red".into())),
        AttrSpec::new("target", AttrType::Float3, AttrValue::Vector3([0.0; 3])),
    );
    let report = convert_graph(&mut scene, &registry, &[NodeId::new("shader1")], "src", "dst").unwrap();

    let created = report.converted(&NodeId::new("shader1")).unwrap();
    assert_eq!(
        scene.attribute_value(created, "target").unwrap(),
        AttrValue::List(vec![AttrValue::Vector3([0.0; 3])])
    );
    assert_eq!(report.skipped_fields.len(), 1);
    assert_eq!(
        report.skipped_fields[0].reason,
        matbridge_translate::FieldSkipReason::CoercionExhausted
    );
}
