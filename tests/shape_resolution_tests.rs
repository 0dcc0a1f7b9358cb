// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Constructor and property resolution through the public API.

mod common;

use common::*;
use evocodec::{
    CodecError, CodecFactory, FieldType, Param, TypeNotation, TypeRegistry, TypeShape, Value,
};

#[derive(Debug, Clone, PartialEq)]
struct Widget {
    id: i64,
    label: String,
}

fn widget_getters() -> evocodec::schema::ShapeBuilder<Widget> {
    TypeShape::concrete::<Widget>("demo.Widget")
        .property("id", FieldType::Long, |w: &Widget| Value::Long(w.id))
        .property("label", FieldType::String, |w: &Widget| {
            Value::String(w.label.clone())
        })
}

fn full_params() -> Vec<Param> {
    vec![
        Param::new("id", FieldType::Long),
        Param::new("label", FieldType::String),
    ]
}

fn build_full(mut args: evocodec::Args) -> evocodec::Result<Widget> {
    Ok(Widget {
        id: args.arg(0)?,
        label: args.arg(1)?,
    })
}

fn params_of(registry: &TypeRegistry, name: &str) -> Vec<String> {
    let shape = registry.get(name).unwrap().unwrap();
    shape
        .resolve_constructor()
        .unwrap()
        .unwrap()
        .params
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

// ============================================================================
// Constructor Selection
// ============================================================================

#[test]
fn test_zero_arg_plus_parameterized() {
    let registry = TypeRegistry::new();
    registry
        .register(
            widget_getters()
                .constructor(Vec::new(), |_| {
                    Ok(Widget {
                        id: 0,
                        label: String::new(),
                    })
                })
                .constructor(full_params(), build_full)
                .build(),
        )
        .unwrap();
    assert_eq!(params_of(&registry, "demo.Widget"), vec!["id", "label"]);
}

#[test]
fn test_marked_wins_among_many() {
    let registry = TypeRegistry::new();
    registry
        .register(
            widget_getters()
                .constructor(vec![Param::new("id", FieldType::Long)], |mut args| {
                    Ok(Widget {
                        id: args.arg(0)?,
                        label: String::new(),
                    })
                })
                .marked_constructor(full_params(), build_full)
                .constructor(vec![Param::new("label", FieldType::String)], |mut args| {
                    Ok(Widget {
                        id: 0,
                        label: args.arg(0)?,
                    })
                })
                .build(),
        )
        .unwrap();
    assert_eq!(params_of(&registry, "demo.Widget"), vec!["id", "label"]);
}

#[test]
fn test_primary_fallback() {
    let registry = TypeRegistry::new();
    registry
        .register(
            widget_getters()
                .constructor(vec![Param::new("id", FieldType::Long)], |mut args| {
                    Ok(Widget {
                        id: args.arg(0)?,
                        label: String::new(),
                    })
                })
                .primary_constructor(full_params(), build_full)
                .constructor(vec![Param::new("label", FieldType::String)], |mut args| {
                    Ok(Widget {
                        id: 0,
                        label: args.arg(0)?,
                    })
                })
                .build(),
        )
        .unwrap();
    assert_eq!(params_of(&registry, "demo.Widget"), vec!["id", "label"]);
}

#[test]
fn test_two_marked_is_ambiguous() {
    let registry = TypeRegistry::new();
    let err = registry
        .register(
            widget_getters()
                .marked_constructor(full_params(), build_full)
                .marked_constructor(vec![Param::new("id", FieldType::Long)], |mut args| {
                    Ok(Widget {
                        id: args.arg(0)?,
                        label: String::new(),
                    })
                })
                .build(),
        )
        .unwrap_err();
    assert!(
        matches!(err, CodecError::AmbiguousConstructor { count: 2, .. }),
        "{err}"
    );
    assert!(!registry.contains("demo.Widget").unwrap());
}

#[test]
fn test_no_constructor() {
    let registry = TypeRegistry::new();
    let err = registry.register(widget_getters().build()).unwrap_err();
    assert!(matches!(err, CodecError::NoConstructorFound { .. }), "{err}");
}

// ============================================================================
// Property Matching
// ============================================================================

#[test]
fn test_missing_property_fails_codec_build() {
    let factory = factory_with(vec![TypeShape::concrete::<Widget>("demo.Widget")
        .property("id", FieldType::Long, |w: &Widget| Value::Long(w.id))
        .constructor(full_params(), build_full)
        .build()]);

    let widget = Widget {
        id: 1,
        label: "x".into(),
    };
    let err = factory.encode(&widget).unwrap_err();
    match err {
        CodecError::PropertyMismatch { property, .. } => assert_eq!(property, "label"),
        other => panic!("expected PropertyMismatch, got {other}"),
    }
    // Nothing is cached for the failed type.
    assert_eq!(factory.cached_codecs(), 0);
}

#[test]
fn test_repeated_parameter_rejected_at_registration() {
    let registry = TypeRegistry::new();
    let shape = widget_getters()
        .constructor(
            vec![
                Param::new("id", FieldType::Long),
                Param::new("id", FieldType::Long),
            ],
            |mut args| {
                Ok(Widget {
                    id: args.arg(0)?,
                    label: String::new(),
                })
            },
        )
        .build();

    let err = registry.register(shape).unwrap_err();
    assert!(
        matches!(err, CodecError::PropertyMismatch { ref property, .. } if property == "id"),
        "{err}"
    );
    assert!(!registry.contains("demo.Widget").unwrap());
}

#[test]
fn test_payload_with_repeated_field_rejected() {
    let factory = factory_with(vec![point_shape()]);
    let bytes = factory.encode(&Point { x: 7, y: 8 }).unwrap();

    let mut envelope = CodecFactory::inspect(&bytes).unwrap();
    if let TypeNotation::Composite(point) = &mut envelope.schema.types[0] {
        point.fields[1].name = "x".into();
    }
    let forged = envelope.to_bytes().unwrap();

    let err = factory.decode::<Point>(&forged).unwrap_err();
    assert!(matches!(err, CodecError::MalformedEnvelope { .. }), "{err}");
}

#[test]
fn test_property_type_not_assignable() {
    let factory = factory_with(vec![TypeShape::concrete::<Widget>("demo.Widget")
        .property("id", FieldType::Int, |w: &Widget| Value::Int(w.id as i32))
        .property("label", FieldType::String, |w: &Widget| {
            Value::String(w.label.clone())
        })
        .constructor(full_params(), build_full)
        .build()]);

    let err = factory.live_codec("demo.Widget").unwrap_err();
    assert!(
        matches!(err, CodecError::PropertyMismatch { ref property, .. } if property == "id"),
        "{err}"
    );
}

#[test]
fn test_named_property_into_any_param() {
    let factory = factory_with(vec![
        point_shape(),
        TypeShape::concrete::<Polygon>("demo.Pin")
            .property("at", FieldType::named("demo.Point"), |p: &Polygon| {
                Value::optional_object(p.centre.clone())
            })
            .constructor(
                vec![Param::new("at", FieldType::Any)],
                |mut args| {
                    Ok(Polygon {
                        name: String::new(),
                        points: Vec::new(),
                        centre: Some(args.object(0)?),
                    })
                },
            )
            .build(),
    ]);
    assert!(factory.live_codec("demo.Pin").is_ok());
}

// ============================================================================
// Abstract Shapes
// ============================================================================

#[test]
fn test_abstract_shape_properties_sorted() {
    let factory = factory_with(vec![TypeShape::abstract_class("demo.Asset")
        .declared_property("value", FieldType::Long, false)
        .declared_property("issuer", FieldType::String, false)
        .declared_property("expiry", FieldType::Timestamp, true)
        .build()]);

    let notation = factory.describe("demo.Asset").unwrap();
    let TypeNotation::Composite(composite) = notation else {
        panic!("expected a composite notation");
    };
    assert_eq!(composite.field_names(), vec!["expiry", "issuer", "value"]);
    assert!(!composite.field("expiry").unwrap().mandatory);
}
