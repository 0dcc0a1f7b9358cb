// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use evocodec::{CodecFactory, FieldType, Param, TypeRegistry, TypeShape, Value};

// ============================================================================
// Factories
// ============================================================================

/// Build a factory over a fresh registry holding `shapes`.
pub fn factory_with(shapes: Vec<TypeShape>) -> CodecFactory {
    let registry = Arc::new(TypeRegistry::new());
    for shape in shapes {
        registry.register(shape).unwrap();
    }
    CodecFactory::new(registry)
}

// ============================================================================
// Record Fixtures
// ============================================================================

/// Two int fields, the simplest record.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

pub fn point_shape() -> TypeShape {
    TypeShape::concrete::<Point>("demo.Point")
        .property("x", FieldType::Int, |p: &Point| Value::Int(p.x))
        .property("y", FieldType::Int, |p: &Point| Value::Int(p.y))
        .constructor(
            vec![Param::new("x", FieldType::Int), Param::new("y", FieldType::Int)],
            |mut args| {
                Ok(Point {
                    x: args.arg(0)?,
                    y: args.arg(1)?,
                })
            },
        )
        .build()
}

/// Nested records, a list of records and a nullable record.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub name: String,
    pub points: Vec<Point>,
    pub centre: Option<Point>,
}

pub fn polygon_shape() -> TypeShape {
    TypeShape::concrete::<Polygon>("demo.Polygon")
        .property("name", FieldType::String, |p: &Polygon| {
            Value::String(p.name.clone())
        })
        .property(
            "points",
            FieldType::list(FieldType::named("demo.Point")),
            |p: &Polygon| Value::objects(p.points.clone()),
        )
        .nullable_property("centre", FieldType::named("demo.Point"), |p: &Polygon| {
            Value::optional_object(p.centre.clone())
        })
        .constructor(
            vec![
                Param::new("name", FieldType::String),
                Param::new("points", FieldType::list(FieldType::named("demo.Point"))),
                Param::nullable("centre", FieldType::named("demo.Point")),
            ],
            |mut args| {
                Ok(Polygon {
                    name: args.arg(0)?,
                    points: args.objects(1)?,
                    centre: args.optional_object(2)?,
                })
            },
        )
        .build()
}

/// One field of every primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub flag: bool,
    pub small: u8,
    pub count: i64,
    pub ratio: f64,
    pub letter: char,
    pub label: String,
    pub data: Vec<u8>,
    pub note: Option<String>,
}

pub fn sample_shape() -> TypeShape {
    TypeShape::concrete::<Sample>("demo.Sample")
        .property("flag", FieldType::Boolean, |s: &Sample| Value::Bool(s.flag))
        .property("small", FieldType::UByte, |s: &Sample| Value::UByte(s.small))
        .property("count", FieldType::Long, |s: &Sample| Value::Long(s.count))
        .property("ratio", FieldType::Double, |s: &Sample| Value::Double(s.ratio))
        .property("letter", FieldType::Char, |s: &Sample| Value::Char(s.letter))
        .property("label", FieldType::String, |s: &Sample| {
            Value::String(s.label.clone())
        })
        .property("data", FieldType::Binary, |s: &Sample| {
            Value::binary(s.data.clone())
        })
        .nullable_property("note", FieldType::String, |s: &Sample| {
            s.note.clone().map(Value::String).unwrap_or(Value::Null)
        })
        .constructor(
            vec![
                Param::new("flag", FieldType::Boolean),
                Param::new("small", FieldType::UByte),
                Param::new("count", FieldType::Long),
                Param::new("ratio", FieldType::Double),
                Param::new("letter", FieldType::Char),
                Param::new("label", FieldType::String),
                Param::new("data", FieldType::Binary),
                Param::nullable("note", FieldType::String),
            ],
            |mut args| {
                Ok(Sample {
                    flag: args.arg(0)?,
                    small: args.arg(1)?,
                    count: args.arg(2)?,
                    ratio: args.arg(3)?,
                    letter: args.arg(4)?,
                    label: args.arg(5)?,
                    data: args.binary(6)?,
                    note: args.arg(7)?,
                })
            },
        )
        .build()
}

/// A record with a `*`-typed payload.
#[derive(Debug, Clone)]
pub struct Tagged {
    pub tag: String,
    pub payload: Value,
}

pub fn tagged_shape() -> TypeShape {
    TypeShape::concrete::<Tagged>("demo.Tagged")
        .property("tag", FieldType::String, |t: &Tagged| {
            Value::String(t.tag.clone())
        })
        .property("payload", FieldType::Any, |t: &Tagged| t.payload.clone())
        .constructor(
            vec![
                Param::new("tag", FieldType::String),
                Param::new("payload", FieldType::Any),
            ],
            |mut args| {
                Ok(Tagged {
                    tag: args.arg(0)?,
                    payload: args.take(1)?,
                })
            },
        )
        .build()
}

// ============================================================================
// Evolution Fixtures
// ============================================================================

/// Type name shared by every version of the evolving record.
pub const ORDERED: &str = "demo.Ordered";

/// Version 1: `{a: int, b: int}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedV1 {
    pub a: i32,
    pub b: i32,
}

pub fn ordered_v1_shape() -> TypeShape {
    TypeShape::concrete::<OrderedV1>(ORDERED)
        .property("a", FieldType::Int, |o: &OrderedV1| Value::Int(o.a))
        .property("b", FieldType::Int, |o: &OrderedV1| Value::Int(o.b))
        .constructor(
            vec![Param::new("a", FieldType::Int), Param::new("b", FieldType::Int)],
            |mut args| {
                Ok(OrderedV1 {
                    a: args.arg(0)?,
                    b: args.arg(1)?,
                })
            },
        )
        .build()
}

/// Swapped order: `{b: int, a: int}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedSwapped {
    pub b: i32,
    pub a: i32,
}

pub fn ordered_swapped_shape() -> TypeShape {
    TypeShape::concrete::<OrderedSwapped>(ORDERED)
        .property("b", FieldType::Int, |o: &OrderedSwapped| Value::Int(o.b))
        .property("a", FieldType::Int, |o: &OrderedSwapped| Value::Int(o.a))
        .constructor(
            vec![Param::new("b", FieldType::Int), Param::new("a", FieldType::Int)],
            |mut args| {
                Ok(OrderedSwapped {
                    b: args.arg(0)?,
                    a: args.arg(1)?,
                })
            },
        )
        .build()
}

/// Added nullable field: `{a: int, b: int, c: string?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedWithNote {
    pub a: i32,
    pub b: i32,
    pub c: Option<String>,
}

pub fn ordered_with_note_shape() -> TypeShape {
    TypeShape::concrete::<OrderedWithNote>(ORDERED)
        .property("a", FieldType::Int, |o: &OrderedWithNote| Value::Int(o.a))
        .property("b", FieldType::Int, |o: &OrderedWithNote| Value::Int(o.b))
        .nullable_property("c", FieldType::String, |o: &OrderedWithNote| {
            o.c.clone().map(Value::String).unwrap_or(Value::Null)
        })
        .constructor(
            vec![
                Param::new("a", FieldType::Int),
                Param::new("b", FieldType::Int),
                Param::nullable("c", FieldType::String),
            ],
            |mut args| {
                Ok(OrderedWithNote {
                    a: args.arg(0)?,
                    b: args.arg(1)?,
                    c: args.arg(2)?,
                })
            },
        )
        .build()
}

/// Added non-nullable field: `{a: int, b: int, c: string}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedWithLabel {
    pub a: i32,
    pub b: i32,
    pub c: String,
}

pub fn ordered_with_label_shape() -> TypeShape {
    TypeShape::concrete::<OrderedWithLabel>(ORDERED)
        .property("a", FieldType::Int, |o: &OrderedWithLabel| Value::Int(o.a))
        .property("b", FieldType::Int, |o: &OrderedWithLabel| Value::Int(o.b))
        .property("c", FieldType::String, |o: &OrderedWithLabel| {
            Value::String(o.c.clone())
        })
        .constructor(
            vec![
                Param::new("a", FieldType::Int),
                Param::new("b", FieldType::Int),
                Param::new("c", FieldType::String),
            ],
            |mut args| {
                Ok(OrderedWithLabel {
                    a: args.arg(0)?,
                    b: args.arg(1)?,
                    c: args.arg(2)?,
                })
            },
        )
        .build()
}

/// Removed field: `{b: int}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedOnlyB {
    pub b: i32,
}

pub fn ordered_only_b_shape() -> TypeShape {
    TypeShape::concrete::<OrderedOnlyB>(ORDERED)
        .property("b", FieldType::Int, |o: &OrderedOnlyB| Value::Int(o.b))
        .constructor(vec![Param::new("b", FieldType::Int)], |mut args| {
            Ok(OrderedOnlyB { b: args.arg(0)? })
        })
        .build()
}

/// Changed type: `{a: string, b: int}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedRetyped {
    pub a: String,
    pub b: i32,
}

pub fn ordered_retyped_shape() -> TypeShape {
    TypeShape::concrete::<OrderedRetyped>(ORDERED)
        .property("a", FieldType::String, |o: &OrderedRetyped| {
            Value::String(o.a.clone())
        })
        .property("b", FieldType::Int, |o: &OrderedRetyped| Value::Int(o.b))
        .constructor(
            vec![
                Param::new("a", FieldType::String),
                Param::new("b", FieldType::Int),
            ],
            |mut args| {
                Ok(OrderedRetyped {
                    a: args.arg(0)?,
                    b: args.arg(1)?,
                })
            },
        )
        .build()
}

/// Nullable first field: `{a: int?, b: int}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMaybeA {
    pub a: Option<i32>,
    pub b: i32,
}

pub fn ordered_maybe_a_shape() -> TypeShape {
    TypeShape::concrete::<OrderedMaybeA>(ORDERED)
        .nullable_property("a", FieldType::Int, |o: &OrderedMaybeA| {
            o.a.map(Value::Int).unwrap_or(Value::Null)
        })
        .property("b", FieldType::Int, |o: &OrderedMaybeA| Value::Int(o.b))
        .constructor(
            vec![
                Param::nullable("a", FieldType::Int),
                Param::new("b", FieldType::Int),
            ],
            |mut args| {
                Ok(OrderedMaybeA {
                    a: args.arg(0)?,
                    b: args.arg(1)?,
                })
            },
        )
        .build()
}

/// Encode an `OrderedMaybeA` with its own factory.
pub fn maybe_a_payload(a: Option<i32>) -> Vec<u8> {
    factory_with(vec![ordered_maybe_a_shape()])
        .encode(&OrderedMaybeA { a, b: 2 })
        .unwrap()
}

/// Encode an `OrderedV1 { a: 1, b: 2 }` with its own factory.
pub fn old_ordered_payload() -> Vec<u8> {
    factory_with(vec![ordered_v1_shape()])
        .encode(&OrderedV1 { a: 1, b: 2 })
        .unwrap()
}
