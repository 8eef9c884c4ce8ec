// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Serialize/deserialize round-trip tests for both codecs.

use bagcodec::{cdr, ros1, Format, MessageValue, Preset, TypeStore, Value};

fn msg(entries: Vec<(&str, Value)>) -> MessageValue {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn time(sec: i32, nanosec: u32) -> Value {
    Value::Struct(msg(vec![
        ("sec", Value::Int32(sec)),
        ("nanosec", Value::UInt32(nanosec)),
    ]))
}

fn header(sec: i32, nanosec: u32, frame_id: &str) -> Value {
    Value::Struct(msg(vec![
        ("stamp", time(sec, nanosec)),
        ("frame_id", Value::String(frame_id.to_string())),
    ]))
}

fn vector3(x: f64, y: f64, z: f64) -> Value {
    Value::Struct(msg(vec![
        ("x", Value::Float64(x)),
        ("y", Value::Float64(y)),
        ("z", Value::Float64(z)),
    ]))
}

fn assert_round_trips(store: &TypeStore, type_name: &str, value: &MessageValue) {
    let ros1_bytes = ros1::serialize(store, type_name, value).unwrap();
    assert_eq!(
        ros1::message_size(store, type_name, value).unwrap(),
        ros1_bytes.len(),
        "{type_name}: ros1 size mismatch"
    );
    assert_eq!(
        &ros1::deserialize(store, type_name, &ros1_bytes).unwrap(),
        value,
        "{type_name}: ros1 round trip"
    );

    let cdr_bytes = cdr::serialize(store, type_name, value).unwrap();
    assert_eq!(
        cdr::message_size(store, type_name, value).unwrap(),
        cdr_bytes.len(),
        "{type_name}: cdr size mismatch"
    );
    assert_eq!(
        &cdr::deserialize(store, type_name, &cdr_bytes).unwrap(),
        value,
        "{type_name}: cdr round trip"
    );
}

#[test]
fn spec_scenario_simple_struct() {
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text("uint32 a\nstring b", Format::Msg, Some("p/msg/Foo"))
        .unwrap();
    let value = msg(vec![
        ("a", Value::UInt32(1)),
        ("b", Value::String("hi".to_string())),
    ]);

    let ros1_bytes = ros1::serialize(&store, "p/msg/Foo", &value).unwrap();
    assert_eq!(
        ros1_bytes,
        [0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x68, 0x69]
    );

    let cdr_bytes = cdr::serialize(&store, "p/msg/Foo", &value).unwrap();
    assert_eq!(
        cdr_bytes,
        [
            0x00, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x68, 0x69,
            0x00
        ]
    );
}

#[test]
fn spec_scenario_empty_sequence() {
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text("uint8[] xs", Format::Msg, Some("p/msg/E"))
        .unwrap();
    let value = msg(vec![("xs", Value::Bytes(vec![]))]);

    assert_eq!(
        ros1::serialize(&store, "p/msg/E", &value).unwrap(),
        [0x00, 0x00, 0x00, 0x00]
    );
    assert_eq!(
        cdr::serialize(&store, "p/msg/E", &value).unwrap(),
        [0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
fn catalog_header_round_trips() {
    let store = TypeStore::new(Preset::Ros1);
    let value = msg(vec![
        ("stamp", time(708, 256)),
        ("frame_id", Value::String("base_link".to_string())),
    ]);
    assert_round_trips(&store, "std_msgs/msg/Header", &value);
}

#[test]
fn catalog_imu_round_trips() {
    let store = TypeStore::new(Preset::Ros2);
    let covariance =
        Value::Array((0..9).map(|i| Value::Float64(i as f64 * 0.5)).collect());
    let value = msg(vec![
        ("header", header(1, 2, "imu")),
        (
            "orientation",
            Value::Struct(msg(vec![
                ("x", Value::Float64(0.0)),
                ("y", Value::Float64(0.0)),
                ("z", Value::Float64(0.0)),
                ("w", Value::Float64(1.0)),
            ])),
        ),
        ("orientation_covariance", covariance.clone()),
        ("angular_velocity", vector3(0.1, 0.2, 0.3)),
        ("angular_velocity_covariance", covariance.clone()),
        ("linear_acceleration", vector3(9.8, 0.0, 0.0)),
        ("linear_acceleration_covariance", covariance),
    ]);
    assert_round_trips(&store, "sensor_msgs/msg/Imu", &value);
}

#[test]
fn catalog_joint_state_round_trips() {
    let store = TypeStore::new(Preset::Ros2);
    let value = msg(vec![
        ("header", header(10, 20, "robot")),
        (
            "name",
            Value::Array(vec![
                Value::String("shoulder".to_string()),
                Value::String("elbow".to_string()),
            ]),
        ),
        (
            "position",
            Value::Array(vec![Value::Float64(1.0), Value::Float64(-0.5)]),
        ),
        ("velocity", Value::Array(vec![])),
        ("effort", Value::Array(vec![])),
    ]);
    assert_round_trips(&store, "sensor_msgs/msg/JointState", &value);
}

#[test]
fn catalog_polygon_round_trips() {
    let store = TypeStore::new(Preset::Ros2);
    let point32 = |x: f32, y: f32, z: f32| {
        Value::Struct(msg(vec![
            ("x", Value::Float32(x)),
            ("y", Value::Float32(y)),
            ("z", Value::Float32(z)),
        ]))
    };
    let value = msg(vec![(
        "points",
        Value::Array(vec![point32(1.0, 2.0, 3.0), point32(1.25, 2.25, 3.25)]),
    )]);
    assert_round_trips(&store, "geometry_msgs/msg/Polygon", &value);
}

#[test]
fn mixed_alignment_type_round_trips() {
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text(
            "bool flag\nint16 s\nuint64 big\nstring tag\nfloat32[2] pair\nint64[] longs",
            Format::Msg,
            Some("p/msg/Mixed"),
        )
        .unwrap();
    let value = msg(vec![
        ("flag", Value::Bool(true)),
        ("s", Value::Int16(-7)),
        ("big", Value::UInt64(u64::MAX)),
        ("tag", Value::String("αβγ".to_string())),
        (
            "pair",
            Value::Array(vec![Value::Float32(1.5), Value::Float32(-2.5)]),
        ),
        (
            "longs",
            Value::Array(vec![Value::Int64(i64::MIN), Value::Int64(i64::MAX)]),
        ),
    ]);
    assert_round_trips(&store, "p/msg/Mixed", &value);
}

#[test]
fn constants_only_type_serializes_empty() {
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text(
            "uint8 OK=0\nuint8 FAILED=1",
            Format::Msg,
            Some("p/msg/Codes"),
        )
        .unwrap();
    let empty = MessageValue::new();
    assert_eq!(ros1::serialize(&store, "p/msg/Codes", &empty).unwrap(), []);
    assert_eq!(
        cdr::serialize(&store, "p/msg/Codes", &empty).unwrap(),
        [0x00, 0x01, 0x00, 0x00]
    );
}

#[test]
fn bounded_fields_round_trip_within_bounds() {
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text(
            "string<=10 short\nint32[<=5] few",
            Format::Msg,
            Some("p/msg/Bounded"),
        )
        .unwrap();
    let value = msg(vec![
        ("short", Value::String("ten chars!".to_string())),
        (
            "few",
            Value::Array(vec![Value::Int32(1), Value::Int32(2)]),
        ),
    ]);
    assert_round_trips(&store, "p/msg/Bounded", &value);
}

#[test]
fn wstring_round_trips_in_cdr() {
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text("wstring wide", Format::Msg, Some("p/msg/Wide"))
        .unwrap();
    let value = msg(vec![("wide", Value::String("héllo".to_string()))]);
    let bytes = cdr::serialize(&store, "p/msg/Wide", &value).unwrap();
    assert_eq!(cdr::deserialize(&store, "p/msg/Wide", &bytes).unwrap(), value);
    assert_eq!(
        cdr::message_size(&store, "p/msg/Wide", &value).unwrap(),
        bytes.len()
    );
}
