// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-level wire1 <-> CDR translator tests.

use bagcodec::{cdr, convert, ros1, Format, MessageValue, Preset, TypeStore, Value};

fn msg(entries: Vec<(&str, Value)>) -> MessageValue {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Both translation directions invert each other for types without a
/// Header (the Header seq field is lossy by design).
fn assert_bijective(store: &TypeStore, type_name: &str, ros1_bytes: &[u8]) {
    let cdr_bytes = convert::ros1_to_cdr(store, type_name, ros1_bytes).unwrap();
    assert_eq!(
        convert::cdr_to_ros1(store, type_name, &cdr_bytes).unwrap(),
        ros1_bytes,
        "{type_name}: ros1 -> cdr -> ros1"
    );
    assert_eq!(
        convert::ros1_to_cdr(store, type_name, ros1_bytes).unwrap(),
        cdr_bytes,
        "{type_name}: translation is deterministic"
    );
}

#[test]
fn spec_scenario_header_translation() {
    let store = TypeStore::new(Preset::Ros1);
    let ros1_bytes = [
        0x07, 0x00, 0x00, 0x00, // seq = 7
        0x01, 0x00, 0x00, 0x00, // stamp.sec = 1
        0x02, 0x00, 0x00, 0x00, // stamp.nsec = 2
        0x01, 0x00, 0x00, 0x00, 0x6D, // frame_id = "m"
    ];
    let cdr_bytes = convert::ros1_to_cdr(&store, "std_msgs/msg/Header", &ros1_bytes).unwrap();
    assert_eq!(
        cdr_bytes,
        [
            0x00, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02, 0x00,
            0x00, 0x00, 0x6D, 0x00
        ]
    );

    // The decoded CDR message carries stamp and frame_id; seq is gone.
    let decoded = cdr::deserialize(&store, "std_msgs/msg/Header", &cdr_bytes).unwrap();
    assert_eq!(decoded["frame_id"], Value::String("m".to_string()));
    let stamp = decoded["stamp"].as_struct().unwrap();
    assert_eq!(stamp["sec"], Value::Int32(1));
    assert_eq!(stamp["nanosec"], Value::UInt32(2));
}

#[test]
fn translation_agrees_with_codecs() {
    // ros1_to_cdr(serialize_ros1(v)) == serialize_cdr(v) field by field.
    let store = TypeStore::new(Preset::Ros2);
    let value = msg(vec![
        (
            "points",
            Value::Array(vec![
                Value::Struct(msg(vec![
                    ("x", Value::Float32(1.0)),
                    ("y", Value::Float32(2.0)),
                    ("z", Value::Float32(3.0)),
                ])),
                Value::Struct(msg(vec![
                    ("x", Value::Float32(1.25)),
                    ("y", Value::Float32(2.25)),
                    ("z", Value::Float32(3.25)),
                ])),
            ]),
        ),
    ]);
    let type_name = "geometry_msgs/msg/Polygon";

    let from_value = cdr::serialize(&store, type_name, &value).unwrap();
    let ros1_bytes = ros1::serialize(&store, type_name, &value).unwrap();
    let translated = convert::ros1_to_cdr(&store, type_name, &ros1_bytes).unwrap();
    assert_eq!(translated, from_value);

    let back = convert::cdr_to_ros1(&store, type_name, &from_value).unwrap();
    assert_eq!(back, ros1_bytes);
}

#[test]
fn bijective_on_mixed_alignment_type() {
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text(
            "uint8 a\nuint64 b\nstring c\nuint16[] shorts\nfloat64[] doubles",
            Format::Msg,
            Some("p/msg/Mixed"),
        )
        .unwrap();
    let value = msg(vec![
        ("a", Value::UInt8(1)),
        ("b", Value::UInt64(2)),
        ("c", Value::String("xyz".to_string())),
        (
            "shorts",
            Value::Array(vec![Value::UInt16(10), Value::UInt16(20)]),
        ),
        (
            "doubles",
            Value::Array(vec![Value::Float64(0.5)]),
        ),
    ]);
    let ros1_bytes = ros1::serialize(&store, "p/msg/Mixed", &value).unwrap();
    assert_bijective(&store, "p/msg/Mixed", &ros1_bytes);
}

#[test]
fn bijective_on_string_sequences() {
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text(
            "string[] names\nstring[2] pair\nuint32 tail",
            Format::Msg,
            Some("p/msg/Strs"),
        )
        .unwrap();
    let value = msg(vec![
        (
            "names",
            Value::Array(vec![
                Value::String("a".to_string()),
                Value::String(String::new()),
                Value::String("long-ish entry".to_string()),
            ]),
        ),
        (
            "pair",
            Value::Array(vec![
                Value::String("x".to_string()),
                Value::String("y".to_string()),
            ]),
        ),
        ("tail", Value::UInt32(0xCAFE)),
    ]);
    let ros1_bytes = ros1::serialize(&store, "p/msg/Strs", &value).unwrap();
    assert_bijective(&store, "p/msg/Strs", &ros1_bytes);
}

#[test]
fn bijective_on_nested_messages() {
    let store = TypeStore::new(Preset::Ros2);
    let quaternion = Value::Struct(msg(vec![
        ("x", Value::Float64(0.0)),
        ("y", Value::Float64(0.0)),
        ("z", Value::Float64(0.7)),
        ("w", Value::Float64(0.7)),
    ]));
    let vector = Value::Struct(msg(vec![
        ("x", Value::Float64(1.0)),
        ("y", Value::Float64(2.0)),
        ("z", Value::Float64(3.0)),
    ]));
    let value = msg(vec![
        ("translation", vector),
        ("rotation", quaternion),
    ]);
    let ros1_bytes = ros1::serialize(&store, "geometry_msgs/msg/Transform", &value).unwrap();
    assert_bijective(&store, "geometry_msgs/msg/Transform", &ros1_bytes);
}

#[test]
fn nested_header_translates_per_occurrence() {
    let mut store = TypeStore::new(Preset::Ros1);
    store
        .register_text(
            "std_msgs/Header header\nuint8 x",
            Format::Msg,
            Some("p/msg/Stamped"),
        )
        .unwrap();

    let mut ros1_bytes = Vec::new();
    ros1_bytes.extend_from_slice(&9u32.to_le_bytes()); // seq
    ros1_bytes.extend_from_slice(&1i32.to_le_bytes()); // sec
    ros1_bytes.extend_from_slice(&2u32.to_le_bytes()); // nsec
    ros1_bytes.extend_from_slice(&0u32.to_le_bytes()); // empty frame_id
    ros1_bytes.push(5); // x

    let cdr_bytes = convert::ros1_to_cdr(&store, "p/msg/Stamped", &ros1_bytes).unwrap();
    let decoded = cdr::deserialize(&store, "p/msg/Stamped", &cdr_bytes).unwrap();
    assert_eq!(decoded["x"], Value::UInt8(5));

    // seq comes back as zero.
    let back = convert::cdr_to_ros1(&store, "p/msg/Stamped", &cdr_bytes).unwrap();
    let mut expected = ros1_bytes.clone();
    expected[..4].fill(0);
    assert_eq!(back, expected);
}

#[test]
fn translator_rejects_big_endian_cdr() {
    let store = TypeStore::new(Preset::Ros2);
    let bytes = [0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
    assert!(convert::cdr_to_ros1(&store, "std_msgs/msg/UInt32", &bytes).is_err());
}

#[test]
fn translator_surfaces_truncation() {
    let store = TypeStore::new(Preset::Ros2);
    let err = convert::ros1_to_cdr(&store, "std_msgs/msg/UInt32", &[1, 2]).unwrap_err();
    assert!(matches!(err, bagcodec::CodecError::Truncated { .. }));
}
