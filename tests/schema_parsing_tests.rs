// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Definition parsing tests over realistic bag-style inputs.

use bagcodec::{CodecError, Format, ParseErrorKind, Preset, TypeSpec, TypeStore};

#[test]
fn connection_record_bundle() {
    // The shape found in bag1 connection records: primary definition first,
    // dependencies behind separators.
    let text = format!(
        "\
# robot observation
std_msgs/Header header
byte kind
char code
Other[] others

{sep}
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id

{sep}
MSG: test_msgs/Other
uint64[3] codes
uint32 STATIC = 42
",
        sep = "=".repeat(80)
    );

    let mut store = TypeStore::new(Preset::Ros1);
    let names = store
        .register_text(&text, Format::Msg, Some("test_msgs/msg/Observation"))
        .unwrap();
    assert_eq!(names.len(), 3);

    let observation = store.lookup("test_msgs/msg/Observation").unwrap();
    assert_eq!(observation.fields.len(), 4);
    assert_eq!(
        observation.fields[3].spec.nameref(),
        Some("test_msgs/msg/Other")
    );

    // The seq-carrying bundle Header yields to the canonical catalog shape.
    let header = store.lookup("std_msgs/msg/Header").unwrap();
    assert_eq!(header.fields.len(), 2);

    let other = store.lookup("test_msgs/msg/Other").unwrap();
    assert_eq!(other.constants[0].name, "STATIC");
}

#[test]
fn string_field_before_string_constant() {
    // A `string` field must not be parsed as a constant, and a constant
    // must swallow its whole line.
    let text = "string s\nstring GREETING=hello there # not a comment";
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text(text, Format::Msg, Some("p/msg/Conf"))
        .unwrap();
    let desc = store.lookup("p/msg/Conf").unwrap();
    assert_eq!(desc.fields.len(), 1);
    assert_eq!(desc.constants.len(), 1);
    assert_eq!(
        desc.constants[0].value,
        bagcodec::Literal::Str("hello there # not a comment".to_string())
    );
}

#[test]
fn msg_error_positions() {
    let mut store = TypeStore::new(Preset::Empty);
    let err = store
        .register_text("int32 ok\nint32[bad] xs", Format::Msg, Some("p/msg/E"))
        .unwrap_err();
    match err {
        CodecError::Parse { kind, line, .. } => {
            assert_eq!(kind, ParseErrorKind::MalformedArray);
            assert_eq!(line, 2);
        }
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn idl_multi_message_bundle() {
    let sep = "=".repeat(80);
    let text = format!(
        r#"{sep}
IDL: demo_msgs/msg/FaultStatus
// generated from rosidl_adapter
#include "std_msgs/msg/Header.idl"

module demo_msgs {{
  module msg {{
    struct FaultStatus {{
      @verbatim (language="comment", text=
        "Standard message header")
      std_msgs::msg::Header header;

      sequence<demo_msgs::msg::FaultDescription> faults;
    }};
  }};
}};

{sep}
IDL: demo_msgs/msg/FaultDescription
module demo_msgs {{
  module msg {{
    struct FaultDescription {{
      string error_id;

      uint16 error_code;
    }};
  }};
}};
"#
    );

    let mut store = TypeStore::new(Preset::Ros2);
    let names = store
        .register_text(&text, Format::Idl, Some("demo_msgs/msg/FaultStatus"))
        .unwrap();
    assert_eq!(names[0], "demo_msgs/msg/FaultStatus");

    let closure = store.closure("demo_msgs/msg/FaultStatus").unwrap();
    assert!(closure.contains(&"std_msgs/msg/Header".to_string()));
    assert!(closure.contains(&"demo_msgs/msg/FaultDescription".to_string()));
}

#[test]
fn idl_unicode_annotation_text() {
    let idl = "
module demo_msgs {
  module msg {
    struct Annotated {
      @verbatim (language=\"comment\", text=
        \"故障数组 \\u00e9\")
      sequence<int32> values;
    };
  };
};
";
    let mut store = TypeStore::new(Preset::Empty);
    store.register_text(idl, Format::Idl, None).unwrap();
    let desc = store.lookup("demo_msgs/msg/Annotated").unwrap();
    assert!(matches!(
        desc.fields[0].spec,
        TypeSpec::Sequence { .. }
    ));
}

#[test]
fn relative_sibling_names() {
    let text = "Header header\nOther other";
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text(text, Format::Msg, Some("test_msgs/msg/Rel"))
        .unwrap();
    let desc = store.lookup("test_msgs/msg/Rel").unwrap();
    assert_eq!(desc.fields[0].spec.nameref(), Some("std_msgs/msg/Header"));
    assert_eq!(desc.fields[1].spec.nameref(), Some("test_msgs/msg/Other"));
}

#[test]
fn bounded_types_parse_everywhere() {
    let text = "\
int32[] unbounded_integer_array
int32[5] five_integers_array
int32[<=5] up_to_five_integers_array
string string_of_unbounded_size
string<=10 up_to_ten_characters_string
string[<=5] up_to_five_unbounded_strings
string<=10[] unbounded_array_of_string_up_to_ten_characters_each
string<=10[<=5] up_to_five_strings_up_to_ten_characters_each
";
    let mut store = TypeStore::new(Preset::Empty);
    store
        .register_text(text, Format::Msg, Some("test_msgs/msg/Bounds"))
        .unwrap();
    let desc = store.lookup("test_msgs/msg/Bounds").unwrap();
    assert_eq!(desc.fields.len(), 8);
}
