// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR codec.
//!
//! Descriptor-driven (de)serialization following the CDR rules: a 4-byte
//! representation header, primitives aligned to `min(sizeof, 8)` relative
//! to the payload start, length-prefixed strings with NUL terminator,
//! count-prefixed sequences, and nested structs inlined with alignment
//! carried through.

pub mod cursor;
pub mod encoder;

pub use cursor::{CdrCursor, CDR_HEADER_SIZE};
pub use encoder::CdrEncoder;

use crate::core::error::{CodecError, Result};
use crate::core::value::{MessageValue, Value};
use crate::encoding::{default_value, Endianness, Strictness};
use crate::schema::ast::{BaseType, Descriptor, ElemType, Field, TypeSpec};
use crate::store::TypeStore;

/// Serialize a value tree as little-endian CDR.
pub fn serialize(store: &TypeStore, type_name: &str, value: &MessageValue) -> Result<Vec<u8>> {
    serialize_with(store, type_name, value, Endianness::Little)
}

/// Serialize a value tree with an explicit byte order.
pub fn serialize_with(
    store: &TypeStore,
    type_name: &str,
    value: &MessageValue,
    endianness: Endianness,
) -> Result<Vec<u8>> {
    let desc = store.get(type_name)?;
    let mut encoder = CdrEncoder::with_endianness(endianness);
    write_message(&mut encoder, store, desc, value)?;
    Ok(encoder.finish())
}

/// Deserialize CDR bytes into a value tree, tolerating trailing bytes.
pub fn deserialize(store: &TypeStore, type_name: &str, data: &[u8]) -> Result<MessageValue> {
    deserialize_with(store, type_name, data, Strictness::Lenient)
}

/// Deserialize CDR bytes with an explicit trailing-byte policy.
pub fn deserialize_with(
    store: &TypeStore,
    type_name: &str,
    data: &[u8],
    strictness: Strictness,
) -> Result<MessageValue> {
    let desc = store.get(type_name)?;
    let mut cursor = CdrCursor::new(data)?;
    let message = read_message(&mut cursor, store, desc)?;
    if strictness == Strictness::Strict && cursor.remaining() > 0 {
        return Err(CodecError::overlong(cursor.remaining(), cursor.position()));
    }
    Ok(message)
}

/// Number of bytes [`serialize`] will produce, header included.
pub fn message_size(store: &TypeStore, type_name: &str, value: &MessageValue) -> Result<usize> {
    let desc = store.get(type_name)?;
    Ok(CDR_HEADER_SIZE + size_message(store, desc, value, 0)?)
}

// ---------------------------------------------------------------------------
// Write path
// ---------------------------------------------------------------------------

fn write_message(
    encoder: &mut CdrEncoder,
    store: &TypeStore,
    desc: &Descriptor,
    value: &MessageValue,
) -> Result<()> {
    for field in &desc.fields {
        let field_value = lookup_field(value, field, encoder.size())?;
        write_field(encoder, store, field, field_value.as_ref())?;
    }
    Ok(())
}

/// Fetch a field's value, falling back to its declared default.
fn lookup_field<'v>(
    value: &'v MessageValue,
    field: &Field,
    offset: usize,
) -> Result<FieldValue<'v>> {
    if let Some(present) = value.get(&field.safe_name()) {
        return Ok(FieldValue::Borrowed(present));
    }
    if let Some(default) = &field.default {
        return Ok(FieldValue::Owned(default_value(default, &field.spec)?));
    }
    Err(CodecError::encoding(
        "cdr",
        format!("missing field '{}'", field.name),
        offset,
    ))
}

enum FieldValue<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

impl FieldValue<'_> {
    fn as_ref(&self) -> &Value {
        match self {
            FieldValue::Borrowed(value) => value,
            FieldValue::Owned(value) => value,
        }
    }
}

fn write_field(
    encoder: &mut CdrEncoder,
    store: &TypeStore,
    field: &Field,
    value: &Value,
) -> Result<()> {
    match &field.spec {
        TypeSpec::Base(base) => write_base(encoder, base, value, &field.name),
        TypeSpec::Name(name) => {
            let nested = expect_struct(value, &field.name, encoder.size())?;
            write_message(encoder, store, store.get(name)?, nested)
        }
        TypeSpec::Array { elem, len } => {
            let actual = container_len(value, elem, &field.name, encoder.size())?;
            if actual != *len {
                return Err(CodecError::bound_violation(actual, *len, encoder.size()));
            }
            write_elements(encoder, store, elem, value, &field.name)
        }
        TypeSpec::Sequence { elem, bound } => {
            let actual = container_len(value, elem, &field.name, encoder.size())?;
            if let Some(bound) = bound {
                if actual > *bound {
                    return Err(CodecError::bound_violation(actual, *bound, encoder.size()));
                }
            }
            encoder.uint32(actual as u32);
            write_elements(encoder, store, elem, value, &field.name)
        }
    }
}

fn write_elements(
    encoder: &mut CdrEncoder,
    store: &TypeStore,
    elem: &ElemType,
    value: &Value,
    field_name: &str,
) -> Result<()> {
    match (elem, value) {
        (ElemType::Base(base), Value::Bytes(bytes)) if base.is_byteish() => {
            encoder.bytes(bytes);
            Ok(())
        }
        (ElemType::Base(base), Value::Array(items)) => {
            for item in items {
                write_base(encoder, base, item, field_name)?;
            }
            Ok(())
        }
        (ElemType::Name(name), Value::Array(items)) => {
            let desc = store.get(name)?;
            for item in items {
                let nested = expect_struct(item, field_name, encoder.size())?;
                write_message(encoder, store, desc, nested)?;
            }
            Ok(())
        }
        _ => Err(type_mismatch("cdr", field_name, "array", value, encoder.size())),
    }
}

fn write_base(
    encoder: &mut CdrEncoder,
    base: &BaseType,
    value: &Value,
    field_name: &str,
) -> Result<()> {
    let offset = encoder.size();
    let err = |expected: &str| type_mismatch("cdr", field_name, expected, value, offset);

    match base {
        BaseType::Bool => encoder.bool(value.as_bool().ok_or_else(|| err("bool"))?),
        BaseType::Octet | BaseType::UInt8 => {
            let v = value.as_u64().and_then(|v| u8::try_from(v).ok());
            encoder.uint8(v.ok_or_else(|| err("uint8"))?);
        }
        BaseType::UInt16 => {
            let v = value.as_u64().and_then(|v| u16::try_from(v).ok());
            encoder.uint16(v.ok_or_else(|| err("uint16"))?);
        }
        BaseType::UInt32 => {
            let v = value.as_u64().and_then(|v| u32::try_from(v).ok());
            encoder.uint32(v.ok_or_else(|| err("uint32"))?);
        }
        BaseType::UInt64 => encoder.uint64(value.as_u64().ok_or_else(|| err("uint64"))?),
        BaseType::Int8 => {
            let v = value.as_i64().and_then(|v| i8::try_from(v).ok());
            encoder.int8(v.ok_or_else(|| err("int8"))?);
        }
        BaseType::Int16 => {
            let v = value.as_i64().and_then(|v| i16::try_from(v).ok());
            encoder.int16(v.ok_or_else(|| err("int16"))?);
        }
        BaseType::Int32 => {
            let v = value.as_i64().and_then(|v| i32::try_from(v).ok());
            encoder.int32(v.ok_or_else(|| err("int32"))?);
        }
        BaseType::Int64 => encoder.int64(value.as_i64().ok_or_else(|| err("int64"))?),
        BaseType::Float32 => encoder.float32(value.as_f64().ok_or_else(|| err("float32"))? as f32),
        BaseType::Float64 => encoder.float64(value.as_f64().ok_or_else(|| err("float64"))?),
        BaseType::String { bound } => {
            let s = value.as_str().ok_or_else(|| err("string"))?;
            check_string_bound(s, *bound, offset)?;
            encoder.string(s);
        }
        BaseType::WString { bound } => {
            let s = value.as_str().ok_or_else(|| err("wstring"))?;
            check_string_bound(s, *bound, offset)?;
            encoder.wstring(s);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read path
// ---------------------------------------------------------------------------

fn read_message(
    cursor: &mut CdrCursor<'_>,
    store: &TypeStore,
    desc: &Descriptor,
) -> Result<MessageValue> {
    let mut message = MessageValue::with_capacity(desc.fields.len());
    for field in &desc.fields {
        let value = read_field(cursor, store, &field.spec)?;
        message.insert(field.safe_name(), value);
    }
    Ok(message)
}

fn read_field(
    cursor: &mut CdrCursor<'_>,
    store: &TypeStore,
    spec: &TypeSpec,
) -> Result<Value> {
    match spec {
        TypeSpec::Base(base) => read_base(cursor, base),
        TypeSpec::Name(name) => {
            let desc = store.get(name)?;
            Ok(Value::Struct(read_message(cursor, store, desc)?))
        }
        TypeSpec::Array { elem, len } => read_elements(cursor, store, elem, *len),
        TypeSpec::Sequence { elem, bound } => {
            let start = cursor.position();
            let count = cursor.read_u32()? as usize;
            if let Some(bound) = bound {
                if count > *bound {
                    return Err(CodecError::bound_violation(count, *bound, start));
                }
            }
            if count > cursor.remaining() {
                return Err(CodecError::truncated(count, cursor.remaining(), start));
            }
            read_elements(cursor, store, elem, count)
        }
    }
}

fn read_elements(
    cursor: &mut CdrCursor<'_>,
    store: &TypeStore,
    elem: &ElemType,
    count: usize,
) -> Result<Value> {
    match elem {
        ElemType::Base(base) if base.is_byteish() => {
            Ok(Value::Bytes(cursor.read_bytes(count)?.to_vec()))
        }
        ElemType::Base(base) => {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(read_base(cursor, base)?);
            }
            Ok(Value::Array(items))
        }
        ElemType::Name(name) => {
            let desc = store.get(name)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(Value::Struct(read_message(cursor, store, desc)?));
            }
            Ok(Value::Array(items))
        }
    }
}

fn read_base(cursor: &mut CdrCursor<'_>, base: &BaseType) -> Result<Value> {
    let value = match base {
        BaseType::Bool => Value::Bool(cursor.read_bool()?),
        BaseType::Octet | BaseType::UInt8 => Value::UInt8(cursor.read_u8()?),
        BaseType::UInt16 => Value::UInt16(cursor.read_u16()?),
        BaseType::UInt32 => Value::UInt32(cursor.read_u32()?),
        BaseType::UInt64 => Value::UInt64(cursor.read_u64()?),
        BaseType::Int8 => Value::Int8(cursor.read_i8()?),
        BaseType::Int16 => Value::Int16(cursor.read_i16()?),
        BaseType::Int32 => Value::Int32(cursor.read_i32()?),
        BaseType::Int64 => Value::Int64(cursor.read_i64()?),
        BaseType::Float32 => Value::Float32(cursor.read_f32()?),
        BaseType::Float64 => Value::Float64(cursor.read_f64()?),
        BaseType::String { bound } => {
            let start = cursor.position();
            let s = cursor.read_string()?;
            check_string_bound(&s, *bound, start)?;
            Value::String(s)
        }
        BaseType::WString { bound } => {
            let start = cursor.position();
            let s = cursor.read_wstring()?;
            check_string_bound(&s, *bound, start)?;
            Value::String(s)
        }
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Size path
// ---------------------------------------------------------------------------

fn size_message(
    store: &TypeStore,
    desc: &Descriptor,
    value: &MessageValue,
    mut pos: usize,
) -> Result<usize> {
    for field in &desc.fields {
        let field_value = lookup_field(value, field, pos)?;
        pos = size_field(store, field, field_value.as_ref(), pos)?;
    }
    Ok(pos)
}

fn size_field(store: &TypeStore, field: &Field, value: &Value, pos: usize) -> Result<usize> {
    match &field.spec {
        TypeSpec::Base(base) => size_base(base, value, pos, &field.name),
        TypeSpec::Name(name) => {
            let nested = expect_struct(value, &field.name, pos)?;
            size_message(store, store.get(name)?, nested, pos)
        }
        TypeSpec::Array { elem, len } => {
            let actual = container_len(value, elem, &field.name, pos)?;
            if actual != *len {
                return Err(CodecError::bound_violation(actual, *len, pos));
            }
            size_elements(store, elem, value, pos, &field.name)
        }
        TypeSpec::Sequence { elem, bound } => {
            let actual = container_len(value, elem, &field.name, pos)?;
            if let Some(bound) = bound {
                if actual > *bound {
                    return Err(CodecError::bound_violation(actual, *bound, pos));
                }
            }
            let pos = align_up(pos, 4) + 4;
            size_elements(store, elem, value, pos, &field.name)
        }
    }
}

fn size_elements(
    store: &TypeStore,
    elem: &ElemType,
    value: &Value,
    mut pos: usize,
    field_name: &str,
) -> Result<usize> {
    match (elem, value) {
        (ElemType::Base(base), Value::Bytes(bytes)) if base.is_byteish() => Ok(pos + bytes.len()),
        (ElemType::Base(base), Value::Array(items)) => {
            for item in items {
                pos = size_base(base, item, pos, field_name)?;
            }
            Ok(pos)
        }
        (ElemType::Name(name), Value::Array(items)) => {
            let desc = store.get(name)?;
            for item in items {
                let nested = expect_struct(item, field_name, pos)?;
                pos = size_message(store, desc, nested, pos)?;
            }
            Ok(pos)
        }
        _ => Err(type_mismatch("cdr", field_name, "array", value, pos)),
    }
}

fn size_base(base: &BaseType, value: &Value, pos: usize, field_name: &str) -> Result<usize> {
    match base {
        BaseType::String { .. } => {
            let s = value
                .as_str()
                .ok_or_else(|| type_mismatch("cdr", field_name, "string", value, pos))?;
            Ok(align_up(pos, 4) + 4 + s.len() + 1)
        }
        BaseType::WString { .. } => {
            let s = value
                .as_str()
                .ok_or_else(|| type_mismatch("cdr", field_name, "wstring", value, pos))?;
            Ok(align_up(pos, 4) + 4 + s.encode_utf16().count() * 2)
        }
        other => {
            let size = other.size().unwrap_or(1);
            Ok(align_up(pos, size) + size)
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn align_up(pos: usize, alignment: usize) -> usize {
    (pos + alignment - 1) & !(alignment - 1)
}

fn expect_struct<'v>(value: &'v Value, field_name: &str, offset: usize) -> Result<&'v MessageValue> {
    value
        .as_struct()
        .ok_or_else(|| type_mismatch("cdr", field_name, "struct", value, offset))
}

fn container_len(
    value: &Value,
    elem: &ElemType,
    field_name: &str,
    offset: usize,
) -> Result<usize> {
    match (value, elem) {
        (Value::Bytes(bytes), ElemType::Base(base)) if base.is_byteish() => Ok(bytes.len()),
        (Value::Array(items), _) => Ok(items.len()),
        _ => Err(type_mismatch("cdr", field_name, "array", value, offset)),
    }
}

fn check_string_bound(s: &str, bound: Option<usize>, offset: usize) -> Result<()> {
    if let Some(bound) = bound {
        let length = s.chars().count();
        if length > bound {
            return Err(CodecError::bound_violation(length, bound, offset));
        }
    }
    Ok(())
}

fn type_mismatch(
    codec: &str,
    field_name: &str,
    expected: &str,
    value: &Value,
    offset: usize,
) -> CodecError {
    CodecError::encoding(
        codec,
        format!(
            "field '{field_name}': expected {expected}, got {}",
            value.type_name()
        ),
        offset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Format;
    use crate::store::Preset;

    fn store_with(text: &str, name: &str) -> TypeStore {
        let mut store = TypeStore::new(Preset::Empty);
        store.register_text(text, Format::Msg, Some(name)).unwrap();
        store
    }

    fn msg(entries: Vec<(&str, Value)>) -> MessageValue {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_scalar_and_string_layout() {
        let store = store_with("uint32 a\nstring b", "p/Foo");
        let value = msg(vec![
            ("a", Value::UInt32(1)),
            ("b", Value::String("hi".to_string())),
        ]);
        let bytes = serialize(&store, "p/msg/Foo", &value).unwrap();
        assert_eq!(
            bytes,
            vec![0x00, 0x01, 0x00, 0x00, 1, 0, 0, 0, 3, 0, 0, 0, b'h', b'i', 0]
        );
        assert_eq!(
            message_size(&store, "p/msg/Foo", &value).unwrap(),
            bytes.len()
        );
        assert_eq!(deserialize(&store, "p/msg/Foo", &bytes).unwrap(), value);
    }

    #[test]
    fn test_empty_sequence_layout() {
        let store = store_with("uint8[] xs", "p/E");
        let value = msg(vec![("xs", Value::Bytes(vec![]))]);
        let bytes = serialize(&store, "p/msg/E", &value).unwrap();
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x00, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_struct_occupies_zero_bytes() {
        let store = store_with("", "p/Nothing");
        let value = MessageValue::new();
        let bytes = serialize(&store, "p/msg/Nothing", &value).unwrap();
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x00]);
        assert_eq!(deserialize(&store, "p/msg/Nothing", &bytes).unwrap(), value);
    }

    #[test]
    fn test_alignment_through_nested_struct() {
        let text = format!(
            "uint8 pad\np/Inner inner\nfloat64 tail\n{sep}\nMSG: p/Inner\nuint8 x\n",
            sep = "=".repeat(80)
        );
        let store = store_with(&text, "p/Outer");
        let value = msg(vec![
            ("pad", Value::UInt8(1)),
            (
                "inner",
                Value::Struct(msg(vec![("x", Value::UInt8(2))])),
            ),
            ("tail", Value::Float64(0.5)),
        ]);
        let bytes = serialize(&store, "p/msg/Outer", &value).unwrap();
        // pad at 0, inner.x at 1, then padding to 8 for the float64.
        assert_eq!(bytes.len(), 4 + 16);
        assert_eq!(
            message_size(&store, "p/msg/Outer", &value).unwrap(),
            bytes.len()
        );
        assert_eq!(deserialize(&store, "p/msg/Outer", &bytes).unwrap(), value);
    }

    #[test]
    fn test_sequence_bound_enforced() {
        let store = store_with("int32[<=2] xs", "p/B");
        let value = msg(vec![(
            "xs",
            Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)]),
        )]);
        assert!(matches!(
            serialize(&store, "p/msg/B", &value),
            Err(CodecError::BoundViolation {
                length: 3,
                bound: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_fixed_array_length_enforced() {
        let store = store_with("float32[3] xs", "p/A");
        let value = msg(vec![(
            "xs",
            Value::Array(vec![Value::Float32(1.0)]),
        )]);
        assert!(matches!(
            serialize(&store, "p/msg/A", &value),
            Err(CodecError::BoundViolation { .. })
        ));
    }

    #[test]
    fn test_strict_mode_flags_trailing_bytes() {
        let store = store_with("uint8 x", "p/S");
        let value = msg(vec![("x", Value::UInt8(1))]);
        let mut bytes = serialize(&store, "p/msg/S", &value).unwrap();
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        assert!(deserialize(&store, "p/msg/S", &bytes).is_ok());
        assert!(matches!(
            deserialize_with(&store, "p/msg/S", &bytes, Strictness::Strict),
            Err(CodecError::Overlong { remaining: 2, .. })
        ));
    }

    #[test]
    fn test_missing_field_uses_default() {
        let store = store_with("uint8 x 42", "p/D");
        let bytes = serialize(&store, "p/msg/D", &MessageValue::new()).unwrap();
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x00, 42]);
    }

    #[test]
    fn test_missing_field_without_default_errors() {
        let store = store_with("uint8 x", "p/M");
        assert!(matches!(
            serialize(&store, "p/msg/M", &MessageValue::new()),
            Err(CodecError::EncodingError { .. })
        ));
    }

    #[test]
    fn test_big_endian_round_trip() {
        let store = store_with("uint32 a\nfloat64 b", "p/BE");
        let value = msg(vec![("a", Value::UInt32(7)), ("b", Value::Float64(2.5))]);
        let bytes = serialize_with(&store, "p/msg/BE", &value, Endianness::Big).unwrap();
        assert_eq!(bytes[1], 0x00);
        assert_eq!(deserialize(&store, "p/msg/BE", &bytes).unwrap(), value);
    }

    #[test]
    fn test_string_sequence_alignment() {
        let store = store_with("string[] names", "p/Names");
        let value = msg(vec![(
            "names",
            Value::Array(vec![
                Value::String("a".to_string()),
                Value::String("b".to_string()),
            ]),
        )]);
        let bytes = serialize(&store, "p/msg/Names", &value).unwrap();
        // count | len 2 'a' 0 | pad pad | len 2 'b' 0
        assert_eq!(
            bytes[4..],
            [
                2, 0, 0, 0, 2, 0, 0, 0, b'a', 0, 0, 0, 2, 0, 0, 0, b'b', 0
            ]
        );
        assert_eq!(
            message_size(&store, "p/msg/Names", &value).unwrap(),
            bytes.len()
        );
        assert_eq!(deserialize(&store, "p/msg/Names", &bytes).unwrap(), value);
    }

    #[test]
    fn test_sequence_count_sanity_check() {
        let store = store_with("int32[] xs", "p/T");
        // Count claims 1000 elements but no data follows.
        let bytes = vec![0x00, 0x01, 0x00, 0x00, 0xE8, 0x03, 0x00, 0x00];
        assert!(matches!(
            deserialize(&store, "p/msg/T", &bytes),
            Err(CodecError::Truncated { .. })
        ));
    }
}
