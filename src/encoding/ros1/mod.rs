// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! wire1 codec.
//!
//! Descriptor-driven (de)serialization following the ROS1 wire rules: all
//! primitives little-endian with no alignment, fields in declared order
//! with no gaps, `uint32` length prefixes for strings and sequences, fixed
//! arrays unprefixed, nested messages inlined.
//!
//! `std_msgs/msg/Header` is stored CDR-shaped; this codec bridges the ROS1
//! `seq` field by writing four zero bytes on encode and skipping four bytes
//! on decode, wherever a Header occurs.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::error::{CodecError, Result};
use crate::core::value::{MessageValue, Value};
use crate::encoding::{default_value, Strictness};
use crate::schema::ast::{BaseType, Descriptor, ElemType, Field, TypeSpec};
use crate::store::TypeStore;

/// The one type whose wire1 shape differs from its descriptor.
const HEADER_TYPE: &str = "std_msgs/msg/Header";

/// Serialize a value tree as wire1 bytes.
pub fn serialize(store: &TypeStore, type_name: &str, value: &MessageValue) -> Result<Vec<u8>> {
    let desc = store.get(type_name)?;
    let mut out = Vec::new();
    write_message(&mut out, store, desc, value)?;
    Ok(out)
}

/// Deserialize wire1 bytes into a value tree, tolerating trailing bytes.
pub fn deserialize(store: &TypeStore, type_name: &str, data: &[u8]) -> Result<MessageValue> {
    deserialize_with(store, type_name, data, Strictness::Lenient)
}

/// Deserialize wire1 bytes with an explicit trailing-byte policy.
pub fn deserialize_with(
    store: &TypeStore,
    type_name: &str,
    data: &[u8],
    strictness: Strictness,
) -> Result<MessageValue> {
    let desc = store.get(type_name)?;
    let mut reader = Reader { data, pos: 0 };
    let message = read_message(&mut reader, store, desc)?;
    if strictness == Strictness::Strict && reader.remaining() > 0 {
        return Err(CodecError::overlong(reader.remaining(), reader.pos));
    }
    Ok(message)
}

/// Number of bytes [`serialize`] will produce.
pub fn message_size(store: &TypeStore, type_name: &str, value: &MessageValue) -> Result<usize> {
    let desc = store.get(type_name)?;
    size_message(store, desc, value, 0)
}

// ---------------------------------------------------------------------------
// Write path
// ---------------------------------------------------------------------------

fn write_message(
    out: &mut Vec<u8>,
    store: &TypeStore,
    desc: &Descriptor,
    value: &MessageValue,
) -> Result<()> {
    if desc.name == HEADER_TYPE {
        // Implicit seq field, always zero on re-serialization.
        out.extend_from_slice(&[0; 4]);
    }
    for field in &desc.fields {
        let field_value = match value.get(&field.safe_name()) {
            Some(present) => present.clone(),
            None => match &field.default {
                Some(default) => default_value(default, &field.spec)?,
                None => {
                    return Err(CodecError::encoding(
                        "ros1",
                        format!("missing field '{}'", field.name),
                        out.len(),
                    ))
                }
            },
        };
        write_field(out, store, field, &field_value)?;
    }
    Ok(())
}

fn write_field(out: &mut Vec<u8>, store: &TypeStore, field: &Field, value: &Value) -> Result<()> {
    match &field.spec {
        TypeSpec::Base(base) => write_base(out, base, value, &field.name),
        TypeSpec::Name(name) => {
            let nested = value
                .as_struct()
                .ok_or_else(|| mismatch(&field.name, "struct", value, out.len()))?;
            write_message(out, store, store.get(name)?, nested)
        }
        TypeSpec::Array { elem, len } => {
            let actual = element_count(value, elem, &field.name, out.len())?;
            if actual != *len {
                return Err(CodecError::bound_violation(actual, *len, out.len()));
            }
            write_elements(out, store, elem, value, &field.name)
        }
        TypeSpec::Sequence { elem, bound } => {
            let actual = element_count(value, elem, &field.name, out.len())?;
            if let Some(bound) = bound {
                if actual > *bound {
                    return Err(CodecError::bound_violation(actual, *bound, out.len()));
                }
            }
            write_u32(out, actual as u32);
            write_elements(out, store, elem, value, &field.name)
        }
    }
}

fn write_elements(
    out: &mut Vec<u8>,
    store: &TypeStore,
    elem: &ElemType,
    value: &Value,
    field_name: &str,
) -> Result<()> {
    match (elem, value) {
        (ElemType::Base(base), Value::Bytes(bytes)) if base.is_byteish() => {
            out.extend_from_slice(bytes);
            Ok(())
        }
        (ElemType::Base(base), Value::Array(items)) => {
            for item in items {
                write_base(out, base, item, field_name)?;
            }
            Ok(())
        }
        (ElemType::Name(name), Value::Array(items)) => {
            let desc = store.get(name)?;
            for item in items {
                let nested = item
                    .as_struct()
                    .ok_or_else(|| mismatch(field_name, "struct", item, out.len()))?;
                write_message(out, store, desc, nested)?;
            }
            Ok(())
        }
        _ => Err(mismatch(field_name, "array", value, out.len())),
    }
}

fn write_base(out: &mut Vec<u8>, base: &BaseType, value: &Value, field_name: &str) -> Result<()> {
    let offset = out.len();
    let err = |expected: &str| mismatch(field_name, expected, value, offset);

    match base {
        BaseType::Bool => out.push(value.as_bool().ok_or_else(|| err("bool"))? as u8),
        BaseType::Octet | BaseType::UInt8 => {
            let v = value.as_u64().and_then(|v| u8::try_from(v).ok());
            out.push(v.ok_or_else(|| err("uint8"))?);
        }
        BaseType::UInt16 => {
            let v = value.as_u64().and_then(|v| u16::try_from(v).ok());
            out.extend_from_slice(&(v.ok_or_else(|| err("uint16"))?).to_le_bytes());
        }
        BaseType::UInt32 => {
            let v = value.as_u64().and_then(|v| u32::try_from(v).ok());
            write_u32(out, v.ok_or_else(|| err("uint32"))?);
        }
        BaseType::UInt64 => {
            out.extend_from_slice(&value.as_u64().ok_or_else(|| err("uint64"))?.to_le_bytes());
        }
        BaseType::Int8 => {
            let v = value.as_i64().and_then(|v| i8::try_from(v).ok());
            out.push(v.ok_or_else(|| err("int8"))? as u8);
        }
        BaseType::Int16 => {
            let v = value.as_i64().and_then(|v| i16::try_from(v).ok());
            out.extend_from_slice(&(v.ok_or_else(|| err("int16"))?).to_le_bytes());
        }
        BaseType::Int32 => {
            let v = value.as_i64().and_then(|v| i32::try_from(v).ok());
            out.extend_from_slice(&(v.ok_or_else(|| err("int32"))?).to_le_bytes());
        }
        BaseType::Int64 => {
            out.extend_from_slice(&value.as_i64().ok_or_else(|| err("int64"))?.to_le_bytes());
        }
        BaseType::Float32 => {
            let v = value.as_f64().ok_or_else(|| err("float32"))? as f32;
            out.extend_from_slice(&v.to_le_bytes());
        }
        BaseType::Float64 => {
            let v = value.as_f64().ok_or_else(|| err("float64"))?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        BaseType::String { bound } => {
            let s = value.as_str().ok_or_else(|| err("string"))?;
            check_string_bound(s, *bound, offset)?;
            write_u32(out, s.len() as u32);
            out.extend_from_slice(s.as_bytes());
        }
        BaseType::WString { .. } => {
            return Err(CodecError::encoding(
                "ros1",
                format!("field '{field_name}': wstring is not representable on wire1"),
                offset,
            ));
        }
    }
    Ok(())
}

fn write_u32(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

// ---------------------------------------------------------------------------
// Read path
// ---------------------------------------------------------------------------

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(CodecError::truncated(count, self.remaining(), self.pos));
        }
        let start = self.pos;
        self.pos += count;
        Ok(&self.data[start..self.pos])
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let length = self.read_u32()? as usize;
        let bytes = self.take(length)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|err| CodecError::encoding("ros1", format!("invalid utf-8: {err}"), start))
    }
}

fn read_message(
    reader: &mut Reader<'_>,
    store: &TypeStore,
    desc: &Descriptor,
) -> Result<MessageValue> {
    if desc.name == HEADER_TYPE {
        reader.take(4)?; // implicit seq field
    }
    let mut message = MessageValue::with_capacity(desc.fields.len());
    for field in &desc.fields {
        let value = read_field(reader, store, &field.spec)?;
        message.insert(field.safe_name(), value);
    }
    Ok(message)
}

fn read_field(reader: &mut Reader<'_>, store: &TypeStore, spec: &TypeSpec) -> Result<Value> {
    match spec {
        TypeSpec::Base(base) => read_base(reader, base),
        TypeSpec::Name(name) => {
            let desc = store.get(name)?;
            Ok(Value::Struct(read_message(reader, store, desc)?))
        }
        TypeSpec::Array { elem, len } => read_elements(reader, store, elem, *len),
        TypeSpec::Sequence { elem, bound } => {
            let start = reader.pos;
            let count = reader.read_u32()? as usize;
            if let Some(bound) = bound {
                if count > *bound {
                    return Err(CodecError::bound_violation(count, *bound, start));
                }
            }
            if count > reader.remaining() {
                return Err(CodecError::truncated(count, reader.remaining(), start));
            }
            read_elements(reader, store, elem, count)
        }
    }
}

fn read_elements(
    reader: &mut Reader<'_>,
    store: &TypeStore,
    elem: &ElemType,
    count: usize,
) -> Result<Value> {
    match elem {
        ElemType::Base(base) if base.is_byteish() => Ok(Value::Bytes(reader.take(count)?.to_vec())),
        ElemType::Base(base) => {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(read_base(reader, base)?);
            }
            Ok(Value::Array(items))
        }
        ElemType::Name(name) => {
            let desc = store.get(name)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(Value::Struct(read_message(reader, store, desc)?));
            }
            Ok(Value::Array(items))
        }
    }
}

fn read_base(reader: &mut Reader<'_>, base: &BaseType) -> Result<Value> {
    let value = match base {
        BaseType::Bool => Value::Bool(reader.take(1)?[0] != 0),
        BaseType::Octet | BaseType::UInt8 => Value::UInt8(reader.take(1)?[0]),
        BaseType::UInt16 => Value::UInt16(LittleEndian::read_u16(reader.take(2)?)),
        BaseType::UInt32 => Value::UInt32(reader.read_u32()?),
        BaseType::UInt64 => Value::UInt64(LittleEndian::read_u64(reader.take(8)?)),
        BaseType::Int8 => Value::Int8(reader.take(1)?[0] as i8),
        BaseType::Int16 => Value::Int16(LittleEndian::read_i16(reader.take(2)?)),
        BaseType::Int32 => Value::Int32(LittleEndian::read_i32(reader.take(4)?)),
        BaseType::Int64 => Value::Int64(LittleEndian::read_i64(reader.take(8)?)),
        BaseType::Float32 => Value::Float32(LittleEndian::read_f32(reader.take(4)?)),
        BaseType::Float64 => Value::Float64(LittleEndian::read_f64(reader.take(8)?)),
        BaseType::String { bound } => {
            let start = reader.pos;
            let s = reader.read_string()?;
            check_string_bound(&s, *bound, start)?;
            Value::String(s)
        }
        BaseType::WString { .. } => {
            return Err(CodecError::encoding(
                "ros1",
                "wstring is not representable on wire1",
                reader.pos,
            ));
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
    if desc.name == HEADER_TYPE {
        pos += 4;
    }
    for field in &desc.fields {
        let field_value = match value.get(&field.safe_name()) {
            Some(present) => present.clone(),
            None => match &field.default {
                Some(default) => default_value(default, &field.spec)?,
                None => {
                    return Err(CodecError::encoding(
                        "ros1",
                        format!("missing field '{}'", field.name),
                        pos,
                    ))
                }
            },
        };
        pos = size_field(store, field, &field_value, pos)?;
    }
    Ok(pos)
}

fn size_field(store: &TypeStore, field: &Field, value: &Value, pos: usize) -> Result<usize> {
    match &field.spec {
        TypeSpec::Base(base) => size_base(base, value, pos, &field.name),
        TypeSpec::Name(name) => {
            let nested = value
                .as_struct()
                .ok_or_else(|| mismatch(&field.name, "struct", value, pos))?;
            size_message(store, store.get(name)?, nested, pos)
        }
        TypeSpec::Array { elem, .. } => size_elements(store, elem, value, pos, &field.name),
        TypeSpec::Sequence { elem, .. } => {
            size_elements(store, elem, value, pos + 4, &field.name)
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
                let nested = item
                    .as_struct()
                    .ok_or_else(|| mismatch(field_name, "struct", item, pos))?;
                pos = size_message(store, desc, nested, pos)?;
            }
            Ok(pos)
        }
        _ => Err(mismatch(field_name, "array", value, pos)),
    }
}

fn size_base(base: &BaseType, value: &Value, pos: usize, field_name: &str) -> Result<usize> {
    match base {
        BaseType::String { .. } => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch(field_name, "string", value, pos))?;
            Ok(pos + 4 + s.len())
        }
        BaseType::WString { .. } => Err(CodecError::encoding(
            "ros1",
            format!("field '{field_name}': wstring is not representable on wire1"),
            pos,
        )),
        other => Ok(pos + other.size().unwrap_or(1)),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn element_count(value: &Value, elem: &ElemType, field_name: &str, offset: usize) -> Result<usize> {
    match (value, elem) {
        (Value::Bytes(bytes), ElemType::Base(base)) if base.is_byteish() => Ok(bytes.len()),
        (Value::Array(items), _) => Ok(items.len()),
        _ => Err(mismatch(field_name, "array", value, offset)),
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

fn mismatch(field_name: &str, expected: &str, value: &Value, offset: usize) -> CodecError {
    CodecError::encoding(
        "ros1",
        format!(
            "field '{field_name}': expected {expected}, got {}",
            value.type_name()
        ),
        offset,
    )
}
