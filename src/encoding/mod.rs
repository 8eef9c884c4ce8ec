// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec implementations for the two wire formats and the byte-level
//! translator between them.
//!
//! - [`ros1`] - packed little-endian wire1 serialization
//! - [`cdr`] - aligned, endian-prefixed CDR serialization
//! - [`convert`] - wire1 <-> CDR re-emission without materialization

pub mod cdr;
pub mod convert;
pub mod ros1;

use crate::core::error::{CodecError, Result};
use crate::core::value::Value;
use crate::schema::ast::{BaseType, ElemType, Literal, TypeSpec};

/// Byte order of a CDR representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Little endian, representation header `00 01 00 00`
    #[default]
    Little,
    /// Big endian, representation header `00 00 00 00`
    Big,
}

/// Trailing-byte policy of the decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Ignore trailing bytes after a fully parsed message
    #[default]
    Lenient,
    /// Flag trailing bytes as `Overlong`
    Strict,
}

/// Materialize a field default as a runtime value.
///
/// Used when a serialized value tree omits a field that declares a default.
pub(crate) fn default_value(literal: &Literal, spec: &TypeSpec) -> Result<Value> {
    match spec {
        TypeSpec::Base(base) => default_scalar(literal, base),
        TypeSpec::Array { elem, .. } | TypeSpec::Sequence { elem, .. } => {
            let Literal::Array(items) = literal else {
                return Err(mismatch(literal, "array default"));
            };
            let base = match elem {
                ElemType::Base(base) => base,
                ElemType::Name(name) => return Err(mismatch(literal, name)),
            };
            if base.is_byteish() {
                let mut bytes = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Literal::Int(v) => bytes.push(*v as u8),
                        other => return Err(mismatch(other, "uint8")),
                    }
                }
                return Ok(Value::Bytes(bytes));
            }
            let values: Result<Vec<Value>> =
                items.iter().map(|item| default_scalar(item, base)).collect();
            Ok(Value::Array(values?))
        }
        TypeSpec::Name(name) => Err(mismatch(literal, name)),
    }
}

fn default_scalar(literal: &Literal, base: &BaseType) -> Result<Value> {
    let value = match (literal, base) {
        (Literal::Bool(v), BaseType::Bool) => Value::Bool(*v),
        (Literal::Int(v), BaseType::Int8) => Value::Int8(*v as i8),
        (Literal::Int(v), BaseType::Int16) => Value::Int16(*v as i16),
        (Literal::Int(v), BaseType::Int32) => Value::Int32(*v as i32),
        (Literal::Int(v), BaseType::Int64) => Value::Int64(*v),
        (Literal::Int(v), BaseType::UInt8 | BaseType::Octet) => Value::UInt8(*v as u8),
        (Literal::Int(v), BaseType::UInt16) => Value::UInt16(*v as u16),
        (Literal::Int(v), BaseType::UInt32) => Value::UInt32(*v as u32),
        (Literal::Int(v), BaseType::UInt64) => Value::UInt64(*v as u64),
        (Literal::Float(v), BaseType::Float32) => Value::Float32(*v as f32),
        (Literal::Float(v), BaseType::Float64) => Value::Float64(*v),
        (Literal::Str(v), BaseType::String { .. } | BaseType::WString { .. }) => {
            Value::String(v.clone())
        }
        (literal, base) => return Err(mismatch(literal, &base.to_string())),
    };
    Ok(value)
}

fn mismatch(literal: &Literal, expected: &str) -> CodecError {
    CodecError::bad_literal(literal.to_string(), expected)
}
