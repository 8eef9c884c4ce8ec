// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST normalization shared by the MSG and IDL parsers.
//!
//! Folds parser output into canonical descriptors: absolute type names,
//! deterministic literal representation, and default/constant values coerced
//! to their field's width.

use crate::core::error::{CodecError, Result};
use crate::schema::ast::{BaseType, Descriptor, ElemType, Literal, TypeSpec};

/// Sub-namespace segments that are already explicit in a qualified name.
const SUBSPACES: &[&str] = &["msg", "srv", "action"];

/// Normalize a message type name by injecting the `msg` segment.
///
/// `std_msgs/Header` becomes `std_msgs/msg/Header`; names that already
/// carry a `msg`, `srv` or `action` segment pass through unchanged.
pub fn normalize_msgtype(name: &str) -> String {
    let segments: Vec<&str> = name.split('/').collect();
    if segments.len() >= 2 {
        let parent = segments[segments.len() - 2];
        if SUBSPACES.contains(&parent) {
            return name.to_string();
        }
    }
    match segments.split_last() {
        Some((last, init)) if !init.is_empty() => {
            format!("{}/msg/{}", init.join("/"), last)
        }
        _ => name.to_string(),
    }
}

/// Undo message type name normalization for wire1-facing text.
///
/// `std_msgs/msg/Header` becomes `std_msgs/Header`.
pub fn denormalize_msgtype(name: &str) -> String {
    let segments: Vec<&str> = name.split('/').collect();
    if segments.len() >= 3 && segments[segments.len() - 2] == "msg" {
        let mut out: Vec<&str> = segments[..segments.len() - 2].to_vec();
        out.push(segments[segments.len() - 1]);
        return out.join("/");
    }
    name.to_string()
}

/// Check whether a string is a valid identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse an integer literal in decimal, hex (`0x`), octal (`0NNN`) or
/// binary (`0b`) form, with an optional sign.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if body.is_empty() {
        return None;
    }

    let magnitude: i128 = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        i128::from_str_radix(bin, 2).ok()?
    } else if body.len() > 1 && body.starts_with('0') && body.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        i128::from_str_radix(&body[1..], 8).ok()?
    } else {
        body.parse::<i128>().ok()?
    };

    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

/// Coerce a parsed literal to a constant's base type, range-checked.
pub fn coerce_constant(value: Literal, base: &BaseType) -> Result<Literal> {
    coerce_scalar(value, base)
}

/// Coerce a parsed literal to a field's type specifier, range-checked.
///
/// Array and sequence fields take bracketed array literals; fixed lengths
/// and sequence bounds are enforced here.
pub fn coerce_default(value: Literal, spec: &TypeSpec) -> Result<Literal> {
    match spec {
        TypeSpec::Base(base) => coerce_scalar(value, base),
        TypeSpec::Name(name) => Err(CodecError::bad_literal(
            value.to_string(),
            name.clone(),
        )),
        TypeSpec::Array { elem, len } => {
            let items = expect_array_literal(value)?;
            if items.len() != *len {
                return Err(CodecError::bad_literal(
                    format!("[{} elements]", items.len()),
                    format!("array of {len}"),
                ));
            }
            coerce_elements(items, elem)
        }
        TypeSpec::Sequence { elem, bound } => {
            let items = expect_array_literal(value)?;
            if let Some(bound) = bound {
                if items.len() > *bound {
                    return Err(CodecError::bad_literal(
                        format!("[{} elements]", items.len()),
                        format!("sequence bounded by {bound}"),
                    ));
                }
            }
            coerce_elements(items, elem)
        }
    }
}

fn expect_array_literal(value: Literal) -> Result<Vec<Literal>> {
    match value {
        Literal::Array(items) => Ok(items),
        other => Err(CodecError::bad_literal(other.to_string(), "array literal")),
    }
}

fn coerce_elements(items: Vec<Literal>, elem: &ElemType) -> Result<Literal> {
    let base = match elem {
        ElemType::Base(base) => base,
        ElemType::Name(name) => {
            return Err(CodecError::bad_literal("[...]", name.clone()));
        }
    };
    let coerced: Result<Vec<Literal>> = items
        .into_iter()
        .map(|item| coerce_scalar(item, base))
        .collect();
    Ok(Literal::Array(coerced?))
}

fn coerce_scalar(value: Literal, base: &BaseType) -> Result<Literal> {
    let mismatch = |value: &Literal| CodecError::bad_literal(value.to_string(), base.to_string());

    match base {
        BaseType::Bool => match value {
            Literal::Bool(_) => Ok(value),
            Literal::Int(0) => Ok(Literal::Bool(false)),
            Literal::Int(1) => Ok(Literal::Bool(true)),
            other => Err(mismatch(&other)),
        },
        BaseType::Float32 | BaseType::Float64 => match value {
            Literal::Float(_) => Ok(value),
            Literal::Int(v) => Ok(Literal::Float(v as f64)),
            other => Err(mismatch(&other)),
        },
        BaseType::String { bound } | BaseType::WString { bound } => match value {
            Literal::Str(ref s) => {
                if let Some(bound) = bound {
                    if s.chars().count() > *bound {
                        return Err(mismatch(&value));
                    }
                }
                Ok(value)
            }
            other => Err(mismatch(&other)),
        },
        _ => match value {
            Literal::Int(v) if int_fits(v, base) => Ok(Literal::Int(v)),
            other => Err(mismatch(&other)),
        },
    }
}

/// Range check for integer literals against integral base types.
fn int_fits(value: i64, base: &BaseType) -> bool {
    match base {
        BaseType::Int8 => i8::try_from(value).is_ok(),
        BaseType::Int16 => i16::try_from(value).is_ok(),
        BaseType::Int32 => i32::try_from(value).is_ok(),
        BaseType::Int64 => true,
        BaseType::Octet | BaseType::UInt8 => u8::try_from(value).is_ok(),
        BaseType::UInt16 => u16::try_from(value).is_ok(),
        BaseType::UInt32 => u32::try_from(value).is_ok(),
        BaseType::UInt64 => value >= 0,
        _ => false,
    }
}

/// Resolve relative name references across a parsed definition bundle.
///
/// Resolution order follows the MSG rules: a bare name matching a bundle
/// member wins, then the well-known `Header` alias, then the defining
/// package, and names lacking a sub-namespace gain the `msg` segment.
pub fn resolve_descriptor_names(descriptors: &mut [Descriptor]) -> Result<()> {
    let short_names: Vec<(String, String)> = descriptors
        .iter()
        .map(|d| {
            let short = d.name.rsplit('/').next().unwrap_or(&d.name).to_string();
            (short, d.name.clone())
        })
        .collect();

    for idx in 0..descriptors.len() {
        let owner = descriptors[idx].name.clone();
        for field in &mut descriptors[idx].fields {
            match &mut field.spec {
                TypeSpec::Name(name) => {
                    *name = resolve_typename(&owner, name, &short_names);
                }
                TypeSpec::Array {
                    elem: ElemType::Name(name),
                    ..
                }
                | TypeSpec::Sequence {
                    elem: ElemType::Name(name),
                    ..
                } => {
                    *name = resolve_typename(&owner, name, &short_names);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Resolve a single referenced type name to its absolute form.
fn resolve_typename(owner: &str, name: &str, short_names: &[(String, String)]) -> String {
    if let Some((_, full)) = short_names.iter().find(|(short, _)| short == name) {
        return full.clone();
    }
    if name == "Header" {
        return "std_msgs/msg/Header".to_string();
    }
    if !name.contains('/') {
        // Sibling type in the defining package.
        let parent = owner.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
        if parent.is_empty() {
            return name.to_string();
        }
        return format!("{parent}/{name}");
    }
    normalize_msgtype(name)
}
