// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Definition hashing.
//!
//! Two hashes stamp types into containers:
//! - the MD5 definition hash used by wire1 connection records, computed
//!   over a canonical text rendering with dependency hashes substituted in
//! - RIHS01, a versioned SHA-256 over a canonical JSON rendering of the
//!   descriptor graph

use crate::core::error::Result;
use crate::schema::ast::{BaseType, ElemType, Field, TypeSpec};
use crate::schema::normalize::denormalize_msgtype;
use crate::store::{TypeStore, WireFlavor};
use md5::{Digest, Md5};
use sha2::Sha256;
use std::collections::BTreeMap;

/// Placeholder member hashed for fieldless structs.
const EMPTY_STRUCT_MEMBER: &str = "structure_needs_at_least_one_member";

/// Generate the canonical definition text and MD5 hash for a type.
///
/// `subdefs` collects transitive dependency definitions in encounter order;
/// each entry maps a dependency name to its `(definition text, hash)`.
pub(crate) fn gendefhash(
    store: &TypeStore,
    typename: &str,
    subdefs: &mut Vec<(String, (String, String))>,
    flavor: WireFlavor,
) -> Result<(String, String)> {
    let desc = store.get(typename)?;

    let mut deftext: Vec<String> = Vec::new();
    let mut hashtext: Vec<String> = Vec::new();

    for constant in &desc.constants {
        let line = format!("{} {}={}", constant.base, constant.name, constant.value);
        deftext.push(line.clone());
        hashtext.push(line);
    }

    for field in &desc.fields {
        match &field.spec {
            TypeSpec::Base(base) => {
                let line = format!("{} {}", wire1_spelling(base), field.name);
                deftext.push(line.clone());
                hashtext.push(line);
            }
            TypeSpec::Name(name) => {
                if let Some(alias) = time_alias(name, flavor) {
                    let line = format!("{alias} {}", field.name);
                    deftext.push(line.clone());
                    hashtext.push(line);
                } else {
                    let subhash = subdef_hash(store, name, subdefs, flavor)?;
                    deftext.push(format!("{} {}", denormalize_msgtype(name), field.name));
                    hashtext.push(format!("{subhash} {}", field.name));
                }
            }
            TypeSpec::Array { elem, len } => {
                push_container_lines(
                    store,
                    subdefs,
                    flavor,
                    field,
                    elem,
                    &len.to_string(),
                    &mut deftext,
                    &mut hashtext,
                )?;
            }
            TypeSpec::Sequence { elem, bound } => {
                let count = match bound {
                    Some(bound) => format!("<={bound}"),
                    None => String::new(),
                };
                push_container_lines(
                    store, subdefs, flavor, field, elem, &count, &mut deftext, &mut hashtext,
                )?;
            }
        }
    }

    if flavor == WireFlavor::Ros1 && typename == "std_msgs/msg/Header" {
        deftext.insert(0, "uint32 seq".to_string());
        hashtext.insert(0, "uint32 seq".to_string());
    }

    let hash = hex::encode(Md5::digest(hashtext.join("\n").as_bytes()));
    deftext.push(String::new());
    Ok((deftext.join("\n"), hash))
}

/// Emit the definition and hash lines for one array or sequence field.
#[allow(clippy::too_many_arguments)]
fn push_container_lines(
    store: &TypeStore,
    subdefs: &mut Vec<(String, (String, String))>,
    flavor: WireFlavor,
    field: &Field,
    elem: &ElemType,
    count: &str,
    deftext: &mut Vec<String>,
    hashtext: &mut Vec<String>,
) -> Result<()> {
    match elem {
        ElemType::Base(base) => {
            let line = format!("{}[{count}] {}", wire1_spelling(base), field.name);
            deftext.push(line.clone());
            hashtext.push(line);
        }
        ElemType::Name(name) => {
            if let Some(alias) = time_alias(name, flavor) {
                let line = format!("{alias}[{count}] {}", field.name);
                deftext.push(line.clone());
                hashtext.push(line);
            } else {
                let subhash = subdef_hash(store, name, subdefs, flavor)?;
                deftext.push(format!(
                    "{}[{count}] {}",
                    denormalize_msgtype(name),
                    field.name
                ));
                hashtext.push(format!("{subhash} {}", field.name));
            }
        }
    }
    Ok(())
}

/// Look up or compute the hash of a dependency definition.
///
/// A placeholder is inserted before recursing so dependencies appear in
/// first-encounter order, ahead of their own dependencies.
fn subdef_hash(
    store: &TypeStore,
    name: &str,
    subdefs: &mut Vec<(String, (String, String))>,
    flavor: WireFlavor,
) -> Result<String> {
    if let Some((_, (_, hash))) = subdefs.iter().find(|(n, _)| n == name) {
        return Ok(hash.clone());
    }
    subdefs.push((name.to_string(), (String::new(), String::new())));
    let entry = gendefhash(store, name, subdefs, flavor)?;
    if let Some((_, slot)) = subdefs.iter_mut().find(|(n, _)| n == name) {
        *slot = entry.clone();
    }
    Ok(entry.1)
}

/// Canonical wire1 spelling of a primitive.
fn wire1_spelling(base: &BaseType) -> String {
    match base {
        BaseType::Octet => "byte".to_string(),
        other => other.to_string(),
    }
}

/// Wire1 alias of the time types, active for the ROS1 flavor only.
fn time_alias(name: &str, flavor: WireFlavor) -> Option<&'static str> {
    if flavor != WireFlavor::Ros1 {
        return None;
    }
    match name {
        "builtin_interfaces/msg/Time" => Some("time"),
        "builtin_interfaces/msg/Duration" => Some("duration"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// RIHS01
// ---------------------------------------------------------------------------

/// Per-type ids of the RIHS01 canonical serialization.
fn type_id(base: &BaseType) -> (u32, usize) {
    match base {
        BaseType::Int8 => (2, 0),
        BaseType::UInt8 => (3, 0),
        BaseType::Int16 => (4, 0),
        BaseType::UInt16 => (5, 0),
        BaseType::Int32 => (6, 0),
        BaseType::UInt32 => (7, 0),
        BaseType::Int64 => (8, 0),
        BaseType::UInt64 => (9, 0),
        BaseType::Float32 => (10, 0),
        BaseType::Float64 => (11, 0),
        BaseType::Bool => (15, 0),
        BaseType::Octet => (16, 0),
        BaseType::String { bound: None } => (17, 0),
        BaseType::WString { bound: None } => (18, 0),
        BaseType::String { bound: Some(n) } => (21, *n),
        BaseType::WString { bound: Some(n) } => (22, *n),
    }
}

/// Compute the RIHS01 hash of a registered type.
pub(crate) fn rihs01(store: &TypeStore, typename: &str) -> Result<String> {
    // Validates resolution and rejects cycles before recursing.
    store.closure(typename)?;

    let mut cache: BTreeMap<String, String> = BTreeMap::new();
    build_struct_json(store, typename, &mut cache)?;

    let mut json = String::from("{\"type_description\": ");
    json.push_str(&cache[typename]);
    json.push_str(", \"referenced_type_descriptions\": [");
    let mut first = true;
    for (name, rendered) in &cache {
        if name == typename {
            continue;
        }
        if !first {
            json.push_str(", ");
        }
        json.push_str(rendered);
        first = false;
    }
    json.push_str("]}");

    let digest = hex::encode(Sha256::digest(json.as_bytes()));
    Ok(format!("RIHS01_{digest}"))
}

/// Render one struct into the cache, recursing into referenced types.
fn build_struct_json(
    store: &TypeStore,
    typename: &str,
    cache: &mut BTreeMap<String, String>,
) -> Result<()> {
    if cache.contains_key(typename) {
        return Ok(());
    }
    // Reserve the slot to terminate self-referential walks.
    cache.insert(typename.to_string(), String::new());

    let desc = store.get(typename)?;
    let mut fields_json: Vec<String> = Vec::new();

    if desc.fields.is_empty() {
        fields_json.push(field_json(EMPTY_STRUCT_MEMBER, 3, 0, 0, ""));
    } else {
        for field in &desc.fields {
            let (tid, capacity, string_capacity, nested) = field_type_info(field)?;
            if !nested.is_empty() {
                build_struct_json(store, &nested, cache)?;
            }
            fields_json.push(field_json(
                &field.name,
                tid,
                capacity,
                string_capacity,
                &nested,
            ));
        }
    }

    let rendered = format!(
        "{{\"type_name\": \"{}\", \"fields\": [{}]}}",
        typename,
        fields_json.join(", ")
    );
    cache.insert(typename.to_string(), rendered);
    Ok(())
}

/// Resolve a field into `(type_id, capacity, string_capacity, nested_name)`.
fn field_type_info(field: &Field) -> Result<(u32, usize, usize, String)> {
    let (increment, capacity, elem): (u32, usize, &ElemType) = match &field.spec {
        TypeSpec::Base(base) => {
            let (tid, string_capacity) = type_id(base);
            return Ok((tid, 0, string_capacity, String::new()));
        }
        TypeSpec::Name(name) => return Ok((1, 0, 0, name.clone())),
        TypeSpec::Array { elem, len } => (48, *len, elem),
        TypeSpec::Sequence {
            elem,
            bound: Some(bound),
        } => (96, *bound, elem),
        TypeSpec::Sequence { elem, bound: None } => (144, 0, elem),
    };

    match elem {
        ElemType::Base(base) => {
            let (tid, string_capacity) = type_id(base);
            Ok((increment + tid, capacity, string_capacity, String::new()))
        }
        ElemType::Name(name) => Ok((increment + 1, capacity, 0, name.clone())),
    }
}

/// Render one field entry with the canonical separators.
fn field_json(
    name: &str,
    type_id: u32,
    capacity: usize,
    string_capacity: usize,
    nested: &str,
) -> String {
    format!(
        "{{\"name\": \"{name}\", \"type\": {{\"type_id\": {type_id}, \"capacity\": {capacity}, \"string_capacity\": {string_capacity}, \"nested_type_name\": \"{nested}\"}}}}"
    )
}

/// Compute the MD5 definition hash of a registered type.
pub(crate) fn md5_hash(store: &TypeStore, typename: &str, flavor: WireFlavor) -> Result<String> {
    store.closure(typename)?;
    let mut subdefs = Vec::new();
    gendefhash(store, typename, &mut subdefs, flavor).map(|(_, hash)| hash)
}
