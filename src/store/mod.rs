// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Typestore: the registry mapping fully-qualified type names to canonical
//! descriptors.
//!
//! A store is seeded from a [`Preset`], grows through registration, and
//! serves lookups, dependency closures, definition hashes and `.msg`
//! emission. Descriptors are immutable once registered; re-registering an
//! identical descriptor is a no-op and a differing one fails with
//! `TypeConflict`. Multiple stores coexist freely within a process.

pub mod emit;
pub mod hash;

use crate::core::error::{CodecError, Result};
use crate::schema::ast::Descriptor;
use crate::schema::builtin_types::CATALOG;
use crate::schema::normalize::normalize_msgtype;
use crate::schema::{parse_definition, Format};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Initial contents of a new store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// No registered types
    Empty,
    /// Built-in catalog, wire1 flavor (time primitives, Header seq)
    Ros1,
    /// Built-in catalog, CDR flavor
    Ros2,
}

/// Wire generation a store's hashes and emitted text target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFlavor {
    /// wire1: `time`/`duration` primitives, Header carries `seq`
    Ros1,
    /// CDR: time types are ordinary message references
    Ros2,
}

/// Registry of canonical type descriptors.
pub struct TypeStore {
    types: HashMap<String, Descriptor>,
    flavor: WireFlavor,
}

impl TypeStore {
    /// Create a store seeded from the given preset.
    pub fn new(preset: Preset) -> Self {
        let flavor = match preset {
            Preset::Ros1 => WireFlavor::Ros1,
            _ => WireFlavor::Ros2,
        };
        let mut store = Self {
            types: HashMap::new(),
            flavor,
        };
        if preset != Preset::Empty {
            for (name, body) in CATALOG {
                store
                    .register_text(body, Format::Msg, Some(name))
                    .expect("built-in catalog is valid");
            }
        }
        store
    }

    /// Wire flavor used by [`md5`](Self::md5) and [`emit_msg`](Self::emit_msg).
    pub fn flavor(&self) -> WireFlavor {
        self.flavor
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// True when the name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a descriptor by fully-qualified name.
    pub fn lookup(&self, name: &str) -> Option<&Descriptor> {
        self.types.get(name)
    }

    /// Look up a descriptor, failing with `UnknownType` when absent.
    pub fn get(&self, name: &str) -> Result<&Descriptor> {
        self.types
            .get(name)
            .ok_or_else(|| CodecError::unknown_type(name))
    }

    /// Register a single descriptor.
    ///
    /// Identical re-registration is a no-op. A differing descriptor for an
    /// already registered name fails with `TypeConflict` - except for the
    /// well-known Header, whose canonical shape always wins so that
    /// wire1-shaped bundles (which spell it with `seq`) merge cleanly.
    pub fn register_descriptor(&mut self, desc: Descriptor) -> Result<()> {
        self.check_registrable(&desc)?;
        self.insert(desc);
        Ok(())
    }

    /// Parse definition text and register the primary type plus every
    /// dependency in the bundle.
    ///
    /// Returns the names of all types in the bundle. The store is unchanged
    /// on error: conflicts are detected against the complete batch before
    /// anything is inserted.
    pub fn register_text(
        &mut self,
        text: &str,
        format: Format,
        primary: Option<&str>,
    ) -> Result<Vec<String>> {
        let descriptors = parse_definition(text, format, primary)?;

        for desc in &descriptors {
            self.check_registrable(desc)?;
        }
        let names: Vec<String> = descriptors.iter().map(|d| d.name.clone()).collect();
        for desc in descriptors {
            self.insert(desc);
        }
        Ok(names)
    }

    /// Dependency closure of a type, dependencies first, the type itself
    /// last.
    ///
    /// Fails with `UnknownType` when a reference has no registration and
    /// with `TypeConflict` when the reference graph contains a cycle.
    pub fn closure(&self, name: &str) -> Result<Vec<String>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut stack = Vec::new();
        self.visit_closure(name, &mut stack, &mut done, &mut order)?;
        Ok(order)
    }

    fn visit_closure(
        &self,
        name: &str,
        stack: &mut Vec<String>,
        done: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if stack.iter().any(|n| n == name) {
            return Err(CodecError::type_conflict(
                name,
                "cyclic type reference discovered during closure",
            ));
        }
        let desc = self.get(name)?;
        stack.push(name.to_string());
        for reference in desc.references() {
            self.visit_closure(reference, stack, done, order)?;
        }
        stack.pop();
        done.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }

    /// MD5 definition hash (32 hex digits) in the store's flavor.
    pub fn md5(&self, name: &str) -> Result<String> {
        hash::md5_hash(self, name, self.flavor)
    }

    /// RIHS01 structural hash (`RIHS01_` + 64 hex digits).
    pub fn rihs01(&self, name: &str) -> Result<String> {
        hash::rihs01(self, name)
    }

    /// Render the definition bundle for a type in the store's flavor.
    pub fn emit_msg(&self, name: &str) -> Result<String> {
        emit::generate_msgdef(self, name, self.flavor).map(|(text, _)| text)
    }

    /// Render the definition bundle and MD5 hash in an explicit flavor.
    pub fn generate_msgdef(&self, name: &str, flavor: WireFlavor) -> Result<(String, String)> {
        emit::generate_msgdef(self, name, flavor)
    }

    /// Reject descriptors that conflict with an existing registration.
    fn check_registrable(&self, desc: &Descriptor) -> Result<()> {
        if desc.name.is_empty() {
            return Err(CodecError::type_conflict("", "type name must not be empty"));
        }
        let Some(existing) = self.types.get(&desc.name) else {
            return Ok(());
        };
        if existing == desc || desc.name == "std_msgs/msg/Header" {
            return Ok(());
        }
        Err(CodecError::type_conflict(
            &desc.name,
            "already registered with a different definition",
        ))
    }

    fn insert(&mut self, desc: Descriptor) {
        if self.types.contains_key(&desc.name) {
            // Identical or Header; the registered descriptor stays.
            return;
        }
        debug!(name = %desc.name, fields = desc.fields.len(), "registered type");
        self.types.insert(desc.name.clone(), desc);
    }
}

impl std::fmt::Debug for TypeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeStore")
            .field("types", &self.types.len())
            .field("flavor", &self.flavor)
            .finish()
    }
}

/// Normalize a user-supplied name the way registration does.
///
/// Collaborators routinely hold ROS1-style names (`pkg/Name`); this maps
/// them to the canonical `pkg/msg/Name` spelling for lookups.
pub fn canonical_name(name: &str) -> String {
    normalize_msgtype(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ast::{BaseType, Field, TypeSpec};

    #[test]
    fn test_empty_preset() {
        let store = TypeStore::new(Preset::Empty);
        assert!(store.is_empty());
        assert_eq!(store.flavor(), WireFlavor::Ros2);
    }

    #[test]
    fn test_seeded_presets() {
        let ros1 = TypeStore::new(Preset::Ros1);
        assert_eq!(ros1.flavor(), WireFlavor::Ros1);
        assert!(ros1.contains("std_msgs/msg/Header"));
        assert!(ros1.contains("builtin_interfaces/msg/Time"));

        let ros2 = TypeStore::new(Preset::Ros2);
        assert_eq!(ros2.flavor(), WireFlavor::Ros2);
        assert!(ros2.contains("sensor_msgs/msg/Imu"));
    }

    #[test]
    fn test_register_and_lookup() {
        let mut store = TypeStore::new(Preset::Empty);
        let names = store
            .register_text("int32 x", Format::Msg, Some("p/msg/A"))
            .unwrap();
        assert_eq!(names, vec!["p/msg/A".to_string()]);
        assert_eq!(store.lookup("p/msg/A").unwrap().fields[0].name, "x");
        assert!(store.lookup("p/msg/B").is_none());
        assert!(matches!(
            store.get("p/msg/B"),
            Err(CodecError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_register_idempotent() {
        let mut store = TypeStore::new(Preset::Empty);
        store
            .register_text("int32 x", Format::Msg, Some("p/msg/A"))
            .unwrap();
        store
            .register_text("int32 x", Format::Msg, Some("p/msg/A"))
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_register_conflict_on_field_order() {
        let mut store = TypeStore::new(Preset::Empty);
        store
            .register_text("int32 a\nint32 b", Format::Msg, Some("p/msg/A"))
            .unwrap();
        // Field order is part of identity.
        let err = store
            .register_text("int32 b\nint32 a", Format::Msg, Some("p/msg/A"))
            .unwrap_err();
        assert!(matches!(err, CodecError::TypeConflict { .. }));
        // The store keeps the original definition.
        assert_eq!(store.lookup("p/msg/A").unwrap().fields[0].name, "a");
    }

    #[test]
    fn test_failed_batch_leaves_store_unchanged() {
        let mut store = TypeStore::new(Preset::Empty);
        store
            .register_text("int32 x", Format::Msg, Some("p/msg/A"))
            .unwrap();
        let bundle = format!(
            "p/B b\nint32 y\n{sep}\nMSG: p/B\nint32 z\n{sep}\nMSG: p/A\nfloat64 different\n",
            sep = "=".repeat(80)
        );
        let err = store
            .register_text(&bundle, Format::Msg, Some("p/msg/Top"))
            .unwrap_err();
        assert!(matches!(err, CodecError::TypeConflict { .. }));
        // Neither Top nor B leaked in.
        assert!(!store.contains("p/msg/Top"));
        assert!(!store.contains("p/msg/B"));
    }

    #[test]
    fn test_header_reregistration_keeps_canonical_shape() {
        let mut store = TypeStore::new(Preset::Ros1);
        let ros1_header = "uint32 seq\ntime stamp\nstring frame_id";
        store
            .register_text(ros1_header, Format::Msg, Some("std_msgs/msg/Header"))
            .unwrap();
        let header = store.lookup("std_msgs/msg/Header").unwrap();
        assert_eq!(header.fields.len(), 2);
        assert_eq!(header.fields[0].name, "stamp");
    }

    #[test]
    fn test_closure_order_and_missing_reference() {
        let store = TypeStore::new(Preset::Ros2);
        let closure = store.closure("geometry_msgs/msg/PoseStamped").unwrap();
        assert_eq!(closure.last().unwrap(), "geometry_msgs/msg/PoseStamped");
        let time_pos = closure
            .iter()
            .position(|n| n == "builtin_interfaces/msg/Time")
            .unwrap();
        let header_pos = closure
            .iter()
            .position(|n| n == "std_msgs/msg/Header")
            .unwrap();
        assert!(time_pos < header_pos);

        let mut incomplete = TypeStore::new(Preset::Empty);
        incomplete
            .register_text("p/Missing m", Format::Msg, Some("p/msg/A"))
            .unwrap();
        assert!(matches!(
            incomplete.closure("p/msg/A"),
            Err(CodecError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_closure_rejects_cycles() {
        let mut store = TypeStore::new(Preset::Empty);
        let mut a = Descriptor::new("p/msg/A");
        a.fields
            .push(Field::new("b", TypeSpec::Name("p/msg/B".to_string())));
        let mut b = Descriptor::new("p/msg/B");
        b.fields
            .push(Field::new("a", TypeSpec::Name("p/msg/A".to_string())));
        store.register_descriptor(a).unwrap();
        store.register_descriptor(b).unwrap();
        let err = store.closure("p/msg/A").unwrap_err();
        assert!(matches!(err, CodecError::TypeConflict { .. }));
    }

    #[test]
    fn test_register_descriptor_direct() {
        let mut store = TypeStore::new(Preset::Empty);
        let mut desc = Descriptor::new("p/msg/Direct");
        desc.fields
            .push(Field::new("flag", TypeSpec::Base(BaseType::Bool)));
        store.register_descriptor(desc.clone()).unwrap();
        assert_eq!(store.lookup("p/msg/Direct"), Some(&desc));
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("std_msgs/Header"), "std_msgs/msg/Header");
        assert_eq!(canonical_name("std_msgs/msg/Header"), "std_msgs/msg/Header");
    }

    #[test]
    fn test_two_stores_coexist() {
        let mut a = TypeStore::new(Preset::Empty);
        let mut b = TypeStore::new(Preset::Empty);
        a.register_text("int32 x", Format::Msg, Some("p/msg/A"))
            .unwrap();
        b.register_text("float64 x", Format::Msg, Some("p/msg/A"))
            .unwrap();
        assert_ne!(a.lookup("p/msg/A"), b.lookup("p/msg/A"));
    }
}
