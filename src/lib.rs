// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # bagcodec
//!
//! Type system and serialization core for robotics bag formats.
//!
//! Bag containers store time-ordered streams of typed messages in one of
//! two wire formats: the packed little-endian layout of classic ROS1 bags
//! ("wire1") and the aligned, endian-prefixed CDR layout of their
//! successors. This crate implements everything between definition text and
//! wire bytes; container parsing, storage backends and CLI surfaces live in
//! the tools built on top of it.
//!
//! - **Parsing**: `.msg` and OMG IDL definition text into one canonical
//!   descriptor model ([`schema`])
//! - **Typestore**: registration, dependency closure, MD5 and RIHS01
//!   definition hashes, `.msg` emission ([`store`])
//! - **Codecs**: descriptor-driven (de)serialization for both wires and a
//!   byte-level translator between them ([`encoding`])
//!
//! ## Example: decode CDR with a registered type
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bagcodec::{cdr, Format, Preset, TypeStore};
//!
//! let mut store = TypeStore::new(Preset::Ros2);
//! store.register_text("int32 x\nstring label", Format::Msg, Some("demo_msgs/msg/Sample"))?;
//!
//! let data = [
//!     0x00, 0x01, 0x00, 0x00, // representation header
//!     0x2A, 0x00, 0x00, 0x00, // x = 42
//!     0x03, 0x00, 0x00, 0x00, b'h', b'i', 0x00, // label = "hi"
//! ];
//! let message = cdr::deserialize(&store, "demo_msgs/msg/Sample", &data)?;
//! assert_eq!(message["x"], bagcodec::Value::Int32(42));
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: convert a wire1 message to CDR
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bagcodec::{convert, Preset, TypeStore};
//!
//! let store = TypeStore::new(Preset::Ros1);
//! let ros1 = [0x01u8, 0x00, 0x00, 0x00]; // std_msgs/UInt32 { data: 1 }
//! let cdr = convert::ros1_to_cdr(&store, "std_msgs/msg/UInt32", &ros1)?;
//! assert_eq!(&cdr[..4], &[0x00, 0x01, 0x00, 0x00]);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use crate::core::{CodecError, MessageValue, ParseErrorKind, Result, Value};

// Definition parsing and the canonical type model
pub mod schema;

pub use schema::{
    BaseType, Constant, Descriptor, ElemType, Field, Format, Literal, TypeSpec,
};

// Typestore
pub mod store;

pub use store::{canonical_name, Preset, TypeStore, WireFlavor};

// Codecs and the wire translator
pub mod encoding;

pub use encoding::{cdr, convert, ros1, Endianness, Strictness};
