// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout bagcodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error taxonomy for parsing, registration and codecs
//! - [`Value`] - Generic tagged-tree message representation

pub mod error;
pub mod value;

pub use error::{CodecError, ParseErrorKind, Result};
pub use value::{MessageValue, Value};
