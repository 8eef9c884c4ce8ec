// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Definition parsers for the two interface definition languages.
//!
//! - [`msg_parser`] - line-oriented ROS `.msg` format
//! - [`idl_parser`] - OMG IDL subset

pub mod idl_parser;
pub mod msg_parser;

use crate::core::error::Result;
use crate::schema::ast::Descriptor;
use crate::schema::normalize::normalize_msgtype;
use crate::schema::Format;

/// Parse definition text into canonical descriptors.
///
/// The primary type, when named, is moved to the front of the result. MSG
/// text without a leading `MSG:` header requires a primary name.
pub fn parse_definition(
    text: &str,
    format: Format,
    primary: Option<&str>,
) -> Result<Vec<Descriptor>> {
    match format {
        Format::Msg => msg_parser::parse(text, primary),
        Format::Idl => {
            let mut descriptors = idl_parser::parse(text)?;
            if let Some(primary) = primary {
                let normalized = normalize_msgtype(primary);
                if let Some(pos) = descriptors.iter().position(|d| d.name == normalized) {
                    let primary_desc = descriptors.remove(pos);
                    descriptors.insert(0, primary_desc);
                }
            }
            Ok(descriptors)
        }
    }
}
