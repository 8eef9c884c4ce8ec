// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MSG emitter.
//!
//! Renders a registered type back to `.msg` text: constants, then fields,
//! then every transitively referenced dependency appended behind a
//! separator line and a `MSG: pkg/Name` header. Output is byte-deterministic
//! for a given store and flavor.

use crate::core::error::Result;
use crate::store::hash::gendefhash;
use crate::store::{TypeStore, WireFlavor};
use crate::schema::normalize::denormalize_msgtype;

/// Separator between concatenated definitions.
const SEPARATOR: &str = "================================================================================";

/// Generate the full definition bundle and MD5 hash for a type.
pub(crate) fn generate_msgdef(
    store: &TypeStore,
    typename: &str,
    flavor: WireFlavor,
) -> Result<(String, String)> {
    store.closure(typename)?;

    let mut subdefs = Vec::new();
    let (mut msgdef, md5sum) = gendefhash(store, typename, &mut subdefs, flavor)?;

    for (name, (deftext, _)) in &subdefs {
        msgdef.push_str(SEPARATOR);
        msgdef.push_str("\nMSG: ");
        msgdef.push_str(&denormalize_msgtype(name));
        msgdef.push('\n');
        msgdef.push_str(deftext);
    }

    Ok((msgdef, md5sum))
}
