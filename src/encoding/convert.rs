// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-level wire1 <-> CDR translation.
//!
//! Walks a type's descriptor over the source bytes and re-emits the
//! destination layout directly, without building a value tree. Length
//! prefixes are adjusted (wire1 strings carry no NUL terminator, CDR
//! strings do), padding is inserted or skipped, and the Header `seq`
//! field is synthesized or dropped wherever a Header occurs.
//!
//! Both directions are little-endian only; the CDR side rejects
//! big-endian input.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::error::{CodecError, Result};
use crate::schema::ast::{BaseType, Descriptor, ElemType, TypeSpec};
use crate::store::TypeStore;

const HEADER_TYPE: &str = "std_msgs/msg/Header";

/// Convert a serialized wire1 message directly to little-endian CDR.
pub fn ros1_to_cdr(store: &TypeStore, type_name: &str, raw: &[u8]) -> Result<Vec<u8>> {
    let desc = store.get(type_name)?;
    let mut input = Input {
        data: raw,
        pos: 0,
        codec: "ros1_to_cdr",
    };
    let mut out = vec![0x00, 0x01, 0x00, 0x00];
    r2c_message(store, desc, &mut input, &mut out)?;
    Ok(out)
}

/// Convert a serialized little-endian CDR message directly to wire1.
pub fn cdr_to_ros1(store: &TypeStore, type_name: &str, raw: &[u8]) -> Result<Vec<u8>> {
    if raw.len() < 4 {
        return Err(CodecError::truncated(4, raw.len(), 0));
    }
    if raw[1] != 1 {
        return Err(CodecError::encoding(
            "cdr_to_ros1",
            "message byte order is not little endian",
            1,
        ));
    }
    let desc = store.get(type_name)?;
    let mut input = Input {
        data: &raw[4..],
        pos: 0,
        codec: "cdr_to_ros1",
    };
    let mut out = Vec::with_capacity(raw.len());
    c2r_message(store, desc, &mut input, &mut out)?;
    Ok(out)
}

/// Source-side reader with translator error context.
struct Input<'a> {
    data: &'a [u8],
    pos: usize,
    codec: &'static str,
}

impl<'a> Input<'a> {
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

    fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Skip source-side padding (CDR input only).
    fn align(&mut self, alignment: usize) -> Result<()> {
        let misalignment = self.pos % alignment;
        if misalignment > 0 {
            self.skip(alignment - misalignment)?;
        }
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn unsupported(&self, what: &str) -> CodecError {
        CodecError::encoding(self.codec, format!("{what} is not convertible"), self.pos)
    }
}

/// Pad destination CDR output to the given alignment.
fn align_out(out: &mut Vec<u8>, alignment: usize) {
    let misalignment = (out.len() - 4) % alignment;
    if misalignment > 0 {
        out.extend(std::iter::repeat(0).take(alignment - misalignment));
    }
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

// ---------------------------------------------------------------------------
// wire1 -> CDR
// ---------------------------------------------------------------------------

fn r2c_message(
    store: &TypeStore,
    desc: &Descriptor,
    input: &mut Input<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    if desc.name == HEADER_TYPE {
        // Drop the wire1 seq field.
        input.skip(4)?;
    }
    for field in &desc.fields {
        match &field.spec {
            TypeSpec::Base(base) => r2c_base(base, input, out)?,
            TypeSpec::Name(name) => r2c_message(store, store.get(name)?, input, out)?,
            TypeSpec::Array { elem, len } => r2c_elements(store, elem, *len, input, out)?,
            TypeSpec::Sequence { elem, .. } => {
                let count = input.read_u32()?;
                align_out(out, 4);
                push_u32(out, count);
                r2c_elements(store, elem, count as usize, input, out)?;
            }
        }
    }
    Ok(())
}

fn r2c_base(base: &BaseType, input: &mut Input<'_>, out: &mut Vec<u8>) -> Result<()> {
    match base {
        BaseType::String { .. } => {
            let length = input.read_u32()?;
            let bytes = input.take(length as usize)?;
            align_out(out, 4);
            push_u32(out, length + 1);
            out.extend_from_slice(bytes);
            out.push(0);
        }
        BaseType::WString { .. } => return Err(input.unsupported("wstring")),
        other => {
            let size = other.size().unwrap_or(1);
            align_out(out, size.min(8));
            let bytes = input.take(size)?;
            out.extend_from_slice(bytes);
        }
    }
    Ok(())
}

fn r2c_elements(
    store: &TypeStore,
    elem: &ElemType,
    count: usize,
    input: &mut Input<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    match elem {
        ElemType::Base(base @ (BaseType::String { .. } | BaseType::WString { .. })) => {
            for _ in 0..count {
                r2c_base(base, input, out)?;
            }
        }
        ElemType::Base(base) => {
            let size = base.size().unwrap_or(1);
            if count > 0 {
                align_out(out, size.min(8));
                let bytes = input.take(count * size)?;
                out.extend_from_slice(bytes);
            }
        }
        ElemType::Name(name) => {
            let desc = store.get(name)?;
            for _ in 0..count {
                r2c_message(store, desc, input, out)?;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CDR -> wire1
// ---------------------------------------------------------------------------

fn c2r_message(
    store: &TypeStore,
    desc: &Descriptor,
    input: &mut Input<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    if desc.name == HEADER_TYPE {
        // Synthesize seq = 0.
        out.extend_from_slice(&[0; 4]);
    }
    for field in &desc.fields {
        match &field.spec {
            TypeSpec::Base(base) => c2r_base(base, input, out)?,
            TypeSpec::Name(name) => c2r_message(store, store.get(name)?, input, out)?,
            TypeSpec::Array { elem, len } => c2r_elements(store, elem, *len, input, out)?,
            TypeSpec::Sequence { elem, .. } => {
                input.align(4)?;
                let count = input.read_u32()?;
                push_u32(out, count);
                c2r_elements(store, elem, count as usize, input, out)?;
            }
        }
    }
    Ok(())
}

fn c2r_base(base: &BaseType, input: &mut Input<'_>, out: &mut Vec<u8>) -> Result<()> {
    match base {
        BaseType::String { .. } => {
            input.align(4)?;
            let length = input.read_u32()?;
            if length == 0 {
                push_u32(out, 0);
                return Ok(());
            }
            push_u32(out, length - 1);
            let bytes = input.take(length as usize)?;
            out.extend_from_slice(&bytes[..length as usize - 1]);
        }
        BaseType::WString { .. } => return Err(input.unsupported("wstring")),
        other => {
            let size = other.size().unwrap_or(1);
            input.align(size.min(8))?;
            let bytes = input.take(size)?;
            out.extend_from_slice(bytes);
        }
    }
    Ok(())
}

fn c2r_elements(
    store: &TypeStore,
    elem: &ElemType,
    count: usize,
    input: &mut Input<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    match elem {
        ElemType::Base(base @ (BaseType::String { .. } | BaseType::WString { .. })) => {
            for _ in 0..count {
                c2r_base(base, input, out)?;
            }
        }
        ElemType::Base(base) => {
            let size = base.size().unwrap_or(1);
            if count > 0 {
                input.align(size.min(8))?;
                let bytes = input.take(count * size)?;
                out.extend_from_slice(bytes);
            }
        }
        ElemType::Name(name) => {
            let desc = store.get(name)?;
            for _ in 0..count {
                c2r_message(store, desc, input, out)?;
            }
        }
    }
    Ok(())
}
