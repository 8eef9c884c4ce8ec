// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MSG format parser using Pest.
//!
//! Handles ROS `.msg` definition text, including concatenated definition
//! bundles as found in bag connection records:
//! - Fields `TYPE NAME` with optional default value
//! - Constants `TYPE NAME = VALUE`
//! - Array suffixes `T[]`, `T[N]`, `T[<=N]` and string bounds `string<=N`
//! - Separator lines of 80+ `=` splitting dependency blocks headed by
//!   `MSG: pkg/Name`
//!
//! The pest grammar classifies lines; statements are split here because
//! string constants swallow the rest of their line, `#` included.

use crate::core::error::{CodecError, ParseErrorKind, Result};
use crate::schema::ast::{BaseType, Constant, Descriptor, ElemType, Field, TypeSpec};
use crate::schema::normalize::{
    coerce_constant, coerce_default, is_identifier, normalize_msgtype, parse_int_literal,
    resolve_descriptor_names,
};
use pest::Parser;
use pest_derive::Parser;

/// Pest parser for ROS .msg schema files.
#[derive(Parser)]
#[grammar = "schema/parser/msg_parser/msg.pest"] // Path relative to src/ directory
pub struct MsgParser;

/// Parse a `.msg` definition bundle into canonical descriptors.
///
/// The primary type comes first in the result, followed by dependency types
/// in order of appearance. `primary` names the first block; it may be `None`
/// when the text itself starts with a `MSG: pkg/Name` header.
pub fn parse(text: &str, primary: Option<&str>) -> Result<Vec<Descriptor>> {
    let pairs = MsgParser::parse(Rule::schema, text).map_err(pest_error)?;

    let mut blocks: Vec<Block<'_>> = Vec::new();
    let mut current = Block::default();
    let mut after_separator = false;

    for pair in pairs.flatten() {
        let (line, col) = pair.line_col();
        match pair.as_rule() {
            Rule::separator => {
                blocks.push(std::mem::take(&mut current));
                after_separator = true;
            }
            Rule::msg_header => {
                let name = pair.as_str()["MSG:".len()..].trim();
                if after_separator || (blocks.is_empty() && current.is_empty()) {
                    current.name = Some(name.to_string());
                    after_separator = false;
                } else {
                    return Err(CodecError::parse(
                        ParseErrorKind::UnexpectedToken,
                        line,
                        col,
                        "MSG: header must follow a separator line",
                    ));
                }
            }
            Rule::statement => {
                if after_separator {
                    return Err(CodecError::parse(
                        ParseErrorKind::UnexpectedToken,
                        line,
                        col,
                        "expected MSG: header after separator",
                    ));
                }
                current.stmts.push((line, pair.as_str()));
            }
            _ => {}
        }
    }
    blocks.push(current);

    let mut descriptors = Vec::with_capacity(blocks.len());
    for (idx, block) in blocks.iter().enumerate() {
        let raw_name = match (&block.name, idx, primary) {
            (Some(name), _, _) => name.as_str(),
            (None, 0, Some(name)) => name,
            _ => {
                return Err(CodecError::parse(
                    ParseErrorKind::UnexpectedToken,
                    1,
                    1,
                    "missing primary type name",
                ))
            }
        };
        descriptors.push(parse_block(&normalize_msgtype(raw_name), &block.stmts)?);
    }

    resolve_descriptor_names(&mut descriptors)?;
    Ok(descriptors)
}

/// One definition block of a bundle: optional `MSG:` name plus statements.
#[derive(Default)]
struct Block<'a> {
    name: Option<String>,
    stmts: Vec<(usize, &'a str)>,
}

impl Block<'_> {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.stmts.is_empty()
    }
}

fn pest_error(err: pest::error::Error<Rule>) -> CodecError {
    let (line, col) = match err.line_col {
        pest::error::LineColLocation::Pos((l, c)) => (l, c),
        pest::error::LineColLocation::Span((l, c), _) => (l, c),
    };
    CodecError::parse(
        ParseErrorKind::UnexpectedToken,
        line,
        col,
        err.variant.message(),
    )
}

/// Parse the statements of one block into a descriptor.
fn parse_block(name: &str, stmts: &[(usize, &str)]) -> Result<Descriptor> {
    let mut desc = Descriptor::new(name);

    for &(line, stmt) in stmts {
        match parse_statement(line, stmt)? {
            Item::Constant(constant) => {
                if desc.constants.iter().any(|c| c.name == constant.name) {
                    return Err(CodecError::parse(
                        ParseErrorKind::DuplicateField,
                        line,
                        1,
                        format!("constant '{}' declared twice", constant.name),
                    ));
                }
                desc.constants.push(constant);
            }
            Item::Field(field) => {
                if desc.fields.iter().any(|f| f.name == field.name) {
                    return Err(CodecError::parse(
                        ParseErrorKind::DuplicateField,
                        line,
                        1,
                        format!("field '{}' declared twice", field.name),
                    ));
                }
                desc.fields.push(field);
            }
        }
    }

    Ok(desc)
}

enum Item {
    Constant(Constant),
    Field(Field),
}

/// Parse a single statement line into a field or constant.
fn parse_statement(line: usize, stmt: &str) -> Result<Item> {
    let trimmed_start = stmt.len() - stmt.trim_start().len();
    let s = stmt.trim_start();
    let col_of = |offset: usize| trimmed_start + offset + 1;

    // Type token runs to the first whitespace.
    let type_end = s
        .find(|c: char| c.is_whitespace())
        .ok_or_else(|| {
            CodecError::parse(
                ParseErrorKind::UnexpectedToken,
                line,
                col_of(0),
                "expected field or constant declaration",
            )
        })?;
    let type_tok = &s[..type_end];
    let spec = parse_type_token(type_tok, line, col_of(0))?;

    // Name token runs to whitespace or '='.
    let after_type = s[type_end..].trim_start();
    let name_offset = s.len() - after_type.len();
    let name_end = after_type
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(after_type.len());
    let name = &after_type[..name_end];
    if !is_identifier(name) {
        return Err(CodecError::parse(
            ParseErrorKind::UnexpectedToken,
            line,
            col_of(name_offset),
            format!("invalid identifier {name:?}"),
        ));
    }

    let rest = after_type[name_end..].trim_start();
    let rest_offset = s.len() - rest.len();

    if let Some(value_text) = rest.strip_prefix('=') {
        let constant = parse_constant(name, &spec, value_text, line, col_of(rest_offset))?;
        return Ok(Item::Constant(constant));
    }

    let spec = spec.into_type_spec();
    if rest.is_empty() {
        return Ok(Item::Field(Field::new(name, spec)));
    }

    // ROS2-style field default after the name, without '='.
    let default_text = strip_comment(rest).trim();
    if default_text.is_empty() {
        return Ok(Item::Field(Field::new(name, spec)));
    }
    let default = parse_default_literal(default_text)
        .and_then(|lit| coerce_default(lit, &spec))
        .map_err(|err| locate(err, line, col_of(rest_offset)))?;
    Ok(Item::Field(Field {
        name: name.to_string(),
        spec,
        default: Some(default),
    }))
}

/// Attach a position to errors produced by position-unaware helpers.
fn locate(err: CodecError, line: usize, col: usize) -> CodecError {
    match err {
        CodecError::BadLiteral { value, expected } => CodecError::parse(
            ParseErrorKind::BadLiteral,
            line,
            col,
            format!("bad literal {value:?} for type '{expected}'"),
        ),
        other => other,
    }
}

/// Intermediate type specifier before name resolution.
struct RawSpec {
    elem: ElemType,
    kind: RawKind,
}

enum RawKind {
    Single,
    Array(usize),
    Sequence(Option<usize>),
}

impl RawSpec {
    fn into_type_spec(self) -> TypeSpec {
        match (self.kind, self.elem) {
            (RawKind::Single, ElemType::Base(base)) => TypeSpec::Base(base),
            (RawKind::Single, ElemType::Name(name)) => TypeSpec::Name(name),
            (RawKind::Array(len), elem) => TypeSpec::Array { elem, len },
            (RawKind::Sequence(bound), elem) => TypeSpec::Sequence { elem, bound },
        }
    }
}

/// Parse a type token like `int32`, `string<=10`, `pkg/Type[4]`, `uint8[<=5]`.
fn parse_type_token(tok: &str, line: usize, col: usize) -> Result<RawSpec> {
    let (base_str, kind) = match tok.find('[') {
        Some(bracket) => {
            let suffix = &tok[bracket..];
            let inner = suffix
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .filter(|s| !s.contains('[') && !s.contains(']'))
                .ok_or_else(|| {
                    CodecError::parse(
                        ParseErrorKind::MalformedArray,
                        line,
                        col,
                        format!("malformed array suffix {suffix:?}"),
                    )
                })?;
            let kind = if inner.is_empty() {
                RawKind::Sequence(None)
            } else if let Some(bound) = inner.strip_prefix("<=") {
                let bound = bound.parse::<usize>().map_err(|_| {
                    CodecError::parse(
                        ParseErrorKind::MalformedArray,
                        line,
                        col,
                        format!("invalid sequence bound {inner:?}"),
                    )
                })?;
                RawKind::Sequence(Some(bound))
            } else {
                let len = inner.parse::<usize>().map_err(|_| {
                    CodecError::parse(
                        ParseErrorKind::MalformedArray,
                        line,
                        col,
                        format!("invalid array length {inner:?}"),
                    )
                })?;
                RawKind::Array(len)
            };
            (&tok[..bracket], kind)
        }
        None => (tok, RawKind::Single),
    };

    Ok(RawSpec {
        elem: parse_elem_type(base_str, line, col)?,
        kind,
    })
}

/// Parse an element type token (no array suffix).
fn parse_elem_type(s: &str, line: usize, col: usize) -> Result<ElemType> {
    // MSG aliases resolved at parse time; the descriptor model has no
    // time/duration/byte/char primitives.
    match s {
        "time" => return Ok(ElemType::Name("builtin_interfaces/msg/Time".to_string())),
        "duration" => {
            return Ok(ElemType::Name("builtin_interfaces/msg/Duration".to_string()));
        }
        "byte" => return Ok(ElemType::Base(BaseType::Octet)),
        "char" => return Ok(ElemType::Base(BaseType::UInt8)),
        _ => {}
    }

    if let Some(base) = BaseType::try_from_str(s) {
        return Ok(ElemType::Base(base));
    }

    for (prefix, ctor) in [
        ("string<=", true),
        ("wstring<=", false),
    ] {
        if let Some(bound_str) = s.strip_prefix(prefix) {
            let bound = bound_str.parse::<usize>().map_err(|_| {
                CodecError::parse(
                    ParseErrorKind::BadLiteral,
                    line,
                    col,
                    format!("invalid string bound {bound_str:?}"),
                )
            })?;
            let base = if ctor {
                BaseType::String { bound: Some(bound) }
            } else {
                BaseType::WString { bound: Some(bound) }
            };
            return Ok(ElemType::Base(base));
        }
    }

    if s.split('/').all(is_identifier) && !s.is_empty() && !s.starts_with('/') && !s.ends_with('/')
    {
        return Ok(ElemType::Name(s.to_string()));
    }

    Err(CodecError::parse(
        ParseErrorKind::UnexpectedToken,
        line,
        col,
        format!("invalid type {s:?}"),
    ))
}

/// Parse a constant declaration value.
///
/// String constants take the raw rest of the line (a `#` inside is literal,
/// not a comment); everything else parses a typed literal.
fn parse_constant(
    name: &str,
    spec: &RawSpec,
    value_text: &str,
    line: usize,
    col: usize,
) -> Result<Constant> {
    let base = match (&spec.kind, &spec.elem) {
        (RawKind::Single, ElemType::Base(base)) => base.clone(),
        (RawKind::Single, ElemType::Name(n)) => {
            return Err(CodecError::parse(
                ParseErrorKind::UnknownType,
                line,
                col,
                format!("constant '{name}' must have a primitive type, not '{n}'"),
            ));
        }
        _ => {
            return Err(CodecError::parse(
                ParseErrorKind::MalformedArray,
                line,
                col,
                format!("constant '{name}' cannot be an array"),
            ));
        }
    };

    let value = if matches!(base, BaseType::String { .. } | BaseType::WString { .. }) {
        crate::schema::ast::Literal::Str(strip_matching_quotes(value_text.trim()).to_string())
    } else {
        let text = strip_comment(value_text).trim().to_string();
        parse_default_literal(&text).map_err(|err| locate(err, line, col))?
    };

    let value = coerce_constant(value, &base).map_err(|err| locate(err, line, col))?;
    Ok(Constant {
        name: name.to_string(),
        base,
        value,
    })
}

/// Strip surrounding quotes when both ends carry the same quote character.
fn strip_matching_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Cut an unquoted `#` comment off a statement tail.
fn strip_comment(s: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '#') => return &s[..i],
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    s
}

/// Parse an untyped literal: bool, int, float, quoted string, or bracketed
/// array.
fn parse_default_literal(text: &str) -> Result<crate::schema::ast::Literal> {
    use crate::schema::ast::Literal;

    let bad = || CodecError::bad_literal(text, "literal");

    if let Some(inner) = text.strip_prefix('[') {
        let inner = inner.strip_suffix(']').ok_or_else(bad)?;
        let mut items = Vec::new();
        let trimmed = inner.trim();
        if !trimmed.is_empty() {
            for part in trimmed.split(',') {
                items.push(parse_default_literal(part.trim())?);
            }
        }
        return Ok(Literal::Array(items));
    }

    match text.to_ascii_lowercase().as_str() {
        "true" => return Ok(Literal::Bool(true)),
        "false" => return Ok(Literal::Bool(false)),
        _ => {}
    }

    if (text.starts_with('"') && text.ends_with('"') && text.len() >= 2)
        || (text.starts_with('\'') && text.ends_with('\'') && text.len() >= 2)
    {
        return Ok(Literal::Str(text[1..text.len() - 1].to_string()));
    }

    if let Some(value) = parse_int_literal(text) {
        return Ok(Literal::Int(value));
    }

    if let Ok(value) = text.parse::<f64>() {
        return Ok(Literal::Float(value));
    }

    Err(bad())
}
