// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! OMG IDL format parser using Pest.
//!
//! Handles the IDL subset emitted for robotics messages: nested modules,
//! structs, typedefs, constants (including `<Struct>_Constants` modules,
//! which fold into their struct), enumerations, annotations, and templated
//! sequence/string types. Constant expressions are evaluated at parse time.
//!
//! Concatenated bundles with `IDL: pkg/Name` separator headers, as stored in
//! bag metadata, are accepted; the headers are stripped before parsing.

use crate::core::error::{CodecError, ParseErrorKind, Result};
use crate::schema::ast::{BaseType, Constant, Descriptor, ElemType, Field, Literal, TypeSpec};
use crate::schema::normalize::{coerce_constant, coerce_default, resolve_descriptor_names};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::collections::HashMap;

/// Pest parser for OMG IDL schema files.
#[derive(Parser)]
#[grammar = "schema/parser/idl_parser/idl.pest"] // Path relative to src/ directory
pub struct IdlParser;

/// Parse IDL text into canonical descriptors, in declaration order.
pub fn parse(text: &str) -> Result<Vec<Descriptor>> {
    let cleaned = strip_bundle_headers(text);
    let pairs = IdlParser::parse(Rule::specification, &cleaned).map_err(pest_error)?;

    let mut visitor = Visitor::default();
    for pair in pairs {
        if pair.as_rule() == Rule::specification {
            for inner in pair.into_inner() {
                visitor.visit_definition(inner, &[])?;
            }
        }
    }

    let Visitor {
        mut structs,
        constants,
        ..
    } = visitor;

    // Fold `<Struct>_Constants` module constants into their struct.
    for (target, constant) in constants {
        if let Some(desc) = structs.iter_mut().find(|d| d.name == target) {
            desc.constants.push(constant);
        }
    }

    resolve_descriptor_names(&mut structs)?;
    Ok(structs)
}

/// Strip `IDL: pkg/Name` bundle headers and their separator lines.
///
/// A header is a line of 80 or more `=` characters immediately followed by a
/// line starting with `IDL: `. Both lines are removed; everything else
/// passes through untouched.
pub fn strip_bundle_headers(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut kept = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim_end();
        let is_separator = line.len() >= 80 && line.chars().all(|c| c == '=');
        if is_separator && i + 1 < lines.len() && lines[i + 1].trim_start().starts_with("IDL: ") {
            i += 2;
        } else {
            kept.push(lines[i]);
            i += 1;
        }
    }
    kept.join("\n")
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

fn error_at(pair: &Pair<'_, Rule>, kind: ParseErrorKind, message: impl Into<String>) -> CodecError {
    let (line, col) = pair.line_col();
    CodecError::parse(kind, line, col, message)
}

#[derive(Default)]
struct Visitor {
    /// Typedef name -> expanded type specifier
    typedefs: HashMap<String, TypeSpec>,
    /// Structs and enums in encounter order
    structs: Vec<Descriptor>,
    /// Constants from `_Constants` modules, keyed by their target struct
    constants: Vec<(String, Constant)>,
}

impl Visitor {
    fn visit_definition(&mut self, pair: Pair<'_, Rule>, path: &[String]) -> Result<()> {
        match pair.as_rule() {
            Rule::module_dcl => self.visit_module(pair, path),
            Rule::struct_dcl => self.visit_struct(pair, path),
            Rule::enum_dcl => self.visit_enum(pair, path),
            Rule::const_dcl => self.visit_const(pair, path),
            Rule::typedef_dcl => self.visit_typedef(pair),
            Rule::EOI => Ok(()),
            _ => Ok(()),
        }
    }

    fn visit_module(&mut self, pair: Pair<'_, Rule>, path: &[String]) -> Result<()> {
        let mut name = None;
        let mut body = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::annotation => {}
                Rule::identifier if name.is_none() => name = Some(inner.as_str().to_string()),
                _ => body.push(inner),
            }
        }
        let mut child_path = path.to_vec();
        child_path.push(name.unwrap_or_default());
        for inner in body {
            self.visit_definition(inner, &child_path)?;
        }
        Ok(())
    }

    fn visit_struct(&mut self, pair: Pair<'_, Rule>, path: &[String]) -> Result<()> {
        let span = pair.clone();
        let mut name = None;
        let mut fields: Vec<Field> = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::annotation => {}
                Rule::identifier if name.is_none() => name = Some(inner.as_str().to_string()),
                Rule::member => {
                    for field in self.visit_member(inner)? {
                        if fields.iter().any(|f| f.name == field.name) {
                            return Err(error_at(
                                &span,
                                ParseErrorKind::DuplicateField,
                                format!("field '{}' declared twice", field.name),
                            ));
                        }
                        fields.push(field);
                    }
                }
                _ => {}
            }
        }

        let mut desc = Descriptor::new(qualify(path, &name.unwrap_or_default()));
        desc.fields = fields;
        self.structs.push(desc);
        Ok(())
    }

    fn visit_enum(&mut self, pair: Pair<'_, Rule>, path: &[String]) -> Result<()> {
        let mut name = None;
        let mut desc = Descriptor::new(String::new());
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::annotation => {}
                Rule::identifier => {
                    if name.is_none() {
                        name = Some(inner.as_str().to_string());
                    } else {
                        desc.constants.push(Constant {
                            name: inner.as_str().to_string(),
                            base: BaseType::UInt32,
                            value: Literal::Int(desc.constants.len() as i64),
                        });
                    }
                }
                _ => {}
            }
        }
        desc.name = qualify(path, &name.unwrap_or_default());
        self.structs.push(desc);
        Ok(())
    }

    fn visit_const(&mut self, pair: Pair<'_, Rule>, path: &[String]) -> Result<()> {
        // Only constants living in a `<Struct>_Constants` module attach to a
        // type; free-floating constants have no message counterpart and are
        // not evaluated.
        let Some(struct_name) = path.last().and_then(|m| m.strip_suffix("_Constants")) else {
            return Ok(());
        };
        let target = qualify(&path[..path.len() - 1], struct_name);

        let span = pair.clone();
        let mut const_type = None;
        let mut name = None;
        let mut value = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::const_type => const_type = Some(inner),
                Rule::identifier => name = Some(inner.as_str().to_string()),
                Rule::expression => value = Some(eval_expression(inner)?),
                _ => {}
            }
        }

        let const_type = const_type
            .ok_or_else(|| error_at(&span, ParseErrorKind::UnexpectedToken, "missing const type"))?;
        let base = self.parse_const_type(const_type)?;
        let value = value
            .ok_or_else(|| error_at(&span, ParseErrorKind::BadLiteral, "missing const value"))?;
        let value = coerce_constant(value, &base).map_err(|err| match err {
            CodecError::BadLiteral { value, expected } => error_at(
                &span,
                ParseErrorKind::BadLiteral,
                format!("bad literal {value:?} for type '{expected}'"),
            ),
            other => other,
        })?;

        self.constants.push((
            target,
            Constant {
                name: name.unwrap_or_default(),
                base,
                value,
            },
        ));
        Ok(())
    }

    fn visit_typedef(&mut self, pair: Pair<'_, Rule>) -> Result<()> {
        let mut decl = None;
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::type_declarator {
                decl = Some(inner);
            }
        }
        let Some(decl) = decl else {
            return Ok(());
        };

        let mut base_spec: Option<TypeSpec> = None;
        for inner in decl.into_inner() {
            match inner.as_rule() {
                Rule::sequence_type | Rule::string_type | Rule::wide_string_type => {
                    base_spec = Some(self.parse_template_type(inner)?);
                }
                Rule::simple_type_spec => {
                    base_spec = Some(self.parse_simple_type(inner)?);
                }
                Rule::any_declarators => {
                    let base = base_spec.clone().ok_or_else(|| {
                        error_at(&inner, ParseErrorKind::UnexpectedToken, "typedef without type")
                    })?;
                    for declarator in inner.into_inner() {
                        let (name, dims) = parse_declarator(&declarator)?;
                        let spec = match dims {
                            None => base.clone(),
                            Some(len) => TypeSpec::Array {
                                elem: spec_to_elem(&declarator, base.clone())?,
                                len,
                            },
                        };
                        self.typedefs.insert(name, spec);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn visit_member(&mut self, pair: Pair<'_, Rule>) -> Result<Vec<Field>> {
        let mut default = None;
        let mut spec: Option<TypeSpec> = None;
        let mut fields = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::annotation => {
                    if let Some(value) = parse_default_annotation(inner)? {
                        default = Some(value);
                    }
                }
                Rule::type_spec => {
                    spec = Some(self.parse_type_spec(inner)?);
                }
                Rule::declarators => {
                    let base = spec.clone().ok_or_else(|| {
                        error_at(&inner, ParseErrorKind::UnexpectedToken, "member without type")
                    })?;
                    for declarator in inner.into_inner() {
                        let (name, dims) = parse_declarator(&declarator)?;
                        let spec = match dims {
                            None => base.clone(),
                            Some(len) => TypeSpec::Array {
                                elem: spec_to_elem(&declarator, base.clone())?,
                                len,
                            },
                        };
                        let default = match &default {
                            Some(value) => Some(
                                coerce_default(value.clone(), &spec).map_err(|err| match err {
                                    CodecError::BadLiteral { value, expected } => error_at(
                                        &declarator,
                                        ParseErrorKind::BadLiteral,
                                        format!("bad default {value:?} for type '{expected}'"),
                                    ),
                                    other => other,
                                })?,
                            ),
                            None => None,
                        };
                        fields.push(Field {
                            name,
                            spec,
                            default,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(fields)
    }

    fn parse_type_spec(&self, pair: Pair<'_, Rule>) -> Result<TypeSpec> {
        let inner = pair
            .into_inner()
            .next()
            .expect("type_spec always has one child");
        match inner.as_rule() {
            Rule::sequence_type | Rule::string_type | Rule::wide_string_type => {
                self.parse_template_type(inner)
            }
            Rule::simple_type_spec => self.parse_simple_type(inner),
            _ => Err(error_at(
                &inner,
                ParseErrorKind::UnexpectedToken,
                format!("unexpected type {:?}", inner.as_str()),
            )),
        }
    }

    fn parse_template_type(&self, pair: Pair<'_, Rule>) -> Result<TypeSpec> {
        match pair.as_rule() {
            Rule::string_type => Ok(TypeSpec::Base(BaseType::String {
                bound: parse_optional_bound(pair)?,
            })),
            Rule::wide_string_type => Ok(TypeSpec::Base(BaseType::WString {
                bound: parse_optional_bound(pair)?,
            })),
            Rule::sequence_type => {
                let span = pair.clone();
                let mut elem = None;
                let mut bound = None;
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::type_spec => {
                            elem = Some(spec_to_elem(&inner, self.parse_type_spec(inner.clone())?)?);
                        }
                        Rule::expression => bound = Some(eval_bound(inner)?),
                        _ => {}
                    }
                }
                let elem = elem.ok_or_else(|| {
                    error_at(&span, ParseErrorKind::MalformedArray, "sequence without element type")
                })?;
                Ok(TypeSpec::Sequence { elem, bound })
            }
            _ => unreachable!("not a template type"),
        }
    }

    fn parse_simple_type(&self, pair: Pair<'_, Rule>) -> Result<TypeSpec> {
        let inner = pair
            .into_inner()
            .next()
            .expect("simple_type_spec always has one child");
        match inner.as_rule() {
            Rule::boolean_type => Ok(TypeSpec::Base(BaseType::Bool)),
            Rule::octet_type => Ok(TypeSpec::Base(BaseType::Octet)),
            Rule::char_type => Ok(TypeSpec::Base(BaseType::UInt8)),
            Rule::float_type => Ok(TypeSpec::Base(match inner.as_str() {
                s if s.contains("double") && !s.starts_with("long") => BaseType::Float64,
                s if s.starts_with("long") => BaseType::Float64,
                _ => BaseType::Float32,
            })),
            Rule::integer_type => Ok(TypeSpec::Base(parse_integer_type(inner.as_str()))),
            Rule::scoped_name => Ok(self.resolve_scoped_name(inner.as_str())),
            _ => Err(error_at(
                &inner,
                ParseErrorKind::UnexpectedToken,
                format!("unexpected type {:?}", inner.as_str()),
            )),
        }
    }

    /// Resolve a scoped name against typedefs and primitive spellings.
    fn resolve_scoped_name(&self, raw: &str) -> TypeSpec {
        let name = raw.trim_start_matches("::").replace("::", "/");
        if let Some(expanded) = self.typedefs.get(&name) {
            return expanded.clone();
        }
        if let Some(base) = BaseType::try_from_str(&name) {
            return TypeSpec::Base(base);
        }
        TypeSpec::Name(name)
    }

    fn parse_const_type(&self, pair: Pair<'_, Rule>) -> Result<BaseType> {
        let span = pair.clone();
        let inner = pair
            .into_inner()
            .next()
            .expect("const_type always has one child");
        let spec = match inner.as_rule() {
            Rule::string_type | Rule::wide_string_type => self.parse_template_type(inner)?,
            _ => self.parse_simple_type_like(inner)?,
        };
        match spec {
            TypeSpec::Base(base) => Ok(base),
            other => Err(error_at(
                &span,
                ParseErrorKind::UnknownType,
                format!("constants must have a primitive type, not {other:?}"),
            )),
        }
    }

    /// Parse a bare base-type or scoped-name pair outside a
    /// `simple_type_spec` wrapper.
    fn parse_simple_type_like(&self, inner: Pair<'_, Rule>) -> Result<TypeSpec> {
        match inner.as_rule() {
            Rule::boolean_type => Ok(TypeSpec::Base(BaseType::Bool)),
            Rule::octet_type => Ok(TypeSpec::Base(BaseType::Octet)),
            Rule::char_type => Ok(TypeSpec::Base(BaseType::UInt8)),
            Rule::float_type => Ok(TypeSpec::Base(if inner.as_str().contains("float") {
                BaseType::Float32
            } else {
                BaseType::Float64
            })),
            Rule::integer_type => Ok(TypeSpec::Base(parse_integer_type(inner.as_str()))),
            Rule::scoped_name => Ok(self.resolve_scoped_name(inner.as_str())),
            other => Err(error_at(
                &inner,
                ParseErrorKind::UnexpectedToken,
                format!("unexpected const type {other:?}"),
            )),
        }
    }
}

/// Extract the optional bound of a `string<N>` / `wstring<N>` type.
fn parse_optional_bound(pair: Pair<'_, Rule>) -> Result<Option<usize>> {
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::expression {
            return Ok(Some(eval_bound(inner)?));
        }
    }
    Ok(None)
}

/// Join a module path and a declaration name into a qualified type name.
fn qualify(path: &[String], name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", path.join("/"), name)
    }
}

/// Map spelled-out IDL integer types to fixed-width base types.
fn parse_integer_type(s: &str) -> BaseType {
    let compact: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
    match compact.as_str() {
        "int8" => BaseType::Int8,
        "int16" | "short" => BaseType::Int16,
        "int32" | "long" | "int" => BaseType::Int32,
        "int64" | "long long" => BaseType::Int64,
        "uint8" => BaseType::UInt8,
        "uint16" | "unsigned short" => BaseType::UInt16,
        "uint32" | "unsigned long" | "unsigned int" => BaseType::UInt32,
        "uint64" | "unsigned long long" => BaseType::UInt64,
        _ => BaseType::Int32,
    }
}

/// Restrict a type specifier to an array/sequence element type.
fn spec_to_elem(pair: &Pair<'_, Rule>, spec: TypeSpec) -> Result<ElemType> {
    match spec {
        TypeSpec::Base(base) => Ok(ElemType::Base(base)),
        TypeSpec::Name(name) => Ok(ElemType::Name(name)),
        other => Err(error_at(
            pair,
            ParseErrorKind::MalformedArray,
            format!("nested container types are not supported: {other:?}"),
        )),
    }
}

/// Parse a declarator into its name and optional fixed array length.
fn parse_declarator(pair: &Pair<'_, Rule>) -> Result<(String, Option<usize>)> {
    match pair.as_rule() {
        Rule::simple_declarator => Ok((pair.as_str().to_string(), None)),
        Rule::array_declarator => {
            let mut name = String::new();
            let mut dims = Vec::new();
            for inner in pair.clone().into_inner() {
                match inner.as_rule() {
                    Rule::identifier => name = inner.as_str().to_string(),
                    Rule::fixed_array_size => {
                        let expr = inner
                            .into_inner()
                            .next()
                            .expect("fixed_array_size always has an expression");
                        dims.push(eval_bound(expr)?);
                    }
                    _ => {}
                }
            }
            if dims.len() != 1 {
                return Err(error_at(
                    pair,
                    ParseErrorKind::MalformedArray,
                    "multi-dimensional arrays are not supported",
                ));
            }
            Ok((name, Some(dims[0])))
        }
        _ => Err(error_at(
            pair,
            ParseErrorKind::UnexpectedToken,
            format!("unexpected declarator {:?}", pair.as_str()),
        )),
    }
}

/// Extract `@default(value=...)`, ignoring every other annotation.
fn parse_default_annotation(pair: Pair<'_, Rule>) -> Result<Option<Literal>> {
    let mut name = None;
    let mut params = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::scoped_name => name = Some(inner.as_str().to_string()),
            Rule::annotation_params => {
                for param in inner.into_inner() {
                    if param.as_rule() == Rule::annotation_param {
                        let mut key = None;
                        let mut value = None;
                        for part in param.into_inner() {
                            match part.as_rule() {
                                Rule::identifier => key = Some(part.as_str().to_string()),
                                Rule::expression => value = Some(eval_expression(part)?),
                                _ => {}
                            }
                        }
                        if let (Some(key), Some(value)) = (key, value) {
                            params.push((key, value));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if name.as_deref() == Some("default") {
        Ok(params
            .into_iter()
            .find(|(key, _)| key == "value")
            .map(|(_, value)| value))
    } else {
        Ok(None)
    }
}

/// Evaluate a bound expression to a non-negative length.
fn eval_bound(pair: Pair<'_, Rule>) -> Result<usize> {
    let span = pair.clone();
    match eval_expression(pair)? {
        Literal::Int(v) if v >= 0 => Ok(v as usize),
        other => Err(error_at(
            &span,
            ParseErrorKind::BadLiteral,
            format!("bound must be a non-negative integer, got {other}"),
        )),
    }
}

/// Evaluate a constant expression to a literal.
fn eval_expression(pair: Pair<'_, Rule>) -> Result<Literal> {
    let span = pair.clone();
    let mut unary = None;
    let mut operands = Vec::new();
    let mut binary = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::unary_operator => unary = Some(inner.as_str().to_string()),
            Rule::binary_operator => binary = Some(inner.as_str().to_string()),
            Rule::primary_expr => operands.push(eval_primary(inner)?),
            _ => {}
        }
    }

    let mut value = operands
        .first()
        .cloned()
        .ok_or_else(|| error_at(&span, ParseErrorKind::BadLiteral, "empty expression"))?;

    if let Some(op) = unary {
        value = eval_unary(&span, &op, value)?;
    }
    if let Some(op) = binary {
        let rhs = operands
            .get(1)
            .cloned()
            .ok_or_else(|| error_at(&span, ParseErrorKind::BadLiteral, "missing operand"))?;
        value = eval_binary(&span, &op, value, rhs)?;
    }
    Ok(value)
}

fn eval_primary(pair: Pair<'_, Rule>) -> Result<Literal> {
    let span = pair.clone();
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| error_at(&span, ParseErrorKind::BadLiteral, "empty expression"))?;
    match inner.as_rule() {
        Rule::boolean_literal => Ok(Literal::Bool(inner.as_str() == "TRUE")),
        Rule::decimal_literal => inner
            .as_str()
            .parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| error_at(&inner, ParseErrorKind::BadLiteral, "integer out of range")),
        Rule::octal_literal => i64::from_str_radix(&inner.as_str()[1..], 8)
            .map(Literal::Int)
            .map_err(|_| error_at(&inner, ParseErrorKind::BadLiteral, "integer out of range")),
        Rule::hexadecimal_literal => i64::from_str_radix(&inner.as_str()[2..], 16)
            .map(Literal::Int)
            .map_err(|_| error_at(&inner, ParseErrorKind::BadLiteral, "integer out of range")),
        Rule::float_literal => inner
            .as_str()
            .parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| error_at(&inner, ParseErrorKind::BadLiteral, "invalid float")),
        Rule::character_literal => {
            let body = inner.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            let decoded = unescape(body)?;
            let ch = decoded.chars().next().unwrap_or('\0');
            Ok(Literal::Int(ch as i64))
        }
        Rule::string_literals => {
            let mut out = String::new();
            for lit in inner.into_inner() {
                if lit.as_rule() == Rule::string_literal {
                    let body = lit.into_inner().next().map(|p| p.as_str()).unwrap_or("");
                    out.push_str(&unescape(body)?);
                }
            }
            Ok(Literal::Str(out))
        }
        Rule::expression => eval_expression(inner),
        Rule::scoped_name => Err(error_at(
            &inner,
            ParseErrorKind::BadLiteral,
            format!("unresolved constant reference '{}'", inner.as_str()),
        )),
        _ => Err(error_at(
            &inner,
            ParseErrorKind::BadLiteral,
            format!("unexpected expression {:?}", inner.as_str()),
        )),
    }
}

fn eval_unary(span: &Pair<'_, Rule>, op: &str, value: Literal) -> Result<Literal> {
    match (op, value) {
        ("+", value) => Ok(value),
        ("-", Literal::Int(v)) => Ok(Literal::Int(-v)),
        ("-", Literal::Float(v)) => Ok(Literal::Float(-v)),
        ("~", Literal::Int(v)) => Ok(Literal::Int(!v)),
        (op, value) => Err(error_at(
            span,
            ParseErrorKind::BadLiteral,
            format!("cannot apply unary '{op}' to {value}"),
        )),
    }
}

fn eval_binary(span: &Pair<'_, Rule>, op: &str, lhs: Literal, rhs: Literal) -> Result<Literal> {
    let (Literal::Int(a), Literal::Int(b)) = (&lhs, &rhs) else {
        return Err(error_at(
            span,
            ParseErrorKind::BadLiteral,
            format!("cannot apply binary '{op}' to {lhs} and {rhs}"),
        ));
    };
    let (a, b) = (*a, *b);
    let value = match op {
        "|" => Some(a | b),
        "^" => Some(a ^ b),
        "&" => Some(a & b),
        "<<" => a.checked_shl(b as u32),
        ">>" => a.checked_shr(b as u32),
        "+" => a.checked_add(b),
        "-" => a.checked_sub(b),
        "*" => a.checked_mul(b),
        "/" => a.checked_div(b),
        "%" => a.checked_rem(b),
        _ => None,
    };
    value.map(Literal::Int).ok_or_else(|| {
        error_at(
            span,
            ParseErrorKind::BadLiteral,
            format!("invalid expression {a} {op} {b}"),
        )
    })
}

/// Decode escape sequences in a string or character literal body.
fn unescape(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| CodecError::bad_literal(format!("\\u{hex}"), "unicode escape"))?;
                out.push(
                    char::from_u32(code)
                        .ok_or_else(|| CodecError::bad_literal(format!("\\u{hex}"), "unicode escape"))?,
                );
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
