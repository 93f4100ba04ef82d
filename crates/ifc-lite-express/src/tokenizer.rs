// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EXPRESS declaration tokenizer using nom combinators
//!
//! Parses the TYPE and ENTITY blocks found by the scanner into raw
//! declarations. Type names stay unresolved here; the resolver maps them to
//! attribute kinds once every declaration is known.

use crate::scanner::{Block, BlockKind};
use ifc_lite_schema::{Error, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map, opt},
    multi::separated_list1,
    sequence::delimited,
    IResult, Parser,
};

/// Built-in EXPRESS simple types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimpleType {
    String,
    Real,
    Integer,
    Number,
    Boolean,
    Logical,
    Binary,
}

/// Aggregation kind of a collection type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateKind {
    List,
    Set,
    Bag,
    Array,
}

/// Unresolved type expression
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    Simple(SimpleType),
    Named(String),
    Aggregate {
        kind: AggregateKind,
        element: Box<TypeRef>,
    },
}

/// Right-hand side of a TYPE declaration
#[derive(Clone, Debug, PartialEq)]
pub enum Underlying {
    Type(TypeRef),
    Enumeration(Vec<String>),
    Select(Vec<String>),
}

/// `TYPE name = underlying;`
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub underlying: Underlying,
    pub line: usize,
}

/// One explicit attribute
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDecl {
    pub name: String,
    pub optional: bool,
    pub ty: TypeRef,
}

/// `ENTITY name ... END_ENTITY;`
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDecl {
    pub name: String,
    pub is_abstract: bool,
    pub supertype: Option<String>,
    pub attributes: Vec<AttributeDecl>,
    /// Inherited attributes redeclared in the DERIVE section
    pub derived: Vec<String>,
    pub line: usize,
}

/// Parsed declaration
#[derive(Clone, Debug, PartialEq)]
pub enum Declaration {
    Type(TypeDecl),
    Entity(EntityDecl),
}

// ============================================================================
// Parsing Primitives
// ============================================================================

/// Parse whitespace
fn ws(input: &str) -> IResult<&str, ()> {
    let (input, _) = multispace0(input)?;
    Ok((input, ()))
}

/// Parse an identifier
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

/// Parse a whole keyword (`LIST` does not match `LISTING`)
fn keyword<'a>(kw: &'static str) -> impl Fn(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, word) = identifier(input)?;
        if word.eq_ignore_ascii_case(kw) {
            Ok((rest, word))
        } else {
            Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )))
        }
    }
}

/// Parse a comma-separated, parenthesized identifier list
fn identifier_list(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        (char('('), ws),
        separated_list1((ws, char(','), ws), map(identifier, String::from)),
        (ws, char(')')),
    )
    .parse(input)
}

/// Skip a balanced parenthesized group (e.g. `(ONEOF(A, B))`)
fn balanced_parens(input: &str) -> IResult<&str, &str> {
    let (_, _) = char('(').parse(input)?;
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], &input[..i + 1]));
                }
            }
            _ => {}
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

// ============================================================================
// Type Expressions
// ============================================================================

/// Parse a simple type with optional width and FIXED (`STRING(22) FIXED`)
fn simple_type(input: &str) -> IResult<&str, SimpleType> {
    let (rest, word) = identifier(input)?;
    let simple = match word.to_ascii_uppercase().as_str() {
        "STRING" => SimpleType::String,
        "REAL" => SimpleType::Real,
        "INTEGER" => SimpleType::Integer,
        "NUMBER" => SimpleType::Number,
        "BOOLEAN" => SimpleType::Boolean,
        "LOGICAL" => SimpleType::Logical,
        "BINARY" => SimpleType::Binary,
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )))
        }
    };
    let (rest, _) = opt((ws, char('('), ws, digit1, ws, char(')'))).parse(rest)?;
    let (rest, _) = opt((ws, keyword("FIXED"))).parse(rest)?;
    Ok((rest, simple))
}

/// Parse an aggregate bound: a number or `?`
fn bound(input: &str) -> IResult<&str, &str> {
    alt((digit1, tag("?"))).parse(input)
}

/// Parse `LIST [1:?] OF [UNIQUE] element`
fn aggregate_type(input: &str) -> IResult<&str, TypeRef> {
    let (input, word) = alt((
        keyword("LIST"),
        keyword("SET"),
        keyword("BAG"),
        keyword("ARRAY"),
    ))
    .parse(input)?;
    let kind = match word.to_ascii_uppercase().as_str() {
        "LIST" => AggregateKind::List,
        "SET" => AggregateKind::Set,
        "BAG" => AggregateKind::Bag,
        _ => AggregateKind::Array,
    };

    let (input, _) = (
        ws,
        char('['),
        ws,
        bound,
        ws,
        char(':'),
        ws,
        bound,
        ws,
        char(']'),
        ws,
        keyword("OF"),
        ws,
    )
        .parse(input)?;
    let (input, _) = opt((keyword("UNIQUE"), ws)).parse(input)?;
    let (input, _) = opt((keyword("OPTIONAL"), ws)).parse(input)?;
    let (input, element) = type_ref(input)?;

    Ok((
        input,
        TypeRef::Aggregate {
            kind,
            element: Box::new(element),
        },
    ))
}

/// Parse any type expression
pub fn type_ref(input: &str) -> IResult<&str, TypeRef> {
    alt((
        aggregate_type,
        map(simple_type, TypeRef::Simple),
        map(identifier, |name| TypeRef::Named(name.to_string())),
    ))
    .parse(input)
}

/// Parse the right-hand side of a TYPE declaration
fn underlying(input: &str) -> IResult<&str, Underlying> {
    let (input, _) = opt((keyword("EXTENSIBLE"), ws)).parse(input)?;
    let (input, _) = opt((keyword("GENERIC_ENTITY"), ws)).parse(input)?;

    alt((
        map(
            (keyword("ENUMERATION"), ws, keyword("OF"), ws, identifier_list),
            |(_, _, _, _, items)| Underlying::Enumeration(items),
        ),
        map(
            (keyword("SELECT"), ws, identifier_list),
            |(_, _, items)| Underlying::Select(items),
        ),
        map(type_ref, Underlying::Type),
    ))
    .parse(input)
}

// ============================================================================
// Statements
// ============================================================================

/// `TYPE name = underlying`
fn type_header(input: &str) -> IResult<&str, (&str, Underlying)> {
    let (input, (_, _, name, _, _, _, underlying, _)) = (
        keyword("TYPE"),
        ws,
        identifier,
        ws,
        char('='),
        ws,
        underlying,
        ws,
    )
        .parse(input)?;
    Ok((input, (name, underlying)))
}

/// Entity header clauses after the name
enum HeaderClause {
    Abstract,
    Supertype,
    Subtype(Vec<String>),
}

fn header_clause(input: &str) -> IResult<&str, HeaderClause> {
    alt((
        map(
            (keyword("SUPERTYPE"), ws, keyword("OF"), ws, balanced_parens),
            |_| HeaderClause::Supertype,
        ),
        map(
            (keyword("SUBTYPE"), ws, keyword("OF"), ws, identifier_list),
            |(_, _, _, _, names)| HeaderClause::Subtype(names),
        ),
        map(keyword("ABSTRACT"), |_| HeaderClause::Abstract),
    ))
    .parse(input)
}

/// `ENTITY name [ABSTRACT] [SUPERTYPE OF (...)] [SUBTYPE OF (...)]`
fn entity_header(input: &str) -> IResult<&str, (&str, bool, Vec<String>)> {
    let (mut input, (_, _, name, _)) =
        (keyword("ENTITY"), ws, identifier, ws).parse(input)?;

    let mut is_abstract = false;
    let mut supertypes = Vec::new();

    while !input.is_empty() {
        let (rest, clause) = header_clause(input)?;
        match clause {
            HeaderClause::Abstract => is_abstract = true,
            HeaderClause::Supertype => {}
            HeaderClause::Subtype(names) => supertypes = names,
        }
        let (rest, _) = ws(rest)?;
        input = rest;
    }

    Ok((input, (name, is_abstract, supertypes)))
}

/// `Name1, Name2 : [OPTIONAL] type`
fn attribute_statement(input: &str) -> IResult<&str, (Vec<String>, bool, TypeRef)> {
    let (input, names) = separated_list1(
        (ws, char(','), ws),
        map(identifier, String::from),
    )
    .parse(input)?;
    let (input, _) = (ws, char(':'), ws).parse(input)?;
    let (input, optional) = opt((keyword("OPTIONAL"), ws)).parse(input)?;
    let (input, ty) = type_ref(input)?;
    let (input, _) = ws(input)?;
    Ok((input, (names, optional.is_some(), ty)))
}

/// `SELF\Supertype.Attribute : ...` and return the attribute name
fn redeclared_attribute(input: &str) -> IResult<&str, &str> {
    let (input, (_, _, _, _, name)) = (
        keyword("SELF"),
        char('\\'),
        identifier,
        char('.'),
        identifier,
    )
        .parse(input)?;
    Ok((input, name))
}

/// Split block text on `;`, ignoring semicolons inside quoted strings
///
/// Returns each statement trimmed, with its 1-based line.
fn statements(text: &str, first_line: usize) -> Vec<(&str, usize)> {
    let mut out = Vec::new();
    let mut line = first_line;
    let mut start = 0;
    let mut start_line = first_line;
    let mut in_string = false;

    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '\n' => line += 1,
            ';' if !in_string => {
                let raw = &text[start..i];
                let leading = raw.len() - raw.trim_start().len();
                let stmt_line =
                    start_line + raw[..leading].matches('\n').count();
                out.push((raw.trim(), stmt_line));
                start = i + 1;
                start_line = line;
            }
            _ => {}
        }
    }
    out
}

/// Run a statement parser over a whole statement, mapping failures to
/// line-numbered errors
fn parse_statement<'a, T>(
    stmt: &'a str,
    line: usize,
    what: &str,
    parser: impl Fn(&'a str) -> IResult<&'a str, T>,
) -> Result<T> {
    all_consuming(parser)
        .parse(stmt)
        .map(|(_, value)| value)
        .map_err(|_| Error::express(line, format!("malformed {}: '{}'", what, stmt)))
}

/// Split a leading section keyword off a statement
fn section_keyword(stmt: &str) -> Option<(Section, &str)> {
    let (rest, word) = identifier(stmt).ok()?;
    let section = match word {
        "DERIVE" => Section::Derive,
        "INVERSE" => Section::Inverse,
        "UNIQUE" => Section::Unique,
        "WHERE" => Section::Where,
        _ => return None,
    };
    Some((section, rest.trim_start()))
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Explicit,
    Derive,
    Inverse,
    Unique,
    Where,
}

// ============================================================================
// Block Parsing
// ============================================================================

/// Parse a TYPE block
pub fn parse_type(block: &Block) -> Result<TypeDecl> {
    let stmts = statements(block.text, block.line);
    let (header, line) = stmts
        .first()
        .copied()
        .ok_or_else(|| Error::express(block.line, "empty TYPE declaration"))?;

    let (name, underlying) = parse_statement(header, line, "TYPE declaration", type_header)?;

    Ok(TypeDecl {
        name: name.to_string(),
        underlying,
        line: block.line,
    })
}

/// Parse an ENTITY block
pub fn parse_entity(block: &Block) -> Result<EntityDecl> {
    let stmts = statements(block.text, block.line);
    let mut iter = stmts.into_iter();

    let (header, line) = iter
        .next()
        .ok_or_else(|| Error::express(block.line, "empty ENTITY declaration"))?;
    let (name, is_abstract, supertypes) =
        parse_statement(header, line, "ENTITY header", entity_header)?;

    if supertypes.len() > 1 {
        return Err(Error::express(
            line,
            format!("{} has multiple supertypes, only single inheritance is supported", name),
        ));
    }

    let mut entity = EntityDecl {
        name: name.to_string(),
        is_abstract,
        supertype: supertypes.into_iter().next(),
        attributes: Vec::new(),
        derived: Vec::new(),
        line: block.line,
    };

    let mut section = Section::Explicit;

    for (stmt, line) in iter {
        if stmt == "END_ENTITY" {
            return Ok(entity);
        }

        let stmt = match section_keyword(stmt) {
            Some((next, rest)) => {
                section = next;
                rest
            }
            None => stmt,
        };

        if stmt.is_empty() {
            continue;
        }

        match section {
            Section::Explicit => {
                // Redeclarations refine an inherited attribute's type only
                if redeclared_attribute(stmt).is_ok() {
                    continue;
                }
                let (names, optional, ty) =
                    parse_statement(stmt, line, "attribute", attribute_statement)?;
                for name in names {
                    entity.attributes.push(AttributeDecl {
                        name,
                        optional,
                        ty: ty.clone(),
                    });
                }
            }
            Section::Derive => {
                if let Ok((_, attribute)) = redeclared_attribute(stmt) {
                    entity.derived.push(attribute.to_string());
                }
            }
            Section::Inverse | Section::Unique | Section::Where => {}
        }
    }

    Err(Error::express(
        block.line,
        format!("{} is missing END_ENTITY", entity.name),
    ))
}

/// Parse any block
pub fn parse_block(block: &Block) -> Result<Declaration> {
    match block.kind {
        BlockKind::Type => parse_type(block).map(Declaration::Type),
        BlockKind::Entity => parse_entity(block).map(Declaration::Entity),
    }
}
