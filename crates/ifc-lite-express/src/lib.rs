// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite EXPRESS - schema reader for the entity type registry
//!
//! Reads ISO 10303-11 EXPRESS schemas into a [`SchemaDescription`].
//!
//! # Architecture
//!
//! - **Scanner**: memchr-based splitting into TYPE / ENTITY blocks
//! - **Tokenizer**: nom-based parsing of each block
//! - **Resolver**: maps declared types to attribute kinds
//!
//! Only what entity construction needs is kept: inheritance, explicit
//! attributes, optionality, DERIVE redeclarations, enumeration literals and
//! select members. INVERSE, UNIQUE and WHERE clauses, functions and rules
//! are skipped.
//!
//! # Example
//!
//! ```
//! use ifc_lite_express::ExpressParser;
//! use ifc_lite_schema::{SchemaRegistry, SchemaSource};
//!
//! let parser = ExpressParser::new(
//!     "SCHEMA DEMO;\n\
//!      TYPE Label = STRING; END_TYPE;\n\
//!      ENTITY Root ABSTRACT; GlobalId : Label; END_ENTITY;\n\
//!      ENTITY Wall SUBTYPE OF (Root); Height : REAL; END_ENTITY;\n\
//!      END_SCHEMA;",
//! );
//! let registry = SchemaRegistry::from_source(&parser).unwrap();
//! assert_eq!(registry.identifier(), "DEMO");
//! assert_eq!(registry.attributes_of(registry.lookup("Wall").unwrap()).len(), 2);
//! ```

pub mod resolver;
pub mod scanner;
pub mod tokenizer;

pub use resolver::TypeResolver;
pub use scanner::{Block, BlockKind, DeclarationScanner};
pub use tokenizer::{Declaration, EntityDecl, TypeDecl, TypeRef};

use ifc_lite_schema::{Error, Result, SchemaDescription, SchemaRegistry, SchemaSource, SchemaVersion};
use once_cell::sync::OnceCell;
use std::sync::Arc;

const IFC2X3_SUBSET: &str = include_str!("../schemas/IFC2X3_subset.exp");
const IFC4_SUBSET: &str = include_str!("../schemas/IFC4_subset.exp");

/// Parse EXPRESS text into raw declarations
///
/// Returns the schema identifier and the declarations in file order.
pub fn parse_declarations(content: &str) -> Result<(String, Vec<Declaration>)> {
    let stripped = scanner::strip_comments(content);
    let mut scanner = DeclarationScanner::new(&stripped);
    let mut declarations = Vec::new();

    while let Some(block) = scanner.next_block()? {
        declarations.push(tokenizer::parse_block(&block)?);
    }

    let identifier = scanner
        .schema_name()
        .ok_or_else(|| Error::express(1, "missing SCHEMA header"))?
        .to_string();

    Ok((identifier, declarations))
}

/// Parse EXPRESS text into a schema description
pub fn parse_schema(content: &str) -> Result<SchemaDescription> {
    let (identifier, declarations) = parse_declarations(content)?;
    let resolver = TypeResolver::new(&declarations)?;
    let description = resolver.describe(&identifier, &declarations)?;

    log::debug!(
        "Parsed EXPRESS schema {}: {} entities, {} defined types",
        description.identifier,
        description.entities.len(),
        description.defined_types.len()
    );

    Ok(description)
}

/// Schema source reading EXPRESS text
#[derive(Clone, Debug)]
pub struct ExpressParser {
    content: String,
}

impl ExpressParser {
    /// Create a parser over EXPRESS text
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Read EXPRESS text from a file
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// Parser over the bundled subset for a schema version
    pub fn bundled(version: SchemaVersion) -> Self {
        Self::new(bundled_text(version))
    }
}

impl SchemaSource for ExpressParser {
    fn describe(&self) -> Result<SchemaDescription> {
        parse_schema(&self.content)
    }
}

/// EXPRESS text of the bundled subset for a schema version
pub fn bundled_text(version: SchemaVersion) -> &'static str {
    match version {
        SchemaVersion::Ifc2x3 => IFC2X3_SUBSET,
        SchemaVersion::Ifc4 => IFC4_SUBSET,
    }
}

/// Parse the bundled subset for a schema version
pub fn bundled(version: SchemaVersion) -> Result<SchemaDescription> {
    parse_schema(bundled_text(version))
}

static IFC2X3_REGISTRY: OnceCell<Arc<SchemaRegistry>> = OnceCell::new();
static IFC4_REGISTRY: OnceCell<Arc<SchemaRegistry>> = OnceCell::new();

/// Shared registry for a bundled schema version
///
/// Built on first use and immutable afterwards; every session for the same
/// version shares it.
pub fn bundled_registry(version: SchemaVersion) -> Result<Arc<SchemaRegistry>> {
    let cell = match version {
        SchemaVersion::Ifc2x3 => &IFC2X3_REGISTRY,
        SchemaVersion::Ifc4 => &IFC4_REGISTRY,
    };
    cell.get_or_try_init(|| {
        let registry = SchemaRegistry::from_description(&bundled(version)?)?;
        log::info!("Loaded {} registry with {} entity types", version, registry.len());
        Ok(Arc::new(registry))
    })
    .cloned()
}
