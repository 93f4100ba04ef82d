// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast declaration scanner using SIMD-accelerated byte searching
//!
//! Splits EXPRESS text into TYPE and ENTITY blocks without parsing them.
//! Keywords are expected in upper case, as in the published IFC schemas.

use ifc_lite_schema::{Error, Result};
use memchr::{memchr, memchr_iter, memmem};

/// Kind of declaration block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Type,
    Entity,
}

/// One `TYPE ... END_TYPE;` or `ENTITY ... END_ENTITY;` block
#[derive(Clone, Debug, PartialEq)]
pub struct Block<'a> {
    pub kind: BlockKind,
    /// Block text including the closing keyword and semicolon
    pub text: &'a str,
    /// 1-based line of the opening keyword
    pub line: usize,
}

/// Replace `(* ... *)` comments with spaces, keeping newlines so that line
/// numbers stay valid
pub fn strip_comments(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut out = String::with_capacity(content.len());
    let mut pos = 0;

    while let Some(offset) = memmem::find(&bytes[pos..], b"(*") {
        let start = pos + offset;
        out.push_str(&content[pos..start]);

        let end = memmem::find(&bytes[start + 2..], b"*)")
            .map(|e| start + 2 + e + 2)
            .unwrap_or(bytes.len());

        for &b in &bytes[start..end] {
            out.push(if b == b'\n' { '\n' } else { ' ' });
        }
        pos = end;
    }

    out.push_str(&content[pos..]);
    out
}

/// Scanner over the declarations of a comment-free EXPRESS schema
pub struct DeclarationScanner<'a> {
    content: &'a str,
    pos: usize,
    line: usize,
    schema_name: Option<&'a str>,
}

impl<'a> DeclarationScanner<'a> {
    /// Create a new scanner for the given content
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            line: 1,
            schema_name: None,
        }
    }

    /// Identifier from the `SCHEMA name;` header, once scanned past
    pub fn schema_name(&self) -> Option<&'a str> {
        self.schema_name
    }

    /// Move to `target`, keeping the line count current
    fn advance_to(&mut self, target: usize) {
        let target = target.min(self.content.len());
        self.line += memchr_iter(b'\n', &self.content.as_bytes()[self.pos..target]).count();
        self.pos = target;
    }

    /// Position just past the `;` that follows the next `closing` keyword
    fn find_block_end(&self, closing: &str) -> Result<usize> {
        let bytes = self.content.as_bytes();
        let keyword = memmem::find(&bytes[self.pos..], closing.as_bytes())
            .map(|k| self.pos + k + closing.len())
            .ok_or_else(|| Error::express(self.line, format!("missing {}", closing)))?;
        let semicolon = memchr(b';', &bytes[keyword..])
            .ok_or_else(|| Error::express(self.line, format!("missing ';' after {}", closing)))?;
        Ok(keyword + semicolon + 1)
    }

    /// Position just past the next `;`
    fn find_statement_end(&self) -> Result<usize> {
        memchr(b';', &self.content.as_bytes()[self.pos..])
            .map(|s| self.pos + s + 1)
            .ok_or_else(|| Error::express(self.line, "missing ';'"))
    }

    /// Scan to the next TYPE or ENTITY block
    pub fn next_block(&mut self) -> Result<Option<Block<'a>>> {
        let bytes = self.content.as_bytes();

        loop {
            // Skip whitespace
            let skip = bytes[self.pos..]
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .unwrap_or(bytes.len() - self.pos);
            self.advance_to(self.pos + skip);

            if self.pos >= bytes.len() {
                return Ok(None);
            }

            let word_len = bytes[self.pos..]
                .iter()
                .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
                .unwrap_or(bytes.len() - self.pos);

            if word_len == 0 {
                return Err(Error::express(
                    self.line,
                    format!("unexpected character '{}'", bytes[self.pos] as char),
                ));
            }

            let start = self.pos;
            let line = self.line;
            let word = &self.content[start..start + word_len];

            let closing = match word {
                "TYPE" => Some((BlockKind::Type, "END_TYPE")),
                "ENTITY" => Some((BlockKind::Entity, "END_ENTITY")),
                _ => None,
            };

            if let Some((kind, closing)) = closing {
                let end = self.find_block_end(closing)?;
                self.advance_to(end);
                return Ok(Some(Block {
                    kind,
                    text: &self.content[start..end],
                    line,
                }));
            }

            let end = match word {
                "SCHEMA" => {
                    let end = self.find_statement_end()?;
                    let name = self.content[start + word_len..end - 1].trim();
                    self.schema_name = Some(name);
                    end
                }
                "FUNCTION" => self.find_block_end("END_FUNCTION")?,
                "RULE" => self.find_block_end("END_RULE")?,
                "PROCEDURE" => self.find_block_end("END_PROCEDURE")?,
                "CONSTANT" => self.find_block_end("END_CONSTANT")?,
                "SUBTYPE_CONSTRAINT" => self.find_block_end("END_SUBTYPE_CONSTRAINT")?,
                "END_SCHEMA" | "USE" | "REFERENCE" => self.find_statement_end()?,
                other => {
                    return Err(Error::express(
                        line,
                        format!("unexpected keyword '{}'", other),
                    ))
                }
            };
            self.advance_to(end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_EXPRESS: &str = r#"SCHEMA DEMO;

TYPE IfcLabel = STRING;
END_TYPE;

(* a comment spanning
   two lines *)
ENTITY IfcRoot
 ABSTRACT SUPERTYPE OF (ONEOF(IfcWall));
  GlobalId : IfcLabel;
END_ENTITY;

FUNCTION IfcDummy (Arg : INTEGER) : INTEGER;
  RETURN (Arg);
END_FUNCTION;

ENTITY IfcWall
 SUBTYPE OF (IfcRoot);
END_ENTITY;

END_SCHEMA;
"#;

    #[test]
    fn test_strip_comments_keeps_lines() {
        let stripped = strip_comments(TEST_EXPRESS);
        assert!(!stripped.contains("a comment"));
        assert_eq!(
            stripped.matches('\n').count(),
            TEST_EXPRESS.matches('\n').count()
        );
    }

    #[test]
    fn test_scanner_finds_blocks() {
        let stripped = strip_comments(TEST_EXPRESS);
        let mut scanner = DeclarationScanner::new(&stripped);
        let mut blocks = Vec::new();

        while let Some(block) = scanner.next_block().unwrap() {
            blocks.push(block);
        }

        assert_eq!(scanner.schema_name(), Some("DEMO"));
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::Type);
        assert_eq!(blocks[0].line, 3);
        assert_eq!(blocks[1].kind, BlockKind::Entity);
        assert_eq!(blocks[1].line, 8);
        assert!(blocks[2].text.starts_with("ENTITY IfcWall"));
        assert!(blocks[2].text.ends_with("END_ENTITY;"));
    }

    #[test]
    fn test_scanner_rejects_unterminated_block() {
        let mut scanner = DeclarationScanner::new("ENTITY IfcRoot;\n GlobalId : STRING;\n");
        let err = scanner.next_block().unwrap_err();
        assert!(err.is_configuration());
    }
}
