// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP physical file (ISO 10303-21) writer
//!
//! Instances are written as `#id=IFCNAME(...);` in creation order. Unset
//! attributes become `$`, derived ones `*`.

use crate::ExportSession;
use ifc_lite_schema::{AttributeValue, Logical, Result};
use std::fmt::Write as _;
use std::io::Write;

/// Contents of the HEADER section
#[derive(Clone, Debug, PartialEq)]
pub struct StepHeader {
    pub description: Vec<String>,
    pub implementation_level: String,
    pub file_name: String,
    /// ISO 8601 timestamp
    pub time_stamp: String,
    pub author: Vec<String>,
    pub organization: Vec<String>,
    pub preprocessor_version: String,
    pub originating_system: String,
    pub authorization: String,
    /// Defaults to the session registry's identifier
    pub schema_identifier: Option<String>,
}

impl Default for StepHeader {
    fn default() -> Self {
        Self {
            description: vec!["ViewDefinition [CoordinationView]".to_string()],
            implementation_level: "2;1".to_string(),
            file_name: String::new(),
            time_stamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            author: Vec::new(),
            organization: Vec::new(),
            preprocessor_version: concat!("ifc-lite-export ", env!("CARGO_PKG_VERSION")).to_string(),
            originating_system: String::new(),
            authorization: String::new(),
            schema_identifier: None,
        }
    }
}

impl StepHeader {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_time_stamp(mut self, time: chrono::DateTime<chrono::Utc>) -> Self {
        self.time_stamp = time.format("%Y-%m-%dT%H:%M:%S").to_string();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author.push(author.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization.push(organization.into());
        self
    }

    pub fn with_originating_system(mut self, system: impl Into<String>) -> Self {
        self.originating_system = system.into();
        self
    }

    fn write_to(&self, schema: &str, out: &mut String) {
        out.push_str("FILE_DESCRIPTION(");
        write_string_list(&self.description, out);
        out.push(',');
        write_string(&self.implementation_level, out);
        out.push_str(");\nFILE_NAME(");
        write_string(&self.file_name, out);
        out.push(',');
        write_string(&self.time_stamp, out);
        out.push(',');
        write_string_list(&self.author, out);
        out.push(',');
        write_string_list(&self.organization, out);
        out.push(',');
        write_string(&self.preprocessor_version, out);
        out.push(',');
        write_string(&self.originating_system, out);
        out.push(',');
        write_string(&self.authorization, out);
        out.push_str(");\nFILE_SCHEMA((");
        write_string(self.schema_identifier.as_deref().unwrap_or(schema), out);
        out.push_str("));\n");
    }
}

/// Write every instance of `session` as a STEP physical file
pub fn write_step<W: Write>(session: &ExportSession, header: &StepHeader, mut writer: W) -> Result<()> {
    let registry = session.registry();
    let mut line = String::with_capacity(256);

    line.push_str("ISO-10303-21;\nHEADER;\n");
    header.write_to(registry.identifier(), &mut line);
    line.push_str("ENDSEC;\n\nDATA;\n");
    writer.write_all(line.as_bytes())?;

    for instance in session.instances() {
        line.clear();
        let step_name = registry
            .entity(instance.entity_type())
            .map(|e| e.step_name.as_str())
            .unwrap_or_default();
        // Infallible on String
        let _ = write!(line, "#{}={}(", instance.id().0, step_name);

        let attributes = registry.attributes_of(instance.entity_type());
        for (i, (def, value)) in attributes.iter().zip(instance.values()).enumerate() {
            if i > 0 {
                line.push(',');
            }
            match value {
                _ if def.derived => line.push('*'),
                Some(value) => write_value(value, &mut line),
                None => line.push('$'),
            }
        }
        line.push_str(");\n");
        writer.write_all(line.as_bytes())?;
    }

    writer.write_all(b"ENDSEC;\nEND-ISO-10303-21;\n")?;
    writer.flush()?;
    log::debug!("Wrote {} instances as STEP", session.len());
    Ok(())
}

/// [`write_step`] into a string
pub fn to_step_string(session: &ExportSession, header: &StepHeader) -> Result<String> {
    let mut buffer = Vec::new();
    write_step(session, header, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_value(value: &AttributeValue, out: &mut String) {
    match value {
        AttributeValue::Null => out.push('$'),
        AttributeValue::Derived => out.push('*'),
        AttributeValue::EntityRef(id) => {
            let _ = write!(out, "#{}", id.0);
        }
        AttributeValue::Bool(b) => out.push_str(if *b { ".T." } else { ".F." }),
        AttributeValue::Logical(l) => out.push_str(match l {
            Logical::True => ".T.",
            Logical::False => ".F.",
            Logical::Unknown => ".U.",
        }),
        AttributeValue::Integer(i) => {
            let _ = write!(out, "{}", i);
        }
        AttributeValue::Float(f) => write_real(*f, out),
        AttributeValue::String(s) => write_string(s, out),
        AttributeValue::Enum(e) => {
            out.push('.');
            out.push_str(e);
            out.push('.');
        }
        AttributeValue::List(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(')');
        }
        AttributeValue::TypedValue(type_name, inner) => {
            out.push_str(&type_name.to_ascii_uppercase());
            out.push('(');
            write_value(inner, out);
            out.push(')');
        }
    }
}

/// Real literal: always a decimal point, upper-case exponent
fn write_real(value: f64, out: &mut String) {
    let mut buffer = [0u8; lexical_core::BUFFER_SIZE];
    let digits = lexical_core::write(value, &mut buffer);
    let text = std::str::from_utf8(digits).unwrap_or("0.");

    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };
    out.push_str(mantissa);
    if !mantissa.contains('.') {
        out.push('.');
    }
    if let Some(exponent) = exponent {
        out.push('E');
        out.push_str(exponent);
    }
}

/// Quoted string with STEP escapes
fn write_string(value: &str, out: &mut String) {
    out.push('\'');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            ' '..='~' => out.push(c),
            _ if (c as u32) <= 0xFFFF => {
                out.push_str("\\X2\\");
                let _ = write!(out, "{:04X}", c as u32);
                while let Some(&next) = chars.peek() {
                    if is_plain(next) || (next as u32) > 0xFFFF {
                        break;
                    }
                    let _ = write!(out, "{:04X}", next as u32);
                    chars.next();
                }
                out.push_str("\\X0\\");
            }
            _ => {
                out.push_str("\\X4\\");
                let _ = write!(out, "{:08X}", c as u32);
                while let Some(&next) = chars.peek() {
                    if (next as u32) <= 0xFFFF {
                        break;
                    }
                    let _ = write!(out, "{:08X}", next as u32);
                    chars.next();
                }
                out.push_str("\\X0\\");
            }
        }
    }
    out.push('\'');
}

fn is_plain(c: char) -> bool {
    matches!(c, ' '..='~')
}

fn write_string_list(values: &[String], out: &mut String) {
    out.push('(');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(value, out);
    }
    out.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementArgs, RootArgs};
    use ifc_lite_schema::SchemaVersion;

    fn escaped(value: &str) -> String {
        let mut out = String::new();
        write_string(value, &mut out);
        out
    }

    fn real(value: f64) -> String {
        let mut out = String::new();
        write_real(value, &mut out);
        out
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(escaped("plain"), "'plain'");
        assert_eq!(escaped("it's"), "'it''s'");
        assert_eq!(escaped("a\\b"), "'a\\\\b'");
        assert_eq!(escaped("Wand Süd"), "'Wand S\\X2\\00FC\\X0\\d'");
        assert_eq!(escaped("ÄÖ"), "'\\X2\\00C400D6\\X0\\'");
        assert_eq!(escaped("\u{1F600}"), "'\\X4\\0001F600\\X0\\'");
    }

    #[test]
    fn test_reals_keep_decimal_point() {
        assert_eq!(real(3.0), "3.0");
        assert_eq!(real(-0.5), "-0.5");
        assert!(real(1e-5).contains('.'));
        assert!(real(1e-5).contains('E'));
        assert!(!real(2.5e20).contains('e'));
    }

    #[test]
    fn test_values() {
        let mut out = String::new();
        write_value(
            &AttributeValue::List(vec![
                AttributeValue::EntityRef(ifc_lite_schema::EntityId(4)),
                AttributeValue::Bool(false),
                AttributeValue::Logical(Logical::Unknown),
                AttributeValue::Enum("NOTDEFINED".into()),
                AttributeValue::TypedValue(
                    "IfcLabel".into(),
                    Box::new(AttributeValue::String("x".into())),
                ),
            ]),
            &mut out,
        );
        assert_eq!(out, "(#4,.F.,.U.,.NOTDEFINED.,IFCLABEL('x'))");
    }

    #[test]
    fn test_file_layout() {
        let mut s = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
        let root = RootArgs::new("0YvctVUKr0kugbFTf53O9L").with_name("W");
        let wall = s.create_wall(&ElementArgs::new(root), None).unwrap();
        let unit = s.create_si_unit("LENGTHUNIT", None, "METRE").unwrap();

        let text = to_step_string(&s, &StepHeader::new("out.ifc")).unwrap();
        assert!(text.starts_with("ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');\n"));
        assert!(text.contains("FILE_SCHEMA(('IFC4'));"));
        assert!(text.ends_with("ENDSEC;\nEND-ISO-10303-21;\n"));

        let wall_line = format!("#{}=IFCWALL('0YvctVUKr0kugbFTf53O9L',$,'W',$,$,$,$,$,$);", wall.id().unwrap().0);
        let unit_line = format!("#{}=IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);", unit.id().unwrap().0);
        let wall_at = text.find(&wall_line).unwrap();
        let unit_at = text.find(&unit_line).unwrap();
        assert!(wall_at < unit_at);
    }
}
