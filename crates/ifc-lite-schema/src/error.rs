// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for schema loading and entity construction

use crate::EntityId;
use thiserror::Error;

/// Result type alias for schema and export operations
pub type Result<T> = std::result::Result<T, Error>;

/// How far an error reaches
///
/// Schema violations concern a single entity: the orchestrator logs them and
/// moves on to the next element. Configuration and I/O failures end the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Skip the element being exported, continue the run
    SkipEntity,
    /// Abort the whole export
    AbortRun,
}

/// Errors raised while building schemas or constructing instances
#[derive(Error, Debug)]
pub enum Error {
    /// Bad argument to an accessor or factory (empty name, null aggregate
    /// member, kind mismatch, foreign handle, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A handle is not an instance of any permitted type
    #[error("{argument}: expected instance of {expected}, got {actual}")]
    SubtypeMismatch {
        argument: String,
        expected: String,
        actual: String,
    },

    /// A mandatory attribute was not supplied
    #[error("Missing required attribute {entity}.{attribute}")]
    MissingAttribute { entity: String, attribute: String },

    /// Attribute not declared for the entity type
    #[error("Attribute {attribute} is not declared for {entity}")]
    UnknownAttribute { entity: String, attribute: String },

    /// Attempt to instantiate an ABSTRACT entity
    #[error("Entity type {0} is abstract")]
    AbstractEntity(String),

    /// Handle refers to an instance the session does not own
    #[error("Instance {0} does not belong to this session")]
    ForeignInstance(EntityId),

    /// Entity type name unknown to the registry (schema mismatch)
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Inconsistent schema description
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// EXPRESS text could not be read
    #[error("EXPRESS error at line {line}: {message}")]
    Express { line: usize, message: String },

    /// IO error while writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(String),
}

impl Error {
    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a subtype-mismatch error
    pub fn subtype_mismatch(
        argument: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Error::SubtypeMismatch {
            argument: argument.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a missing-attribute error
    pub fn missing(entity: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::MissingAttribute {
            entity: entity.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an invalid-schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::InvalidSchema(msg.into())
    }

    /// Create an EXPRESS error
    pub fn express(line: usize, msg: impl Into<String>) -> Self {
        Error::Express {
            line,
            message: msg.into(),
        }
    }

    /// Whether the error is a schema violation local to one entity
    pub fn is_schema_violation(&self) -> bool {
        self.severity() == Severity::SkipEntity
    }

    /// Whether the error rejects an argument passed to an accessor
    ///
    /// Unknown attributes and foreign handles are argument errors with a
    /// more specific message.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_) | Error::UnknownAttribute { .. } | Error::ForeignInstance(_)
        )
    }

    /// Whether the error is a configuration error (schema/registry mismatch)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownEntityType(_) | Error::InvalidSchema(_) | Error::Express { .. }
        )
    }

    /// Classify the error for the export orchestrator
    pub fn severity(&self) -> Severity {
        match self {
            Error::InvalidArgument(_)
            | Error::SubtypeMismatch { .. }
            | Error::MissingAttribute { .. }
            | Error::UnknownAttribute { .. }
            | Error::AbstractEntity(_)
            | Error::ForeignInstance(_) => Severity::SkipEntity,
            Error::UnknownEntityType(_)
            | Error::InvalidSchema(_)
            | Error::Express { .. }
            | Error::Io(_)
            | Error::Json(_) => Severity::AbortRun,
        }
    }
}
