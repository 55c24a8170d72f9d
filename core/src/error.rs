use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A table or column referenced by a schema operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaObject {
    Table(String),
    Column { table: String, column: String },
}

impl SchemaObject {
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table(name.into())
    }

    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Column {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(name) => write!(f, "table {name:?}"),
            Self::Column { table, column } => write!(f, "column {column:?} on table {table:?}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} does not exist")]
    SchemaObjectNotFound(SchemaObject),

    #[error("{0} already exists")]
    SchemaObjectExists(SchemaObject),

    #[error("cannot {action} {revision}: schema is at {}, expected {}", display_revision(.found), display_revision(.expected))]
    SchemaConflict {
        action: &'static str,
        revision: String,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("unknown revision {0:?}")]
    UnknownRevision(String),

    #[error("revision prefix {prefix:?} is ambiguous: matches {}", .candidates.join(", "))]
    AmbiguousRevision {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("invalid migration target {0:?}")]
    InvalidTarget(String),

    #[error("invalid migration chain: {0}")]
    InvalidChain(String),

    #[error("schema backend error: {0}")]
    Backend(String),
}

fn display_revision(revision: &Option<String>) -> &str {
    revision.as_deref().unwrap_or("base")
}

#[cfg(test)]
mod tests {
    use super::{Error, SchemaObject};

    #[test]
    fn error_display_names_the_object() {
        let e = Error::SchemaObjectNotFound(SchemaObject::table("students"));
        assert_eq!(e.to_string(), "table \"students\" does not exist");

        let e = Error::SchemaObjectExists(SchemaObject::column("students", "email_address"));
        assert_eq!(
            e.to_string(),
            "column \"email_address\" on table \"students\" already exists"
        );
    }

    #[test]
    fn conflict_display_uses_base_for_missing_revision() {
        let e = Error::SchemaConflict {
            action: "downgrade",
            revision: "f279f017e5c1".into(),
            expected: Some("f279f017e5c1".into()),
            found: None,
        };
        assert_eq!(
            e.to_string(),
            "cannot downgrade f279f017e5c1: schema is at base, expected f279f017e5c1"
        );
    }
}
