use std::fmt;

/// A single structural change to the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOp {
    RenameTable {
        from: String,
        to: String,
    },
    RenameColumn {
        table: String,
        from: String,
        to: String,
    },
}

impl SchemaOp {
    pub fn rename_table(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::RenameTable {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn rename_column(
        table: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::RenameColumn {
            table: table.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// The operation that undoes `self`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Self::RenameTable { from, to } => Self::rename_table(to, from),
            Self::RenameColumn { table, from, to } => Self::rename_column(table, to, from),
        }
    }
}

impl fmt::Display for SchemaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RenameTable { from, to } => write!(f, "rename table {from} -> {to}"),
            Self::RenameColumn { table, from, to } => {
                write!(f, "rename column {table}.{from} -> {table}.{to}")
            },
        }
    }
}
