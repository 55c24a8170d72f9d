use std::collections::BTreeMap;

use crate::{backend::SchemaBackend, ops::SchemaOp, Error, Result, SchemaObject};

/// In-memory schema state: tables with ordered columns, plus the version
/// record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    tables: BTreeMap<String, Vec<String>>,
    current_revision: Option<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(name.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn at_revision(mut self, revision: impl Into<String>) -> Self {
        self.current_revision = Some(revision.into());
        self
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.columns(table)
            .is_some_and(|columns| columns.iter().any(|c| c == column))
    }

    pub fn revision(&self) -> Option<&str> {
        self.current_revision.as_deref()
    }

    /// Applies `op`, leaving the schema untouched on error.
    ///
    /// # Errors
    /// `SchemaObjectNotFound` or `SchemaObjectExists` per the renamed object.
    pub fn apply_op(&mut self, op: &SchemaOp) -> Result<()> {
        match op {
            SchemaOp::RenameTable { from, to } => self.rename_table_in_place(from, to),
            SchemaOp::RenameColumn { table, from, to } => {
                self.rename_column_in_place(table, from, to)
            },
        }
    }

    fn rename_table_in_place(&mut self, from: &str, to: &str) -> Result<()> {
        if !self.has_table(from) {
            return Err(Error::SchemaObjectNotFound(SchemaObject::table(from)));
        }
        if self.has_table(to) {
            return Err(Error::SchemaObjectExists(SchemaObject::table(to)));
        }

        if let Some(columns) = self.tables.remove(from) {
            self.tables.insert(to.to_owned(), columns);
        }

        Ok(())
    }

    fn rename_column_in_place(&mut self, table: &str, from: &str, to: &str) -> Result<()> {
        let columns = self
            .tables
            .get_mut(table)
            .ok_or_else(|| Error::SchemaObjectNotFound(SchemaObject::table(table)))?;

        let position = columns
            .iter()
            .position(|c| c == from)
            .ok_or_else(|| Error::SchemaObjectNotFound(SchemaObject::column(table, from)))?;

        if columns.iter().any(|c| c == to) {
            return Err(Error::SchemaObjectExists(SchemaObject::column(table, to)));
        }

        columns[position] = to.to_owned();

        Ok(())
    }
}

#[async_trait::async_trait]
impl SchemaBackend for Schema {
    async fn rename_table(&mut self, from: &str, to: &str) -> Result<()> {
        self.rename_table_in_place(from, to)
    }

    async fn rename_column(&mut self, table: &str, from: &str, to: &str) -> Result<()> {
        self.rename_column_in_place(table, from, to)
    }

    async fn current_revision(&mut self) -> Result<Option<String>> {
        Ok(self.current_revision.clone())
    }

    async fn set_current_revision(&mut self, revision: Option<&str>) -> Result<()> {
        self.current_revision = revision.map(ToOwned::to_owned);

        Ok(())
    }
}
