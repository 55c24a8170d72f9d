use crate::{ops::SchemaOp, Result};

/// The schema-manipulation primitives a migration run needs.
///
/// Implementations are expected to report missing or clashing objects as
/// [`Error::SchemaObjectNotFound`](crate::Error::SchemaObjectNotFound) and
/// [`Error::SchemaObjectExists`](crate::Error::SchemaObjectExists) rather than
/// as opaque backend errors.
#[async_trait::async_trait]
pub trait SchemaBackend: Send {
    async fn rename_table(&mut self, from: &str, to: &str) -> Result<()>;

    async fn rename_column(&mut self, table: &str, from: &str, to: &str) -> Result<()>;

    /// Revision recorded in the version metadata, `None` when nothing has been
    /// applied.
    async fn current_revision(&mut self) -> Result<Option<String>>;

    async fn set_current_revision(&mut self, revision: Option<&str>) -> Result<()>;

    async fn apply(&mut self, op: &SchemaOp) -> Result<()> {
        match op {
            SchemaOp::RenameTable { from, to } => self.rename_table(from, to).await,
            SchemaOp::RenameColumn { table, from, to } => {
                self.rename_column(table, from, to).await
            },
        }
    }
}
