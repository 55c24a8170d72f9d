use crate::ops::SchemaOp;

/// One link of the migration chain.
///
/// Steps are authored once and never mutated. `down_revision` names the
/// predecessor by identifier; the chain is rebuilt by lookup, not by holding
/// references between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    pub revision: String,
    pub down_revision: Option<String>,
    pub message: String,
    pub create_date: Option<String>,
    pub upgrade_ops: Vec<SchemaOp>,
    pub downgrade_ops: Vec<SchemaOp>,
}

impl MigrationStep {
    pub fn new(
        revision: impl Into<String>,
        down_revision: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            revision: revision.into(),
            down_revision: down_revision.map(Into::into),
            message: message.into(),
            create_date: None,
            upgrade_ops: Vec::new(),
            downgrade_ops: Vec::new(),
        }
    }

    #[must_use]
    pub fn create_date(mut self, date: impl Into<String>) -> Self {
        self.create_date = Some(date.into());
        self
    }

    #[must_use]
    pub fn upgrade(mut self, op: SchemaOp) -> Self {
        self.upgrade_ops.push(op);
        self
    }

    #[must_use]
    pub fn downgrade(mut self, op: SchemaOp) -> Self {
        self.downgrade_ops.push(op);
        self
    }

    /// Whether `downgrade_ops` is exactly the inverse of `upgrade_ops`, in
    /// reverse order.
    pub fn is_reversible(&self) -> bool {
        self.upgrade_ops.len() == self.downgrade_ops.len()
            && self
                .upgrade_ops
                .iter()
                .rev()
                .zip(&self.downgrade_ops)
                .all(|(up, down)| up.inverse() == *down)
    }
}
