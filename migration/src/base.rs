use scholars_core::MigrationStep;

pub const REVISION: &str = "791279dd0760";

/// Root of the history. The schema it stands for already exists wherever this
/// chain is run, so it carries no operations.
pub fn step() -> MigrationStep {
    MigrationStep::new(REVISION, None, "Initial schema")
}
