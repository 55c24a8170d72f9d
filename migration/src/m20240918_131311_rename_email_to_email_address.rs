use scholars_core::{MigrationStep, SchemaOp};
use sea_orm_migration::prelude::*;

pub const REVISION: &str = "6e0614c804d2";

// Targets `students`, the name the previous revision renamed away from.
pub fn step() -> MigrationStep {
    MigrationStep::new(
        REVISION,
        Some(super::m20240918_121852_rename_students_to_scholars::REVISION),
        "Renaming email to email_address",
    )
    .create_date("2024-09-18 13:13:11.571546")
    .upgrade(SchemaOp::rename_column(
        Students::Table.to_string(),
        Students::Email.to_string(),
        Students::EmailAddress.to_string(),
    ))
    .downgrade(SchemaOp::rename_column(
        Students::Table.to_string(),
        Students::EmailAddress.to_string(),
        Students::Email.to_string(),
    ))
}

#[derive(Iden)]
enum Students {
    Table,
    Email,
    EmailAddress,
}
