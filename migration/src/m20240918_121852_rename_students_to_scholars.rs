use scholars_core::{MigrationStep, SchemaOp};
use sea_orm_migration::prelude::*;

pub const REVISION: &str = "f279f017e5c1";

pub fn step() -> MigrationStep {
    MigrationStep::new(
        REVISION,
        Some(super::base::REVISION),
        "Renaming students to scholars",
    )
    .create_date("2024-09-18 12:18:52.321966")
    .upgrade(SchemaOp::rename_table(
        Students::Table.to_string(),
        Scholars::Table.to_string(),
    ))
    .downgrade(SchemaOp::rename_table(
        Scholars::Table.to_string(),
        Students::Table.to_string(),
    ))
}

#[derive(Iden)]
enum Students {
    Table,
}

#[derive(Iden)]
enum Scholars {
    Table,
}
