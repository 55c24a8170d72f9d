#![deny(clippy::disallowed_methods, clippy::suspicious, clippy::style)]
#![warn(clippy::pedantic, clippy::cargo)]
#![allow(clippy::module_name_repetitions)]

pub use scholars_core;
use scholars_core::{Chain, MigrationStep, Result};

mod backend;
mod base;
pub mod db;
mod m20240918_121852_rename_students_to_scholars;
mod m20240918_131311_rename_email_to_email_address;
pub mod run;
#[cfg(test)]
mod test_support;

pub use backend::{to_postgres_sql, SeaOrmBackend};

/// Every step of the scholars schema history, in authoring order.
pub fn steps() -> Vec<MigrationStep> {
    vec![
        base::step(),
        m20240918_121852_rename_students_to_scholars::step(),
        m20240918_131311_rename_email_to_email_address::step(),
    ]
}

/// # Errors
/// If the authored steps do not form a valid chain.
pub fn chain() -> Result<Chain> {
    Chain::new(steps())
}
