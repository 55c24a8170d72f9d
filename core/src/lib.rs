#![deny(clippy::disallowed_methods, clippy::suspicious, clippy::style)]
#![warn(clippy::pedantic, clippy::cargo)]
#![allow(clippy::module_name_repetitions)]

//! A chain of reversible schema migrations linked by revision identifiers.

mod backend;
mod chain;
mod error;
mod ops;
mod runner;
mod schema;
mod step;

pub use backend::SchemaBackend;
pub use chain::{Chain, Direction, Plan, Target};
pub use error::{Error, Result, SchemaObject};
pub use ops::SchemaOp;
pub use runner::{downgrade, migrate, run_step, stamp, upgrade};
pub use schema::Schema;
pub use step::MigrationStep;
