use anyhow::{Context, Result};
use sea_orm_migration::sea_orm::{ConnectOptions, Database, DatabaseConnection};

#[derive(Debug, clap::Args)]
pub struct DbArgs {
    #[arg(long, env)]
    pub database_url: Option<String>,

    #[arg(long, env, default_value_t = 1)]
    pub database_max_connections: u32,
}

impl DbArgs {
    /// # Errors
    /// If no URL was given or the connection fails.
    pub async fn connect(&self) -> Result<DatabaseConnection> {
        let url = self
            .database_url
            .clone()
            .context("DATABASE_URL must be set for this command")?;

        let mut options = ConnectOptions::new(url);
        options
            .max_connections(self.database_max_connections)
            .sqlx_logging(false);

        Database::connect(options)
            .await
            .context("failed to get database connection")
    }
}
