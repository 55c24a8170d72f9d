use sea_orm_migration::{
    prelude::*,
    sea_orm::{ConnectOptions, Database, DatabaseConnection},
};

pub async fn sqlite() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1).sqlx_logging(false);

    Database::connect(options).await.unwrap()
}

pub async fn create_table(db: &DatabaseConnection, table: &str, columns: &[&str]) {
    let mut statement = Table::create();
    statement.table(Alias::new(table)).col(
        ColumnDef::new(Alias::new("id"))
            .integer()
            .not_null()
            .primary_key(),
    );

    for column in columns {
        statement.col(ColumnDef::new(Alias::new(*column)).string());
    }

    SchemaManager::new(db)
        .create_table(statement.to_owned())
        .await
        .unwrap();
}

pub async fn has_table(db: &DatabaseConnection, table: &str) -> bool {
    SchemaManager::new(db).has_table(table).await.unwrap()
}

pub async fn has_column(db: &DatabaseConnection, table: &str, column: &str) -> bool {
    SchemaManager::new(db)
        .has_column(table, column)
        .await
        .unwrap()
}
