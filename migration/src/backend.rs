use scholars_core::{Error, Result, SchemaBackend, SchemaObject, SchemaOp};
use sea_orm_migration::{prelude::*, sea_orm::ConnectionTrait};

/// Table holding the single-row version record.
#[derive(Iden)]
pub enum SchemaRevision {
    Table,
    VersionNum,
}

pub(crate) fn db_err(e: DbErr) -> Error {
    Error::Backend(e.to_string())
}

pub fn version_table_statement() -> TableCreateStatement {
    Table::create()
        .table(SchemaRevision::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(SchemaRevision::VersionNum)
                .string_len(32)
                .not_null()
                .primary_key(),
        )
        .to_owned()
}

pub fn rename_table_statement(from: &str, to: &str) -> TableRenameStatement {
    Table::rename()
        .table(Alias::new(from), Alias::new(to))
        .to_owned()
}

pub fn rename_column_statement(table: &str, from: &str, to: &str) -> TableAlterStatement {
    Table::alter()
        .table(Alias::new(table))
        .rename_column(Alias::new(from), Alias::new(to))
        .to_owned()
}

/// Postgres `ALTER TABLE` text for `op`.
pub fn to_postgres_sql(op: &SchemaOp) -> String {
    match op {
        SchemaOp::RenameTable { from, to } => {
            rename_table_statement(from, to).to_string(PostgresQueryBuilder)
        },
        SchemaOp::RenameColumn { table, from, to } => {
            rename_column_statement(table, from, to).to_string(PostgresQueryBuilder)
        },
    }
}

/// [`SchemaBackend`] over a sea-orm-migration [`SchemaManager`].
///
/// Existence is checked before each rename so callers get
/// `SchemaObjectNotFound`/`SchemaObjectExists` instead of a driver error.
pub struct SeaOrmBackend<'a, 'c> {
    manager: &'a SchemaManager<'c>,
}

impl<'a, 'c> SeaOrmBackend<'a, 'c> {
    pub fn new(manager: &'a SchemaManager<'c>) -> Self {
        Self { manager }
    }

    async fn ensure_version_table(&self) -> Result<()> {
        self.manager
            .create_table(version_table_statement())
            .await
            .map_err(db_err)
    }

    async fn require_table(&self, table: &str) -> Result<()> {
        if self.manager.has_table(table).await.map_err(db_err)? {
            Ok(())
        } else {
            Err(Error::SchemaObjectNotFound(SchemaObject::table(table)))
        }
    }
}

#[async_trait::async_trait]
impl<'a, 'c> SchemaBackend for SeaOrmBackend<'a, 'c> {
    async fn rename_table(&mut self, from: &str, to: &str) -> Result<()> {
        self.require_table(from).await?;

        if self.manager.has_table(to).await.map_err(db_err)? {
            return Err(Error::SchemaObjectExists(SchemaObject::table(to)));
        }

        self.manager
            .rename_table(rename_table_statement(from, to))
            .await
            .map_err(db_err)
    }

    async fn rename_column(&mut self, table: &str, from: &str, to: &str) -> Result<()> {
        self.require_table(table).await?;

        if !self.manager.has_column(table, from).await.map_err(db_err)? {
            return Err(Error::SchemaObjectNotFound(SchemaObject::column(table, from)));
        }

        if self.manager.has_column(table, to).await.map_err(db_err)? {
            return Err(Error::SchemaObjectExists(SchemaObject::column(table, to)));
        }

        self.manager
            .alter_table(rename_column_statement(table, from, to))
            .await
            .map_err(db_err)
    }

    async fn current_revision(&mut self) -> Result<Option<String>> {
        let table = SchemaRevision::Table.to_string();

        if !self.manager.has_table(&table).await.map_err(db_err)? {
            return Ok(None);
        }

        let conn = self.manager.get_connection();
        let builder = self.manager.get_database_backend();
        let query = Query::select()
            .column(SchemaRevision::VersionNum)
            .from(SchemaRevision::Table)
            .to_owned();

        let row = conn.query_one(builder.build(&query)).await.map_err(db_err)?;

        row.map(|row| row.try_get::<String>("", &SchemaRevision::VersionNum.to_string()))
            .transpose()
            .map_err(db_err)
    }

    async fn set_current_revision(&mut self, revision: Option<&str>) -> Result<()> {
        self.ensure_version_table().await?;

        let conn = self.manager.get_connection();
        let builder = self.manager.get_database_backend();

        conn.execute(builder.build(
            &Query::delete()
                .from_table(SchemaRevision::Table)
                .to_owned(),
        ))
        .await
        .map_err(db_err)?;

        if let Some(revision) = revision {
            let insert = Query::insert()
                .into_table(SchemaRevision::Table)
                .columns([SchemaRevision::VersionNum])
                .values([revision.into()])
                .map_err(|e| Error::Backend(e.to_string()))?
                .to_owned();

            conn.execute(builder.build(&insert)).await.map_err(db_err)?;
        }

        Ok(())
    }
}
