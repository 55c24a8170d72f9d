use scholars_core::{run_step, Chain, Direction, Error, Plan, Result, SchemaBackend, Target};
use sea_orm_migration::{
    prelude::*,
    sea_orm::{DatabaseConnection, TransactionTrait},
};
use tracing::{info, warn};

use crate::backend::{db_err, to_postgres_sql, version_table_statement, SchemaRevision, SeaOrmBackend};

/// # Errors
/// Backend errors reading the version record.
pub async fn current_revision(db: &DatabaseConnection) -> Result<Option<String>> {
    let manager = SchemaManager::new(db);

    SeaOrmBackend::new(&manager).current_revision().await
}

/// Moves the database to `target`, committing each step together with its
/// version record update in its own transaction.
///
/// # Errors
/// Planning errors and the first failing step. The failing step is rolled
/// back; earlier steps stay committed.
pub async fn migrate(db: &DatabaseConnection, chain: &Chain, target: &Target) -> Result<Vec<String>> {
    let current = current_revision(db).await?;
    let plan = chain.plan(current.as_deref(), target)?;

    if plan.is_empty() {
        info!(current = current.as_deref().unwrap_or("base"), %target, "nothing to do");
        return Ok(Vec::new());
    }

    let mut done = Vec::with_capacity(plan.steps.len());

    for step in plan.steps {
        let txn = db.begin().await.map_err(db_err)?;

        {
            let manager = SchemaManager::new(&txn);
            let mut backend = SeaOrmBackend::new(&manager);

            if let Err(e) = run_step(&mut backend, plan.direction, step).await {
                warn!(revision = %step.revision, error = %e, "migration aborted, rolling back step");
                return Err(e);
            }
        }

        txn.commit().await.map_err(db_err)?;
        done.push(step.revision.clone());
    }

    Ok(done)
}

/// # Errors
/// Target resolution and backend errors.
pub async fn stamp(db: &DatabaseConnection, chain: &Chain, target: &Target) -> Result<Option<String>> {
    let txn = db.begin().await.map_err(db_err)?;

    let revision = {
        let manager = SchemaManager::new(&txn);
        let mut backend = SeaOrmBackend::new(&manager);

        scholars_core::stamp(&mut backend, chain, target).await?
    };

    txn.commit().await.map_err(db_err)?;

    Ok(revision)
}

fn version_record_sql(from: Option<&str>, to: Option<&str>) -> Result<String> {
    let sql = match (from, to) {
        (None, Some(to)) => Query::insert()
            .into_table(SchemaRevision::Table)
            .columns([SchemaRevision::VersionNum])
            .values([to.into()])
            .map_err(|e| Error::Backend(e.to_string()))?
            .to_string(PostgresQueryBuilder),
        (Some(_), Some(to)) => Query::update()
            .table(SchemaRevision::Table)
            .value(SchemaRevision::VersionNum, to)
            .to_string(PostgresQueryBuilder),
        (_, None) => Query::delete()
            .from_table(SchemaRevision::Table)
            .to_string(PostgresQueryBuilder),
    };

    Ok(sql)
}

/// Renders the Postgres statements `plan` would run, starting from `from`,
/// without touching a database.
///
/// # Errors
/// If a version record statement cannot be built.
pub fn render_sql(plan: &Plan<'_>, from: Option<&str>) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    if from.is_none() && plan.direction == Direction::Upgrade {
        lines.push(format!(
            "{};",
            version_table_statement().to_string(PostgresQueryBuilder)
        ));
    }

    for step in &plan.steps {
        let (action, before, after, ops) = match plan.direction {
            Direction::Upgrade => (
                "upgrade",
                step.down_revision.as_deref(),
                Some(step.revision.as_str()),
                &step.upgrade_ops,
            ),
            Direction::Downgrade => (
                "downgrade",
                Some(step.revision.as_str()),
                step.down_revision.as_deref(),
                &step.downgrade_ops,
            ),
        };

        lines.push(format!(
            "-- Running {action} {} -> {}",
            before.unwrap_or("base"),
            after.unwrap_or("base")
        ));
        lines.extend(ops.iter().map(|op| format!("{};", to_postgres_sql(op))));
        lines.push(format!("{};", version_record_sql(before, after)?));
    }

    Ok(lines)
}
