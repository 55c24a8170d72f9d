use tracing::{debug, info, warn};

use crate::{
    backend::SchemaBackend,
    chain::{Chain, Direction, Target},
    step::MigrationStep,
    Error, Result,
};

/// Applies `step.upgrade_ops` and advances the version record to
/// `step.revision`.
///
/// # Errors
/// `SchemaConflict` unless the record currently reads `step.down_revision`,
/// otherwise whatever the backend reports for the operations.
pub async fn upgrade<B: SchemaBackend + ?Sized>(backend: &mut B, step: &MigrationStep) -> Result<()> {
    let found = backend.current_revision().await?;

    if found != step.down_revision {
        return Err(Error::SchemaConflict {
            action: "upgrade",
            revision: step.revision.clone(),
            expected: step.down_revision.clone(),
            found,
        });
    }

    for op in &step.upgrade_ops {
        debug!(revision = %step.revision, %op, "applying");
        backend.apply(op).await?;
    }

    backend.set_current_revision(Some(&step.revision)).await?;

    info!(
        from = step.down_revision.as_deref().unwrap_or("base"),
        to = %step.revision,
        message = %step.message,
        "upgraded"
    );

    Ok(())
}

/// Applies `step.downgrade_ops` and moves the version record back to
/// `step.down_revision`.
///
/// # Errors
/// `SchemaConflict` unless the record currently reads `step.revision`,
/// otherwise whatever the backend reports for the operations.
pub async fn downgrade<B: SchemaBackend + ?Sized>(
    backend: &mut B,
    step: &MigrationStep,
) -> Result<()> {
    let found = backend.current_revision().await?;

    if found.as_deref() != Some(step.revision.as_str()) {
        return Err(Error::SchemaConflict {
            action: "downgrade",
            revision: step.revision.clone(),
            expected: Some(step.revision.clone()),
            found,
        });
    }

    for op in &step.downgrade_ops {
        debug!(revision = %step.revision, %op, "applying");
        backend.apply(op).await?;
    }

    backend
        .set_current_revision(step.down_revision.as_deref())
        .await?;

    info!(
        from = %step.revision,
        to = step.down_revision.as_deref().unwrap_or("base"),
        message = %step.message,
        "downgraded"
    );

    Ok(())
}

/// Runs `step` in `direction`.
///
/// # Errors
/// See [`upgrade`] and [`downgrade`].
pub async fn run_step<B: SchemaBackend + ?Sized>(
    backend: &mut B,
    direction: Direction,
    step: &MigrationStep,
) -> Result<()> {
    match direction {
        Direction::Upgrade => upgrade(backend, step).await,
        Direction::Downgrade => downgrade(backend, step).await,
    }
}

/// Moves `backend` to `target` one step at a time and returns the revisions
/// that were upgraded or downgraded, in order.
///
/// The first failing step aborts the run. Steps completed before it stay
/// applied.
///
/// # Errors
/// Planning errors from [`Chain::plan`] and any step error.
pub async fn migrate<B: SchemaBackend + ?Sized>(
    backend: &mut B,
    chain: &Chain,
    target: &Target,
) -> Result<Vec<String>> {
    let current = backend.current_revision().await?;
    let plan = chain.plan(current.as_deref(), target)?;

    if plan.is_empty() {
        info!(current = current.as_deref().unwrap_or("base"), %target, "nothing to do");
        return Ok(Vec::new());
    }

    let mut done = Vec::with_capacity(plan.steps.len());

    for step in plan.steps {
        if let Err(e) = run_step(backend, plan.direction, step).await {
            warn!(revision = %step.revision, error = %e, "migration aborted");
            return Err(e);
        }

        done.push(step.revision.clone());
    }

    Ok(done)
}

/// Points the version record at `target` without running any operation.
///
/// # Errors
/// Target resolution errors and backend errors.
pub async fn stamp<B: SchemaBackend + ?Sized>(
    backend: &mut B,
    chain: &Chain,
    target: &Target,
) -> Result<Option<String>> {
    let current = backend.current_revision().await?;
    let revision = chain
        .target_revision(current.as_deref(), target)?
        .map(ToOwned::to_owned);

    backend.set_current_revision(revision.as_deref()).await?;

    info!(revision = revision.as_deref().unwrap_or("base"), "stamped");

    Ok(revision)
}

#[cfg(test)]
mod tests {
    use super::{downgrade, migrate, stamp, upgrade};
    use crate::{
        chain::{Chain, Target},
        ops::SchemaOp,
        schema::Schema,
        step::MigrationStep,
        Error, SchemaObject,
    };

    fn chain() -> Chain {
        Chain::new([
            MigrationStep::new("a1", None, "root"),
            MigrationStep::new("b2", Some("a1"), "rename people")
                .upgrade(SchemaOp::rename_table("people", "persons"))
                .downgrade(SchemaOp::rename_table("persons", "people")),
            MigrationStep::new("c3", Some("b2"), "rename mail")
                .upgrade(SchemaOp::rename_column("persons", "mail", "email"))
                .downgrade(SchemaOp::rename_column("persons", "email", "mail")),
        ])
        .unwrap()
    }

    fn people() -> Schema {
        Schema::new().with_table("people", ["id", "mail"])
    }

    #[async_std::test]
    async fn upgrade_then_downgrade_round_trips() {
        let chain = chain();

        for step in chain.iter() {
            let mut schema = people();
            let parent = step
                .down_revision
                .clone()
                .map_or(Target::Base, Target::Revision);
            migrate(&mut schema, &chain, &parent).await.unwrap();
            let before = schema.clone();

            upgrade(&mut schema, step).await.unwrap();
            assert_eq!(schema.revision(), Some(step.revision.as_str()));
            downgrade(&mut schema, step).await.unwrap();

            assert_eq!(schema, before);
        }
    }

    #[async_std::test]
    async fn upgrading_twice_is_a_conflict() {
        let chain = chain();
        let step = chain.get("b2").unwrap();
        let mut schema = people().at_revision("a1");

        upgrade(&mut schema, step).await.unwrap();
        let err = upgrade(&mut schema, step).await.unwrap_err();

        assert!(matches!(
            err,
            Error::SchemaConflict { action: "upgrade", expected: Some(e), found: Some(f), .. }
                if e == "a1" && f == "b2"
        ));
        assert!(schema.has_table("persons"));
    }

    #[async_std::test]
    async fn downgrade_before_upgrade_is_a_conflict() {
        let chain = chain();
        let mut schema = people().at_revision("a1");
        let err = downgrade(&mut schema, chain.get("b2").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SchemaConflict { action: "downgrade", .. }));
        assert_eq!(schema, people().at_revision("a1"));
    }

    #[async_std::test]
    async fn migrate_to_head_and_back_to_base() {
        let chain = chain();
        let mut schema = people();

        let applied = migrate(&mut schema, &chain, &Target::Head).await.unwrap();
        assert_eq!(applied, ["a1", "b2", "c3"]);
        assert_eq!(schema.columns("persons").unwrap(), ["id", "email"]);
        assert_eq!(schema.revision(), Some("c3"));

        assert!(migrate(&mut schema, &chain, &Target::Head)
            .await
            .unwrap()
            .is_empty());

        let reverted = migrate(&mut schema, &chain, &Target::Base).await.unwrap();
        assert_eq!(reverted, ["c3", "b2", "a1"]);
        assert_eq!(schema, people());
    }

    #[async_std::test]
    async fn failed_step_stops_the_run_at_the_last_good_revision() {
        let chain = chain();
        let mut schema = Schema::new().with_table("people", ["id", "name"]);

        let err = migrate(&mut schema, &chain, &Target::Head)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::SchemaObjectNotFound(SchemaObject::Column { column, .. }) if column == "mail"
        ));
        assert_eq!(schema.revision(), Some("b2"));
        assert!(schema.has_table("persons"));
    }

    #[async_std::test]
    async fn stamp_moves_the_record_only() {
        let chain = chain();
        let mut schema = people();

        let rev = stamp(&mut schema, &chain, &Target::Head).await.unwrap();

        assert_eq!(rev.as_deref(), Some("c3"));
        assert_eq!(schema, people().at_revision("c3"));
    }
}
