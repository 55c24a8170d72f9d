use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use migration::{
    db::DbArgs,
    run,
    scholars_core::{Chain, Target},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, author, about)]
struct Args {
    #[command(flatten)]
    db: DbArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply steps up to TARGET
    Upgrade {
        #[arg(default_value = "head")]
        target: Target,

        #[command(flatten)]
        offline: Offline,
    },
    /// Revert steps down to TARGET
    Downgrade {
        target: Target,

        #[command(flatten)]
        offline: Offline,
    },
    /// Show the revision the database is at
    Current,
    /// List every revision, root first
    History,
    /// Show the head revision
    Heads,
    /// Point the version record at TARGET without running any step
    Stamp { target: Target },
}

#[derive(Debug, clap::Args)]
struct Offline {
    /// Print the SQL instead of running it
    #[arg(long)]
    sql: bool,

    /// Revision the offline SQL starts from
    #[arg(long, requires = "sql")]
    from: Option<Target>,
}

#[async_std::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Args { db, command } = Args::parse();
    let chain = migration::chain().context("invalid migration chain")?;

    match command {
        Command::Upgrade { target, offline } if offline.sql => {
            print_offline_sql(&chain, offline.from.as_ref(), None, &target)?;
        },
        Command::Downgrade { target, offline } if offline.sql => {
            let head = chain.head().revision.as_str();
            print_offline_sql(&chain, offline.from.as_ref(), Some(head), &target)?;
        },
        Command::Upgrade { target, .. } | Command::Downgrade { target, .. } => {
            let conn = db.connect().await?;
            let done = run::migrate(&conn, &chain, &target)
                .await
                .with_context(|| format!("failed to migrate to {target}"))?;

            info!(steps = done.len(), "migration finished");
        },
        Command::Current => {
            let conn = db.connect().await?;
            let current = run::current_revision(&conn).await?;

            match current.as_deref().and_then(|rev| chain.get(rev)) {
                Some(step) if step.revision == chain.head().revision => {
                    println!("{} (head)", step.revision);
                },
                Some(step) => println!("{}", step.revision),
                None => println!("{}", current.as_deref().unwrap_or("base")),
            }
        },
        Command::History => {
            for step in chain.iter().rev() {
                println!(
                    "{} -> {}, {}{}",
                    step.down_revision.as_deref().unwrap_or("<base>"),
                    step.revision,
                    step.message,
                    step.create_date
                        .as_deref()
                        .map(|date| format!(" ({date})"))
                        .unwrap_or_default(),
                );
            }
        },
        Command::Heads => println!("{} (head)", chain.head().revision),
        Command::Stamp { target } => {
            let conn = db.connect().await?;
            let revision = run::stamp(&conn, &chain, &target).await?;

            println!("{}", revision.as_deref().unwrap_or("base"));
        },
    }

    Ok(())
}

fn print_offline_sql(
    chain: &Chain,
    from: Option<&Target>,
    default_from: Option<&str>,
    target: &Target,
) -> Result<()> {
    let from = match from {
        Some(from) => chain.target_revision(None, from)?,
        None => default_from,
    };
    let plan = chain.plan(from, target)?;

    for line in run::render_sql(&plan, from)? {
        println!("{line}");
    }

    Ok(())
}
