use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod lifecycle;
mod merge;
mod prompt;
mod remote;
mod report;
mod stamp;

use cli::Args;
use lifecycle::{CollisionPolicy, FixedCollisionPolicy, Installed, ReportStore};
use prompt::InteractiveCollisionPolicy;

/// How one whole pipeline run ended.
enum RunOutcome {
    Complete(RunSummary),
    Aborted,
}

#[derive(Default)]
struct RunSummary {
    written: usize,
    archived: usize,
    quarantined: usize,
    skipped: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    loop {
        match run_pipeline(&args) {
            Ok(RunOutcome::Complete(summary)) => {
                println!(
                    "Reports generated: {} new, {} archived, {} quarantined, {} skipped",
                    summary.written, summary.archived, summary.quarantined, summary.skipped
                );
                return Ok(());
            }
            Ok(RunOutcome::Aborted) => {
                return Err(anyhow!("run aborted on archive-name collision"));
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "run failed");
                if args.non_interactive || !prompt::confirm_retry() {
                    return Err(err);
                }
            }
        }
    }
}

/// One sequential pass: fetch, merge, then install one report per user.
fn run_pipeline(args: &Args) -> Result<RunOutcome> {
    let (tasks, users) = remote::fetch_collections(&args.tasks_url, &args.users_url)?;
    tracing::info!(tasks = tasks.len(), users = users.len(), "fetched collections");
    let sources = merge::merge_tasks(users, tasks);

    let store = ReportStore::new(args.out_dir.clone());
    store.ensure_dir()?;

    let mut policy: Box<dyn CollisionPolicy> = if args.non_interactive {
        Box::new(FixedCollisionPolicy(args.on_collision.decision()))
    } else {
        Box::new(InteractiveCollisionPolicy)
    };

    let mut summary = RunSummary::default();
    for source in &sources {
        let stem = report::derive_stem(&source.user.name);
        if stem.is_empty() {
            tracing::warn!(user_id = source.user.id, "user has no usable name, skipping");
            summary.skipped += 1;
            continue;
        }
        let now = Local::now().naive_local();
        let body = report::render_report(source, now);
        match store.install(&stem, &body, now, policy.as_mut())? {
            Installed::Written => summary.written += 1,
            Installed::Archived { archive } => {
                tracing::info!(stem, archive = %archive.display(), "prior report archived");
                summary.archived += 1;
            }
            Installed::Quarantined { quarantine } => {
                tracing::info!(stem, quarantine = %quarantine.display(), "damaged report quarantined");
                summary.quarantined += 1;
            }
            Installed::SkippedCollision { occupied } => {
                tracing::info!(stem, occupied = %occupied.display(), "user skipped on collision");
                summary.skipped += 1;
            }
            Installed::AbortRequested => return Ok(RunOutcome::Aborted),
        }
    }

    Ok(RunOutcome::Complete(summary))
}
