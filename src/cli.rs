//! CLI argument parsing for the report pipeline.
//!
//! The CLI stays thin: endpoints, output directory, and prompt policy are
//! flags, so nothing in the pipeline depends on the process working
//! directory or a terminal being attached.

use crate::lifecycle::CollisionDecision;
use crate::remote;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "trep",
    version,
    about = "Generate one task report per user, archiving prior reports instead of overwriting them"
)]
pub struct Args {
    /// Endpoint serving the JSON array of tasks
    #[arg(long, value_name = "URL", default_value = remote::DEFAULT_TASKS_URL)]
    pub tasks_url: String,

    /// Endpoint serving the JSON array of users
    #[arg(long, value_name = "URL", default_value = remote::DEFAULT_USERS_URL)]
    pub users_url: String,

    /// Output directory for report files (created if absent)
    #[arg(long, value_name = "DIR", default_value = "tasks")]
    pub out_dir: PathBuf,

    /// Never read stdin: no retry prompts, collisions follow --on-collision
    #[arg(long)]
    pub non_interactive: bool,

    /// Fixed archive-collision policy for non-interactive runs
    #[arg(long, value_enum, default_value = "skip")]
    pub on_collision: CollisionChoice,
}

/// Non-interactive stand-in for the three-way collision prompt.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CollisionChoice {
    /// Leave the colliding user's files untouched and continue
    Skip,
    /// Stop the whole run
    Abort,
    /// Delete the occupying archive and retry
    Delete,
}

impl CollisionChoice {
    pub fn decision(self) -> CollisionDecision {
        match self {
            CollisionChoice::Skip => CollisionDecision::Skip,
            CollisionChoice::Abort => CollisionDecision::Abort,
            CollisionChoice::Delete => CollisionDecision::DeleteAndRetry,
        }
    }
}
