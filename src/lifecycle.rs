//! The report-file lifecycle manager.
//!
//! One `ReportStore` owns one output directory. For each stem it keeps the
//! invariant that at most one current report (`<stem>.txt`) exists, while
//! never losing prior content: a valid prior report is archived under a
//! timestamped name, a structurally damaged one is quarantined for
//! inspection. Every install runs as a bounded classify/move/write loop, so
//! a persistently misbehaving filesystem surfaces as an error instead of
//! unbounded retrying.

use crate::stamp;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on classify/move/write cycles for one install.
const MAX_CYCLE_ATTEMPTS: usize = 4;

/// What an existing `<stem>.txt` turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No current report exists for the stem.
    Absent,
    /// The second line ends with a well-formed stamp (carried here).
    Valid(String),
    /// The file exists but fails the structural stamp check.
    Corrupted,
}

/// Three-way decision when an archive target name is already occupied.
///
/// Deleting a minute-old report is destructive, so the store never resolves
/// a collision on its own; the decision is injected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionDecision {
    /// Remove the occupant and re-run the cycle.
    DeleteAndRetry,
    /// Leave everything untouched and move on to the next user.
    Skip,
    /// Stop the whole run.
    Abort,
}

/// Decides archive-name collisions for the store.
pub trait CollisionPolicy {
    fn decide(&mut self, stem: &str, occupied: &Path) -> CollisionDecision;
}

/// Fixed-answer policy for non-interactive runs and tests.
pub struct FixedCollisionPolicy(pub CollisionDecision);

impl CollisionPolicy for FixedCollisionPolicy {
    fn decide(&mut self, _stem: &str, _occupied: &Path) -> CollisionDecision {
        self.0
    }
}

/// How an install settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installed {
    /// Fresh write; no prior file existed.
    Written,
    /// Prior valid report preserved under the archive name, new body written.
    Archived { archive: PathBuf },
    /// Prior damaged file preserved under the quarantine name, new body written.
    Quarantined { quarantine: PathBuf },
    /// Archive target occupied and the policy chose to leave this stem alone.
    SkippedCollision { occupied: PathBuf },
    /// Archive target occupied and the policy chose to stop the run.
    AbortRequested,
}

/// Filesystem surface the install cycle goes through. The default
/// implementation is the real filesystem; tests swap in faulting ones,
/// since a disk that fails a write or keeps presenting a damaged file
/// cannot be produced on demand.
trait CycleFs {
    fn classify(&mut self, store: &ReportStore, stem: &str) -> Result<Classification>;
    fn write(&mut self, path: &Path, body: &str) -> std::io::Result<()>;
}

struct RealFs;

impl CycleFs for RealFs {
    fn classify(&mut self, store: &ReportStore, stem: &str) -> Result<Classification> {
        store.classify(stem)
    }

    fn write(&mut self, path: &Path, body: &str) -> std::io::Result<()> {
        fs::write(path, body)
    }
}

pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: PathBuf) -> Self {
        ReportStore { dir }
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))
    }

    pub fn report_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.txt"))
    }

    /// Classify the current file for `stem`. Read-only and idempotent.
    pub fn classify(&self, stem: &str) -> Result<Classification> {
        let path = self.report_path(stem);
        if !path.is_file() {
            return Ok(Classification::Absent);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let Some(second_line) = content.lines().nth(1) else {
            return Ok(Classification::Corrupted);
        };
        match tail_chars(second_line, stamp::STAMP_LEN) {
            Some(tail) if stamp::is_valid(tail) => Ok(Classification::Valid(tail.to_string())),
            _ => Ok(Classification::Corrupted),
        }
    }

    /// Install a freshly rendered body for `stem`, preserving whatever was
    /// there before. `now` names the quarantine file when the prior report
    /// is damaged; archive names come from the prior report's own stamp.
    pub fn install(
        &self,
        stem: &str,
        body: &str,
        now: NaiveDateTime,
        policy: &mut dyn CollisionPolicy,
    ) -> Result<Installed> {
        self.install_with(stem, body, now, policy, &mut RealFs)
    }

    fn install_with(
        &self,
        stem: &str,
        body: &str,
        now: NaiveDateTime,
        policy: &mut dyn CollisionPolicy,
        fs_io: &mut dyn CycleFs,
    ) -> Result<Installed> {
        let path = self.report_path(stem);
        let mut quarantine: Option<PathBuf> = None;

        for _ in 0..MAX_CYCLE_ATTEMPTS {
            match fs_io.classify(self, stem)? {
                Classification::Absent => {
                    write_restoring(fs_io, &path, body, quarantine.as_deref())?;
                    return Ok(match quarantine {
                        Some(quarantine) => Installed::Quarantined { quarantine },
                        None => Installed::Written,
                    });
                }
                Classification::Valid(prior_stamp) => {
                    let safe = stamp::fs_safe(&prior_stamp)
                        .ok_or_else(|| anyhow!("stamp '{prior_stamp}' failed to reformat"))?;
                    let archive = self.dir.join(format!("old_{stem}_{safe}.txt"));
                    if archive.exists() {
                        match policy.decide(stem, &archive) {
                            CollisionDecision::DeleteAndRetry => {
                                fs::remove_file(&archive)
                                    .with_context(|| format!("remove {}", archive.display()))?;
                                tracing::info!(stem, archive = %archive.display(), "removed colliding archive");
                                continue;
                            }
                            CollisionDecision::Skip => {
                                tracing::warn!(stem, occupied = %archive.display(), "archive name occupied, skipping user");
                                return Ok(Installed::SkippedCollision { occupied: archive });
                            }
                            CollisionDecision::Abort => {
                                return Ok(Installed::AbortRequested);
                            }
                        }
                    }
                    fs::rename(&path, &archive).with_context(|| {
                        format!("archive {} as {}", path.display(), archive.display())
                    })?;
                    write_restoring(fs_io, &path, body, Some(&archive))?;
                    return Ok(Installed::Archived { archive });
                }
                Classification::Corrupted => {
                    let target = self.free_quarantine_path(stem, now)?;
                    tracing::warn!(stem, quarantine = %target.display(), "report failed structural check, quarantining");
                    fs::rename(&path, &target).with_context(|| {
                        format!("quarantine {} as {}", path.display(), target.display())
                    })?;
                    quarantine = Some(target);
                    // Re-enter the cycle; the stem is now absent.
                }
            }
        }

        Err(anyhow!(
            "report cycle for '{stem}' did not settle after {MAX_CYCLE_ATTEMPTS} attempts"
        ))
    }

    /// First unoccupied quarantine name for `stem`. The stamp is minute
    /// precision, so two damaged files in one minute need the suffix.
    fn free_quarantine_path(&self, stem: &str, now: NaiveDateTime) -> Result<PathBuf> {
        let safe = stamp::fs_safe(&stamp::human(now))
            .ok_or_else(|| anyhow!("current time failed to reformat"))?;
        let base = format!("_Error_{stem}_Error_Datetime_{safe}");
        let candidate = self.dir.join(format!("{base}.txt"));
        if !candidate.exists() {
            return Ok(candidate);
        }
        for n in 2..=9 {
            let candidate = self.dir.join(format!("{base}_{n}.txt"));
            if !candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(anyhow!("no free quarantine name for '{stem}'"))
    }
}

/// Write the new body. If the prior file was already moved aside and the
/// write fails, move it back so the stem keeps its last-known-good report.
fn write_restoring(
    fs_io: &mut dyn CycleFs,
    path: &Path,
    body: &str,
    moved_aside: Option<&Path>,
) -> Result<()> {
    if let Err(err) = fs_io.write(path, body) {
        if let Some(prior) = moved_aside {
            tracing::warn!(prior = %prior.display(), "write failed, restoring prior report");
            if let Err(restore_err) = fs::rename(prior, path) {
                tracing::error!(
                    prior = %prior.display(),
                    error = %restore_err,
                    "could not restore prior report; stem is left without a current file"
                );
            }
        }
        return Err(err).with_context(|| format!("write {}", path.display()));
    }
    Ok(())
}

fn tail_chars(line: &str, n: usize) -> Option<&str> {
    let count = line.chars().count();
    if count < n {
        return None;
    }
    let (byte_idx, _) = line.char_indices().nth(count - n)?;
    Some(&line[byte_idx..])
}
