//! Report-body rendering and filename-stem derivation.
//!
//! Rendering is pure: given a merged user and a wall-clock time it produces
//! the full report text, with no I/O. The second output line ends with the
//! generation stamp, which is the structural contract the file lifecycle
//! relies on when classifying an existing report.

use crate::merge::UserReportSource;
use crate::stamp;
use chrono::NaiveDateTime;

/// Task titles longer than this are truncated with an ellipsis marker.
pub const TITLE_LIMIT: usize = 48;

struct TaskBucket {
    lines: String,
    count: usize,
}

impl TaskBucket {
    fn new() -> Self {
        TaskBucket {
            lines: String::new(),
            count: 0,
        }
    }

    fn push(&mut self, title: &str) {
        self.lines.push_str(&truncate_title(title));
        self.lines.push('\n');
        self.count += 1;
    }
}

/// Render the full report body for one user.
pub fn render_report(source: &UserReportSource, generated_at: NaiveDateTime) -> String {
    let mut completed = TaskBucket::new();
    let mut remaining = TaskBucket::new();
    for task in &source.tasks {
        if task.completed {
            completed.push(&task.title);
        } else {
            remaining.push(&task.title);
        }
    }

    let user = &source.user;
    let mut out = format!(
        "Report for {}.\n{}<{}> {}\nTotal tasks: {}\n\n",
        user.company.name,
        user.name,
        user.email,
        stamp::human(generated_at),
        completed.count + remaining.count,
    );

    if completed.count > 0 {
        out.push_str(&format!(
            "Completed tasks ({}):\n{}\n",
            completed.count, completed.lines
        ));
    }
    if remaining.count > 0 {
        out.push_str(&format!(
            "Remaining tasks ({}):\n{}",
            remaining.count, remaining.lines
        ));
    }
    out
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_LIMIT {
        return title.to_string();
    }
    let mut truncated: String = title.chars().take(TITLE_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

/// Derive the filename stem from a full name: the first whitespace token,
/// with an honorific token ("Mr", "Mrs", ...) joined to the token after it.
///
/// Stems are how report files are keyed, and they are not guaranteed unique
/// across users; two users sharing a first name share a report lifecycle.
pub fn derive_stem(full_name: &str) -> String {
    let mut tokens = full_name.split_whitespace();
    let Some(first) = tokens.next() else {
        return String::new();
    };
    let mut stem = first.to_string();
    if first.to_lowercase().contains("mr") {
        if let Some(second) = tokens.next() {
            stem.push_str(second);
        }
    }
    stem
}
