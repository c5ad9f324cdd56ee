//! Interactive stdin decisions.
//!
//! Prompts accept an affirmative token, a negative token, or anything else
//! as a pass-through default. The collision prompt implements the store's
//! policy trait, so the lifecycle core never touches a terminal.

use crate::lifecycle::{CollisionDecision, CollisionPolicy};
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Affirmative,
    Negative,
    PassThrough,
}

/// Map a raw input line onto the three-way answer.
pub fn classify_answer(raw: &str) -> Answer {
    match raw.trim().to_lowercase().as_str() {
        "y" | "yes" => Answer::Affirmative,
        "n" | "no" => Answer::Negative,
        _ => Answer::PassThrough,
    }
}

/// Print `question` and read one answer line. A read failure (e.g. closed
/// stdin) falls through to the pass-through default.
pub fn ask(question: &str) -> Answer {
    println!("{question}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => Answer::PassThrough,
        Ok(_) => classify_answer(&line),
    }
}

/// Whole-run retry prompt. Only an explicit affirmative retries.
pub fn confirm_retry() -> bool {
    ask("Try again? y / n") == Answer::Affirmative
}

/// Asks the operator to resolve an archive-name collision. Deleting a
/// minute-old report is destructive, so the default answer skips the user.
pub struct InteractiveCollisionPolicy;

impl CollisionPolicy for InteractiveCollisionPolicy {
    fn decide(&mut self, stem: &str, occupied: &Path) -> CollisionDecision {
        println!("A second report for '{stem}' was generated within the same minute.");
        println!("Archive name {} is already taken.", occupied.display());
        match ask("Delete it and retry - y | abort the run - n | anything else skips this user") {
            Answer::Affirmative => CollisionDecision::DeleteAndRetry,
            Answer::Negative => CollisionDecision::Abort,
            Answer::PassThrough => CollisionDecision::Skip,
        }
    }
}
