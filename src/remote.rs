//! Remote collections: serde models and the HTTP fetcher.
//!
//! The fetcher is deliberately dumb: one GET per collection, no retry or
//! backoff. Recovery from a failed fetch is a whole-run decision owned by
//! the orchestrator.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default endpoints matching the original data source.
pub const DEFAULT_TASKS_URL: &str = "https://json.medrating.org/todos";
pub const DEFAULT_USERS_URL: &str = "https://json.medrating.org/users";

/// One task row as served by the remote collection.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTask {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

/// One user row as served by the remote collection.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub company: RemoteCompany,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCompany {
    pub name: String,
}

/// Fetch both collections. Any transport failure, non-2xx status, or
/// malformed JSON body fails the whole fetch; there is no partial result.
pub fn fetch_collections(
    tasks_url: &str,
    users_url: &str,
) -> Result<(Vec<RemoteTask>, Vec<RemoteUser>)> {
    let tasks = fetch_json(tasks_url).with_context(|| format!("fetch tasks from {tasks_url}"))?;
    let users = fetch_json(users_url).with_context(|| format!("fetch users from {users_url}"))?;
    Ok((tasks, users))
}

fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T> {
    let mut response = ureq::get(url).call()?;
    let value = response.body_mut().read_json()?;
    Ok(value)
}
