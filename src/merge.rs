//! Join tasks into their owning user records.
//!
//! The join is keyed by user id through a map rather than by array position,
//! so nothing depends on the remote source returning users in id order.

use crate::remote::{RemoteTask, RemoteUser};
use std::collections::HashMap;

/// A user together with the tasks that belong to it, in remote order.
#[derive(Debug, Clone)]
pub struct UserReportSource {
    pub user: RemoteUser,
    pub tasks: Vec<RemoteTask>,
}

/// Attach each task to its owning user. A task whose `user_id` matches no
/// user is dropped with a warning; users keep their remote order and users
/// without tasks are retained.
pub fn merge_tasks(users: Vec<RemoteUser>, tasks: Vec<RemoteTask>) -> Vec<UserReportSource> {
    let mut sources: Vec<UserReportSource> = users
        .into_iter()
        .map(|user| UserReportSource {
            user,
            tasks: Vec::new(),
        })
        .collect();

    let index_by_id: HashMap<u64, usize> = sources
        .iter()
        .enumerate()
        .map(|(idx, source)| (source.user.id, idx))
        .collect();

    for task in tasks {
        match index_by_id.get(&task.user_id) {
            Some(&idx) => sources[idx].tasks.push(task),
            None => {
                tracing::warn!(
                    user_id = task.user_id,
                    title = %task.title,
                    "dropping task with no matching user"
                );
            }
        }
    }

    sources
}
