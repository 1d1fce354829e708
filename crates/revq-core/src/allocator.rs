//! Capacity ceilings and the assignment commit pass.
//!
//! The remaining pool is always derived (`queue length - log length`), never
//! decremented on its own, and ceilings are recomputed from scratch after
//! every edit so the sum of requested counts can never exceed the pool. Both
//! operations are pure functions over the inputs; session state lives in
//! [`crate::session`].

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::Serialize;

use crate::queue::PendingEntry;

/// One committed (reviewer, subject) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub reviewer: String,
    pub subject_id: String,
}

/// Result of one commit pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Accepted pairs, in commit order.
    pub accepted: Vec<Assignment>,
    /// Queue entries skipped because the subject was already in the log.
    pub skipped_duplicates: usize,
    /// The queue ran out before every request was filled.
    pub exhausted: bool,
}

/// Per-reviewer editable maximum for the current requested counts.
///
/// Each reviewer may request at most what is left of the pool after every
/// other reviewer's current request: `remaining - sum(others)`, floored at
/// zero. Callers re-invoke this after every change to any requested count.
pub fn compute_ceilings(
    requested: &BTreeMap<String, u32>,
    remaining: usize,
) -> BTreeMap<String, u32> {
    let total: u64 = requested.values().map(|count| u64::from(*count)).sum();
    requested
        .iter()
        .map(|(reviewer, own)| {
            let others = total - u64::from(*own);
            let ceiling = (remaining as u64).saturating_sub(others);
            (reviewer.clone(), u32::try_from(ceiling).unwrap_or(u32::MAX))
        })
        .collect()
}

/// Commits requested counts against a snapshot of the pending queue.
///
/// Requests are processed in the given order, each taking entries off the
/// front of a private copy of the queue. Subjects already present in the log
/// are skipped without being granted (a defensive check; the queue is
/// already deduplicated upstream). Exhausting the queue mid-pass leaves the
/// rest of the requests unfilled without an error.
pub fn commit(
    requests: &[(String, u32)],
    queue: &[PendingEntry],
    log: &[Assignment],
) -> CommitOutcome {
    let mut taken: HashSet<&str> = log.iter().map(|a| a.subject_id.as_str()).collect();
    let mut front: VecDeque<&PendingEntry> = queue.iter().collect();
    let mut outcome = CommitOutcome::default();

    for (reviewer, requested) in requests {
        let mut granted = 0;
        while granted < *requested {
            let Some(entry) = front.pop_front() else {
                outcome.exhausted = true;
                return outcome;
            };
            if !taken.insert(entry.subject_id.as_str()) {
                outcome.skipped_duplicates += 1;
                continue;
            }
            outcome.accepted.push(Assignment {
                reviewer: reviewer.clone(),
                subject_id: entry.subject_id.clone(),
            });
            granted += 1;
        }
    }

    outcome
}
