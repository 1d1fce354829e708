//! Pending-queue builder.
//!
//! Filters the table down to unassigned tickets still waiting for review,
//! deduplicates by subject (first occurrence wins), and optionally orders the
//! queue by the best-effort parsed load timestamp. When the timestamp column
//! is unusable the queue keeps the original file order and carries an
//! informational notice instead of failing.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::loader::TicketTable;
use crate::schema::ReviewState;
use crate::timestamp;

/// Queue ordering selected by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueOrder {
    /// Original file order (default).
    #[default]
    Original,
    OldestFirst,
    NewestFirst,
}

impl QueueOrder {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Original => "file order",
            Self::OldestFirst => "oldest first",
            Self::NewestFirst => "newest first",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Original => Self::OldestFirst,
            Self::OldestFirst => Self::NewestFirst,
            Self::NewestFirst => Self::Original,
        }
    }
}

/// One unassigned subject waiting for a reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub subject_id: String,
    pub record_id: String,
    /// Parsed load timestamp, when the column heuristic produced one.
    pub loaded_at: Option<NaiveDateTime>,
}

/// The ordered queue of unassigned pending subjects for one ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingQueue {
    pub entries: Vec<PendingEntry>,
    pub order: QueueOrder,
    /// Informational notice when timestamp ordering degraded to file order.
    pub notice: Option<String>,
}

impl PendingQueue {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the pending queue from a loaded table.
pub fn build_pending(table: &TicketTable, order: QueueOrder) -> PendingQueue {
    let mut seen = HashSet::new();
    let pending: Vec<_> = table
        .tickets
        .iter()
        .filter(|t| t.reviewer.is_none() && t.review_state == ReviewState::Pending)
        .filter(|t| seen.insert(t.subject_id.clone()))
        .collect();

    let mut entries: Vec<PendingEntry> = pending
        .iter()
        .map(|t| PendingEntry {
            subject_id: t.subject_id.clone(),
            record_id: t.record_id.clone(),
            loaded_at: None,
        })
        .collect();

    let mut notice = None;
    if order != QueueOrder::Original {
        if !table.has_load_timestamp {
            notice = Some("no load timestamp column: keeping file order".to_string());
        } else {
            let raw: Vec<Option<&str>> = pending
                .iter()
                .map(|t| t.load_timestamp.as_deref())
                .collect();
            let parse = timestamp::parse_column(&raw);
            if parse.usable() {
                for (entry, value) in entries.iter_mut().zip(parse.values) {
                    entry.loaded_at = value;
                }
                let newest_first = order == QueueOrder::NewestFirst;
                entries.sort_by(|a, b| compare_nulls_last(a, b, newest_first));
                if parse.parsed < parse.populated {
                    notice = Some(format!(
                        "read load timestamps as {} ({} of {} values)",
                        parse.format.describe(),
                        parse.parsed,
                        parse.populated,
                    ));
                }
            } else {
                notice = Some(format!(
                    "load timestamp column could not be interpreted ({} values): keeping file order",
                    parse.populated,
                ));
            }
        }
    }

    PendingQueue {
        entries,
        order,
        notice,
    }
}

/// Timestamp comparison with unparseable rows last in either direction;
/// ties broken by subject id ascending.
fn compare_nulls_last(a: &PendingEntry, b: &PendingEntry, newest_first: bool) -> Ordering {
    match (a.loaded_at, b.loaded_at) {
        (Some(x), Some(y)) => {
            let by_time = if newest_first { y.cmp(&x) } else { x.cmp(&y) };
            by_time.then_with(|| a.subject_id.cmp(&b.subject_id))
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.subject_id.cmp(&b.subject_id),
    }
}
