//! Per-reviewer load ranking.
//!
//! Counts tickets across the full table (deduped by key, not by subject) in
//! three buckets per roster reviewer and sorts by already-assigned pending
//! work, heaviest first.

use std::collections::HashMap;

use serde::Serialize;

use crate::loader::TicketTable;
use crate::schema::ReviewState;

/// Load buckets for one roster reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewerLoad {
    pub reviewer: String,
    /// Tickets with a verdict (no incidents, or incidents to review).
    pub reviewed: usize,
    pub in_review: usize,
    /// Assigned but still pending; distinct from the unassigned queue.
    pub assigned_pending: usize,
}

/// One row per roster reviewer, sorted by assigned-pending descending.
/// The sort is stable, so ties keep roster order.
pub fn load_ranking(table: &TicketTable, roster: &[String]) -> Vec<ReviewerLoad> {
    let mut by_reviewer: HashMap<&str, ReviewerLoad> = roster
        .iter()
        .map(|reviewer| {
            (
                reviewer.as_str(),
                ReviewerLoad {
                    reviewer: reviewer.clone(),
                    ..ReviewerLoad::default()
                },
            )
        })
        .collect();

    for ticket in &table.tickets {
        let Some(reviewer) = ticket.reviewer.as_deref() else {
            continue;
        };
        let Some(row) = by_reviewer.get_mut(reviewer) else {
            continue;
        };
        if ticket.review_state.is_reviewed() {
            row.reviewed += 1;
        } else if ticket.review_state == ReviewState::InReview {
            row.in_review += 1;
        } else if ticket.review_state == ReviewState::Pending {
            row.assigned_pending += 1;
        }
    }

    let mut rows: Vec<ReviewerLoad> = roster
        .iter()
        .filter_map(|reviewer| by_reviewer.remove(reviewer.as_str()))
        .collect();
    rows.sort_by(|a, b| b.assigned_pending.cmp(&a.assigned_pending));
    rows
}
