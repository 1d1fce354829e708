//! Top-3 approval leaderboards.
//!
//! Two groupings over the outcome column: per reviewer (each reviewer's
//! approval/rejection rate over their own rows, with a configured exclusion
//! set removed from both sides of the ratio) and per incidence type (each
//! type's share of all rows with that outcome; no exclusions).

use std::collections::HashMap;

use serde::Serialize;

use crate::loader::TicketTable;
use crate::schema::IncidenceStatus;

/// Boards show at most this many entries.
const BOARD_SIZE: usize = 3;

/// One leaderboard row: a reviewer or incidence type with its percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub label: String,
    /// Rounded to the nearest integer percent; always in 0..=100.
    pub percent: u32,
}

/// Top reviewers by share of their own rows carrying `outcome`.
///
/// Excluded reviewers are dropped before the ratio, so they appear in
/// neither numerator nor denominator. Reviewers with no rows carrying the
/// outcome do not appear at all.
pub fn top_reviewers(
    table: &TicketTable,
    outcome: IncidenceStatus,
    excluded: &[String],
) -> Vec<BoardEntry> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    let mut hits: HashMap<&str, usize> = HashMap::new();

    for ticket in &table.tickets {
        let Some(reviewer) = ticket.reviewer.as_deref() else {
            continue;
        };
        if excluded.iter().any(|e| e == reviewer) {
            continue;
        }
        *totals.entry(reviewer).or_default() += 1;
        if ticket.incidence_status == Some(outcome) {
            *hits.entry(reviewer).or_default() += 1;
        }
    }

    let entries = hits.into_iter().filter_map(|(reviewer, hit)| {
        let total = *totals.get(reviewer)?;
        Some(BoardEntry {
            label: reviewer.to_string(),
            percent: rounded_percent(hit, total),
        })
    });
    top_three(entries.collect())
}

/// Top incidence types by share of all rows carrying `outcome`.
pub fn top_types(table: &TicketTable, outcome: IncidenceStatus) -> Vec<BoardEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;

    for ticket in &table.tickets {
        if ticket.incidence_status != Some(outcome) {
            continue;
        }
        total += 1;
        if !ticket.incidence_type.is_empty() {
            *counts.entry(ticket.incidence_type.as_str()).or_default() += 1;
        }
    }

    if total == 0 {
        return Vec::new();
    }
    let entries = counts.into_iter().map(|(kind, count)| BoardEntry {
        label: kind.to_string(),
        percent: rounded_percent(count, total),
    });
    top_three(entries.collect())
}

fn rounded_percent(numerator: usize, denominator: usize) -> u32 {
    let ratio = numerator as f64 / denominator as f64 * 100.0;
    ratio.round() as u32
}

/// Percent descending, label ascending for deterministic ties, cut to three.
fn top_three(mut entries: Vec<BoardEntry>) -> Vec<BoardEntry> {
    entries.sort_by(|a, b| {
        b.percent
            .cmp(&a.percent)
            .then_with(|| a.label.cmp(&b.label))
    });
    entries.truncate(BOARD_SIZE);
    entries
}
