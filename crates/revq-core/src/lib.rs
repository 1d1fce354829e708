//! revq-core: domain model and allocation logic for the revq review
//! assignment tool.
//!
//! This crate contains everything below the presentation surfaces: the ticket
//! schema, CSV ingestion, the pending-queue builder with its best-effort
//! timestamp ordering, per-reviewer load ranking, the capacity-ceiling
//! allocator, approval leaderboards, and the session store that owns the
//! roster, pending selections, and assignment log for one interactive run.

pub mod allocator;
pub mod config;
pub mod error;
pub mod export;
pub mod leaderboard;
pub mod loader;
pub mod queue;
pub mod ranking;
pub mod schema;
pub mod session;
pub mod summary;
pub mod timestamp;

/// Crate identity label used by bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "revq-core"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "revq-core");
    }

    #[test]
    fn modules_are_accessible() {
        // Verify all public modules compile and are reachable.
        let _ = schema::ReviewState::Pending;
        let _ = queue::QueueOrder::Original;
        let _ = timestamp::TimestampFormat::Unparsed;
        let _ = config::AppConfig::default();
        let _ = error::CoreError::Parse("test".into());
        let _ = allocator::CommitOutcome::default();
    }
}
