//! Session-scoped store for one interactive run.
//!
//! Owns everything that outlives a single ingest: the roster, the pending
//! selection map, and the append-only assignment log. The ticket table and
//! pending queue are rebuilt on every upload; the session state is not, so
//! re-uploading a file never erases prior assignments. The store has exactly
//! one owner; a multi-user embedding must put its own mutex or actor
//! boundary around it.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::allocator::{self, Assignment, CommitOutcome};
use crate::config::{AppConfig, PendingLevel};
use crate::error::CoreError;
use crate::export;
use crate::loader::{self, TicketTable};
use crate::queue::{self, PendingQueue, QueueOrder};

/// Validation failures from roster and selection edits. Reported inline;
/// session state is unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("enter an email address")]
    EmptyEmail,
    #[error("only {domain} addresses can be added")]
    WrongDomain { domain: String },
    #[error("{email} is already on the roster")]
    DuplicateReviewer { email: String },
    #[error("{email} is not on the roster")]
    UnknownReviewer { email: String },
    #[error("at most {max} more videos can go to {email}")]
    OverCeiling { email: String, max: u32 },
}

/// One interactive session.
#[derive(Debug, Clone)]
pub struct Session {
    config: AppConfig,
    roster: Vec<String>,
    selection: BTreeMap<String, u32>,
    log: Vec<Assignment>,
    table: Option<TicketTable>,
    queue: PendingQueue,
    order: QueueOrder,
    session_notices: Vec<String>,
}

impl Session {
    /// Starts a session seeded from the configured roster.
    pub fn new(config: AppConfig) -> Self {
        let roster: Vec<String> = config.seed_reviewers.clone();
        let selection = roster.iter().map(|r| (r.clone(), 0)).collect();
        Self {
            config,
            roster,
            selection,
            log: Vec::new(),
            table: None,
            queue: PendingQueue::default(),
            order: QueueOrder::default(),
            session_notices: Vec::new(),
        }
    }

    // -----------------------------------------------------------------
    // Ingest
    // -----------------------------------------------------------------

    /// Replaces the table and pending queue from a fresh upload. Roster,
    /// selections, and the assignment log survive; on error nothing changes.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        let table = loader::load_table(bytes)?;
        self.queue = queue::build_pending(&table, self.order);
        self.table = Some(table);
        self.session_notices.clear();
        self.clamp_selection_to_pool();
        Ok(())
    }

    /// Changes the queue ordering and rebuilds the queue in place.
    pub fn set_order(&mut self, order: QueueOrder) {
        self.order = order;
        if let Some(table) = &self.table {
            self.queue = queue::build_pending(table, order);
        }
    }

    pub fn order(&self) -> QueueOrder {
        self.order
    }

    /// A smaller upload can leave stale selections exceeding the new pool;
    /// reset them rather than guess which reviewer should lose count.
    fn clamp_selection_to_pool(&mut self) {
        if usize::try_from(self.selected_total()).unwrap_or(usize::MAX) > self.remaining() {
            for count in self.selection.values_mut() {
                *count = 0;
            }
            self.session_notices
                .push("pending selections were reset: they exceeded the new remaining pool".into());
        }
    }

    // -----------------------------------------------------------------
    // Capacity
    // -----------------------------------------------------------------

    /// Unassigned pending subjects left in the pool. Always derived from the
    /// queue length minus the log length; assignments made outside this
    /// session between uploads are intentionally not reconciled.
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.log.len())
    }

    /// Sum of all requested counts.
    pub fn selected_total(&self) -> u32 {
        self.selection.values().sum()
    }

    /// Pool still untouched after the current selections.
    pub fn unassigned_after_selection(&self) -> usize {
        self.remaining()
            .saturating_sub(usize::try_from(self.selected_total()).unwrap_or(usize::MAX))
    }

    /// Status band for the floating pending counter.
    pub fn pending_level(&self) -> PendingLevel {
        self.config
            .pending_thresholds
            .classify(self.unassigned_after_selection())
    }

    /// Per-reviewer editable maxima for the current selections.
    pub fn ceilings(&self) -> BTreeMap<String, u32> {
        allocator::compute_ceilings(&self.selection, self.remaining())
    }

    pub fn ceiling_for(&self, email: &str) -> u32 {
        self.ceilings().get(email).copied().unwrap_or(0)
    }

    pub fn request(&self, email: &str) -> u32 {
        self.selection.get(email).copied().unwrap_or(0)
    }

    /// Sets one reviewer's requested count, enforcing the ceiling so the
    /// selection sum can never exceed the remaining pool.
    pub fn set_request(&mut self, email: &str, count: u32) -> Result<(), EditError> {
        if !self.selection.contains_key(email) {
            return Err(EditError::UnknownReviewer {
                email: email.to_string(),
            });
        }
        let max = self.ceiling_for(email);
        if count > max {
            return Err(EditError::OverCeiling {
                email: email.to_string(),
                max,
            });
        }
        self.selection.insert(email.to_string(), count);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Reviewers added during this session; the only ones removable.
    pub fn added_reviewers(&self) -> Vec<&str> {
        self.roster
            .iter()
            .filter(|r| !self.config.seed_reviewers.contains(r))
            .map(String::as_str)
            .collect()
    }

    /// Adds a reviewer after validating the address.
    pub fn add_reviewer(&mut self, email: &str) -> Result<(), EditError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(EditError::EmptyEmail);
        }
        if !email.ends_with(&self.config.reviewer_domain) {
            return Err(EditError::WrongDomain {
                domain: self.config.reviewer_domain.clone(),
            });
        }
        if self.roster.iter().any(|r| r == email) {
            return Err(EditError::DuplicateReviewer {
                email: email.to_string(),
            });
        }
        self.roster.push(email.to_string());
        self.selection.insert(email.to_string(), 0);
        Ok(())
    }

    /// Removes a session-added reviewer. Seed entries and unknown names are
    /// a no-op, reported via the return value.
    pub fn remove_reviewer(&mut self, email: &str) -> bool {
        if self.config.seed_reviewers.iter().any(|r| r == email) {
            return false;
        }
        let Some(index) = self.roster.iter().position(|r| r == email) else {
            return false;
        };
        self.roster.remove(index);
        self.selection.remove(email);
        true
    }

    // -----------------------------------------------------------------
    // Commit and export
    // -----------------------------------------------------------------

    /// Commits the current selections in roster order, appends accepted
    /// pairs to the log, and zeroes the committed counts.
    pub fn commit(&mut self) -> CommitOutcome {
        let requests: Vec<(String, u32)> = self
            .roster
            .iter()
            .filter_map(|reviewer| {
                let count = self.request(reviewer);
                (count > 0).then(|| (reviewer.clone(), count))
            })
            .collect();

        let outcome = allocator::commit(&requests, &self.queue.entries, &self.log);
        self.log.extend(outcome.accepted.iter().cloned());
        for (reviewer, _) in &requests {
            self.selection.insert(reviewer.clone(), 0);
        }
        outcome
    }

    pub fn log(&self) -> &[Assignment] {
        &self.log
    }

    /// Serializes the assignment log as the semicolon CSV download.
    pub fn export_csv(&self) -> Result<Vec<u8>, CoreError> {
        export::write_assignments(&self.log)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn table(&self) -> Option<&TicketTable> {
        self.table.as_ref()
    }

    pub fn pending_queue(&self) -> &PendingQueue {
        &self.queue
    }

    /// Everything worth surfacing from the last ingest: load warnings, the
    /// queue-ordering notice, and session-level notices.
    pub fn notices(&self) -> Vec<String> {
        let mut notices = Vec::new();
        if let Some(table) = &self.table {
            notices.extend(table.report.warnings.iter().cloned());
        }
        if let Some(notice) = &self.queue.notice {
            notices.push(notice.clone());
        }
        notices.extend(self.session_notices.iter().cloned());
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PendingThresholds;

    const HEADER: &str =
        "id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor,fecha_carga_bucket\n";

    fn config_with_roster(roster: &[&str]) -> AppConfig {
        AppConfig {
            seed_reviewers: roster.iter().map(|r| (*r).to_string()).collect(),
            ..AppConfig::default()
        }
    }

    fn session_with_pending(roster: &[&str], subjects: &[&str]) -> Session {
        let mut session = Session::new(config_with_roster(roster));
        let mut text = HEADER.to_string();
        for (index, subject) in subjects.iter().enumerate() {
            text.push_str(&format!(
                "{},pendiente_de_revision,audio,{subject},,\n",
                index + 1
            ));
        }
        if let Err(err) = session.ingest(text.as_bytes()) {
            panic!("ingest failed: {err}");
        }
        session
    }

    fn set_request_ok(session: &mut Session, email: &str, count: u32) {
        if let Err(err) = session.set_request(email, count) {
            panic!("set_request({email}, {count}) failed: {err}");
        }
    }

    #[test]
    fn commit_slices_queue_across_roster_order() {
        let mut session = session_with_pending(&["a@iie.cl", "b@iie.cl"], &["s1", "s2", "s3"]);
        set_request_ok(&mut session, "a@iie.cl", 2);
        set_request_ok(&mut session, "b@iie.cl", 1);

        let outcome = session.commit();
        let pairs: Vec<(&str, &str)> = outcome
            .accepted
            .iter()
            .map(|a| (a.reviewer.as_str(), a.subject_id.as_str()))
            .collect();
        assert_eq!(pairs, [("a@iie.cl", "s1"), ("a@iie.cl", "s2"), ("b@iie.cl", "s3")]);
        assert_eq!(session.remaining(), 0);
        assert_eq!(session.selected_total(), 0);
    }

    #[test]
    fn ceilings_tighten_as_requests_are_entered() {
        let mut session = session_with_pending(&["a@iie.cl", "b@iie.cl"], &["s1"]);
        assert_eq!(session.ceiling_for("a@iie.cl"), 1);
        assert_eq!(session.ceiling_for("b@iie.cl"), 1);

        set_request_ok(&mut session, "a@iie.cl", 1);
        assert_eq!(session.ceiling_for("b@iie.cl"), 0);
        assert_eq!(
            session.set_request("b@iie.cl", 1),
            Err(EditError::OverCeiling {
                email: "b@iie.cl".to_string(),
                max: 0,
            })
        );
    }

    #[test]
    fn request_sum_never_exceeds_remaining() {
        let mut session =
            session_with_pending(&["a@iie.cl", "b@iie.cl", "c@iie.cl"], &["s1", "s2", "s3"]);
        set_request_ok(&mut session, "a@iie.cl", 2);
        set_request_ok(&mut session, "b@iie.cl", 1);
        assert!(session.set_request("c@iie.cl", 1).is_err());
        assert!(usize::try_from(session.selected_total()).unwrap_or(usize::MAX) <= session.remaining());
    }

    #[test]
    fn zero_selection_commit_is_idempotent() {
        let mut session = session_with_pending(&["a@iie.cl"], &["s1"]);
        let before_log = session.log().len();
        let outcome = session.commit();
        assert_eq!(outcome, CommitOutcome::default());
        assert_eq!(session.log().len(), before_log);
        assert_eq!(session.remaining(), 1);
    }

    #[test]
    fn log_survives_reingest_and_blocks_reassignment() {
        let mut session = session_with_pending(&["a@iie.cl"], &["s1", "s2"]);
        set_request_ok(&mut session, "a@iie.cl", 1);
        session.commit();
        assert_eq!(session.log().len(), 1);

        // Same file again: the queue is rebuilt, the log is not.
        let text = format!(
            "{HEADER}1,pendiente_de_revision,audio,s1,,\n2,pendiente_de_revision,audio,s2,,\n"
        );
        if let Err(err) = session.ingest(text.as_bytes()) {
            panic!("ingest failed: {err}");
        }
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.remaining(), 1);

        set_request_ok(&mut session, "a@iie.cl", 1);
        let outcome = session.commit();
        // s1 is already in the log; the defensive skip hands out s2.
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].subject_id, "s2");
        assert_eq!(outcome.skipped_duplicates, 1);
    }

    #[test]
    fn failed_ingest_leaves_session_untouched() {
        let mut session = session_with_pending(&["a@iie.cl"], &["s1"]);
        let result = session.ingest(b"not,a\nvalid");
        assert!(result.is_err());
        assert_eq!(session.remaining(), 1);
        assert!(session.table().is_some());
    }

    #[test]
    fn add_reviewer_validates_like_the_form() {
        let mut session = session_with_pending(&["a@iie.cl"], &[]);
        assert_eq!(session.add_reviewer("  "), Err(EditError::EmptyEmail));
        assert_eq!(
            session.add_reviewer("new.person@otherdomain.com"),
            Err(EditError::WrongDomain {
                domain: "@iie.cl".to_string()
            })
        );
        assert!(session.add_reviewer("new.person@iie.cl").is_ok());
        assert_eq!(
            session.add_reviewer("new.person@iie.cl"),
            Err(EditError::DuplicateReviewer {
                email: "new.person@iie.cl".to_string()
            })
        );
        assert_eq!(session.request("new.person@iie.cl"), 0);
    }

    #[test]
    fn only_added_reviewers_can_be_removed() {
        let mut session = session_with_pending(&["a@iie.cl"], &[]);
        assert!(!session.remove_reviewer("a@iie.cl"));
        assert!(session.add_reviewer("new.person@iie.cl").is_ok());
        assert_eq!(session.added_reviewers(), ["new.person@iie.cl"]);
        assert!(session.remove_reviewer("new.person@iie.cl"));
        assert!(!session.remove_reviewer("new.person@iie.cl"));
        assert!(session.added_reviewers().is_empty());
    }

    #[test]
    fn shrinking_upload_resets_stale_selections() {
        let mut session = session_with_pending(&["a@iie.cl"], &["s1", "s2", "s3"]);
        set_request_ok(&mut session, "a@iie.cl", 3);

        let text = format!("{HEADER}1,pendiente_de_revision,audio,s1,,\n");
        if let Err(err) = session.ingest(text.as_bytes()) {
            panic!("ingest failed: {err}");
        }
        assert_eq!(session.selected_total(), 0);
        assert!(session
            .notices()
            .iter()
            .any(|n| n.contains("selections were reset")));
    }

    #[test]
    fn pending_level_tracks_selection_counter() {
        let config = AppConfig {
            seed_reviewers: vec!["a@iie.cl".to_string()],
            pending_thresholds: PendingThresholds::default(),
            ..AppConfig::default()
        };
        let mut session = Session::new(config);
        let mut text = HEADER.to_string();
        for index in 0..6 {
            text.push_str(&format!(
                "{},pendiente_de_revision,audio,s{index},,\n",
                index + 1
            ));
        }
        if let Err(err) = session.ingest(text.as_bytes()) {
            panic!("ingest failed: {err}");
        }

        assert_eq!(session.pending_level(), PendingLevel::Comfortable);
        set_request_ok(&mut session, "a@iie.cl", 4);
        assert_eq!(session.pending_level(), PendingLevel::Tight);
        set_request_ok(&mut session, "a@iie.cl", 6);
        assert_eq!(session.pending_level(), PendingLevel::Critical);
    }

    #[test]
    fn export_reflects_commit_order() {
        let mut session = session_with_pending(&["a@iie.cl", "b@iie.cl"], &["s1", "s2"]);
        set_request_ok(&mut session, "b@iie.cl", 1);
        session.commit();
        set_request_ok(&mut session, "a@iie.cl", 1);
        session.commit();

        let bytes = match session.export_csv() {
            Ok(bytes) => bytes,
            Err(err) => panic!("export failed: {err}"),
        };
        assert_eq!(
            String::from_utf8_lossy(&bytes),
            "id_revisor;rut_docente\nb@iie.cl;s1\na@iie.cl;s2\n"
        );
    }
}
