//! App shell for the revq TUI.
//!
//! A pure model: [`App::update`] consumes input events and returns a
//! [`Command`] for the runtime, [`App::render`] draws into a plain cell
//! frame. No terminal types leak in here, so the whole interactive flow is
//! unit-testable.

use revq_core::config::PendingLevel;
use revq_core::leaderboard;
use revq_core::ranking;
use revq_core::schema::IncidenceStatus;
use revq_core::session::Session;
use revq_core::summary;

use crate::frame::{FrameSize, RenderFrame, TextRole};
use crate::input::{InputEvent, Key};

/// Views reachable from the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    Assign,
    Ranking,
    Boards,
}

impl ViewId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Assign => "Assign",
            Self::Ranking => "Ranking",
            Self::Boards => "Boards",
        }
    }

    pub const ALL: [ViewId; 3] = [Self::Assign, Self::Ranking, Self::Boards];

    fn next(self) -> Self {
        match self {
            Self::Assign => Self::Ranking,
            Self::Ranking => Self::Boards,
            Self::Boards => Self::Assign,
        }
    }
}

/// Commands returned to the runtime event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    /// Re-ingest the report file without touching session state.
    Reload,
    /// Write the assignment export.
    Export,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    AddingReviewer,
}

/// One-line feedback above the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub role: TextRole,
}

pub struct App {
    session: Session,
    view: ViewId,
    cursor: usize,
    mode: Mode,
    add_buffer: String,
    status: Option<StatusLine>,
    size: FrameSize,
    quitting: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            view: ViewId::Assign,
            cursor: 0,
            mode: Mode::Normal,
            add_buffer: String::new(),
            status: None,
            size: FrameSize {
                width: 100,
                height: 30,
            },
            quitting: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn quitting(&self) -> bool {
        self.quitting
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn set_status(&mut self, text: String, role: TextRole) {
        self.status = Some(StatusLine { text, role });
    }

    // -----------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------

    pub fn update(&mut self, event: InputEvent) -> Command {
        match event {
            InputEvent::Resize(size) => {
                self.size = size;
                Command::None
            }
            InputEvent::Key(key) => match self.mode {
                Mode::AddingReviewer => self.update_add_mode(key),
                Mode::Normal => self.update_normal(key),
            },
        }
    }

    fn update_add_mode(&mut self, key: Key) -> Command {
        match key {
            Key::Char(ch) => {
                self.add_buffer.push(ch);
            }
            Key::Backspace => {
                self.add_buffer.pop();
            }
            Key::Escape => {
                self.add_buffer.clear();
                self.mode = Mode::Normal;
            }
            Key::Enter => {
                let email = self.add_buffer.trim().to_string();
                match self.session.add_reviewer(&email) {
                    Ok(()) => {
                        self.set_status(format!("added {email}"), TextRole::Success);
                        self.add_buffer.clear();
                        self.mode = Mode::Normal;
                    }
                    Err(err) => {
                        // Keep the buffer so the address can be corrected.
                        self.set_status(err.to_string(), TextRole::Danger);
                    }
                }
            }
            _ => {}
        }
        Command::None
    }

    fn update_normal(&mut self, key: Key) -> Command {
        match key {
            Key::Char('q') => {
                self.quitting = true;
                return Command::Quit;
            }
            Key::Char('r') => return Command::Reload,
            Key::Char('x') => return Command::Export,
            Key::Tab => self.view = self.view.next(),
            Key::Char('1') => self.view = ViewId::Assign,
            Key::Char('2') => self.view = ViewId::Ranking,
            Key::Char('3') => self.view = ViewId::Boards,
            Key::Char('o') => {
                let order = self.session.order().next();
                self.session.set_order(order);
                self.set_status(format!("queue order: {}", order.describe()), TextRole::Accent);
            }
            Key::Up => self.cursor = self.cursor.saturating_sub(1),
            Key::Down => {
                let last = self.session.roster().len().saturating_sub(1);
                self.cursor = (self.cursor + 1).min(last);
            }
            Key::Char('+') | Key::Right => self.adjust_selected(1),
            Key::Char('-') | Key::Left => self.adjust_selected(-1),
            Key::Char('m') => self.max_out_selected(),
            Key::Char('0') => self.zero_selected(),
            Key::Char('a') => {
                if self.view == ViewId::Assign {
                    self.mode = Mode::AddingReviewer;
                    self.add_buffer.clear();
                }
            }
            Key::Char('d') => self.remove_selected(),
            Key::Char('c') | Key::Enter => self.commit_selected(),
            _ => {}
        }
        Command::None
    }

    fn selected_reviewer(&self) -> Option<String> {
        self.session.roster().get(self.cursor).cloned()
    }

    fn adjust_selected(&mut self, delta: i64) {
        let Some(reviewer) = self.selected_reviewer() else {
            return;
        };
        let current = i64::from(self.session.request(&reviewer));
        let wanted = (current + delta).max(0);
        let wanted = u32::try_from(wanted).unwrap_or(0);
        let max = self.session.ceiling_for(&reviewer);
        if wanted > max {
            self.set_status(
                format!("{reviewer} is at the remaining-pool maximum ({max})"),
                TextRole::Warning,
            );
            return;
        }
        if self.session.set_request(&reviewer, wanted).is_ok() {
            self.status = None;
        }
    }

    fn max_out_selected(&mut self) {
        let Some(reviewer) = self.selected_reviewer() else {
            return;
        };
        let max = self.session.ceiling_for(&reviewer);
        if self.session.set_request(&reviewer, max).is_ok() {
            self.status = None;
        }
    }

    fn zero_selected(&mut self) {
        let Some(reviewer) = self.selected_reviewer() else {
            return;
        };
        if self.session.set_request(&reviewer, 0).is_ok() {
            self.status = None;
        }
    }

    fn remove_selected(&mut self) {
        let Some(reviewer) = self.selected_reviewer() else {
            return;
        };
        if self.session.remove_reviewer(&reviewer) {
            self.set_status(format!("removed {reviewer}"), TextRole::Success);
            let last = self.session.roster().len().saturating_sub(1);
            self.cursor = self.cursor.min(last);
        } else {
            self.set_status(
                format!("{reviewer} is on the seed roster and stays"),
                TextRole::Warning,
            );
        }
    }

    fn commit_selected(&mut self) {
        if self.session.selected_total() == 0 {
            self.set_status("nothing selected to assign".to_string(), TextRole::Muted);
            return;
        }
        let outcome = self.session.commit();
        let mut text = format!("assigned {} videos", outcome.accepted.len());
        if outcome.skipped_duplicates > 0 {
            text.push_str(&format!(
                " ({} already assigned, skipped)",
                outcome.skipped_duplicates
            ));
        }
        if outcome.exhausted {
            text.push_str(", queue exhausted");
        }
        self.set_status(text, TextRole::Success);
    }

    // -----------------------------------------------------------------
    // Render
    // -----------------------------------------------------------------

    pub fn render(&self) -> RenderFrame {
        let mut frame = RenderFrame::new(self.size);
        self.render_header(&mut frame);
        self.render_info(&mut frame);
        match self.view {
            ViewId::Assign => self.render_assign(&mut frame),
            ViewId::Ranking => self.render_ranking(&mut frame),
            ViewId::Boards => self.render_boards(&mut frame),
        }
        self.render_status(&mut frame);
        self.render_footer(&mut frame);
        frame
    }

    fn body_rows(&self) -> usize {
        self.size.height.saturating_sub(4)
    }

    fn render_header(&self, frame: &mut RenderFrame) {
        frame.set_text_bold(1, 0, "revq", TextRole::Accent);
        let mut x = 8;
        for view in ViewId::ALL {
            let label = format!("[{}]", view.label());
            if view == self.view {
                frame.set_text_bold(x, 0, &label, TextRole::Focus);
            } else {
                frame.set_text(x, 0, &label, TextRole::Muted);
            }
            x += label.len() + 2;
        }
    }

    fn render_info(&self, frame: &mut RenderFrame) {
        let line = match self.session.table() {
            Some(table) => {
                let mut line = format!("rows {}", table.report.rows);
                if table.report.dedup_applied {
                    line.push_str(&format!(" (dups removed {})", table.report.duplicates_removed));
                }
                line.push_str(&format!(
                    "  |  queue {} ({})  |  log {}",
                    self.session.pending_queue().len(),
                    self.session.order().describe(),
                    self.session.log().len()
                ));
                line
            }
            None => "no report loaded: press r to load".to_string(),
        };
        frame.set_text(1, 1, &line, TextRole::Muted);
    }

    fn render_assign(&self, frame: &mut RenderFrame) {
        let roster = self.session.roster().to_vec();
        let loads = self
            .session
            .table()
            .map(|table| ranking::load_ranking(table, &roster))
            .unwrap_or_default();
        let assigned_pending = |reviewer: &str| {
            loads
                .iter()
                .find(|row| row.reviewer == reviewer)
                .map(|row| row.assigned_pending)
                .unwrap_or(0)
        };

        let rows = self.body_rows().saturating_sub(1);
        let start = if self.cursor >= rows && rows > 0 {
            self.cursor - rows + 1
        } else {
            0
        };

        let mut y = 2;
        for (index, reviewer) in roster.iter().enumerate().skip(start).take(rows) {
            let selected = index == self.cursor;
            let marker = if selected { '>' } else { ' ' };
            let count = self.session.request(reviewer);
            let max = self.session.ceiling_for(reviewer);
            let line = format!(
                "{marker} {:<34} pending {:>3}   give {:>3} / {:>3}",
                display_name(reviewer),
                assigned_pending(reviewer),
                count,
                max,
            );
            let role = if selected {
                TextRole::Focus
            } else if count > 0 {
                TextRole::Accent
            } else {
                TextRole::Primary
            };
            if selected {
                frame.set_text_bold(1, y, &line, role);
            } else {
                frame.set_text(1, y, &line, role);
            }
            y += 1;
        }

        if self.mode == Mode::AddingReviewer {
            let prompt = format!("add reviewer: {}_", self.add_buffer);
            frame.set_text_bold(1, 2 + rows, &prompt, TextRole::Focus);
        }
    }

    fn render_ranking(&self, frame: &mut RenderFrame) {
        let Some(table) = self.session.table() else {
            frame.set_text(1, 2, "load a report to see the ranking", TextRole::Muted);
            return;
        };
        let rows = ranking::load_ranking(table, self.session.roster());
        frame.set_text_bold(
            1,
            2,
            &format!(
                "{:<34} {:>9} {:>10} {:>17}",
                "REVIEWER", "REVIEWED", "IN REVIEW", "PENDING ASSIGNED"
            ),
            TextRole::Muted,
        );
        for (offset, row) in rows.iter().take(self.body_rows().saturating_sub(1)).enumerate() {
            frame.set_text(
                1,
                3 + offset,
                &format!(
                    "{:<34} {:>9} {:>10} {:>17}",
                    display_name(&row.reviewer),
                    row.reviewed,
                    row.in_review,
                    row.assigned_pending
                ),
                TextRole::Primary,
            );
        }
    }

    fn render_boards(&self, frame: &mut RenderFrame) {
        let Some(table) = self.session.table() else {
            frame.set_text(1, 2, "load a report to see the boards", TextRole::Muted);
            return;
        };
        let distribution = summary::video_distribution(table);
        frame.set_text(
            1,
            2,
            &format!(
                "videos: {} reviewed, {} in review, {} pending",
                distribution.reviewed, distribution.in_review, distribution.pending
            ),
            TextRole::Primary,
        );

        let excluded = &self.session.config().leaderboard_exclusions;
        let boards = [
            (
                "top approved by reviewer",
                TextRole::Success,
                leaderboard::top_reviewers(table, IncidenceStatus::Approved, excluded),
            ),
            (
                "top rejected by reviewer",
                TextRole::Danger,
                leaderboard::top_reviewers(table, IncidenceStatus::NotApproved, excluded),
            ),
            (
                "top approved by type",
                TextRole::Success,
                leaderboard::top_types(table, IncidenceStatus::Approved),
            ),
            (
                "top rejected by type",
                TextRole::Danger,
                leaderboard::top_types(table, IncidenceStatus::NotApproved),
            ),
        ];

        let mut y = 4;
        for (title, role, board) in boards {
            frame.set_text_bold(1, y, title, role);
            y += 1;
            if board.is_empty() {
                frame.set_text(3, y, "(no data)", TextRole::Muted);
                y += 1;
            }
            for entry in board {
                frame.set_text(3, y, &format!("{:<40} {:>3}%", entry.label, entry.percent), TextRole::Primary);
                y += 1;
            }
            y += 1;
        }
    }

    fn render_status(&self, frame: &mut RenderFrame) {
        let y = self.size.height.saturating_sub(2);
        if let Some(status) = &self.status {
            frame.set_text(1, y, &status.text, status.role);
        } else {
            let notices = self.session.notices();
            if let Some(notice) = notices.first() {
                frame.set_text(1, y, notice, TextRole::Muted);
            }
        }
    }

    fn render_footer(&self, frame: &mut RenderFrame) {
        let y = self.size.height.saturating_sub(1);
        let pending = self.session.unassigned_after_selection();
        let role = match self.session.pending_level() {
            PendingLevel::Comfortable => TextRole::Success,
            PendingLevel::Tight => TextRole::Warning,
            PendingLevel::Critical => TextRole::Danger,
        };
        let counter = format!("unassigned pending: {pending}");
        frame.set_text_bold(1, y, &counter, role);
        frame.set_text(
            counter.len() + 3,
            y,
            "tab views  +/- give  m max  c commit  a add  d drop  o order  r reload  x export  q quit",
            TextRole::Muted,
        );
    }
}

/// `ana.perez@iie.cl` -> `Ana Perez`, for display only.
pub fn display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
