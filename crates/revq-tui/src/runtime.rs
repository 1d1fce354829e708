//! Crossterm event loop driving the app model.
//!
//! Terminal concerns stop here: raw-mode lifecycle, event translation, and
//! painting the cell frame. Everything stateful lives in [`App`].

use std::io::{self, Write};
use std::path::PathBuf;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event as TerminalEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use revq_core::config::AppConfig;
use revq_core::session::Session;

use crate::app::{App, Command};
use crate::frame::{FrameSize, RenderFrame, TextRole};
use crate::input::{InputEvent, Key};

/// Startup options resolved by the binary.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Daily report to ingest at startup and on reload.
    pub csv_path: Option<PathBuf>,
    /// Optional YAML config path; falls back to `REVQ_CONFIG` / defaults.
    pub config_path: Option<PathBuf>,
    /// Where `x` writes the assignment export.
    pub export_path: PathBuf,
}

pub fn run(options: &RuntimeOptions) -> Result<(), String> {
    let config =
        AppConfig::load(options.config_path.as_deref()).map_err(|err| err.to_string())?;
    let mut app = App::new(Session::new(config));
    ingest_report(&mut app, options);

    let mut terminal_session =
        TerminalSession::enter().map_err(|err| format!("enter tui terminal mode: {err}"))?;

    let (width, height) = terminal_size().map_err(|err| format!("read terminal size: {err}"))?;
    let _ = app.update(InputEvent::Resize(FrameSize { width, height }));

    loop {
        let frame = app.render();
        render_frame(&mut terminal_session.stdout, &frame)
            .map_err(|err| format!("render frame: {err}"))?;

        if app.quitting() {
            break;
        }

        let event = event::read().map_err(|err| format!("read terminal event: {err}"))?;
        if is_interrupt(&event) {
            break;
        }
        let Some(input) = map_terminal_event(event) else {
            continue;
        };
        match app.update(input) {
            Command::None => {}
            Command::Quit => break,
            Command::Reload => ingest_report(&mut app, options),
            Command::Export => export_assignments(&mut app, options),
        }
    }

    Ok(())
}

fn ingest_report(app: &mut App, options: &RuntimeOptions) {
    let Some(path) = &options.csv_path else {
        app.set_status(
            "no report path given: start revq-tui with the daily CSV".to_string(),
            TextRole::Warning,
        );
        return;
    };
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            app.set_status(format!("read {}: {err}", path.display()), TextRole::Danger);
            return;
        }
    };
    match app.session_mut().ingest(&bytes) {
        Ok(()) => {
            let report = app
                .session()
                .table()
                .map(|table| table.report.clone())
                .unwrap_or_default();
            let mut text = format!("loaded {} rows from {}", report.rows, path.display());
            if report.duplicates_removed > 0 {
                text.push_str(&format!(" ({} duplicates removed)", report.duplicates_removed));
            }
            app.set_status(text, TextRole::Success);
        }
        Err(err) => app.set_status(err.to_string(), TextRole::Danger),
    }
}

fn export_assignments(app: &mut App, options: &RuntimeOptions) {
    if app.session().log().is_empty() {
        app.set_status("nothing committed yet: nothing to export".to_string(), TextRole::Muted);
        return;
    }
    let bytes = match app.session().export_csv() {
        Ok(bytes) => bytes,
        Err(err) => {
            app.set_status(err.to_string(), TextRole::Danger);
            return;
        }
    };
    match std::fs::write(&options.export_path, bytes) {
        Ok(()) => app.set_status(
            format!(
                "wrote {} assignments to {}",
                app.session().log().len(),
                options.export_path.display()
            ),
            TextRole::Success,
        ),
        Err(err) => app.set_status(
            format!("write {}: {err}", options.export_path.display()),
            TextRole::Danger,
        ),
    }
}

fn terminal_size() -> io::Result<(usize, usize)> {
    let (width, height) = terminal::size()?;
    Ok((usize::from(width), usize::from(height)))
}

fn map_terminal_event(event: TerminalEvent) -> Option<InputEvent> {
    match event {
        TerminalEvent::Resize(width, height) => Some(InputEvent::Resize(FrameSize {
            width: usize::from(width),
            height: usize::from(height),
        })),
        TerminalEvent::Key(key_event) => {
            if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                return None;
            }
            let key = match key_event.code {
                KeyCode::Char(ch) => Key::Char(ch),
                KeyCode::Enter => Key::Enter,
                KeyCode::Esc => Key::Escape,
                KeyCode::Tab | KeyCode::BackTab => Key::Tab,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Up => Key::Up,
                KeyCode::Down => Key::Down,
                KeyCode::Left => Key::Left,
                KeyCode::Right => Key::Right,
                _ => return None,
            };
            Some(InputEvent::Key(key))
        }
        _ => None,
    }
}

fn is_interrupt(event: &TerminalEvent) -> bool {
    let TerminalEvent::Key(key_event) = event else {
        return false;
    };
    if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return false;
    }
    matches!(key_event.code, KeyCode::Char('c'))
        && key_event.modifiers.contains(KeyModifiers::CONTROL)
}

fn render_frame<W: Write>(out: &mut W, frame: &RenderFrame) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    let size = frame.size();

    for y in 0..size.height {
        queue!(out, MoveTo(0, to_u16(y)))?;
        let mut style = None;
        for x in 0..size.width {
            if let Some(cell) = frame.cell(x, y) {
                let cell_style = (cell.role, cell.bold);
                if style != Some(cell_style) {
                    queue_style(out, cell.role, cell.bold)?;
                    style = Some(cell_style);
                }
                queue!(out, Print(cell.glyph))?;
            }
        }
    }

    queue!(
        out,
        SetAttribute(Attribute::Reset),
        MoveTo(0, to_u16(size.height))
    )?;
    out.flush()
}

fn role_color(role: TextRole) -> Color {
    match role {
        TextRole::Primary => Color::Reset,
        TextRole::Muted => Color::DarkGrey,
        TextRole::Accent => Color::Cyan,
        TextRole::Success => Color::Green,
        TextRole::Warning => Color::Yellow,
        TextRole::Danger => Color::Red,
        TextRole::Focus => Color::White,
    }
}

fn queue_style<W: Write>(out: &mut W, role: TextRole, bold: bool) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetForegroundColor(role_color(role)),
    )?;
    if bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    Ok(())
}

fn to_u16(value: usize) -> u16 {
    value.min(usize::from(u16::MAX)) as u16
}

struct TerminalSession {
    stdout: io::Stdout,
}

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            SetAttribute(Attribute::Reset),
            LeaveAlternateScreen,
            Show,
            MoveTo(0, 0)
        );
        let _ = terminal::disable_raw_mode();
    }
}
