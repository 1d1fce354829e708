//! revq-cli: one-shot command surface over the revq domain layer.

use std::path::Path;
use std::sync::OnceLock;

use revq_core::config::AppConfig;
use revq_core::loader::{self, TicketTable};
use revq_core::queue::QueueOrder;

/// Stable crate label used by bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "revq-cli"
}

static VERSION: OnceLock<String> = OnceLock::new();

/// Set the version string for `--version` output.
pub fn set_version(version: &str) {
    let _ = VERSION.set(version.to_string());
}

fn get_version() -> &'static str {
    VERSION.get().map(|s| s.as_str()).unwrap_or("dev")
}

fn help_text() -> String {
    "\
revq distributes unassigned video reviews across a reviewer roster.

Usage:
  revq [command] <report.csv> [flags]

Available Commands:
  assign      Allocate pending videos to reviewers and export the result
  help        Help about any command
  queue       Show the unassigned pending queue
  rank        Show the per-reviewer load ranking
  summary     Show ingest counters and the video distribution
  top         Show the approval leaderboards

Flags:
  -h, --help      help for revq
  -v, --version   version for revq
      --config    Path to a YAML config (default: $REVQ_CONFIG)

Use \"revq [command] --help\" for more information about a command.\n"
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        }
    }
}

/// Filesystem access behind the commands, mockable for tests.
pub trait CliBackend {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, String>;
    fn write_file(&self, path: &str, bytes: &[u8]) -> Result<(), String>;
}

pub struct FilesystemCliBackend;

impl CliBackend for FilesystemCliBackend {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, String> {
        std::fs::read(path).map_err(|err| format!("read {path}: {err}"))
    }

    fn write_file(&self, path: &str, bytes: &[u8]) -> Result<(), String> {
        std::fs::write(path, bytes).map_err(|err| format!("write {path}: {err}"))
    }
}

pub mod assign;
pub mod queue;
pub mod rank;
pub mod summary;
pub mod top;

#[cfg(test)]
pub(crate) mod tests_common;

pub fn run_cli_for_test(args: &[&str], backend: &dyn CliBackend) -> CommandOutput {
    let Some((cmd, rest)) = args.split_first() else {
        return CommandOutput::success(help_text());
    };

    match *cmd {
        "--help" | "-h" | "help" => CommandOutput::success(help_text()),
        "--version" | "-v" => CommandOutput::success(format!("revq version {}\n", get_version())),
        "assign" => assign::run_assign_for_test(rest, backend),
        "queue" => queue::run_queue_for_test(rest, backend),
        "rank" => rank::run_rank_for_test(rest, backend),
        "summary" => summary::run_summary_for_test(rest, backend),
        "top" => top::run_top_for_test(rest, backend),
        _ => CommandOutput {
            stdout: String::new(),
            stderr: format!("Error: unknown command \"{cmd}\" for \"revq\"\n"),
            exit_code: 1,
        },
    }
}

pub fn run_cli(args: &[String], backend: &dyn CliBackend) -> CommandOutput {
    let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    run_cli_for_test(&refs, backend)
}

// ---------------------------------------------------------------------------
// Shared argument plumbing
// ---------------------------------------------------------------------------

/// Options common to every command: the report path and the config file.
pub(crate) struct CommonArgs {
    pub csv_path: String,
    pub config: AppConfig,
    /// Flags the command-specific parser still has to consume.
    pub rest: Vec<String>,
}

/// Splits the positional report path and `--config` out of `args`. Flags in
/// `value_flags` keep their value paired in `rest`; other flags are bare.
pub(crate) fn parse_common(
    args: &[&str],
    value_flags: &[&str],
) -> Result<CommonArgs, (i32, String)> {
    let mut csv_path = None;
    let mut config_path = None;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or((1, "--config requires a path".to_string()))?;
                config_path = Some((*value).to_string());
            }
            flag if flag.starts_with("--") => {
                rest.push(flag.to_string());
                if value_flags.contains(&flag) {
                    let value = iter
                        .next()
                        .ok_or((1, format!("{flag} requires a value")))?;
                    rest.push((*value).to_string());
                }
            }
            positional => {
                if csv_path.is_some() {
                    return Err((1, format!("unexpected argument: {positional}")));
                }
                csv_path = Some(positional.to_string());
            }
        }
    }

    let csv_path = csv_path.ok_or((1, "expected a report CSV path".to_string()))?;
    let config = AppConfig::load(config_path.as_deref().map(Path::new))
        .map_err(|err| (1, err.to_string()))?;
    Ok(CommonArgs {
        csv_path,
        config,
        rest,
    })
}

/// Removes a bare flag from `rest`, reporting whether it was present.
pub(crate) fn take_flag(rest: &mut Vec<String>, name: &str) -> bool {
    let before = rest.len();
    rest.retain(|f| f != name);
    rest.len() != before
}

/// Removes one `name value` pair from `rest`.
pub(crate) fn take_value(rest: &mut Vec<String>, name: &str) -> Option<String> {
    let index = rest.iter().position(|f| f == name)?;
    rest.remove(index);
    if index < rest.len() {
        Some(rest.remove(index))
    } else {
        None
    }
}

/// Removes every `name value` pair from `rest`, preserving order.
pub(crate) fn take_values(rest: &mut Vec<String>, name: &str) -> Vec<String> {
    let mut values = Vec::new();
    while let Some(value) = take_value(rest, name) {
        values.push(value);
    }
    values
}

/// Rejects flags no command consumed.
pub(crate) fn reject_leftovers(rest: &[String]) -> Result<(), (i32, String)> {
    match rest.first() {
        Some(flag) => Err((1, format!("unknown flag: {flag}"))),
        None => Ok(()),
    }
}

/// Reads and parses the report, flattening errors for display.
pub(crate) fn load_report(
    backend: &dyn CliBackend,
    path: &str,
) -> Result<TicketTable, (i32, String)> {
    let bytes = backend.read_file(path).map_err(|err| (1, err))?;
    loader::load_table(&bytes).map_err(|err| (1, err.to_string()))
}

/// Parses a `--order` value.
pub(crate) fn parse_order(value: &str) -> Result<QueueOrder, (i32, String)> {
    match value {
        "original" => Ok(QueueOrder::Original),
        "oldest" => Ok(QueueOrder::OldestFirst),
        "newest" => Ok(QueueOrder::NewestFirst),
        other => Err((
            1,
            format!("invalid --order: {other} (expected original, oldest, or newest)"),
        )),
    }
}

/// Renders a tab-separated table through tabwriter.
pub(crate) fn render_table(lines: &[String]) -> Result<String, (i32, String)> {
    use std::io::Write;

    let mut tw = tabwriter::TabWriter::new(Vec::new()).padding(2);
    for line in lines {
        writeln!(tw, "{line}").map_err(|err| (1, err.to_string()))?;
    }
    tw.flush().map_err(|err| (1, err.to_string()))?;
    let bytes = tw.into_inner().map_err(|err| (1, err.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Wraps a command body that reports `(exit_code, message)` failures.
pub(crate) fn run_command(
    result: Result<CommandOutput, (i32, String)>,
) -> CommandOutput {
    match result {
        Ok(output) => output,
        Err((exit_code, message)) => CommandOutput {
            stdout: String::new(),
            stderr: format!("{message}\n"),
            exit_code,
        },
    }
}
