//! `revq top`: approval leaderboards.

use revq_core::leaderboard;
use revq_core::schema::IncidenceStatus;

use crate::{
    load_report, parse_common, reject_leftovers, render_table, run_command, take_flag,
    take_value, CliBackend, CommandOutput,
};

pub fn run_top_for_test(args: &[&str], backend: &dyn CliBackend) -> CommandOutput {
    run_command(execute_top(args, backend))
}

fn execute_top(args: &[&str], backend: &dyn CliBackend) -> Result<CommandOutput, (i32, String)> {
    let mut common = parse_common(args, &["--by", "--outcome"])?;
    let json = take_flag(&mut common.rest, "--json");
    let by = take_value(&mut common.rest, "--by").unwrap_or_else(|| "reviewer".to_string());
    let outcome_raw =
        take_value(&mut common.rest, "--outcome").unwrap_or_else(|| "approved".to_string());
    reject_leftovers(&common.rest)?;

    let outcome = match outcome_raw.as_str() {
        "approved" => IncidenceStatus::Approved,
        "rejected" => IncidenceStatus::NotApproved,
        other => {
            return Err((
                1,
                format!("invalid --outcome: {other} (expected approved or rejected)"),
            ))
        }
    };

    let table = load_report(backend, &common.csv_path)?;
    let board = match by.as_str() {
        "reviewer" => leaderboard::top_reviewers(
            &table,
            outcome,
            &common.config.leaderboard_exclusions,
        ),
        "type" => leaderboard::top_types(&table, outcome),
        other => {
            return Err((
                1,
                format!("invalid --by: {other} (expected reviewer or type)"),
            ))
        }
    };

    let stderr = table
        .report
        .warnings
        .iter()
        .map(|w| format!("{w}\n"))
        .collect();

    let stdout = if json {
        let body = serde_json::to_string_pretty(&board).map_err(|err| (1, err.to_string()))?;
        format!("{body}\n")
    } else if board.is_empty() {
        format!("no rows with outcome {outcome_raw}\n")
    } else {
        let mut lines = vec![format!("TOP {}\tPERCENT", by.to_uppercase())];
        for entry in &board {
            lines.push(format!("{}\t{}%", entry.label, entry.percent));
        }
        render_table(&lines)?
    };

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: 0,
    })
}
