//! `revq rank`: per-reviewer load ranking.

use revq_core::ranking;

use crate::{
    load_report, parse_common, reject_leftovers, render_table, run_command, take_flag,
    CliBackend, CommandOutput,
};

pub fn run_rank_for_test(args: &[&str], backend: &dyn CliBackend) -> CommandOutput {
    run_command(execute_rank(args, backend))
}

fn execute_rank(args: &[&str], backend: &dyn CliBackend) -> Result<CommandOutput, (i32, String)> {
    let mut common = parse_common(args, &[])?;
    let json = take_flag(&mut common.rest, "--json");
    reject_leftovers(&common.rest)?;

    let table = load_report(backend, &common.csv_path)?;
    let rows = ranking::load_ranking(&table, &common.config.seed_reviewers);

    let stderr = table
        .report
        .warnings
        .iter()
        .map(|w| format!("{w}\n"))
        .collect();

    let stdout = if json {
        let body = serde_json::to_string_pretty(&rows).map_err(|err| (1, err.to_string()))?;
        format!("{body}\n")
    } else {
        let mut lines = vec!["REVIEWER\tREVIEWED\tIN REVIEW\tPENDING ASSIGNED".to_string()];
        for row in &rows {
            lines.push(format!(
                "{}\t{}\t{}\t{}",
                row.reviewer, row.reviewed, row.in_review, row.assigned_pending
            ));
        }
        render_table(&lines)?
    };

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: 0,
    })
}
