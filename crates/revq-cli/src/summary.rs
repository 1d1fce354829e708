//! `revq summary`: ingest counters and the video distribution.

use revq_core::queue::{build_pending, QueueOrder};
use revq_core::summary::video_distribution;

use crate::{
    load_report, parse_common, reject_leftovers, run_command, take_flag, CliBackend,
    CommandOutput,
};

pub fn run_summary_for_test(args: &[&str], backend: &dyn CliBackend) -> CommandOutput {
    run_command(execute_summary(args, backend))
}

fn execute_summary(
    args: &[&str],
    backend: &dyn CliBackend,
) -> Result<CommandOutput, (i32, String)> {
    let mut common = parse_common(args, &[])?;
    let json = take_flag(&mut common.rest, "--json");
    reject_leftovers(&common.rest)?;

    let table = load_report(backend, &common.csv_path)?;
    let distribution = video_distribution(&table);
    let queue = build_pending(&table, QueueOrder::Original);

    let stderr = table
        .report
        .warnings
        .iter()
        .map(|w| format!("{w}\n"))
        .collect();

    let stdout = if json {
        let body = serde_json::json!({
            "rows": table.report.rows,
            "duplicates_removed": table.report.duplicates_removed,
            "dedup_applied": table.report.dedup_applied,
            "distribution": distribution,
            "unassigned_pending": queue.len(),
        });
        let text = serde_json::to_string_pretty(&body).map_err(|err| (1, err.to_string()))?;
        format!("{text}\n")
    } else {
        let mut text = String::new();
        text.push_str(&format!("rows: {}\n", table.report.rows));
        if table.report.dedup_applied {
            text.push_str(&format!(
                "duplicates removed: {}\n",
                table.report.duplicates_removed
            ));
        }
        text.push_str(&format!("videos reviewed: {}\n", distribution.reviewed));
        text.push_str(&format!("videos in review: {}\n", distribution.in_review));
        text.push_str(&format!("videos pending: {}\n", distribution.pending));
        text.push_str(&format!("unassigned pending: {}\n", queue.len()));
        text
    };

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: 0,
    })
}
