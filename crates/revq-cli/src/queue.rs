//! `revq queue`: the unassigned pending queue.

use revq_core::queue::{build_pending, QueueOrder};

use crate::{
    load_report, parse_common, parse_order, reject_leftovers, render_table, run_command,
    take_flag, take_value, CliBackend, CommandOutput,
};

pub fn run_queue_for_test(args: &[&str], backend: &dyn CliBackend) -> CommandOutput {
    run_command(execute_queue(args, backend))
}

fn execute_queue(args: &[&str], backend: &dyn CliBackend) -> Result<CommandOutput, (i32, String)> {
    let mut common = parse_common(args, &["--order", "--limit"])?;
    let json = take_flag(&mut common.rest, "--json");
    let order = match take_value(&mut common.rest, "--order") {
        Some(value) => parse_order(&value)?,
        None => QueueOrder::Original,
    };
    let limit = match take_value(&mut common.rest, "--limit") {
        Some(value) => Some(
            value
                .parse::<usize>()
                .map_err(|_| (1, format!("invalid --limit: {value}")))?,
        ),
        None => None,
    };
    reject_leftovers(&common.rest)?;

    let table = load_report(backend, &common.csv_path)?;
    let queue = build_pending(&table, order);

    let mut stderr: String = table
        .report
        .warnings
        .iter()
        .map(|w| format!("{w}\n"))
        .collect();
    if let Some(notice) = &queue.notice {
        stderr.push_str(notice);
        stderr.push('\n');
    }

    let shown = limit.unwrap_or(queue.len()).min(queue.len());
    let stdout = if json {
        let entries: Vec<serde_json::Value> = queue.entries[..shown]
            .iter()
            .map(|e| {
                serde_json::json!({
                    "subject_id": e.subject_id,
                    "record_id": e.record_id,
                    "loaded_at": e.loaded_at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                })
            })
            .collect();
        let body = serde_json::to_string_pretty(&entries).map_err(|err| (1, err.to_string()))?;
        format!("{body}\n")
    } else {
        let mut lines = vec!["SUBJECT\tRECORD\tLOADED AT".to_string()];
        for entry in &queue.entries[..shown] {
            let loaded = entry
                .loaded_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!("{}\t{}\t{}", entry.subject_id, entry.record_id, loaded));
        }
        let mut body = render_table(&lines)?;
        body.push_str(&format!("{} pending ({})\n", queue.len(), order.describe()));
        body
    };

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: 0,
    })
}
