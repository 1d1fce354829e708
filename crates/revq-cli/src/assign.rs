//! `revq assign`: a scripted allocation pass.
//!
//! Runs the same session flow as the interactive surface, one shot: seed the
//! roster, ingest the report, enter the requested counts in flag order (the
//! ceilings tighten after each one, exactly like the interactive form), then
//! commit and optionally export the semicolon CSV.

use revq_core::queue::QueueOrder;
use revq_core::session::Session;

use crate::{
    parse_common, parse_order, reject_leftovers, render_table, run_command, take_flag,
    take_value, take_values, CliBackend, CommandOutput,
};

pub fn run_assign_for_test(args: &[&str], backend: &dyn CliBackend) -> CommandOutput {
    run_command(execute_assign(args, backend))
}

fn execute_assign(
    args: &[&str],
    backend: &dyn CliBackend,
) -> Result<CommandOutput, (i32, String)> {
    let mut common = parse_common(args, &["--give", "--add", "--order", "--out"])?;
    let json = take_flag(&mut common.rest, "--json");
    let adds = take_values(&mut common.rest, "--add");
    let gives = take_values(&mut common.rest, "--give");
    let order = match take_value(&mut common.rest, "--order") {
        Some(value) => parse_order(&value)?,
        None => QueueOrder::Original,
    };
    let out_path = take_value(&mut common.rest, "--out");
    reject_leftovers(&common.rest)?;

    if gives.is_empty() {
        return Err((1, "expected at least one --give EMAIL=COUNT".to_string()));
    }

    let mut session = Session::new(common.config);
    session.set_order(order);
    for email in &adds {
        session
            .add_reviewer(email)
            .map_err(|err| (1, err.to_string()))?;
    }

    let bytes = backend.read_file(&common.csv_path).map_err(|err| (1, err))?;
    session.ingest(&bytes).map_err(|err| (1, err.to_string()))?;

    for give in &gives {
        let (email, count) = parse_give(give)?;
        session
            .set_request(email, count)
            .map_err(|err| (1, err.to_string()))?;
    }

    let outcome = session.commit();
    let remaining = session.remaining();

    let mut stderr: String = session
        .notices()
        .iter()
        .map(|n| format!("{n}\n"))
        .collect();
    if outcome.exhausted {
        stderr.push_str("pending queue exhausted before every request was filled\n");
    }

    if let Some(path) = &out_path {
        let csv = session.export_csv().map_err(|err| (1, err.to_string()))?;
        backend.write_file(path, &csv).map_err(|err| (1, err))?;
    }

    let stdout = if json {
        let body = serde_json::json!({
            "assignments": outcome.accepted,
            "skipped_duplicates": outcome.skipped_duplicates,
            "exhausted": outcome.exhausted,
            "remaining": remaining,
        });
        let text = serde_json::to_string_pretty(&body).map_err(|err| (1, err.to_string()))?;
        format!("{text}\n")
    } else {
        let mut lines = vec!["REVIEWER\tSUBJECT".to_string()];
        for assignment in &outcome.accepted {
            lines.push(format!("{}\t{}", assignment.reviewer, assignment.subject_id));
        }
        let mut body = render_table(&lines)?;
        body.push_str(&format!(
            "assigned {} videos, {} still unassigned\n",
            outcome.accepted.len(),
            remaining
        ));
        if let Some(path) = &out_path {
            body.push_str(&format!("wrote {path}\n"));
        }
        body
    };

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: 0,
    })
}

/// Parses one `EMAIL=COUNT` pair.
fn parse_give(raw: &str) -> Result<(&str, u32), (i32, String)> {
    let Some((email, count)) = raw.split_once('=') else {
        return Err((1, format!("invalid --give: {raw} (expected EMAIL=COUNT)")));
    };
    let count = count
        .parse::<u32>()
        .map_err(|_| (1, format!("invalid --give count: {raw}")))?;
    Ok((email, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_common::{pending_fixture, MockCliBackend};

    #[test]
    fn assigns_in_flag_order_and_reports() {
        let backend = MockCliBackend::with_file("report.csv", pending_fixture(&["s1", "s2", "s3"]));
        let out = run_assign_for_test(
            &[
                "report.csv",
                "--give",
                "antonia.cutino@iie.cl=2",
                "--give",
                "antonia.rios@iie.cl=1",
            ],
            &backend,
        );
        assert_eq!(out.exit_code, 0, "stderr: {}", out.stderr);
        assert!(out.stdout.contains("assigned 3 videos, 0 still unassigned"));
        let first = out.stdout.lines().nth(1).unwrap_or("");
        assert!(first.contains("antonia.cutino@iie.cl"));
        assert!(first.contains("s1"));
    }

    #[test]
    fn over_ceiling_give_is_rejected() {
        let backend = MockCliBackend::with_file("report.csv", pending_fixture(&["s1"]));
        let out = run_assign_for_test(
            &[
                "report.csv",
                "--give",
                "antonia.cutino@iie.cl=1",
                "--give",
                "antonia.rios@iie.cl=1",
            ],
            &backend,
        );
        assert_eq!(out.exit_code, 1);
        assert!(out.stderr.contains("at most 0 more videos"));
    }

    #[test]
    fn unknown_reviewer_is_rejected() {
        let backend = MockCliBackend::with_file("report.csv", pending_fixture(&["s1"]));
        let out = run_assign_for_test(
            &["report.csv", "--give", "stranger@iie.cl=1"],
            &backend,
        );
        assert_eq!(out.exit_code, 1);
        assert!(out.stderr.contains("not on the roster"));
    }

    #[test]
    fn add_flag_extends_the_roster_first() {
        let backend = MockCliBackend::with_file("report.csv", pending_fixture(&["s1"]));
        let out = run_assign_for_test(
            &[
                "report.csv",
                "--add",
                "new.person@iie.cl",
                "--give",
                "new.person@iie.cl=1",
            ],
            &backend,
        );
        assert_eq!(out.exit_code, 0, "stderr: {}", out.stderr);
        assert!(out.stdout.contains("new.person@iie.cl"));
    }

    #[test]
    fn wrong_domain_add_is_rejected() {
        let backend = MockCliBackend::with_file("report.csv", pending_fixture(&["s1"]));
        let out = run_assign_for_test(
            &["report.csv", "--add", "new.person@otherdomain.com", "--give", "x@iie.cl=1"],
            &backend,
        );
        assert_eq!(out.exit_code, 1);
        assert!(out.stderr.contains("@iie.cl"));
    }

    #[test]
    fn out_flag_writes_the_export() {
        let backend = MockCliBackend::with_file("report.csv", pending_fixture(&["s1"]));
        let out = run_assign_for_test(
            &[
                "report.csv",
                "--give",
                "antonia.cutino@iie.cl=1",
                "--out",
                "assignments.csv",
            ],
            &backend,
        );
        assert_eq!(out.exit_code, 0, "stderr: {}", out.stderr);
        let written = backend.written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, "assignments.csv");
        let text = String::from_utf8_lossy(&written[0].1).into_owned();
        assert_eq!(
            text,
            "id_revisor;rut_docente\nantonia.cutino@iie.cl;s1\n"
        );
    }

    #[test]
    fn malformed_give_is_rejected() {
        let backend = MockCliBackend::with_file("report.csv", pending_fixture(&["s1"]));
        let out = run_assign_for_test(&["report.csv", "--give", "no-count"], &backend);
        assert_eq!(out.exit_code, 1);
        assert!(out.stderr.contains("expected EMAIL=COUNT"));
    }
}
