//! Human and JSON rendering for CLI output.

use comfy_table::{presets, Cell, ContentArrangement, Table};
use console::style;

use crate::domain::models::{
    DispatchPlan, FinalReport, GroupKind, RunOutcome, Session, SessionStatus, StopReason,
};

/// Print the final run report.
pub fn print_final_report(report: &FinalReport, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
        return;
    }

    match report.outcome {
        RunOutcome::Done => {
            println!(
                "\n{} suite passing after {} attempt(s)",
                style("done:").green().bold(),
                report.attempts_used
            );
        }
        RunOutcome::Stopped(reason) => {
            println!(
                "\n{} {} after {} attempt(s)",
                style("stopped:").red().bold(),
                reason.describe(),
                report.attempts_used
            );
        }
    }

    if !report.fixed.is_empty() {
        println!("  fixed: {}", report.fixed.join(", "));
    }
    if !report.still_failing.is_empty() {
        println!(
            "  still failing: {}",
            style(report.still_failing.join(", ")).red()
        );
    }
}

/// Print a dry-run dispatch plan.
pub fn print_plan(plan: &DispatchPlan, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(plan).unwrap_or_default());
        return;
    }

    if plan.is_empty() {
        println!("{} nothing failing, nothing to plan", style("plan:").bold());
        return;
    }

    println!(
        "{} {} group(s) over {} failing test(s), pool cap {}",
        style("plan:").bold(),
        plan.group_count(),
        plan.test_count(),
        plan.concurrency_cap
    );

    let mut table = base_table(&["lane", "kind", "tests", "coupling"]);
    for group in &plan.pool {
        table.add_row(vec![
            Cell::new("pool"),
            Cell::new(kind_name(group.kind)),
            Cell::new(group.test_ids().join(", ")),
            Cell::new(""),
        ]);
    }
    for group in &plan.lane {
        let coupling: Vec<String> = group
            .coupling
            .iter()
            .map(|signal| format!("{signal:?}"))
            .collect();
        table.add_row(vec![
            Cell::new("sequential"),
            Cell::new(kind_name(group.kind)),
            Cell::new(group.test_ids().join(", ")),
            Cell::new(coupling.join("; ")),
        ]);
    }
    println!("{table}");
}

/// Print the persisted session with its attempt history.
pub fn print_session(session: &Session, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(session).unwrap_or_default()
        );
        return;
    }

    println!(
        "{} {} ({}, {} mode, budget {}, cap {})",
        style("session:").bold(),
        session.id,
        status_name(session.status, session.stop_reason),
        match session.mode {
            crate::domain::models::RunMode::Interactive => "interactive",
            crate::domain::models::RunMode::Unattended => "unattended",
        },
        session.retry_budget,
        session.concurrency_cap,
    );

    if session.attempts.is_empty() {
        println!("  no attempts yet");
        return;
    }

    let mut table = base_table(&["attempt", "before", "after", "fixed", "broken", "groups"]);
    for attempt in &session.attempts {
        table.add_row(vec![
            Cell::new(attempt.number),
            Cell::new(attempt.before.len()),
            Cell::new(attempt.after.len()),
            Cell::new(attempt.fixed.len()),
            Cell::new(attempt.broken.len()),
            Cell::new(attempt.plan.group_count()),
        ]);
    }
    println!("{table}");
}

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h.to_uppercase())));
    table
}

fn kind_name(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Independent => "independent",
        GroupKind::Coupled => "coupled",
    }
}

fn status_name(status: SessionStatus, reason: Option<StopReason>) -> String {
    match status {
        SessionStatus::Active => "active".to_string(),
        SessionStatus::Completed => "completed".to_string(),
        SessionStatus::Stopped => format!(
            "stopped: {}",
            reason.map_or("unknown", StopReason::describe)
        ),
    }
}
