use crate::cmd::time_or_now;
use crate::output::{percent, print_json, print_table};
use anyhow::Context;
use sla_core::config::SlaConfig;
use sla_core::report::{SlaReport, TrackStats};
use sla_core::ticket;
use std::path::Path;

pub fn run(
    root: &Path,
    file: Option<&Path>,
    now: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let now = time_or_now(now)?;
    let config = SlaConfig::load(root).context("failed to load config")?;
    let tickets = match file {
        Some(path) => ticket::load_tickets_file(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => ticket::list(root).context("failed to load tickets")?,
    };

    let report = SlaReport::build(&tickets, &config, now);
    if json {
        return print_json(&report);
    }

    println!("SLA report as of {} ({} tickets)", now.to_rfc3339(), report.total);
    println!();
    print_table(
        &["TRACK", "ON_TIME", "BREACHED", "PENDING", "IMMINENT", "COMPLIANCE"],
        vec![
            track_row("response", &report.response),
            track_row("solving", &report.solving),
        ],
    );

    if !report.by_priority.is_empty() {
        println!();
        let rows = report
            .by_priority
            .iter()
            .map(|p| {
                vec![
                    p.priority.to_string(),
                    p.tickets.to_string(),
                    p.breached.to_string(),
                ]
            })
            .collect();
        print_table(&["PRIORITY", "TICKETS", "BREACHED"], rows);
    }

    println!();
    if report.at_risk.is_empty() {
        println!("No tickets at risk.");
        return Ok(());
    }
    println!("At risk:");
    let rows = report
        .at_risk
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.priority.to_string(),
                percent(r.percent_used),
                r.summary.response.remaining.formatted.clone(),
                r.summary.solving.remaining.formatted.clone(),
                r.title.clone(),
            ]
        })
        .collect();
    print_table(
        &["ID", "PRIORITY", "USED", "RESPONSE", "SOLVING", "TITLE"],
        rows,
    );
    Ok(())
}

fn track_row(label: &str, stats: &TrackStats) -> Vec<String> {
    vec![
        label.to_string(),
        stats.on_time.to_string(),
        stats.breached.to_string(),
        stats.pending.to_string(),
        stats.imminent.to_string(),
        stats
            .compliance_percent
            .map(percent)
            .unwrap_or_else(|| "-".to_string()),
    ]
}
