use crate::cmd::time_or_now;
use crate::output::{percent, print_json};
use anyhow::Context;
use sla_core::config::SlaConfig;
use sla_core::sla::{summarize, TrackSummary};
use sla_core::ticket;
use std::path::Path;

pub fn run(root: &Path, id: &str, now: Option<&str>, json: bool) -> anyhow::Result<()> {
    let now = time_or_now(now)?;
    let config = SlaConfig::load(root).context("failed to load config")?;
    let t = ticket::get(root, id)?;
    let summary = summarize(&t, config.policy_for(&t.priority), now);

    if json {
        let value = serde_json::json!({
            "id": t.id,
            "priority": t.priority,
            "status": t.status,
            "evaluated_at": now,
            "sla": summary,
        });
        return print_json(&value);
    }

    println!("{} [{}] {} ({})", t.id, t.priority, t.title, t.status);
    print_track("response", &summary.response);
    print_track("solving", &summary.solving);
    Ok(())
}

fn print_track(label: &str, track: &TrackSummary) {
    let flag = if track.is_imminent { "  (breach imminent)" } else { "" };
    println!(
        "  {:<9} {:<8} {:>7} of {}h used  remaining: {}{}",
        label,
        track.result.status.as_str(),
        percent(track.result.percent_used),
        track.result.hours_allowed,
        track.remaining.formatted,
        flag,
    );
}
