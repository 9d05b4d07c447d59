use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use sla_core::config::{SlaConfig, WarnLevel};
use sla_core::types::Priority;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PolicySubcommand {
    /// Show the effective response/resolution windows per priority
    Show,

    /// Validate the policy config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: PolicySubcommand, json: bool) -> anyhow::Result<()> {
    let config = SlaConfig::load(root).context("failed to load config")?;
    match subcmd {
        PolicySubcommand::Show => show(&config, json),
        PolicySubcommand::Validate => validate(&config, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config: &SlaConfig, json: bool) -> anyhow::Result<()> {
    let effective: Vec<_> = Priority::known()
        .iter()
        .map(|p| {
            let source = if config.policy_for(p).is_some() {
                "policy"
            } else {
                "default"
            };
            (p, config.effective_times(p), source)
        })
        .collect();

    if json {
        let entries: Vec<serde_json::Value> = effective
            .iter()
            .map(|(p, times, source)| {
                serde_json::json!({
                    "priority": p,
                    "response_hours": times.response_hours,
                    "resolution_hours": times.resolution_hours,
                    "source": source,
                })
            })
            .collect();
        return print_json(&entries);
    }

    let rows = effective
        .iter()
        .map(|(p, times, source)| {
            vec![
                p.to_string(),
                format!("{}h", times.response_hours),
                format!("{}h", times.resolution_hours),
                source.to_string(),
            ]
        })
        .collect();
    print_table(&["PRIORITY", "RESPONSE", "RESOLUTION", "SOURCE"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config: &SlaConfig, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();
    let errors = warnings
        .iter()
        .filter(|w| w.level == WarnLevel::Error)
        .count();

    if json {
        print_json(&serde_json::json!({
            "valid": errors == 0,
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("config ok ({} policies)", config.policies.len());
    } else {
        for w in &warnings {
            let tag = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{tag}: {}", w.message);
        }
    }

    if errors > 0 {
        anyhow::bail!("{errors} error(s) in policy config");
    }
    Ok(())
}
