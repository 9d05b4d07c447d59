use anyhow::Context;
use sla_core::config::SlaConfig;
use sla_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config = SlaConfig::with_default_policies()
        .to_yaml()
        .context("failed to render default config")?;
    let wrote_config = io::write_if_missing(&paths::config_path(root), config.as_bytes())
        .context("failed to write config")?;
    let wrote_tickets = io::write_if_missing(&paths::tickets_path(root), b"[]\n")
        .context("failed to write tickets file")?;

    if wrote_config {
        println!("created {}", paths::CONFIG_FILE);
    }
    if wrote_tickets {
        println!("created {}", paths::TICKETS_FILE);
    }
    if !wrote_config && !wrote_tickets {
        println!("already initialized: {}", root.display());
    }
    Ok(())
}
