pub mod check;
pub mod format;
pub mod init;
pub mod policy;
pub mod report;
pub mod ticket;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sla_core::ticket::parse_timestamp;

/// `--now` / `--at` value, or the wall clock read once.
pub fn time_or_now(value: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match value {
        Some(s) => parse_timestamp(s).context("invalid time argument"),
        None => Ok(Utc::now()),
    }
}
