//! Ticket records and the file-backed ticket store.
//!
//! Layout:
//!   .helpdesk/tickets.yaml   list of all tickets, any status
//!
//! IDs are sequential: T1, T2, T3, … (one past the highest existing suffix).

use crate::error::{Result, SlaError};
use crate::io;
use crate::paths;
use crate::types::{Priority, TicketStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A ticket as the SLA engine sees it. `created_at` is required; a record
/// without a parsable creation time fails to deserialize instead of reaching
/// the engine with a bogus duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_response_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Parse an RFC 3339 timestamp from user input.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| SlaError::InvalidTimestamp(s.to_string()))
}

// ---------------------------------------------------------------------------
// Internal file I/O
// ---------------------------------------------------------------------------

fn load_all(root: &Path) -> Result<Vec<Ticket>> {
    io::read_yaml(&paths::tickets_path(root))
}

fn save_all(root: &Path, tickets: &[Ticket]) -> Result<()> {
    io::write_yaml(&paths::tickets_path(root), tickets)
}

fn next_id(tickets: &[Ticket]) -> Result<String> {
    let max = tickets
        .iter()
        .filter_map(|t| t.id.strip_prefix('T')?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    let next = max
        .checked_add(1)
        .ok_or_else(|| SlaError::TicketIdExhausted(format!("T{max}")))?;
    Ok(format!("T{next}"))
}

fn update<F>(root: &Path, id: &str, apply: F) -> Result<Ticket>
where
    F: FnOnce(&mut Ticket) -> Result<()>,
{
    let mut tickets = load_all(root)?;
    let ticket = tickets
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| SlaError::TicketNotFound(id.to_string()))?;
    apply(ticket)?;
    let updated = ticket.clone();
    save_all(root, &tickets)?;
    Ok(updated)
}

fn invalid_transition(ticket: &Ticket, to: TicketStatus) -> SlaError {
    SlaError::InvalidTransition {
        id: ticket.id.clone(),
        status: ticket.status.to_string(),
        to: to.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Open a new ticket.
pub fn create(
    root: &Path,
    title: impl Into<String>,
    priority: Priority,
    created_at: DateTime<Utc>,
) -> Result<Ticket> {
    if !paths::is_initialized(root) {
        return Err(SlaError::NotInitialized);
    }
    let mut tickets = load_all(root)?;
    let ticket = Ticket {
        id: next_id(&tickets)?,
        title: title.into(),
        priority,
        status: TicketStatus::Open,
        created_at,
        first_response_at: None,
        resolved_at: None,
    };
    tickets.push(ticket.clone());
    save_all(root, &tickets)?;
    tracing::info!(id = %ticket.id, priority = %ticket.priority, "ticket created");
    Ok(ticket)
}

pub fn list(root: &Path) -> Result<Vec<Ticket>> {
    load_all(root)
}

pub fn get(root: &Path, id: &str) -> Result<Ticket> {
    load_all(root)?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| SlaError::TicketNotFound(id.to_string()))
}

/// Record the first response. A ticket that already has one keeps it; an
/// open ticket moves to in_progress.
pub fn respond(root: &Path, id: &str, at: DateTime<Utc>) -> Result<Ticket> {
    let ticket = update(root, id, |t| {
        if t.first_response_at.is_none() {
            t.first_response_at = Some(at);
        }
        if t.status == TicketStatus::Open {
            t.status = TicketStatus::InProgress;
        }
        Ok(())
    })?;
    tracing::info!(id, "ticket responded");
    Ok(ticket)
}

pub fn resolve(root: &Path, id: &str, at: DateTime<Utc>) -> Result<Ticket> {
    let ticket = update(root, id, |t| {
        if t.status.is_finished() {
            return Err(invalid_transition(t, TicketStatus::Resolved));
        }
        t.status = TicketStatus::Resolved;
        t.resolved_at = Some(at);
        Ok(())
    })?;
    tracing::info!(id, "ticket resolved");
    Ok(ticket)
}

/// Close a ticket. Closing a resolved ticket keeps its original `resolved_at`.
pub fn close(root: &Path, id: &str, at: DateTime<Utc>) -> Result<Ticket> {
    let ticket = update(root, id, |t| {
        if t.status == TicketStatus::Closed {
            return Err(invalid_transition(t, TicketStatus::Closed));
        }
        t.status = TicketStatus::Closed;
        if t.resolved_at.is_none() {
            t.resolved_at = Some(at);
        }
        Ok(())
    })?;
    tracing::info!(id, "ticket closed");
    Ok(ticket)
}

pub fn escalate(root: &Path, id: &str) -> Result<Ticket> {
    let ticket = update(root, id, |t| {
        if t.status.is_finished() {
            return Err(invalid_transition(t, TicketStatus::OnEscalation));
        }
        t.status = TicketStatus::OnEscalation;
        Ok(())
    })?;
    tracing::info!(id, "ticket escalated");
    Ok(ticket)
}

/// Load tickets from an arbitrary export file, YAML or JSON by extension.
pub fn load_tickets_file(path: &Path) -> Result<Vec<Ticket>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let content = std::fs::read_to_string(path)?;
    match ext.as_deref() {
        Some("yaml") | Some("yml") => {
            if content.trim().is_empty() {
                return Ok(Vec::new());
            }
            Ok(serde_yaml::from_str(&content)?)
        }
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(SlaError::UnsupportedFormat(path.display().to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
