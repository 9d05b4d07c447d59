use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlaError {
    #[error("not initialized: run 'sla init'")]
    NotInitialized,

    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    #[error("no ticket id left after {0}: renumber .helpdesk/tickets.yaml")]
    TicketIdExhausted(String),

    #[error("invalid ticket status '{0}': must be open, in_progress, on_escalation, resolved, or closed")]
    InvalidStatus(String),

    #[error("invalid priority '{0}': must be low, medium, high, or critical")]
    InvalidPriority(String),

    #[error("invalid timestamp '{0}': expected RFC 3339 (e.g. 2026-01-05T09:00:00Z)")]
    InvalidTimestamp(String),

    #[error("invalid transition for ticket {id}: {status} -> {to}")]
    InvalidTransition {
        id: String,
        status: String,
        to: String,
    },

    #[error("unsupported tickets file '{0}': expected .yaml, .yml, or .json")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SlaError>;
