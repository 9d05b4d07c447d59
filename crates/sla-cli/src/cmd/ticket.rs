use crate::cmd::time_or_now;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use sla_core::ticket::{self, Ticket};
use sla_core::types::{Priority, TicketStatus};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand tree
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum TicketSubcommand {
    /// Open a new ticket
    Create {
        /// Short, descriptive title
        #[arg(long)]
        title: String,

        /// Priority: low | medium | high | critical
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Creation time (RFC 3339) [default: now]
        #[arg(long)]
        created_at: Option<String>,
    },

    /// List tickets
    List {
        /// Only show tickets in this status (open, in_progress, on_escalation, resolved, closed)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show a single ticket
    Show {
        /// Ticket ID (e.g. T1)
        id: String,
    },

    /// Record the first response on a ticket
    Respond {
        /// Ticket ID (e.g. T1)
        id: String,

        /// Response time (RFC 3339) [default: now]
        #[arg(long)]
        at: Option<String>,
    },

    /// Mark a ticket resolved
    Resolve {
        /// Ticket ID (e.g. T1)
        id: String,

        /// Resolution time (RFC 3339) [default: now]
        #[arg(long)]
        at: Option<String>,
    },

    /// Close a ticket
    Close {
        /// Ticket ID (e.g. T1)
        id: String,

        /// Close time, recorded as resolution time if none is set [default: now]
        #[arg(long)]
        at: Option<String>,
    },

    /// Move a ticket to on_escalation
    Escalate {
        /// Ticket ID (e.g. T1)
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: TicketSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        TicketSubcommand::Create {
            title,
            priority,
            created_at,
        } => {
            let priority = Priority::parse_known(&priority)?;
            let created_at = time_or_now(created_at.as_deref())?;
            let t = ticket::create(root, &title, priority, created_at)
                .context("failed to create ticket")?;
            if json {
                print_json(&t)?;
            } else {
                println!("created ticket {} [{}] {}", t.id, t.priority, t.title);
            }
            Ok(())
        }
        TicketSubcommand::List { status } => {
            let status = status
                .as_deref()
                .map(str::parse::<TicketStatus>)
                .transpose()?;
            list(root, status, json)
        }
        TicketSubcommand::Show { id } => {
            let t = ticket::get(root, &id)?;
            if json {
                print_json(&t)?;
            } else {
                print_ticket(&t);
            }
            Ok(())
        }
        TicketSubcommand::Respond { id, at } => {
            let at = time_or_now(at.as_deref())?;
            let t = ticket::respond(root, &id, at)?;
            report_change(&t, "responded", json)
        }
        TicketSubcommand::Resolve { id, at } => {
            let at = time_or_now(at.as_deref())?;
            let t = ticket::resolve(root, &id, at)?;
            report_change(&t, "resolved", json)
        }
        TicketSubcommand::Close { id, at } => {
            let at = time_or_now(at.as_deref())?;
            let t = ticket::close(root, &id, at)?;
            report_change(&t, "closed", json)
        }
        TicketSubcommand::Escalate { id } => {
            let t = ticket::escalate(root, &id)?;
            report_change(&t, "escalated", json)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn list(root: &Path, status: Option<TicketStatus>, json: bool) -> anyhow::Result<()> {
    let mut tickets = ticket::list(root).context("failed to load tickets")?;
    if let Some(status) = status {
        tickets.retain(|t| t.status == status);
    }
    if json {
        return print_json(&tickets);
    }
    if tickets.is_empty() {
        println!("No tickets.");
        return Ok(());
    }
    let rows = tickets
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.priority.to_string(),
                t.status.to_string(),
                t.created_at.to_rfc3339(),
                t.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "PRIORITY", "STATUS", "CREATED", "TITLE"], rows);
    Ok(())
}

fn print_ticket(t: &Ticket) {
    println!("{}: {}", t.id, t.title);
    println!("  priority:          {}", t.priority);
    println!("  status:            {}", t.status);
    println!("  created_at:        {}", t.created_at.to_rfc3339());
    if let Some(at) = t.first_response_at {
        println!("  first_response_at: {}", at.to_rfc3339());
    }
    if let Some(at) = t.resolved_at {
        println!("  resolved_at:       {}", at.to_rfc3339());
    }
}

fn report_change(t: &Ticket, verb: &str, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(t)
    } else {
        println!("{verb} ticket {} (status: {})", t.id, t.status);
        Ok(())
    }
}
