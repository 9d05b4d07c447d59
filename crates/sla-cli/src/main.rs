mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{policy::PolicySubcommand, ticket::TicketSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sla",
    about = "Helpdesk SLA tracking: response and resolution deadlines for tickets",
    version,
    propagate_version = true
)]
struct Cli {
    /// Helpdesk root (default: auto-detect from .helpdesk/)
    #[arg(long, global = true, env = "HELPDESK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .helpdesk/ with default SLA policies and an empty ticket list
    Init,

    /// Manage tickets
    Ticket {
        #[command(subcommand)]
        subcommand: TicketSubcommand,
    },

    /// Show response and resolution SLA for one ticket
    Check {
        /// Ticket ID (e.g. T1)
        id: String,

        /// Evaluate as of this RFC 3339 time instead of now
        #[arg(long)]
        now: Option<String>,
    },

    /// SLA dashboard: compliance per track, breaches per priority, tickets at risk
    Report {
        /// Read tickets from a YAML or JSON export instead of the store
        #[arg(long)]
        file: Option<PathBuf>,

        /// Evaluate as of this RFC 3339 time instead of now
        #[arg(long)]
        now: Option<String>,
    },

    /// Inspect and validate SLA policies
    Policy {
        #[command(subcommand)]
        subcommand: PolicySubcommand,
    },

    /// Render an hour count the way the dashboards do
    Format {
        /// Hours (fractional allowed)
        #[arg(allow_negative_numbers = true)]
        hours: f64,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Ticket { subcommand } => cmd::ticket::run(&root, subcommand, cli.json),
        Commands::Check { id, now } => cmd::check::run(&root, &id, now.as_deref(), cli.json),
        Commands::Report { file, now } => {
            cmd::report::run(&root, file.as_deref(), now.as_deref(), cli.json)
        }
        Commands::Policy { subcommand } => cmd::policy::run(&root, subcommand, cli.json),
        Commands::Format { hours } => cmd::format::run(hours, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
