#![forbid(unsafe_code)]

mod cmd;
mod identity;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use phasewise_core::config::load_user_config;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pw: project phases, budgets and Gantt timelines",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Act as this user (overrides PHASEWISE_USER).
    #[arg(long, global = true)]
    user: Option<String>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        let user_output = load_user_config().ok().and_then(|config| config.output);
        resolve_output_mode(self.format, self.json, user_output.as_deref())
    }

    fn user_flag(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create a .phasewise/ workspace here",
        after_help = "EXAMPLES:\n    pw init\n\n    # Reset config.toml to defaults, keeping projects\n    pw init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(next_help_heading = "Projects", about = "Create, list, show and delete projects")]
    Project {
        #[command(subcommand)]
        command: cmd::project::ProjectCommand,
    },

    #[command(
        next_help_heading = "Projects",
        about = "Edit phases, attachments and reviewers",
        long_about = "Edit phases, attachments and reviewers. When --user or PHASEWISE_USER is set, every change requires a user whose role may edit the timeline."
    )]
    Phase {
        #[command(subcommand)]
        command: cmd::phase::PhaseCommand,
    },

    #[command(next_help_heading = "Projects", about = "Show or change the budget")]
    Budget {
        #[command(subcommand)]
        command: cmd::budget::BudgetCommand,
    },

    #[command(next_help_heading = "Projects", about = "Manage the risk register")]
    Risk {
        #[command(subcommand)]
        command: cmd::risk::RiskCommand,
    },

    #[command(next_help_heading = "Projects", about = "Manage the team")]
    Team {
        #[command(subcommand)]
        command: cmd::team::TeamCommand,
    },

    #[command(next_help_heading = "Projects", about = "Manage stakeholders and meetings")]
    Comms {
        #[command(subcommand)]
        command: cmd::comms::CommsCommand,
    },

    #[command(
        next_help_heading = "Views",
        about = "Draw a project's Gantt chart",
        after_help = "EXAMPLES:\n    pw gantt k3f\n    pw gantt k3f --width 100\n\n    # Bar geometry as JSON\n    pw gantt k3f --json"
    )]
    Gantt(cmd::gantt::GanttArgs),

    #[command(next_help_heading = "Views", about = "Portfolio totals across all projects")]
    Overview,

    #[command(next_help_heading = "Views", about = "List known users and their roles")]
    Users,

    #[command(
        next_help_heading = "Tools",
        about = "Print the duration label for two dates",
        after_help = "EXAMPLES:\n    pw duration 2024-01-01 2024-02-15\n    # 1 month 15 days"
    )]
    Duration(cmd::duration::DurationArgs),

    #[command(next_help_heading = "Tools", about = "Generate shell completions")]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PHASEWISE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "phasewise=debug,pw=debug,info"
        } else {
            "phasewise=info,pw=info,warn"
        })
    });

    let format = env::var("PHASEWISE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let output = cli.output_mode();
    debug!(?output, root = %project_root.display(), "resolved output mode");

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, cli.quiet, &project_root),
        Commands::Project { command } => cmd::project::run_project(command, output, &project_root),
        Commands::Phase { command } => {
            cmd::phase::run_phase(command, cli.user_flag(), output, &project_root)
        }
        Commands::Budget { command } => cmd::budget::run_budget(command, output, &project_root),
        Commands::Risk { command } => cmd::risk::run_risk(command, output, &project_root),
        Commands::Team { command } => cmd::team::run_team(command, output, &project_root),
        Commands::Comms { command } => cmd::comms::run_comms(command, output, &project_root),
        Commands::Gantt(args) => cmd::gantt::run_gantt(args, output, &project_root),
        Commands::Overview => cmd::overview::run_overview(output, &project_root),
        Commands::Users => cmd::users::run_users(output, &project_root),
        Commands::Duration(args) => cmd::duration::run_duration(args, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
