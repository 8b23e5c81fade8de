pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "ariva",
    about = "Ariva AR operator CLI",
    long_about = "Run canned AR reports over an invoice snapshot, check route authorization decisions, and inspect runtime configuration.",
    after_help = "Examples:\n  ariva report --kind aging --input invoices.json\n  ariva authz --role collector --path /dashboard/manager\n  ariva doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Aging,
    Disputes,
    Ptp,
    Performance,
    Regions,
    Customers,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Build a canned report from a JSON invoice snapshot and print it as JSON")]
    Report {
        #[arg(long, value_enum, help = "Which report to build")]
        kind: ReportKind,
        #[arg(long, help = "Path to the JSON invoice snapshot file")]
        input: PathBuf,
        #[arg(long, help = "Reference date (YYYY-MM-DD); defaults to today")]
        as_of: Option<chrono::NaiveDate>,
    },
    #[command(about = "Evaluate the route access policy for a role and path")]
    Authz {
        #[arg(long, help = "Subject role label")]
        role: String,
        #[arg(long, help = "Requested resource path")]
        path: String,
    },
    #[command(about = "Inspect effective configuration values and their sources")]
    Config,
    #[command(about = "Validate config and snapshot readiness with per-check details")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Report { kind, input, as_of } => commands::report::run(kind, &input, as_of),
        Command::Authz { role, path } => commands::authz::run(&role, &path),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
