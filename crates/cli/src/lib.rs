pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "freightdesk",
    about = "Freightdesk operator CLI",
    long_about = "Run carrier eligibility checks, price caps, negotiation rounds, and load-board searches from the terminal.",
    after_help = "Examples:\n  freightdesk verify MC-76667\n  freightdesk evaluate --load-id L-1001 --listed 2000 --ask 2200 --round 1\n  freightdesk cap --listed 2000 --miles 250 --equipment reefer\n  freightdesk doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Verify a carrier MC number against the registry")]
    Verify {
        #[arg(help = "MC number in any formatting; non-digits are stripped")]
        mc: String,
        #[arg(long, help = "Include the raw registry fragments in the output")]
        evidence: bool,
    },
    #[command(about = "Evaluate one negotiation round and print the decision")]
    Evaluate(commands::evaluate::EvaluateArgs),
    #[command(about = "Print the price cap and its breakdown for a load")]
    Cap(commands::cap::CapArgs),
    #[command(about = "Search a load-board catalog file for matching postings")]
    Loads(commands::loads::LoadsArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, web-key readiness, and registry reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Command {
    fn execute(self) -> CommandResult {
        match self {
            Self::Verify { mc, evidence } => commands::verify::run(&mc, evidence),
            Self::Evaluate(args) => commands::evaluate::run(&args),
            Self::Cap(args) => commands::cap::run(&args),
            Self::Loads(args) => commands::loads::run(&args),
            Self::Config => CommandResult { exit_code: 0, output: commands::config::run() },
            Self::Doctor { json } => {
                CommandResult { exit_code: 0, output: commands::doctor::run(json) }
            }
        }
    }
}

pub fn run() -> ExitCode {
    let result = Cli::parse().command.execute();
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
