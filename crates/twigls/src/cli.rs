use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::TwiglsCommand;
use crate::exit::Exit;

/// Language server and linter for Twig templates.
#[derive(Parser)]
#[command(name = "twigls")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: TwiglsCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command.
pub fn run<I, T>(args: I) -> Result<Exit>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| e.exit());
    cli.command.execute(&cli.args)
}

/// Log to stderr, for commands that do not own stdio for a protocol.
pub fn init_stderr_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
