mod check;
mod serve;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum TwiglsCommand {
    /// Start the LSP server on stdio
    Serve(self::serve::Serve),
    /// Report diagnostics for templates on disk
    Check(self::check::Check),
}

impl Command for TwiglsCommand {
    fn execute(&self, args: &Args) -> Result<Exit> {
        match self {
            TwiglsCommand::Serve(cmd) => cmd.execute(args),
            TwiglsCommand::Check(cmd) => cmd.execute(args),
        }
    }
}
