//! Command-line interface.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nodewarden - node inventory and SSH access provisioning
#[derive(Parser, Debug, Clone)]
#[command(name = "nodewarden")]
#[command(author = "Nodewarden Contributors")]
#[command(version)]
#[command(about = "Node inventory and SSH access provisioning service", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "NODEWARDEN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the REST API server
    Serve(ServeArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Bind address, overriding the configuration file
    #[arg(short = 'b', long)]
    pub bind: Option<SocketAddr>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_command_parses() {
        let cli = Cli::parse_from(["nodewarden", "serve", "--bind", "0.0.0.0:9000"]);
        let Commands::Serve(args) = &cli.command;
        assert_eq!(args.bind.unwrap().port(), 9000);
    }

    #[test]
    fn test_verbosity_accumulates() {
        let cli = Cli::parse_from(["nodewarden", "-vv", "serve"]);
        assert_eq!(cli.verbosity(), 2);
    }
}
