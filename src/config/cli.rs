use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "defense-scheduler")]
#[command(about = "Assigns thesis committees and schedules defense presentations")]
pub struct CliConfig {
    #[arg(long, short, default_value = "./defense.toml")]
    pub config: String,

    #[arg(long, help = "Override the store path from the configuration file")]
    pub store: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Give every incomplete committee an advisor and two readers
    Assign,
    /// Place committees into the configured classroom slots
    Schedule,
    /// Assign committees, then schedule them
    Run,
    /// List the professor clashes a swap would cause
    CheckSwap { first: i64, second: i64 },
    /// Exchange time and room of two presentations
    Swap {
        first: i64,
        second: i64,
        #[arg(long, help = "Swap even when professors would clash")]
        force: bool,
    },
}
