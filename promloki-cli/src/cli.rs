use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "promloki",
    about = "MCP bridge exposing Prometheus and Loki queries as tools",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level when neither RUST_LOG nor PROM_LOG_LEVEL is set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server
    Serve {
        /// Config file (JSON, or TOML by extension)
        #[arg(short, long, env = "PROM_CONFIG_PATH")]
        config: Option<PathBuf>,

        /// Transport to serve on (stdio or http)
        #[arg(short, long, default_value = "http")]
        transport: String,

        /// HTTP port, defaults to serverPort from the config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the adaptive step for a time range
    Step {
        /// Range start, unix seconds
        #[arg(long, allow_negative_numbers = true)]
        start: i64,

        /// Range end, unix seconds
        #[arg(long, allow_negative_numbers = true)]
        end: i64,

        /// Maximum number of samples
        #[arg(long)]
        max_points: Option<i64>,

        /// Step used when no point budget is given
        #[arg(long)]
        default_step: Option<String>,

        /// Smallest step allowed
        #[arg(long)]
        min_step: Option<String>,
    },

    /// Convert an RFC3339Nano timestamp to unix nanoseconds
    Timestamp {
        /// e.g. 2025-08-26T20:00:00.123+08:00
        value: String,
    },
}
