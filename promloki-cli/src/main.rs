use anyhow::{Context, Result};
use clap::Parser;
use promloki_core::{
    apply_min_step, compute_adaptive_step, logging::init_logging, parse_rfc3339_nano_to_nanos,
    ConfigManager,
};
use promloki_mcp::transport::TransportType;
use promloki_mcp::{create_server, Config};
use tracing::info;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Serve {
            config,
            transport,
            port,
        } => {
            let manager = ConfigManager::load(config.as_deref())
                .context("Failed to load configuration")?;
            let port = port.unwrap_or_else(|| manager.global_config.server_port());
            let server = create_server(manager.global_config, Config::default())?;

            let transport = TransportType::from_name(&transport, port)?;
            info!("Starting prometheus-mcp with {:?} transport", transport);

            match transport {
                TransportType::Stdio => server.start_stdio().await,
                TransportType::Http { port } => server.start_http(port).await,
            }
        }
        Commands::Step {
            start,
            end,
            max_points,
            default_step,
            min_step,
        } => {
            let step = compute_adaptive_step(start, end, max_points, default_step.as_deref())?;
            println!("{}", apply_min_step(&step, min_step.as_deref()));
            Ok(())
        }
        Commands::Timestamp { value } => {
            let nanos = parse_rfc3339_nano_to_nanos(&value)?;
            println!("{}", nanos);
            Ok(())
        }
    }
}
