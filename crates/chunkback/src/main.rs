// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Chunkback server binary

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chunkback::{ChunkbackConfig, Server};
use chunkback_logging::CliLoggingArgs;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chunkback", version, about = "Mock LLM server streaming CBPL scripts")]
struct Cli {
    #[command(flatten)]
    logging: CliLoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the OpenAI, Anthropic and Gemini compatible endpoints
    Serve {
        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(long, env = "HOST_PORT")]
        port: Option<u16>,

        /// Disable permissive CORS
        #[arg(long)]
        no_cors: bool,

        /// Require this API key (repeatable)
        #[arg(long = "api-key")]
        api_keys: Vec<String>,
    },

    /// Print the commands a script parses to, as JSON
    Parse {
        /// Script file, or `-` for stdin
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.logging.init("chunkback")?;

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            no_cors,
            api_keys,
        } => {
            let mut config = match config {
                Some(path) => ChunkbackConfig::from_file(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => ChunkbackConfig::default(),
            };
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port.or_else(port_from_env) {
                config.server.port = port;
            }
            if no_cors {
                config.server.cors_enabled = false;
            }
            config.security.api_keys.extend(api_keys);

            let server = Server::new(config)?;
            server.run().await?;
        }
        Commands::Parse { file } => {
            let script = if file.as_os_str() == "-" {
                let mut script = String::new();
                std::io::stdin().read_to_string(&mut script)?;
                script
            } else {
                std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?
            };
            let commands = chunkback_cbpl::parse_script(&script)?;
            println!("{}", serde_json::to_string_pretty(&commands)?);
        }
    }

    Ok(())
}

/// `PORT` applies when neither `--port` nor `HOST_PORT` is set.
fn port_from_env() -> Option<u16> {
    std::env::var("PORT").ok()?.parse().ok()
}
