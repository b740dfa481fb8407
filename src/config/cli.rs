use crate::config::Settings;
use crate::utils::error::Result;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pretino")]
#[command(about = "Authenticated gateway for Pretix event orders")]
pub struct CliConfig {
    /// Path to a TOML settings file. Without it settings come from PRETINO_* variables
    #[arg(short, long, env = "PRETINO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Override the bind port
    #[arg(long)]
    pub port: Option<u16>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads settings from the chosen source and applies command line overrides.
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::from_env()?,
        };

        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }

        Ok(settings)
    }
}
