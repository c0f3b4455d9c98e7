//! Settings of the binary. Read from `config/walletwatch.toml` (or `--config`),
//! then `WALLETWATCH__*` environment variables, then command-line flags.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [filemaker]
//! server_url = "https://fm.example.com"
//! database = "WalletWatch"
//! username = "api"
//! password = "..."
//! ```

use client::ClientConfig;
use serde::Deserialize;

use crate::{cli::Cli, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/walletwatch.toml";
const DEFAULT_STATE_PATH: &str = "config/walletwatch_state.json";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    pub state_path: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            state_path: DEFAULT_STATE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub filemaker: ClientConfig,
}

impl Settings {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("WALLETWATCH").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(server_url) = &cli.server_url {
            settings.filemaker.server_url = server_url.clone();
        }
        if let Some(database) = &cli.database {
            settings.filemaker.database = database.clone();
        }
        if let Some(state_path) = &cli.state {
            settings.app.state_path = state_path.clone();
        }
        Ok(settings)
    }
}
