// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::client::{api_base_url, token_url, DEFAULT_API_URL};
use crate::command::Command;
use crate::credential::{token_file_path, ClientCredentials};

/// Command-line access to WHOOP data using the locally stored OAuth credentials.
#[derive(Debug, Parser)]
#[command(name = "whoop-mcp", version, about)]
pub struct Config {
    /// OAuth client ID of the registered WHOOP application.
    #[arg(long, global = true, env = "WHOOP_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret of the registered WHOOP application.
    #[arg(long, global = true, env = "WHOOP_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Credential file (defaults to ~/.whoop-mcp/tokens.json).
    #[arg(long, global = true, env = "WHOOP_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// WHOOP API host.
    #[arg(long, global = true, env = "WHOOP_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = "WHOOP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log format (json or text).
    #[arg(long, global = true, env = "WHOOP_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "WHOOP_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other} (expected json or text)"),
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("--timeout-secs must be greater than zero");
        }
        let has_id = self.client_id.as_deref().is_some_and(|s| !s.is_empty());
        let has_secret = self.client_secret.as_deref().is_some_and(|s| !s.is_empty());
        if has_id != has_secret {
            anyhow::bail!("WHOOP_CLIENT_ID and WHOOP_CLIENT_SECRET must be set together");
        }
        reqwest::Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("invalid API URL {:?}: {e}", self.api_url))?;
        Ok(())
    }

    /// Client credentials, if both halves are configured.
    pub fn client_credentials(&self) -> Option<ClientCredentials> {
        let client_id = self.client_id.clone().filter(|s| !s.is_empty())?;
        let client_secret = self.client_secret.clone().filter(|s| !s.is_empty())?;
        Some(ClientCredentials { client_id, client_secret })
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_file.clone().unwrap_or_else(token_file_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token_url(&self) -> String {
        token_url(&self.api_url)
    }

    pub fn api_base_url(&self) -> String {
        api_base_url(&self.api_url)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
