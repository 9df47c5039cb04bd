// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommands of the `whoop-mcp` binary.
//!
//! Each command produces a JSON value that the binary prints to stdout.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Value};
use tracing::info;

use crate::client::{PageParams, WhoopClient, MAX_PAGE_LIMIT};

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Show whether usable credentials exist and whom they belong to.
    Status,
    /// Exchange the refresh token for a new access token now.
    Refresh,
    /// List recent physiological cycles.
    Cycles(PageArgs),
    /// Fetch a single cycle.
    Cycle { id: i64 },
    /// List recent sleeps.
    Sleeps(PageArgs),
    /// Fetch a single sleep.
    Sleep { id: String },
    /// Fetch the recovery scored for a cycle.
    Recovery { cycle_id: i64 },
    /// Fetch the sleep that belongs to a cycle.
    CycleSleep { cycle_id: i64 },
}

/// Pagination flags shared by the collection commands.
#[derive(Debug, Clone, clap::Args)]
pub struct PageArgs {
    /// Number of records to return.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_LIMIT as i64))]
    pub limit: u32,

    /// Only include records from the last N days.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=30))]
    pub days: Option<u32>,

    /// Continue from a previous page.
    #[arg(long)]
    pub next_token: Option<String>,
}

impl PageArgs {
    pub fn to_params(&self, now: DateTime<Utc>) -> PageParams {
        let (start, end) = match self.days {
            Some(days) => {
                let start = now - chrono::Duration::days(i64::from(days));
                (Some(rfc3339(start)), Some(rfc3339(now)))
            }
            None => (None, None),
        };
        PageParams { limit: Some(self.limit), start, end, next_token: self.next_token.clone() }
    }
}

/// Run one command against the shared client.
pub async fn execute(command: &Command, client: &WhoopClient) -> anyhow::Result<Value> {
    let value = match command {
        Command::Status => status(client).await?,
        Command::Refresh => refresh(client).await?,
        Command::Cycles(page) => {
            serde_json::to_value(client.cycle_collection(&page.to_params(Utc::now())).await?)?
        }
        Command::Cycle { id } => serde_json::to_value(client.cycle_by_id(*id).await?)?,
        Command::Sleeps(page) => {
            serde_json::to_value(client.sleep_collection(&page.to_params(Utc::now())).await?)?
        }
        Command::Sleep { id } => serde_json::to_value(client.sleep_by_id(id).await?)?,
        Command::Recovery { cycle_id } => {
            serde_json::to_value(client.recovery_for_cycle(*cycle_id).await?)?
        }
        Command::CycleSleep { cycle_id } => {
            serde_json::to_value(client.sleep_for_cycle(*cycle_id).await?)?
        }
    };
    Ok(value)
}

async fn status(client: &WhoopClient) -> anyhow::Result<Value> {
    let tokens = client.tokens();
    let authenticated = tokens.is_authenticated().await;
    let user = tokens.user_info().await;
    Ok(json!({
        "authenticated": authenticated,
        "tokenFile": tokens.store().path(),
        "expiresAt": user.as_ref().and_then(|u| epoch_ms_rfc3339(u.expires_at)),
        "user": user,
    }))
}

async fn refresh(client: &WhoopClient) -> anyhow::Result<Value> {
    let tokens = client.tokens();
    let previous = tokens.user_info().await.map(|u| u.expires_at);

    tokens.refresh_access_token().await.map_err(|e| {
        anyhow::anyhow!("{e}; you may need to re-run the WHOOP authorization flow")
    })?;

    let expires_at = tokens.cached().await.map(|r| r.expires_at);
    info!(?expires_at, "token refreshed from command line");
    Ok(json!({
        "refreshed": true,
        "previousExpiresAt": previous.and_then(epoch_ms_rfc3339),
        "expiresAt": expires_at.and_then(epoch_ms_rfc3339),
    }))
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn epoch_ms_rfc3339(ms: u64) -> Option<String> {
    Utc.timestamp_millis_opt(i64::try_from(ms).ok()?).single().map(rfc3339)
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
