// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serial_test::serial;

use super::Config;
use crate::command::Command;

const ENV_VARS: &[&str] = &[
    "WHOOP_CLIENT_ID",
    "WHOOP_CLIENT_SECRET",
    "WHOOP_TOKEN_FILE",
    "WHOOP_API_URL",
    "WHOOP_TIMEOUT_SECS",
    "WHOOP_LOG_FORMAT",
    "WHOOP_LOG_LEVEL",
];

fn parse(args: &[&str]) -> anyhow::Result<Config> {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
    Ok(Config::try_parse_from(args)?)
}

#[test]
#[serial]
fn defaults() -> anyhow::Result<()> {
    let config = parse(&["whoop-mcp", "status"])?;
    config.validate()?;
    assert!(matches!(config.command, Command::Status));
    assert_eq!(config.api_url, "https://api.prod.whoop.com");
    assert_eq!(config.token_url(), "https://api.prod.whoop.com/oauth/oauth2/token");
    assert_eq!(config.api_base_url(), "https://api.prod.whoop.com/developer");
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert_eq!(config.log_format, "text");
    assert!(config.client_credentials().is_none());
    Ok(())
}

#[test]
#[serial]
fn global_flags_after_subcommand() -> anyhow::Result<()> {
    let config = parse(&[
        "whoop-mcp",
        "refresh",
        "--client-id",
        "id",
        "--client-secret",
        "secret",
        "--token-file",
        "/tmp/whoop/tokens.json",
    ])?;
    config.validate()?;
    assert!(matches!(config.command, Command::Refresh));
    let creds = config.client_credentials().ok_or_else(|| anyhow::anyhow!("no creds"))?;
    assert_eq!(creds.client_id, "id");
    assert_eq!(creds.client_secret, "secret");
    assert_eq!(config.token_path(), PathBuf::from("/tmp/whoop/tokens.json"));
    Ok(())
}

#[test]
#[serial]
fn env_vars_are_read() -> anyhow::Result<()> {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
    std::env::set_var("WHOOP_CLIENT_ID", "env-id");
    std::env::set_var("WHOOP_CLIENT_SECRET", "env-secret");
    std::env::set_var("WHOOP_TOKEN_FILE", "/env/tokens.json");
    let result = Config::try_parse_from(["whoop-mcp", "status"]);
    for var in ENV_VARS {
        std::env::remove_var(var);
    }

    let config = result?;
    assert_eq!(config.client_id.as_deref(), Some("env-id"));
    assert_eq!(config.token_path(), PathBuf::from("/env/tokens.json"));
    Ok(())
}

#[test]
#[serial]
fn invalid_configs_are_rejected() -> anyhow::Result<()> {
    let cases: &[(&[&str], &str)] = &[
        (&["whoop-mcp", "--log-format", "xml", "status"], "invalid log format"),
        (&["whoop-mcp", "--timeout-secs", "0", "status"], "greater than zero"),
        (&["whoop-mcp", "--client-id", "id", "status"], "set together"),
        (&["whoop-mcp", "--client-secret", "s", "status"], "set together"),
        (&["whoop-mcp", "--api-url", "not a url", "status"], "invalid API URL"),
    ];
    for (args, expected) in cases {
        let config = parse(args)?;
        let err = config.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains(expected), "expected {expected:?} in {err:?} for {args:?}");
    }
    Ok(())
}

#[test]
#[serial]
fn page_flags_are_range_checked() -> anyhow::Result<()> {
    assert!(parse(&["whoop-mcp", "cycles", "--limit", "26"]).is_err());
    assert!(parse(&["whoop-mcp", "cycles", "--limit", "0"]).is_err());
    assert!(parse(&["whoop-mcp", "sleeps", "--days", "31"]).is_err());
    let config = parse(&["whoop-mcp", "cycles", "--limit", "25", "--days", "7"])?;
    let Command::Cycles(page) = config.command else {
        anyhow::bail!("expected cycles command");
    };
    assert_eq!(page.limit, 25);
    assert_eq!(page.days, Some(7));
    Ok(())
}
