// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WHOOP API access on behalf of a single locally authorized user.

pub mod client;
pub mod command;
pub mod config;
pub mod credential;
pub mod error;
pub mod model;

use std::sync::{Arc, Once};

use anyhow::Context;
use tracing::debug;

use crate::client::WhoopClient;
use crate::config::Config;
use crate::credential::manager::TokenManager;
use crate::credential::store::CredentialStore;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times; only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Build the process-wide client: one HTTP pool, one token manager.
pub fn connect(config: &Config) -> anyhow::Result<WhoopClient> {
    ensure_crypto();
    let http = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .context("build HTTP client")?;

    let store = CredentialStore::new(config.token_path());
    debug!(path = %store.path().display(), "using credential file");

    let tokens = TokenManager::new(
        store,
        http.clone(),
        config.token_url(),
        config.client_credentials(),
    );
    Ok(WhoopClient::new(http, config.api_base_url(), Arc::new(tokens)))
}

/// Run the configured subcommand and print its JSON result to stdout.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = connect(&config)?;
    let value = command::execute(&config.command, &client).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
