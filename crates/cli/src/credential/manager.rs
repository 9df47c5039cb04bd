// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token lifecycle: cache the credential record, refresh it on demand.
//!
//! Refresh happens only when a caller asks for a token and the cached one is
//! within [`EXPIRY_BUFFER`] of expiring. There is no background loop and no
//! retry; a failed refresh yields no token and the caller decides what to do.
//!
//! Other processes sharing the credential file are not coordinated with. A
//! refresh done elsewhere is only seen after this manager reloads the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::credential::clock::{system_clock, Clock};
use crate::credential::store::CredentialStore;
use crate::credential::{ClientCredentials, CredentialRecord, TokenResponse, UserInfo};
use crate::error::WhoopError;

/// Margin before expiry at which a token is treated as stale.
pub const EXPIRY_BUFFER: Duration = Duration::from_secs(5 * 60);

/// Hands out a currently valid WHOOP access token.
pub struct TokenManager {
    store: CredentialStore,
    clock: Arc<dyn Clock>,
    http: reqwest::Client,
    token_url: String,
    client: Option<ClientCredentials>,
    /// Last loaded or refreshed record.
    cache: Mutex<Option<CredentialRecord>>,
}

impl TokenManager {
    pub fn new(
        store: CredentialStore,
        http: reqwest::Client,
        token_url: impl Into<String>,
        client: Option<ClientCredentials>,
    ) -> Self {
        Self {
            store,
            clock: system_clock(),
            http,
            token_url: token_url.into(),
            client,
            cache: Mutex::new(None),
        }
    }

    /// Replace the time source (tests pin it to a fixed instant).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Return a valid access token, refreshing first if it is about to expire.
    ///
    /// `None` when no credentials exist or a required refresh failed; the
    /// stale token is never returned.
    pub async fn get_valid_token(&self) -> Option<String> {
        let mut cache = self.cache.lock().await;
        self.load_if_empty(&mut cache);

        let expires_at = cache.as_ref()?.expires_at;
        if self.is_stale(expires_at) {
            debug!(expires_at, "access token expired or expiring soon, refreshing");
            if let Err(e) = self.refresh_locked(&mut cache).await {
                warn!(err = %e, "failed to refresh token, re-run the authorization flow");
                return None;
            }
        } else {
            debug!(expires_at, "using cached access token");
        }

        cache.as_ref().map(|record| record.access_token.clone())
    }

    /// Like [`get_valid_token`](Self::get_valid_token) but fails with
    /// [`WhoopError::Unauthenticated`] when no token is available.
    pub async fn require_auth(&self) -> Result<String, WhoopError> {
        self.get_valid_token().await.ok_or(WhoopError::Unauthenticated)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.get_valid_token().await.is_some()
    }

    /// Perform a refresh-token grant now, regardless of expiry.
    pub async fn refresh_access_token(&self) -> Result<(), WhoopError> {
        let mut cache = self.cache.lock().await;
        self.load_if_empty(&mut cache);
        self.refresh_locked(&mut cache).await
    }

    /// Identity of the authorized user, without tokens. Never refreshes.
    pub async fn user_info(&self) -> Option<UserInfo> {
        let mut cache = self.cache.lock().await;
        self.load_if_empty(&mut cache);
        cache.as_ref().map(CredentialRecord::user_info)
    }

    /// Snapshot of the cached record, if any.
    pub async fn cached(&self) -> Option<CredentialRecord> {
        self.cache.lock().await.clone()
    }

    /// Replace the cached record with whatever the store holds now.
    pub async fn reload(&self) {
        *self.cache.lock().await = self.store.load();
    }

    fn load_if_empty(&self, cache: &mut Option<CredentialRecord>) {
        if cache.is_none() {
            *cache = self.store.load();
        }
    }

    fn is_stale(&self, expires_at: u64) -> bool {
        let buffer_ms = EXPIRY_BUFFER.as_millis() as u64;
        self.clock.now_ms() >= expires_at.saturating_sub(buffer_ms)
    }

    /// Exchange the cached refresh token, then persist and cache the result.
    ///
    /// The cache is only replaced after the new record is on disk; any
    /// failure leaves it untouched.
    async fn refresh_locked(
        &self,
        cache: &mut Option<CredentialRecord>,
    ) -> Result<(), WhoopError> {
        let current = cache
            .as_ref()
            .ok_or_else(|| WhoopError::RefreshFailed("no stored credentials".into()))?;
        if current.refresh_token.is_empty() {
            return Err(WhoopError::RefreshFailed("no refresh token available".into()));
        }
        let client = self.client.as_ref().ok_or_else(|| {
            WhoopError::RefreshFailed(
                "WHOOP_CLIENT_ID and WHOOP_CLIENT_SECRET must be set".into(),
            )
        })?;

        let token = self.request_token(client, &current.refresh_token).await?;
        let refreshed = current.refreshed(token, self.clock.now_ms());

        self.store
            .save(&refreshed)
            .map_err(|e| WhoopError::RefreshFailed(format!("save credentials: {e:#}")))?;

        info!(expires_at = refreshed.expires_at, "access token refreshed");
        *cache = Some(refreshed);
        Ok(())
    }

    /// Single refresh-token grant against the token endpoint.
    async fn request_token(
        &self,
        client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, WhoopError> {
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| WhoopError::RefreshFailed(format!("HTTP error: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| WhoopError::RefreshFailed(format!("read body: {e}")))?;

        if !status.is_success() {
            return Err(WhoopError::RefreshFailed(format!("HTTP {status}: {body}")));
        }

        serde_json::from_str(&body)
            .map_err(|e| WhoopError::RefreshFailed(format!("parse response: {e}")))
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
