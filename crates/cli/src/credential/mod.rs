// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WHOOP OAuth credential management.
//!
//! A single [`CredentialRecord`] per installation is persisted by
//! [`store::CredentialStore`] and handed out by [`manager::TokenManager`],
//! which refreshes the access token shortly before it expires.
//!
//! The record is created by the browser-based authorization flow, which lives
//! outside this crate; a missing file simply means "not authenticated".

pub mod clock;
pub mod manager;
pub mod store;

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Environment variable that overrides the credential file location.
pub const TOKEN_FILE_ENV: &str = "WHOOP_TOKEN_FILE";

/// Persisted WHOOP credentials for the single authorized user.
///
/// Serialized with camelCase keys so the file stays compatible with the
/// authorization helper that writes the first record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as milliseconds since Unix epoch.
    pub expires_at: u64,
    #[serde(deserialize_with = "user_id_from_string_or_number")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl CredentialRecord {
    /// Build the record that replaces `self` after a successful refresh.
    ///
    /// User identity is carried over; the refresh token is only replaced when
    /// the provider rotated it.
    pub fn refreshed(&self, token: TokenResponse, now_ms: u64) -> Self {
        let refresh_token = match token.refresh_token {
            Some(rotated) if !rotated.is_empty() => rotated,
            _ => self.refresh_token.clone(),
        };
        Self {
            access_token: token.access_token,
            refresh_token,
            expires_at: now_ms.saturating_add(token.expires_in.saturating_mul(1000)),
            ..self.clone()
        }
    }

    /// Identity portion of the record, without either token.
    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// The credential record minus its tokens, safe to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub expires_at: u64,
}

/// Standard OAuth2 token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

/// Registered OAuth application credentials.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Resolve the credential file path.
///
/// Checks `WHOOP_TOKEN_FILE`, then `$HOME/.whoop-mcp/tokens.json`.
pub fn token_file_path() -> PathBuf {
    token_file_path_with(|name| std::env::var(name).ok())
}

/// Inner implementation that accepts an env lookup for testability.
fn token_file_path_with(get_env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(path) = get_env(TOKEN_FILE_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let home = get_env("HOME").or_else(|| get_env("USERPROFILE")).unwrap_or_else(|| ".".to_owned());
    PathBuf::from(home).join(".whoop-mcp").join("tokens.json")
}

/// WHOOP reports `user_id` as a number; older helpers stored it verbatim.
fn user_id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawUserId::deserialize(deserializer)? {
        RawUserId::Text(s) => s,
        RawUserId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
