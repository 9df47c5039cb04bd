// SPDX-License-Identifier: BUSL-1.1
// Copyright 2025 Alfred Jean LLC

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of every failure the WHOOP client can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No usable token; re-run the authorization flow.
    Unauthenticated,
    RefreshFailed,
    NotFound,
    /// Try again later.
    RateLimited,
    ApiError,
    /// Network or body-decoding failure before a usable response.
    Transport,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::RefreshFailed => "REFRESH_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::ApiError => "API_ERROR",
            Self::Transport => "TRANSPORT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the token manager and the API client.
#[derive(Debug, thiserror::Error)]
pub enum WhoopError {
    #[error("not authenticated: run the WHOOP authorization flow to sign in")]
    Unauthenticated,

    /// The API rejected the bearer token (HTTP 401).
    #[error("Authentication failed: {0}. Please re-authenticate with WHOOP.")]
    AuthenticationFailed(String),

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}. Please try again later.")]
    RateLimited(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl WhoopError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthenticated | Self::AuthenticationFailed(_) => ErrorCode::Unauthenticated,
            Self::RefreshFailed(_) => ErrorCode::RefreshFailed,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::RateLimited(_) => ErrorCode::RateLimited,
            Self::Api { .. } => ErrorCode::ApiError,
            Self::Transport(_) | Self::InvalidBody(_) | Self::InvalidUrl(_) => {
                ErrorCode::Transport
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
