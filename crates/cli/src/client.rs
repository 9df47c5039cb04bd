// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated WHOOP API client.
//!
//! Every call first obtains a valid token from the [`TokenManager`], then
//! issues the request with a bearer header and maps non-2xx responses onto
//! [`WhoopError`]. Nothing is retried, including rate-limit responses.
//!
//! Construct one client per process and share it (it is cheap to clone).

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::credential::manager::TokenManager;
use crate::error::WhoopError;
use crate::model::{Cycle, Page, Recovery, Sleep};

/// Production WHOOP host.
pub const DEFAULT_API_URL: &str = "https://api.prod.whoop.com";

/// OAuth2 token endpoint path, relative to the host.
pub const TOKEN_PATH: &str = "/oauth/oauth2/token";

/// Developer API base path, relative to the host.
pub const API_BASE_PATH: &str = "/developer";

/// Largest page size the collection endpoints accept.
pub const MAX_PAGE_LIMIT: u32 = 25;

/// Token endpoint URL for a host such as [`DEFAULT_API_URL`].
pub fn token_url(api_url: &str) -> String {
    format!("{}{TOKEN_PATH}", api_url.trim_end_matches('/'))
}

/// Resource API base URL for a host such as [`DEFAULT_API_URL`].
pub fn api_base_url(api_url: &str) -> String {
    format!("{}{API_BASE_PATH}", api_url.trim_end_matches('/'))
}

/// Optional pagination parameters for collection endpoints.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub limit: Option<u32>,
    /// RFC 3339 lower bound.
    pub start: Option<String>,
    /// RFC 3339 upper bound.
    pub end: Option<String>,
    pub next_token: Option<String>,
}

impl PageParams {
    /// Query pairs for the parameters that are set; unset, empty or zero
    /// values are left out.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        let strings = [("start", &self.start), ("end", &self.end), ("nextToken", &self.next_token)];
        for (key, value) in strings {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_owned()));
            }
        }
        pairs
    }
}

/// Per-call request settings merged into the authenticated request.
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    /// Defaults to GET.
    pub method: Option<Method>,
    /// Extra headers. An `Authorization` entry here is ignored.
    pub headers: HeaderMap,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn with_query(query: Vec<(&'static str, String)>) -> Self {
        Self { query, ..Self::default() }
    }
}

#[derive(Clone)]
pub struct WhoopClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenManager>,
}

impl WhoopClient {
    /// `base_url` is the resource API root, e.g. [`api_base_url`]`(DEFAULT_API_URL)`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, tokens: Arc<TokenManager>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Issue an authenticated request and decode the JSON response as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, WhoopError> {
        let token = self.tokens.require_auth().await?;

        let mut url = reqwest::Url::parse(&format!("{}{endpoint}", self.base_url))
            .map_err(|e| WhoopError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if !options.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &options.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = options.headers;
        headers.remove(AUTHORIZATION);
        headers.entry(CONTENT_TYPE).or_insert(HeaderValue::from_static("application/json"));

        let method = options.method.unwrap_or(Method::GET);
        debug!(%method, path = url.path(), "WHOOP API request");

        let mut req = self.http.request(method, url).headers(headers).bearer_auth(token);
        if let Some(ref body) = options.body {
            req = req.body(serde_json::to_vec(body)?);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify(status, &body));
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn sleep_by_id(&self, sleep_id: &str) -> Result<Sleep, WhoopError> {
        self.request(&format!("/v2/activity/sleep/{sleep_id}"), RequestOptions::default()).await
    }

    pub async fn sleep_collection(&self, params: &PageParams) -> Result<Page<Sleep>, WhoopError> {
        self.request("/v2/activity/sleep", RequestOptions::with_query(params.query_pairs())).await
    }

    pub async fn cycle_by_id(&self, cycle_id: i64) -> Result<Cycle, WhoopError> {
        self.request(&format!("/v2/cycle/{cycle_id}"), RequestOptions::default()).await
    }

    pub async fn cycle_collection(&self, params: &PageParams) -> Result<Page<Cycle>, WhoopError> {
        self.request("/v2/cycle", RequestOptions::with_query(params.query_pairs())).await
    }

    pub async fn recovery_for_cycle(&self, cycle_id: i64) -> Result<Recovery, WhoopError> {
        self.request(&format!("/v2/cycle/{cycle_id}/recovery"), RequestOptions::default()).await
    }

    pub async fn sleep_for_cycle(&self, cycle_id: i64) -> Result<Sleep, WhoopError> {
        self.request(&format!("/v2/cycle/{cycle_id}/sleep"), RequestOptions::default()).await
    }
}

/// Map a non-success response onto an error, folding in the API's message.
pub(crate) fn classify(status: StatusCode, body: &str) -> WhoopError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).unwrap_or_default();
    let field = |key: &str| parsed.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty());
    let detail = field("message")
        .or_else(|| field("error"))
        .map_or_else(|| status.to_string(), str::to_owned);
    let message = format!("WHOOP API Error: {detail}");

    match status {
        StatusCode::UNAUTHORIZED => WhoopError::AuthenticationFailed(message),
        StatusCode::NOT_FOUND => WhoopError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => WhoopError::RateLimited(message),
        _ => WhoopError::Api { status: status.as_u16(), message },
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
