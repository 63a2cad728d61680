//! Admin console API client.
//!
//! [`AdminClient`] wraps a configured `reqwest::Client` with:
//!
//! - a validated base URL (any scheme for localhost, https elsewhere)
//! - an optional bearer token taken from the console config
//! - a consistent User-Agent and JSON Accept header
//!
//! The [`ConsoleApi`] trait is the seam front ends depend on, so session and
//! group loading can be exercised without a server.

mod console;
mod error;

pub use console::{ConsoleApi, fetch_current_user, fetch_user_groups, send_impersonation};
pub use error::ApiError;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use conform_types::{ImpersonateRequest, User, UserGroup};
use conform_util::{ConsoleConfig, redact_sensitive};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

pub const CURRENT_USER_PATH: &str = "/api/me";
pub const USER_GROUPS_PATH: &str = "/api/manage/admin/user-group";
pub const IMPERSONATE_PATH: &str = "/api/tenants/impersonate";

/// Thin wrapper around a configured `reqwest::Client` for console access.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl AdminClient {
    /// Builds a client against `base_url`, authenticating with `api_key` when
    /// present.
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        if let Some(api_key) = api_key {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {api_key}"))?;
            value.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, value);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("conform/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Builds a client from the console config.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base, config.api_key.as_deref(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API-relative path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%url, %method, "building request");
        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<(StatusCode, Option<T>), ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok((status, None));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: redact_sensitive(&text),
            });
        }
        Ok((status, Some(serde_json::from_str(&text)?)))
    }
}

#[async_trait]
impl ConsoleApi for AdminClient {
    async fn current_user(&self) -> Result<Option<User>, ApiError> {
        let (status, user) = self.get_json::<User>(CURRENT_USER_PATH).await?;
        debug!(status = status.as_u16(), signed_in = user.is_some(), "current user fetched");
        Ok(user)
    }

    async fn user_groups(&self) -> Result<Vec<UserGroup>, ApiError> {
        let (status, groups) = self.get_json::<Vec<UserGroup>>(USER_GROUPS_PATH).await?;
        match groups {
            Some(groups) => Ok(groups),
            None => Err(ApiError::Status {
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    async fn impersonate(&self, request: &ImpersonateRequest) -> Result<u16, ApiError> {
        let response = self.request(Method::POST, IMPERSONATE_PATH).json(request).send().await?;
        Ok(response.status().as_u16())
    }
}

/// Validate that a base URL is acceptable for use by the client, returning it
/// without a trailing slash.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
pub fn validate_base_url(base: &str) -> Result<String, ApiError> {
    let parsed = Url::parse(base.trim()).map_err(|error| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason: error.to_string(),
    })?;

    let host_name = parsed.host_str().ok_or_else(|| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason: "missing host".to_string(),
    })?;

    let is_local = LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed));
    if !is_local && parsed.scheme() != "https" {
        return Err(ApiError::InsecureScheme {
            scheme: parsed.scheme().to_string(),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
