//! Chef Server search client
//!
//! Issues `GET {server}/search/node?q=...` and parses the JSON answer.
//! Requests are not signed, and a config that sets `key` is refused by
//! [`ApiConfig::validate`]. Point `server` at an endpoint that accepts the
//! client as-is (chef-zero, or a signing proxy).

use super::{NodeSearch, ResultSet};
use crate::config::ApiConfig;
use crate::error::ChefError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Search index queried by `{{chef>...}}` tags
const NODE_INDEX: &str = "node";

/// HTTP client for the Chef Server API
pub struct ChefClient {
    http: reqwest::Client,
    server: Url,
    client_name: String,
    version: String,
}

impl ChefClient {
    /// Build a client from validated settings
    pub fn new(config: &ApiConfig) -> Result<Self, ChefError> {
        let server = config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            server,
            client_name: config.client.clone(),
            version: config.version.clone(),
        })
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    /// `{server}/search/{index}?q={query}`, keeping any organization path
    fn search_url(&self, index: &str, query: &str) -> Result<Url, ChefError> {
        let mut url = self.server.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ChefError::Config(format!("server URL '{}' cannot have a path", self.server))
            })?
            .pop_if_empty()
            .extend(["search", index]);
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }
}

#[async_trait]
impl NodeSearch for ChefClient {
    fn name(&self) -> &str {
        "chef"
    }

    async fn search(&self, query: &str) -> Result<ResultSet, ChefError> {
        let url = self.search_url(NODE_INDEX, query)?;

        tracing::debug!(
            client = %self.client_name,
            url = %url,
            "Sending search request to Chef Server"
        );

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .header("X-Chef-Version", &self.version)
            .header("X-Ops-UserId", &self.client_name)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if let Some(message) = api_error(&body) {
            tracing::error!(status = %status, error = %message, "Chef API error");
            return Err(ChefError::Api(message));
        }

        if !status.is_success() {
            tracing::error!(status = %status, "Chef Server returned an error status");
            return Err(ChefError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let result: ResultSet = serde_json::from_str(&body)?;
        tracing::debug!(total = result.total, rows = result.rows.len(), "search complete");
        Ok(result)
    }
}

/// Extract the `error` field of an API answer, joined with ", "
fn api_error(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Some(parts.join(", "))
        }
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
