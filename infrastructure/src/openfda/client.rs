//! Reqwest-backed adapter for the openFDA enforcement endpoint

use crate::config::SourceSettings;
use crate::openfda::types::{EnforcementPage, is_empty_window};
use async_trait::async_trait;
use herald_application::{RecallSource, SourceError};
use herald_domain::RecallRecord;
use reqwest::StatusCode;
use tracing::debug;

/// Identifies the bot to the upstream API
const USER_AGENT: &str = concat!("recall-herald/", env!("CARGO_PKG_VERSION"));

/// Upstream page size ceiling
const MAX_LIMIT: usize = 100;

/// Read-only client for the openFDA food-enforcement feed
///
/// Issues one request per fetch, newest reports first. The endpoint
/// needs no credential, but an `api_key` raises the rate limit.
pub struct OpenFdaClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenFdaClient {
    pub fn new(settings: &SourceSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl RecallSource for OpenFdaClient {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RecallRecord>, SourceError> {
        let limit = limit.clamp(1, MAX_LIMIT);

        let limit_param = limit.to_string();
        let mut request = self.http.get(&self.endpoint).query(&[
            ("sort", "report_date:desc"),
            ("limit", limit_param.as_str()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::unavailable(format!("reading response failed: {e}")))?;

        if status == StatusCode::NOT_FOUND && is_empty_window(&body) {
            debug!("source reports no matches for the query window");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(SourceError::unavailable(format!("HTTP {status}")));
        }

        let page: EnforcementPage = serde_json::from_str(&body)
            .map_err(|e| SourceError::malformed(format!("undecodable enforcement page: {e}")))?;

        debug!(records = page.results.len(), "fetched enforcement page");
        page.results
            .into_iter()
            .map(|report| report.into_record())
            .collect()
    }
}
