//! PubMed E-utilities client.
//!
//! Searches with `esearch.fcgi` (JSON) and fetches single articles with
//! `efetch.fcgi` (XML). Requests are serialized and spaced by the configured
//! interval. HTTP 429, 5xx and network failures are retried with exponential
//! backoff; other 4xx responses fail at once.

use crate::config::{ClientConfig, TOOL_NAME};
use crate::document::RawRecord;
use crate::error::{PubmedError, Result};
use crate::source::RecordSource;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

/// E-utilities client with rate limiting and retries
pub struct PubMedClient {
    client: reqwest::Client,
    config: ClientConfig,
    base_url: Url,
    semaphore: Arc<Semaphore>,
    last_request: Mutex<Option<Instant>>,
}

impl PubMedClient {
    /// Create a new PubMedClient
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout)
            .build()
            .map_err(|e| PubmedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| PubmedError::Config(format!("Invalid base URL '{}': {}", base, e)))?;

        Ok(Self {
            client,
            config,
            base_url,
            semaphore: Arc::new(Semaphore::new(1)),
            last_request: Mutex::new(None),
        })
    }

    /// Build the esearch URL for `query`
    fn esearch_url(&self, query: &str, max_results: usize) -> Result<Url> {
        let mut url = self.endpoint("esearch.fcgi")?;
        url.query_pairs_mut()
            .append_pair("db", "pubmed")
            .append_pair("term", query)
            .append_pair("retmode", "json")
            .append_pair("retmax", &max_results.to_string());
        self.append_identity(&mut url);
        Ok(url)
    }

    /// Build the efetch URL for one PMID
    fn efetch_url(&self, id: &str) -> Result<Url> {
        let mut url = self.endpoint("efetch.fcgi")?;
        url.query_pairs_mut()
            .append_pair("db", "pubmed")
            .append_pair("id", id)
            .append_pair("retmode", "xml");
        self.append_identity(&mut url);
        Ok(url)
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        self.base_url
            .join(name)
            .map_err(|e| PubmedError::Config(format!("Invalid endpoint '{}': {}", name, e)))
    }

    /// Add `tool`, `email` and `api_key` as NCBI asks clients to.
    fn append_identity(&self, url: &mut Url) {
        let mut params = url.query_pairs_mut();
        params.append_pair("tool", TOOL_NAME);
        if let Some(email) = &self.config.email {
            params.append_pair("email", email);
        }
        if let Some(key) = &self.config.api_key {
            params.append_pair("api_key", key);
        }
    }

    /// GET `url` with rate limiting and retries
    async fn get_text(&self, url: &Url) -> Result<String> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| PubmedError::Config(format!("Request limiter closed: {}", e)))?;

        let attempts = self.config.max_retries.max(1);
        let mut backoff = self.config.retry_backoff;
        let mut last_error = None;

        for attempt in 0..attempts {
            self.wait_for_rate_limit().await;

            match self.do_get(url).await {
                Ok(body) => return Ok(body),
                Err(PubmedError::RateLimited(secs)) => {
                    let wait = Duration::from_secs(secs).max(backoff);
                    warn!(
                        attempt = attempt + 1,
                        wait_secs = wait.as_secs(),
                        "Rate limited, waiting"
                    );
                    if attempt + 1 < attempts {
                        tokio::time::sleep(wait).await;
                    }
                    backoff *= 2;
                    last_error = Some(PubmedError::RateLimited(secs));
                }
                Err(e) if !is_retryable(&e) => return Err(e),
                Err(e) => {
                    debug!(attempt = attempt + 1, error = %e, "Request failed");
                    if attempt + 1 < attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PubmedError::Config("No request attempted".to_string())))
    }

    /// Internal request implementation
    async fn do_get(&self, url: &Url) -> Result<String> {
        debug!(url = %redact_api_key(url), "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1);
            return Err(PubmedError::RateLimited(retry_after));
        }

        if !status.is_success() {
            return Err(PubmedError::Api {
                code: status.as_u16() as i32,
                message: format!("E-utilities error: {}", status),
            });
        }

        Ok(response.text().await?)
    }

    /// Wait until the configured interval has passed since the last request
    async fn wait_for_rate_limit(&self) {
        let remaining = {
            let last = self.last_request.lock().ok().and_then(|l| *l);
            last.and_then(|t| self.config.request_interval.checked_sub(t.elapsed()))
        };

        if let Some(wait) = remaining {
            tokio::time::sleep(wait).await;
        }

        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(Instant::now());
        }
    }
}

#[async_trait]
impl RecordSource for PubMedClient {
    async fn search_ids(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let url = self.esearch_url(query, max_results)?;
        let body = self.get_text(&url).await?;
        let ids = parse_esearch(&body)?;
        info!(query = query, count = ids.len(), "PubMed search complete");
        Ok(ids)
    }

    async fn fetch_record(&self, id: &str) -> Result<RawRecord> {
        let url = self.efetch_url(id)?;
        let xml = self.get_text(&url).await?;
        RawRecord::parse(&xml)
    }
}

/// Client errors other than 429 will not get better on retry.
fn is_retryable(error: &PubmedError) -> bool {
    match error {
        PubmedError::Api { code, .. } => !(400..500).contains(code),
        PubmedError::Network(_) | PubmedError::RateLimited(_) => true,
        _ => false,
    }
}

fn redact_api_key(url: &Url) -> Url {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" { "***".into() } else { v };
            (k.into_owned(), v.into_owned())
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}

// === esearch Response Types ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: Option<ESearchResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
}

/// Parse the PMIDs out of an esearch JSON body
fn parse_esearch(body: &str) -> Result<Vec<String>> {
    let data: ESearchResponse = serde_json::from_str(body)?;

    if let Some(error) = data
        .error
        .or_else(|| data.esearchresult.as_ref().and_then(|r| r.error.clone()))
    {
        if error.to_lowercase().contains("rate limit") {
            return Err(PubmedError::RateLimited(1));
        }
        return Err(PubmedError::Parse(format!("esearch error: {}", error)));
    }

    Ok(data.esearchresult.map(|r| r.idlist).unwrap_or_default())
}
