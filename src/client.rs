//! AbuseIPDB reputation client.

use crate::cache::{cache_key, CheckCache, MemoryCache};
use crate::category::encode_categories;
use crate::config::{CacheConfig, ClientConfig};
use crate::error::ClientError;
use crate::notify::{NotificationSink, SpamEvent, TracingSink};
use crate::response::{score_in_range, CheckResult, ReportResult};
use crate::transport::{ApiRequest, HttpTransport, Method, ReqwestTransport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the AbuseIPDB check and report endpoints.
pub struct ReputationClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn CheckCache>,
    sink: Arc<dyn NotificationSink>,
    last_ip: RwLock<Option<String>>,
}

impl ReputationClient {
    /// Create a client from a configuration and its collaborators.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn CheckCache>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            cache,
            sink,
            last_ip: RwLock::new(None),
        })
    }

    /// Create a client using reqwest, an in-memory cache and a logging sink.
    pub fn with_defaults(config: ClientConfig, cache: &CacheConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(Duration::from_millis(config.timeout_ms))
            .map_err(|e| ClientError::Transport(format!("HTTP client init failed: {e}")))?;

        Self::new(
            config,
            Arc::new(transport),
            Arc::new(MemoryCache::new(cache.max_entries)),
            Arc::new(TracingSink),
        )
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Set the IP used when an operation is called without one.
    pub fn set_ip(&self, ip: impl Into<String>) {
        if let Ok(mut last) = self.last_ip.write() {
            *last = Some(ip.into());
        }
    }

    /// The IP used when an operation is called without one.
    pub fn ip(&self) -> Option<String> {
        self.last_ip.read().ok().and_then(|ip| ip.clone())
    }

    /// Check whether an IP's abuse score reaches the spam threshold.
    ///
    /// Emits a [`SpamEvent`] when it does.
    pub async fn is_spam_ip(&self, ip: Option<&str>) -> Result<bool, ClientError> {
        Ok(self.classify(ip).await?.0)
    }

    /// Like [`is_spam_ip`](Self::is_spam_ip), also returning the check result
    /// the verdict was based on.
    pub async fn classify(&self, ip: Option<&str>) -> Result<(bool, CheckResult), ClientError> {
        let (ip, result) = self.lookup(ip).await?;
        let score = result.abuse_confidence_score;

        if score >= self.config.spam_threshold {
            self.sink.emit(&SpamEvent { ip, score });
            return Ok((true, result));
        }

        Ok((false, result))
    }

    /// Look up an IP, serving from cache while the entry is live.
    pub async fn check(&self, ip: Option<&str>) -> Result<CheckResult, ClientError> {
        Ok(self.lookup(ip).await?.1)
    }

    async fn lookup(&self, ip: Option<&str>) -> Result<(String, CheckResult), ClientError> {
        let ip = self.resolve_ip(ip)?;
        let key = cache_key(&ip, self.config.lookback_days);

        if let Some(cached) = self.cache.get(&key) {
            debug!(ip = %ip, score = cached.abuse_confidence_score, "AbuseIPDB cache hit");
            return Ok((ip, cached));
        }

        debug!(ip = %ip, "Querying AbuseIPDB");

        let data = self
            .request_data(
                Method::Get,
                "check",
                vec![
                    ("ipAddress".to_string(), ip.clone()),
                    (
                        "maxAgeInDays".to_string(),
                        self.config.lookback_days.to_string(),
                    ),
                ],
            )
            .await?;
        let result: CheckResult = decode_data(data)?;
        check_score(result.abuse_confidence_score)?;

        self.cache.insert(
            &key,
            result.clone(),
            Duration::from_secs(self.config.cache_ttl_seconds),
        );

        debug!(
            ip = %ip,
            score = result.abuse_confidence_score,
            reports = result.total_reports,
            "AbuseIPDB lookup complete"
        );

        Ok((ip, result))
    }

    /// Report an IP and return its updated abuse score.
    pub async fn report_ip(
        &self,
        categories: &[u8],
        ip: Option<&str>,
        comment: &str,
    ) -> Result<u8, ClientError> {
        Ok(self
            .report(categories, ip, comment)
            .await?
            .abuse_confidence_score)
    }

    /// Report an IP. Never cached.
    pub async fn report(
        &self,
        categories: &[u8],
        ip: Option<&str>,
        comment: &str,
    ) -> Result<ReportResult, ClientError> {
        if categories.is_empty() {
            return Err(ClientError::config("at least one category is required"));
        }
        let ip = self.resolve_ip(ip)?;
        let categories = encode_categories(categories);

        let data = self
            .request_data(
                Method::Post,
                "report",
                vec![
                    ("ip".to_string(), ip.clone()),
                    ("categories".to_string(), categories.clone()),
                    ("comment".to_string(), comment.to_string()),
                ],
            )
            .await?;
        let result: ReportResult = decode_data(data)?;
        check_score(result.abuse_confidence_score)?;

        info!(
            ip = %ip,
            categories = %categories,
            score = result.abuse_confidence_score,
            "Reported IP to AbuseIPDB"
        );

        Ok(result)
    }

    /// Use the given IP (trimmed) and remember it, or fall back to the
    /// remembered one.
    fn resolve_ip(&self, ip: Option<&str>) -> Result<String, ClientError> {
        match ip.map(str::trim) {
            Some(ip) => {
                self.set_ip(ip);
                Ok(ip.to_string())
            }
            None => self
                .ip()
                .ok_or_else(|| ClientError::config("no IP address given and none set")),
        }
    }

    async fn request_data(
        &self,
        method: Method,
        endpoint: &str,
        query: Vec<(String, String)>,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest {
            method,
            url: format!(
                "{}/{}",
                self.config.api_base_url.trim_end_matches('/'),
                endpoint
            ),
            query,
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Key".to_string(), self.config.api_key.clone()),
            ],
        };

        let response = self.transport.send(request).await.into_response().map_err(|e| {
            warn!(endpoint = endpoint, error = %e, "AbuseIPDB request failed");
            ClientError::Transport(e)
        })?;

        parse_body(&response.body)
    }
}

/// Parse an API body and return its `data` member.
fn parse_body(body: &str) -> Result<Value, ClientError> {
    let output: Value = match serde_json::from_str(body) {
        Ok(Value::Null) | Err(_) => return Err(ClientError::InvalidResponse(body.to_string())),
        Ok(value) => value,
    };

    if let Some(errors) = output.get("errors") {
        let details: Vec<&str> = errors
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .map(|e| e.get("detail").and_then(Value::as_str).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        return Err(ClientError::Service(details.join(", ")));
    }

    match output.get("data") {
        Some(data) => Ok(data.clone()),
        None => Err(ClientError::UnexpectedPayload(
            "response has no data member".to_string(),
        )),
    }
}

fn decode_data<T: DeserializeOwned>(data: Value) -> Result<T, ClientError> {
    serde_json::from_value(data).map_err(|e| ClientError::UnexpectedPayload(e.to_string()))
}

fn check_score(score: u8) -> Result<(), ClientError> {
    if !score_in_range(score) {
        return Err(ClientError::UnexpectedPayload(format!(
            "abuseConfidenceScore out of range: {score}"
        )));
    }
    Ok(())
}
