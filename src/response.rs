//! Payloads returned by the AbuseIPDB API.

use serde::{Deserialize, Serialize};

/// `data` member of a `check` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub ip_address: String,

    /// Abuse confidence score (0-100).
    pub abuse_confidence_score: u8,

    #[serde(default)]
    pub is_public: Option<bool>,

    #[serde(default)]
    pub ip_version: Option<u8>,

    #[serde(default)]
    pub is_whitelisted: Option<bool>,

    #[serde(default)]
    pub country_code: Option<String>,

    /// Usage type (e.g., "Data Center/Web Hosting/Transit").
    #[serde(default)]
    pub usage_type: Option<String>,

    #[serde(default)]
    pub isp: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub hostnames: Vec<String>,

    /// Whether the IP is a known Tor exit node.
    #[serde(default)]
    pub is_tor: bool,

    #[serde(default)]
    pub total_reports: u32,

    #[serde(default)]
    pub num_distinct_users: u32,

    #[serde(default)]
    pub last_reported_at: Option<String>,
}

/// `data` member of a `report` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    #[serde(default)]
    pub ip_address: Option<String>,

    /// Updated abuse confidence score (0-100).
    pub abuse_confidence_score: u8,
}

/// Scores outside 0-100 are not produced by the service.
pub(crate) fn score_in_range(score: u8) -> bool {
    score <= 100
}
