//! AbuseIPDB client.
//!
//! Checks IP addresses against the AbuseIPDB reputation service, caches the
//! results, and classifies IPs as spam by their abuse confidence score.
//!
//! # Features
//!
//! - **Check** - Query the abuse confidence score of an IP
//! - **Spam classification** - Score at or above a configurable threshold is spam
//! - **Report** - Submit abusive IPs with category codes and a comment
//! - **Caching** - Cache check results with configurable TTL
//! - **Pluggable collaborators** - HTTP transport, cache and notification sink are traits
//!
//! # Example Configuration
//!
//! ```yaml
//! abuseipdb:
//!   api_key: "${ABUSEIPDB_API_KEY}"
//!   lookback_days: 30
//!   cache_ttl_seconds: 10
//!   spam_threshold: 100
//! ```

pub mod cache;
pub mod category;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod response;
pub mod transport;

pub use category::AbuseCategory;
pub use client::ReputationClient;
pub use config::{ClientConfig, Config};
pub use error::ClientError;
pub use notify::{NotificationSink, SpamEvent};
pub use response::{CheckResult, ReportResult};
