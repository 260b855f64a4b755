//! Per-domain checking: signal collectors and the classifier

pub mod classifier;
pub mod dns;
pub mod rules;
pub mod web;
pub mod whois;

// Re-export main functionality
pub use classifier::Classifier;
pub use dns::DnsCollector;
pub use rules::{check_special_status, WhoisText};
pub use web::{HttpCollector, TlsCollector};
pub use whois::{fetch_whois_with_retry, WhoisClient};

use crate::error::{Result, ScannerError};
use crate::types::{Classification, Signal};
use async_trait::async_trait;

/// DNS presence signals for a domain. Lookup failures are simply absent tags.
#[async_trait]
pub trait DnsProbe: Send + Sync {
    async fn signals(&self, domain: &str) -> Vec<Signal>;
}

/// Whether a TLS service on port 443 presents any certificate
#[async_trait]
pub trait TlsProbe: Send + Sync {
    async fn certificate_presented(&self, domain: &str) -> bool;
}

/// Whether anything answers plain HTTP
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn responds(&self, domain: &str) -> bool;
}

/// Raw WHOIS text for a domain
#[async_trait]
pub trait WhoisSource: Send + Sync {
    async fn whois(&self, domain: &str) -> Result<String>;
}

/// What the scan driver runs for every job
#[async_trait]
pub trait DomainCheck: Send + Sync {
    async fn check(&self, domain: &str) -> Result<Classification>;
}

/// Rejects names that cannot be a registrable `label.suffix`.
pub fn validate_candidate(domain: &str) -> Result<()> {
    if domain.is_empty() || domain.len() > 253 {
        return Err(ScannerError::validation(format!("invalid domain length: '{}'", domain)));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(ScannerError::validation(format!("'{}' has no suffix", domain)));
    }

    for label in labels {
        if label.is_empty() || label.len() > 63 {
            return Err(ScannerError::validation(format!("invalid label in '{}'", domain)));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(ScannerError::validation(format!("label may not start or end with '-': '{}'", domain)));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ScannerError::validation(format!("invalid character in '{}'", domain)));
        }
    }

    Ok(())
}
