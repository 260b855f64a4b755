//! WHOIS collector: raw text over TCP/43 with a bounded retry loop

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::domain::WhoisSource;
use crate::error::{Result, ScannerError};
use crate::types::RetryPolicy;

const WHOIS_PORT: u16 = 43;
const IANA_WHOIS: &str = "whois.iana.org";

/// Pure Rust WHOIS client (no external `whois` binary required).
pub struct WhoisClient {
    step_timeout: Duration,
    /// TLD -> server found through IANA during this run
    discovered: RwLock<HashMap<String, String>>,
}

impl WhoisClient {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Client whose connect, write and read steps are each bounded by `step_timeout`
    pub fn with_timeout(step_timeout: Duration) -> Self {
        Self {
            step_timeout,
            discovered: RwLock::new(HashMap::new()),
        }
    }

    /// Minimal convention-based mapping for high-usage TLDs.
    /// Unknown TLDs fall back to IANA discovery.
    fn known_server(tld: &str) -> Option<&'static str> {
        match tld {
            "li" | "ch" => Some("whois.nic.ch"),
            "com" | "net" => Some("whois.verisign-grs.com"),
            "org" => Some("whois.pir.org"),
            "io" => Some("whois.nic.io"),
            "ai" => Some("whois.nic.ai"),
            "co" => Some("whois.nic.co"),
            "me" => Some("whois.nic.me"),
            "xyz" => Some("whois.nic.xyz"),
            "dev" | "app" => Some("whois.nic.google"),
            "de" => Some("whois.denic.de"),
            _ => None,
        }
    }

    async fn server_for(&self, domain: &str) -> Result<String> {
        let tld = domain
            .rsplit('.')
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScannerError::validation(format!("no TLD in '{}'", domain)))?
            .to_lowercase();

        if let Some(server) = Self::known_server(&tld) {
            return Ok(server.to_string());
        }
        let cached = self.discovered.read().get(&tld).cloned();
        if let Some(server) = cached {
            return Ok(server);
        }

        let iana = self.query(IANA_WHOIS, &tld).await?;
        let server = parse_iana_field(&iana, "whois:")
            .or_else(|| parse_iana_field(&iana, "refer:"))
            .ok_or_else(|| {
                ScannerError::domain_check(
                    domain,
                    format!("No WHOIS server found for TLD: {}", tld),
                    Some("whois".to_string()),
                )
            })?;

        tracing::debug!(tld = %tld, server = %server, "Discovered WHOIS server");
        self.discovered.write().insert(tld, server.clone());
        Ok(server)
    }

    async fn query(&self, server: &str, query: &str) -> Result<String> {
        let secs = self.step_timeout.as_secs();
        let addr = format!("{}:{}", server, WHOIS_PORT);

        let mut stream = timeout(self.step_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ScannerError::timeout("WHOIS connect", secs))?
            .map_err(|e| ScannerError::network(format!("WHOIS connect failed: {}", e), Some(addr.clone())))?;

        timeout(self.step_timeout, stream.write_all(format!("{}\r\n", query).as_bytes()))
            .await
            .map_err(|_| ScannerError::timeout("WHOIS write", secs))?
            .map_err(|e| ScannerError::network(format!("WHOIS write failed: {}", e), Some(addr.clone())))?;

        let mut buf = Vec::new();
        timeout(self.step_timeout, stream.read_to_end(&mut buf))
            .await
            .map_err(|_| ScannerError::timeout("WHOIS read", secs))?
            .map_err(|e| ScannerError::network(format!("WHOIS read failed: {}", e), Some(addr)))?;

        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WhoisSource for WhoisClient {
    async fn whois(&self, domain: &str) -> Result<String> {
        let server = self.server_for(domain).await?;
        self.query(&server, domain).await
    }
}

fn parse_iana_field(iana: &str, field: &str) -> Option<String> {
    iana.lines()
        .map(str::trim)
        .find_map(|line| {
            if line.to_lowercase().starts_with(field) {
                Some(line.splitn(2, ':').nth(1)?.trim().to_string())
            } else {
                None
            }
        })
        .filter(|s| !s.is_empty())
}

/// Query `source` up to `policy.attempts` times, pausing `policy.backoff`
/// between attempts. Exhausting the attempts yields empty text, not an error.
/// Errors that a retry cannot fix (no server for the TLD) end the loop early.
pub async fn fetch_whois_with_retry(source: &dyn WhoisSource, domain: &str, policy: RetryPolicy) -> String {
    let attempts = policy.attempts.max(1);

    for attempt in 1..=attempts {
        match source.whois(domain).await {
            Ok(text) => return text,
            Err(e) => {
                tracing::warn!(domain = %domain, attempt, attempts, error = %e, "WHOIS query failed");
                if !e.is_transient() {
                    break;
                }
                if attempt < attempts && !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
            }
        }
    }

    String::new()
}
