//! DNS collector backed by hickory-resolver

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::domain::DnsProbe;
use crate::error::{Result, ScannerError};
use crate::types::Signal;

/// Resolves NS, A/AAAA, MX, TXT and CNAME records through the system resolver.
pub struct DnsCollector {
    resolver: TokioAsyncResolver,
    lookup_timeout: Duration,
}

impl DnsCollector {
    /// Build from `/etc/resolv.conf` (or the platform equivalent)
    pub fn from_system(lookup_timeout: Duration) -> Result<Self> {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .map_err(|e| ScannerError::config(format!("cannot read system resolver config: {}", e)))?;
        opts.timeout = lookup_timeout;
        Ok(Self::with_config(config, opts, lookup_timeout))
    }

    pub fn with_config(config: ResolverConfig, opts: ResolverOpts, lookup_timeout: Duration) -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            lookup_timeout,
        }
    }

    /// True only for a non-empty answer; errors and timeouts count as absence.
    async fn present<F, T, E>(&self, domain: &str, record: &'static str, lookup: F) -> bool
    where
        F: Future<Output = std::result::Result<T, E>>,
        T: HasRecords,
        E: std::fmt::Display,
    {
        match timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(answer)) => answer.has_records(),
            Ok(Err(e)) => {
                tracing::debug!(domain = %domain, record, error = %e, "DNS lookup returned nothing");
                false
            }
            Err(_) => {
                tracing::debug!(domain = %domain, record, "DNS lookup timed out");
                false
            }
        }
    }

    async fn cname_present(&self, domain: &str, fqdn: &str) -> bool {
        match timeout(self.lookup_timeout, self.resolver.lookup(fqdn, RecordType::CNAME)).await {
            Ok(Ok(answer)) => answer
                .iter()
                .filter(|rdata| rdata.record_type() == RecordType::CNAME)
                .any(|rdata| is_delegating_cname(domain, &rdata.to_string())),
            Ok(Err(e)) => {
                tracing::debug!(domain = %domain, record = "CNAME", error = %e, "DNS lookup returned nothing");
                false
            }
            Err(_) => {
                tracing::debug!(domain = %domain, record = "CNAME", "DNS lookup timed out");
                false
            }
        }
    }
}

#[async_trait]
impl DnsProbe for DnsCollector {
    async fn signals(&self, domain: &str) -> Vec<Signal> {
        // Fully qualified, so resolv.conf search domains are never appended
        let fqdn = format!("{}.", domain.trim_end_matches('.'));

        let (ns, a, mx, txt, cname) = tokio::join!(
            self.present(domain, "NS", self.resolver.ns_lookup(fqdn.as_str())),
            self.present(domain, "A", self.resolver.lookup_ip(fqdn.as_str())),
            self.present(domain, "MX", self.resolver.mx_lookup(fqdn.as_str())),
            self.present(domain, "TXT", self.resolver.txt_lookup(fqdn.as_str())),
            self.cname_present(domain, &fqdn),
        );

        [
            (ns, Signal::DnsNs),
            (a, Signal::DnsA),
            (mx, Signal::DnsMx),
            (txt, Signal::DnsTxt),
            (cname, Signal::DnsCname),
        ]
        .into_iter()
        .filter_map(|(found, signal)| found.then_some(signal))
        .collect()
    }
}

/// Lookup answers that can be empty
trait HasRecords {
    fn has_records(&self) -> bool;
}

impl HasRecords for hickory_resolver::lookup::NsLookup {
    fn has_records(&self) -> bool {
        self.iter().next().is_some()
    }
}

impl HasRecords for hickory_resolver::lookup_ip::LookupIp {
    fn has_records(&self) -> bool {
        self.iter().next().is_some()
    }
}

impl HasRecords for hickory_resolver::lookup::MxLookup {
    fn has_records(&self) -> bool {
        self.iter().next().is_some()
    }
}

impl HasRecords for hickory_resolver::lookup::TxtLookup {
    fn has_records(&self) -> bool {
        self.iter().next().is_some()
    }
}

/// A CNAME pointing back at the queried name itself is not a delegation.
pub fn is_delegating_cname(domain: &str, target: &str) -> bool {
    let target = target.trim().trim_end_matches('.');
    let domain = domain.trim().trim_end_matches('.');
    !target.is_empty() && !target.eq_ignore_ascii_case(domain)
}
