//! Signal reconciliation: collectors in, one verdict out

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::dns::DnsCollector;
use crate::domain::rules::WhoisText;
use crate::domain::web::{HttpCollector, TlsCollector};
use crate::domain::whois::{fetch_whois_with_retry, WhoisClient};
use crate::domain::{validate_candidate, DnsProbe, DomainCheck, HttpProbe, TlsProbe, WhoisSource};
use crate::error::Result;
use crate::types::{
    CheckMethods, Classification, Provenance, RetryPolicy, Signal, SignalSet, SpecialStatusKind, Verdict,
};

/// Per-lookup bound for DNS, the TLS handshake and the HTTP request
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Turns DNS, TLS, HTTP and WHOIS evidence into a [`Verdict`].
///
/// Holds no per-domain state, so one instance is shared by every worker.
#[derive(Clone)]
pub struct Classifier {
    dns: Option<Arc<dyn DnsProbe>>,
    tls: Option<Arc<dyn TlsProbe>>,
    http: Option<Arc<dyn HttpProbe>>,
    whois: Option<Arc<dyn WhoisSource>>,
    retry: RetryPolicy,
}

impl Classifier {
    /// Classifier wired to the real network collectors selected by `methods`
    pub fn new(methods: CheckMethods, retry: RetryPolicy) -> Result<Self> {
        let mut classifier = Self::without_probes(retry);

        if methods.dns {
            classifier = classifier.with_dns(Arc::new(DnsCollector::from_system(PROBE_TIMEOUT)?));
        }
        if methods.whois {
            classifier = classifier.with_whois(Arc::new(WhoisClient::new()));
        }
        if methods.ssl {
            classifier = classifier.with_tls(Arc::new(TlsCollector::new(PROBE_TIMEOUT)));
        }
        if methods.http {
            classifier = classifier.with_http(Arc::new(HttpCollector::new(PROBE_TIMEOUT)?));
        }

        Ok(classifier)
    }

    /// Classifier with every collector switched off
    pub fn without_probes(retry: RetryPolicy) -> Self {
        Self {
            dns: None,
            tls: None,
            http: None,
            whois: None,
            retry,
        }
    }

    pub fn with_dns(mut self, probe: Arc<dyn DnsProbe>) -> Self {
        self.dns = Some(probe);
        self
    }

    pub fn with_tls(mut self, probe: Arc<dyn TlsProbe>) -> Self {
        self.tls = Some(probe);
        self
    }

    pub fn with_http(mut self, probe: Arc<dyn HttpProbe>) -> Self {
        self.http = Some(probe);
        self
    }

    pub fn with_whois(mut self, source: Arc<dyn WhoisSource>) -> Self {
        self.whois = Some(source);
        self
    }

    /// Availability verdict for `domain`
    pub async fn classify(&self, domain: &str) -> Verdict {
        self.assess(domain).await.verdict
    }

    /// Verdict plus the signatures and rule that produced it.
    ///
    /// Collector failures never surface here; they only remove evidence.
    pub async fn assess(&self, domain: &str) -> Classification {
        let (dns, whois, ssl, http) = tokio::join!(
            self.dns_signals(domain),
            self.whois_text(domain),
            self.tls_signal(domain),
            self.http_signal(domain),
        );

        let mut signatures: SignalSet = dns.into_iter().collect();
        if whois.indicates_reserved() {
            signatures.push(Signal::Reserved);
        }
        if whois.indicates_registered() {
            signatures.push(Signal::Whois);
        }
        if ssl {
            signatures.push(Signal::Ssl);
        }
        if http {
            signatures.push(Signal::Http);
        }

        let classification = if signatures.contains(Signal::Reserved) {
            let kind = whois.special_status().unwrap_or(SpecialStatusKind::Reserved);
            Classification {
                verdict: Verdict::SpecialStatus { kind },
                signatures,
                provenance: Provenance::Reserved,
            }
        } else if !signatures.is_empty() {
            let verdict = unavailable(&whois, signatures.clone());
            Classification {
                verdict,
                signatures,
                provenance: Provenance::Signals,
            }
        } else {
            self.recheck(domain, signatures).await
        };

        tracing::debug!(
            domain = %domain,
            verdict = %classification.verdict,
            signatures = %classification.signatures.joined(),
            provenance = %classification.provenance,
            "Domain classified"
        );

        classification
    }

    /// Dedicated WHOIS pass for domains that left no trace anywhere else
    async fn recheck(&self, domain: &str, mut signatures: SignalSet) -> Classification {
        let text = self.whois_text(domain).await;

        let (verdict, provenance) = if text.is_empty() {
            (Verdict::Available, Provenance::NoData)
        } else if text.indicates_reserved() {
            signatures.push(Signal::Reserved);
            let kind = text.special_status().unwrap_or(SpecialStatusKind::Reserved);
            (Verdict::SpecialStatus { kind }, Provenance::Reserved)
        } else if text.indicates_available() {
            (Verdict::Available, Provenance::WhoisAvailable)
        } else if text.indicates_registered_or_connect() {
            signatures.push(Signal::Whois);
            (unavailable(&text, signatures.clone()), Provenance::WhoisRegistered)
        } else if let Some(kind) = text.special_status() {
            (Verdict::SpecialStatus { kind }, Provenance::WhoisSpecialStatus)
        } else {
            (Verdict::Available, Provenance::Undetermined)
        };

        Classification {
            verdict,
            signatures,
            provenance,
        }
    }

    async fn dns_signals(&self, domain: &str) -> Vec<Signal> {
        match &self.dns {
            Some(probe) => probe.signals(domain).await,
            None => Vec::new(),
        }
    }

    async fn whois_text(&self, domain: &str) -> WhoisText {
        match &self.whois {
            Some(source) => WhoisText::new(&fetch_whois_with_retry(source.as_ref(), domain, self.retry).await),
            None => WhoisText::default(),
        }
    }

    async fn tls_signal(&self, domain: &str) -> bool {
        match &self.tls {
            Some(probe) => probe.certificate_presented(domain).await,
            None => false,
        }
    }

    async fn http_signal(&self, domain: &str) -> bool {
        match &self.http {
            Some(probe) => probe.responds(domain).await,
            None => false,
        }
    }
}

/// Not available: a special lifecycle state if the text names one, otherwise registered.
fn unavailable(whois: &WhoisText, signatures: SignalSet) -> Verdict {
    match whois.special_status() {
        Some(kind) => Verdict::SpecialStatus { kind },
        None => Verdict::Registered { signatures },
    }
}

#[async_trait]
impl DomainCheck for Classifier {
    async fn check(&self, domain: &str) -> Result<Classification> {
        validate_candidate(domain)?;
        Ok(self.assess(domain).await)
    }
}
