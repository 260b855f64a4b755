//! Core types and structures for domain-scanner

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::ScannerError;

/// One piece of corroborating evidence collected for a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    DnsNs,
    DnsA,
    DnsMx,
    DnsTxt,
    DnsCname,
    Whois,
    Reserved,
    Ssl,
    Http,
}

impl Signal {
    /// Tag used in progress lines and reports
    pub fn tag(&self) -> &'static str {
        match self {
            Signal::DnsNs => "DNS_NS",
            Signal::DnsA => "DNS_A",
            Signal::DnsMx => "DNS_MX",
            Signal::DnsTxt => "DNS_TXT",
            Signal::DnsCname => "DNS_CNAME",
            Signal::Whois => "WHOIS",
            Signal::Reserved => "RESERVED",
            Signal::Ssl => "SSL",
            Signal::Http => "HTTP",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Ordered signals gathered for one domain during one classification pass.
///
/// Duplicates are kept; they carry no extra weight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSet(Vec<Signal>);

impl SignalSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, signal: Signal) {
        self.0.push(signal);
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.0.contains(&signal)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Comma separated tags, e.g. `DNS_NS, WHOIS`
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(Signal::tag)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<Signal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Registry lifecycle state between "registered" and "available"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialStatusKind {
    RedemptionPeriod,
    PendingDelete,
    Hold,
    Inactive,
    Suspended,
    Reserved,
    Quarantined,
    PendingRegistration,
    TransferPending,
    GracePeriod,
    AutoRenewPeriod,
    Expired,
}

impl SpecialStatusKind {
    /// Human readable label written to the special-status file
    pub fn label(&self) -> &'static str {
        match self {
            SpecialStatusKind::RedemptionPeriod => "Redemption Period",
            SpecialStatusKind::PendingDelete => "Pending Delete",
            SpecialStatusKind::Hold => "Hold",
            SpecialStatusKind::Inactive => "Inactive",
            SpecialStatusKind::Suspended => "Suspended",
            SpecialStatusKind::Reserved => "Reserved",
            SpecialStatusKind::Quarantined => "Quarantined",
            SpecialStatusKind::PendingRegistration => "Pending Registration",
            SpecialStatusKind::TransferPending => "Transfer Pending",
            SpecialStatusKind::GracePeriod => "Grace Period",
            SpecialStatusKind::AutoRenewPeriod => "Auto-Renew Period",
            SpecialStatusKind::Expired => "Expired",
        }
    }
}

impl std::fmt::Display for SpecialStatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Availability verdict for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Available,
    Registered { signatures: SignalSet },
    SpecialStatus { kind: SpecialStatusKind },
}

impl Verdict {
    pub fn is_available(&self) -> bool {
        matches!(self, Verdict::Available)
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Verdict::Registered { .. })
    }

    pub fn special_status(&self) -> Option<SpecialStatusKind> {
        match self {
            Verdict::SpecialStatus { kind } => Some(*kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Available => write!(f, "available"),
            Verdict::Registered { .. } => write!(f, "registered"),
            Verdict::SpecialStatus { kind } => write!(f, "special status ({})", kind),
        }
    }
}

/// Which evidence decided a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// DNS, TLS, HTTP or WHOIS signatures were present
    Signals,
    /// WHOIS text carried a reserved-name indicator
    Reserved,
    /// WHOIS re-check matched an available indicator
    WhoisAvailable,
    /// WHOIS re-check matched a registered indicator
    WhoisRegistered,
    /// WHOIS re-check matched only a special-status indicator
    WhoisSpecialStatus,
    /// No signals and no WHOIS text at all
    NoData,
    /// WHOIS text present but matched nothing
    Undetermined,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Signals => write!(f, "signals"),
            Provenance::Reserved => write!(f, "reserved"),
            Provenance::WhoisAvailable => write!(f, "whois-available"),
            Provenance::WhoisRegistered => write!(f, "whois-registered"),
            Provenance::WhoisSpecialStatus => write!(f, "whois-special"),
            Provenance::NoData => write!(f, "no-data"),
            Provenance::Undetermined => write!(f, "undetermined"),
        }
    }
}

/// Verdict together with the evidence behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub signatures: SignalSet,
    pub provenance: Provenance,
}

/// Outcome of one scan job
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub domain: String,
    /// `None` when the job errored
    pub verdict: Option<Verdict>,
    pub signatures: SignalSet,
    pub provenance: Option<Provenance>,
    pub error: Option<ScannerError>,
    pub check_duration: Duration,
}

impl ScanResult {
    pub fn completed(domain: String, classification: Classification, check_duration: Duration) -> Self {
        Self {
            domain,
            verdict: Some(classification.verdict),
            signatures: classification.signatures,
            provenance: Some(classification.provenance),
            error: None,
            check_duration,
        }
    }

    pub fn errored(domain: String, error: ScannerError, check_duration: Duration) -> Self {
        Self {
            domain,
            verdict: None,
            signatures: SignalSet::new(),
            provenance: None,
            error: Some(error),
            check_duration,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Retry schedule for WHOIS queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub attempts: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Which collectors the classifier runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckMethods {
    pub dns: bool,
    pub whois: bool,
    pub ssl: bool,
    pub http: bool,
}

impl Default for CheckMethods {
    fn default() -> Self {
        Self {
            dns: true,
            whois: true,
            ssl: true,
            http: false,
        }
    }
}

/// Lock-free counters shared by scan workers
#[derive(Debug, Default)]
pub struct ScanMetrics {
    domains_checked: AtomicU64,
    errors_encountered: AtomicU64,
    total_check_time_ms: AtomicU64,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, result: &ScanResult) {
        self.domains_checked.fetch_add(1, Ordering::Relaxed);
        if result.is_error() {
            self.errors_encountered.fetch_add(1, Ordering::Relaxed);
        }
        self.total_check_time_ms
            .fetch_add(result.check_duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            domains_checked: self.domains_checked.load(Ordering::Relaxed),
            errors_encountered: self.errors_encountered.load(Ordering::Relaxed),
            total_check_time_ms: self.total_check_time_ms.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub domains_checked: u64,
    pub errors_encountered: u64,
    pub total_check_time_ms: u64,
}

impl MetricsSnapshot {
    pub fn avg_check_time_ms(&self) -> f64 {
        if self.domains_checked == 0 {
            0.0
        } else {
            self.total_check_time_ms as f64 / self.domains_checked as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_set_keeps_order_and_duplicates() {
        let mut set = SignalSet::new();
        set.push(Signal::DnsNs);
        set.push(Signal::Whois);
        set.push(Signal::DnsNs);

        assert_eq!(set.len(), 3);
        assert!(set.contains(Signal::Whois));
        assert!(!set.contains(Signal::Ssl));
        assert_eq!(set.joined(), "DNS_NS, WHOIS, DNS_NS");
    }

    #[test]
    fn test_special_status_labels() {
        assert_eq!(SpecialStatusKind::AutoRenewPeriod.label(), "Auto-Renew Period");
        assert_eq!(SpecialStatusKind::PendingRegistration.to_string(), "Pending Registration");
    }

    #[test]
    fn test_metrics_average() {
        let metrics = ScanMetrics::new();
        assert_eq!(metrics.snapshot().avg_check_time_ms(), 0.0);

        let ok = ScanResult::completed(
            "abc.li".to_string(),
            Classification {
                verdict: Verdict::Available,
                signatures: SignalSet::new(),
                provenance: Provenance::NoData,
            },
            Duration::from_millis(30),
        );
        let failed = ScanResult::errored(
            "???".to_string(),
            ScannerError::validation("bad"),
            Duration::from_millis(10),
        );
        metrics.record(&ok);
        metrics.record(&failed);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.domains_checked, 2);
        assert_eq!(snapshot.errors_encountered, 1);
        assert_eq!(snapshot.avg_check_time_ms(), 20.0);
    }
}
