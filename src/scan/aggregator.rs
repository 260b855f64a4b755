//! Result buckets filled by the single scan consumer

use crate::error::ScannerError;
use crate::types::{ScanResult, SignalSet, SpecialStatusKind, Verdict};

/// A registered domain with the evidence that marked it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredDomain {
    pub domain: String,
    pub signatures: SignalSet,
}

/// A domain in a transitional registry state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialStatusDomain {
    pub domain: String,
    pub kind: SpecialStatusKind,
}

/// A job that failed inside the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDomain {
    pub domain: String,
    pub error: ScannerError,
}

/// Which bucket a result landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Available,
    Registered,
    SpecialStatus,
    Error,
}

/// Append-only partition of scan results.
///
/// Owned by whoever consumes the result stream; never shared between workers.
#[derive(Debug, Clone, Default)]
pub struct ResultBuckets {
    pub available: Vec<String>,
    pub registered: Vec<RegisteredDomain>,
    pub special_status: Vec<SpecialStatusDomain>,
    pub errors: Vec<FailedDomain>,
}

impl ResultBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// File one result and report where it went
    pub fn record(&mut self, result: ScanResult) -> Bucket {
        match (result.error, result.verdict) {
            (Some(error), _) => {
                self.errors.push(FailedDomain {
                    domain: result.domain,
                    error,
                });
                Bucket::Error
            }
            (None, Some(Verdict::Available)) => {
                self.available.push(result.domain);
                Bucket::Available
            }
            (None, Some(Verdict::Registered { signatures })) => {
                self.registered.push(RegisteredDomain {
                    domain: result.domain,
                    signatures,
                });
                Bucket::Registered
            }
            (None, Some(Verdict::SpecialStatus { kind })) => {
                self.special_status.push(SpecialStatusDomain {
                    domain: result.domain,
                    kind,
                });
                Bucket::SpecialStatus
            }
            (None, None) => {
                self.errors.push(FailedDomain {
                    error: crate::internal_error!("no verdict recorded for {}", result.domain),
                    domain: result.domain,
                });
                Bucket::Error
            }
        }
    }

    pub fn total(&self) -> usize {
        self.available.len() + self.registered.len() + self.special_status.len() + self.errors.len()
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            total: self.total(),
            available: self.available.len(),
            registered: self.registered.len(),
            special_status: self.special_status.len(),
            errors: self.errors.len(),
        }
    }
}

/// Final counts for the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub available: usize,
    pub registered: usize,
    pub special_status: usize,
    pub errors: usize,
}
