//! Domain Scanner - bulk availability checks for short, pattern-based domain names
//!
//! Every candidate is probed through DNS, TLS and WHOIS; the evidence is
//! reconciled into one of available, registered or a special registry status.

pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod scan;
pub mod types;

// Re-export commonly used types
pub use error::{Result, ScannerError};
pub use types::{
    CheckMethods, Classification, MetricsSnapshot, Provenance, RetryPolicy, ScanResult, Signal,
    SignalSet, SpecialStatusKind, Verdict,
};

// Re-export main functionality
pub use config::AppConfig;
pub use domain::{Classifier, DomainCheck};
pub use scan::{generate_candidates, Pattern, ResultBuckets, ScanConfig, ScanReport, Scanner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
