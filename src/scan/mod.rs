//! Bulk scanning - candidate generation, worker pool and result buckets

mod aggregator;
mod generator;
mod scanner;

pub use aggregator::{Bucket, FailedDomain, RegisteredDomain, ResultBuckets, ScanSummary, SpecialStatusDomain};
pub use generator::{generate_candidates, normalize_suffix, CandidateGenerator};
pub use scanner::{ScanConfig, ScanProgress, ScanReport, Scanner};

use std::str::FromStr;

use crate::error::ScannerError;

const DIGITS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

const LETTERS: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const ALPHANUMERIC: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Character set for candidate labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pattern {
    /// `d`: digits only (e.g. `123.li`)
    Digits,
    /// `D`: lowercase letters only (e.g. `abc.li`)
    #[default]
    Letters,
    /// `a`: letters then digits (e.g. `a1b.li`)
    Alphanumeric,
}

impl Pattern {
    pub fn chars(&self) -> &'static [char] {
        match self {
            Pattern::Digits => DIGITS,
            Pattern::Letters => LETTERS,
            Pattern::Alphanumeric => ALPHANUMERIC,
        }
    }

    /// The command-line spelling, also used in output file names
    pub fn flag(&self) -> &'static str {
        match self {
            Pattern::Digits => "d",
            Pattern::Letters => "D",
            Pattern::Alphanumeric => "a",
        }
    }

    pub fn total_combinations(&self, length: usize) -> u64 {
        (self.chars().len() as u64).saturating_pow(length as u32)
    }
}

impl FromStr for Pattern {
    type Err = ScannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d" => Ok(Pattern::Digits),
            "D" => Ok(Pattern::Letters),
            "a" => Ok(Pattern::Alphanumeric),
            other => Err(crate::validation_error!(
                "invalid pattern '{}': use d for numbers, D for letters, a for alphanumeric",
                other
            )),
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.flag())
    }
}
