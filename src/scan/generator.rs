//! Candidate name generator

use regex::Regex;

use super::Pattern;
use crate::error::Result;

/// Longest label DNS allows
const MAX_LABEL_LENGTH: usize = 63;

/// Odometer-order enumeration of every label of a given length
pub struct CandidateGenerator {
    pattern: Pattern,
    length: usize,
    current_index: u64,
    total: u64,
}

impl CandidateGenerator {
    pub fn new(length: usize, pattern: Pattern) -> Self {
        let total = if length == 0 { 0 } else { pattern.total_combinations(length) };
        Self {
            pattern,
            length,
            current_index: 0,
            total,
        }
    }

    /// Get total number of combinations
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Label at a specific index
    pub fn label_at(&self, index: u64) -> Option<String> {
        if index >= self.total {
            return None;
        }

        let chars = self.pattern.chars();
        let base = chars.len() as u64;
        let mut result = vec![' '; self.length];
        let mut n = index;

        for i in (0..self.length).rev() {
            result[i] = chars[(n % base) as usize];
            n /= base;
        }

        Some(result.into_iter().collect())
    }

    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.current_index)
    }
}

impl Iterator for CandidateGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let label = self.label_at(self.current_index)?;
        self.current_index += 1;
        Some(label)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// `li` and `.li` both become `.li`
pub fn normalize_suffix(suffix: &str) -> String {
    let suffix = suffix.trim();
    if suffix.starts_with('.') {
        suffix.to_lowercase()
    } else {
        format!(".{}", suffix.to_lowercase())
    }
}

/// Every `label + suffix` of the given length, optionally filtered by a
/// regex matched against the full name. Names come out in generation order.
pub fn generate_candidates(
    length: usize,
    suffix: &str,
    pattern: Pattern,
    regex_filter: Option<&str>,
) -> Result<Vec<String>> {
    if length > MAX_LABEL_LENGTH {
        return Err(crate::validation_error!(
            "length {} exceeds the {}-character DNS label limit",
            length,
            MAX_LABEL_LENGTH
        ));
    }
    if (pattern.chars().len() as u64).checked_pow(length as u32).is_none() {
        return Err(crate::validation_error!(
            "length {} with pattern {} gives too many combinations to scan",
            length,
            pattern
        ));
    }

    let filter = match regex_filter.filter(|r| !r.is_empty()) {
        Some(expr) => Some(Regex::new(expr)?),
        None => None,
    };
    let suffix = normalize_suffix(suffix);

    let domains = CandidateGenerator::new(length, pattern)
        .map(|label| format!("{}{}", label, suffix))
        .filter(|domain| filter.as_ref().map_or(true, |re| re.is_match(domain)))
        .collect();

    Ok(domains)
}
