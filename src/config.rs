//! TOML configuration file

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, ScannerError};
use crate::scan::{normalize_suffix, Pattern, ScanConfig};
use crate::types::CheckMethods;

/// Whole config file. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub domain: DomainSettings,
    pub scanner: ScannerSettings,
    pub output: OutputSettings,
}

/// `[domain]`: what to generate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomainSettings {
    pub length: usize,
    pub suffix: String,
    pub pattern: String,
    pub regex_filter: String,
}

impl Default for DomainSettings {
    fn default() -> Self {
        Self {
            length: 3,
            suffix: ".li".to_string(),
            pattern: "D".to_string(),
            regex_filter: String::new(),
        }
    }
}

/// `[scanner]`: pacing and probes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Milliseconds a worker waits after each domain
    pub delay: u64,
    pub workers: usize,
    pub show_registered: bool,
    pub methods: MethodSettings,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            delay: 1000,
            workers: 10,
            show_registered: false,
            methods: MethodSettings::default(),
        }
    }
}

/// `[scanner.methods]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MethodSettings {
    pub dns_check: bool,
    pub whois_check: bool,
    pub ssl_check: bool,
    pub http_check: bool,
}

impl Default for MethodSettings {
    fn default() -> Self {
        let methods = CheckMethods::default();
        Self {
            dns_check: methods.dns,
            whois_check: methods.whois,
            ssl_check: methods.ssl,
            http_check: methods.http,
        }
    }
}

impl MethodSettings {
    fn any_enabled(&self) -> bool {
        self.dns_check || self.whois_check || self.ssl_check || self.http_check
    }
}

/// `[output]`: file name templates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub available_file: String,
    pub registered_file: String,
    pub special_status_file: String,
    pub output_dir: String,
    pub verbose: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            available_file: "available_domains_{pattern}_{length}_{suffix}.txt".to_string(),
            registered_file: "registered_domains_{pattern}_{length}_{suffix}.txt".to_string(),
            special_status_file: "special_status_domains_{pattern}_{length}_{suffix}.txt".to_string(),
            output_dir: ".".to_string(),
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Read and normalise a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScannerError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Fill holes an explicit-but-empty value would leave
    pub fn normalize(&mut self) {
        let defaults = AppConfig::default();

        if self.domain.length == 0 {
            self.domain.length = defaults.domain.length;
        }
        if self.domain.suffix.trim().is_empty() {
            self.domain.suffix = defaults.domain.suffix;
        }
        self.domain.suffix = normalize_suffix(&self.domain.suffix);
        if self.domain.pattern.is_empty() {
            self.domain.pattern = defaults.domain.pattern;
        }
        if self.scanner.workers == 0 {
            self.scanner.workers = defaults.scanner.workers;
        }
        if !self.scanner.methods.any_enabled() {
            self.scanner.methods = defaults.scanner.methods;
        }
        if self.output.available_file.is_empty() {
            self.output.available_file = defaults.output.available_file;
        }
        if self.output.registered_file.is_empty() {
            self.output.registered_file = defaults.output.registered_file;
        }
        if self.output.special_status_file.is_empty() {
            self.output.special_status_file = defaults.output.special_status_file;
        }
        if self.output.output_dir.is_empty() {
            self.output.output_dir = defaults.output.output_dir;
        }
    }

    pub fn pattern(&self) -> Result<Pattern> {
        self.domain.pattern.parse()
    }

    pub fn regex_filter(&self) -> Option<&str> {
        Some(self.domain.regex_filter.as_str()).filter(|r| !r.is_empty())
    }

    pub fn check_methods(&self) -> CheckMethods {
        let m = self.scanner.methods;
        CheckMethods {
            dns: m.dns_check,
            whois: m.whois_check,
            ssl: m.ssl_check,
            http: m.http_check,
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            workers: self.scanner.workers,
            delay: Duration::from_millis(self.scanner.delay),
        }
    }
}
