//! Integration tests for domain-scanner

use assert_cmd::Command;
use async_trait::async_trait;
use domain_scanner::{
    config::AppConfig,
    domain::{DnsProbe, TlsProbe, WhoisSource},
    generate_candidates,
    output::{NamingContext, ResultWriter},
    Classifier, Pattern, Provenance, RetryPolicy, Result, ScanConfig, Scanner, ScannerError, Signal,
    SpecialStatusKind, Verdict,
};
use predicates::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Canned DNS answers keyed by domain
#[derive(Default)]
struct FixtureDns(HashMap<String, Vec<Signal>>);

#[async_trait]
impl DnsProbe for FixtureDns {
    async fn signals(&self, domain: &str) -> Vec<Signal> {
        self.0.get(domain).cloned().unwrap_or_default()
    }
}

/// Domains that present a certificate
#[derive(Default)]
struct FixtureTls(HashSet<String>);

#[async_trait]
impl TlsProbe for FixtureTls {
    async fn certificate_presented(&self, domain: &str) -> bool {
        self.0.contains(domain)
    }
}

/// Canned WHOIS text; unknown domains get a network error
#[derive(Default)]
struct FixtureWhois {
    records: HashMap<String, String>,
    calls: AtomicUsize,
}

#[async_trait]
impl WhoisSource for FixtureWhois {
    async fn whois(&self, domain: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(domain)
            .cloned()
            .ok_or_else(|| ScannerError::network("connection refused", Some("whois.nic.ch".to_string())))
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        backoff: Duration::ZERO,
    }
}

fn fixture_classifier() -> (Classifier, Arc<FixtureWhois>) {
    let mut dns = FixtureDns::default();
    dns.0.insert("xyz.li".to_string(), vec![Signal::DnsNs]);

    let mut tls = FixtureTls::default();
    tls.0.insert("xyz.li".to_string());

    let mut whois = FixtureWhois::default();
    whois.records.insert(
        "abc.li".to_string(),
        "We do not have an entry in our database matching your query.".to_string(),
    );
    whois.records.insert("xyz.li".to_string(), "Registrar: Example AG\nStatus: active".to_string());
    whois.records.insert("res.li".to_string(), "Domain reserved by registry policy".to_string());
    whois.records.insert("cnn.li".to_string(), "Status: connect".to_string());
    whois.records.insert("old.li".to_string(), "Domain Status: redemptionPeriod".to_string());
    let whois = Arc::new(whois);

    let classifier = Classifier::without_probes(fast_retry())
        .with_dns(Arc::new(dns))
        .with_tls(Arc::new(tls))
        .with_whois(whois.clone());

    (classifier, whois)
}

fn scanner(workers: usize) -> Scanner {
    let (classifier, _) = fixture_classifier();
    Scanner::new(
        Arc::new(classifier),
        ScanConfig {
            workers,
            delay: Duration::ZERO,
        },
    )
}

#[tokio::test]
async fn test_end_to_end_scan_buckets() {
    let candidates = vec!["abc.li".to_string(), "xyz.li".to_string()];
    let report = scanner(2).run(candidates, |_| {}).await;

    assert_eq!(report.summary.total, 2);
    assert_eq!(report.buckets.available, vec!["abc.li".to_string()]);
    assert_eq!(report.buckets.registered.len(), 1);

    let registered = &report.buckets.registered[0];
    assert_eq!(registered.domain, "xyz.li");
    assert_eq!(registered.signatures.joined(), "DNS_NS, WHOIS, SSL");
}

#[tokio::test]
async fn test_whois_only_scan_buckets() {
    let mut whois = FixtureWhois::default();
    whois.records.insert("abc.li".to_string(), "No match for domain".to_string());
    whois.records.insert("xyz.li".to_string(), "Registrar: Example Corp".to_string());

    let classifier = Classifier::without_probes(fast_retry()).with_whois(Arc::new(whois));
    let scanner = Scanner::new(
        Arc::new(classifier),
        ScanConfig {
            workers: 2,
            delay: Duration::ZERO,
        },
    );

    let report = scanner
        .run(vec!["abc.li".to_string(), "xyz.li".to_string()], |_| {})
        .await;

    assert_eq!(report.buckets.available, vec!["abc.li".to_string()]);
    assert_eq!(report.buckets.registered.len(), 1);
    assert_eq!(report.buckets.registered[0].domain, "xyz.li");
    assert_eq!(report.buckets.registered[0].signatures.joined(), "WHOIS");
    assert!(report.buckets.special_status.is_empty());
    assert!(report.buckets.errors.is_empty());
}

#[tokio::test]
async fn test_one_result_per_candidate_for_any_pool_size() {
    let candidates: Vec<String> = ["abc.li", "xyz.li", "res.li", "cnn.li", "old.li", "zzz.li"]
        .iter()
        .map(|d| d.to_string())
        .collect();

    for workers in [1, 3, candidates.len()] {
        let results = scanner(workers).collect(candidates.clone()).await;
        let seen: HashSet<String> = results.iter().map(|r| r.domain.clone()).collect();

        assert_eq!(results.len(), candidates.len(), "workers = {}", workers);
        assert_eq!(seen.len(), candidates.len(), "workers = {}", workers);
    }
}

#[tokio::test]
async fn test_reserved_domain_is_special_status() {
    let (classifier, _) = fixture_classifier();
    let classification = classifier.assess("res.li").await;

    assert_eq!(
        classification.verdict,
        Verdict::SpecialStatus {
            kind: SpecialStatusKind::Reserved
        }
    );
    assert_eq!(classification.provenance, Provenance::Reserved);
    assert!(classification.signatures.contains(Signal::Reserved));
}

#[tokio::test]
async fn test_connect_hint_counts_as_registered() {
    let (classifier, _) = fixture_classifier();
    let classification = classifier.assess("cnn.li").await;

    assert!(classification.verdict.is_registered());
    assert_eq!(classification.provenance, Provenance::WhoisRegistered);
    assert!(classification.signatures.contains(Signal::Whois));
}

#[tokio::test]
async fn test_whois_only_special_status() {
    let (classifier, _) = fixture_classifier();
    let verdict = classifier.classify("old.li").await;

    assert_eq!(verdict.special_status(), Some(SpecialStatusKind::RedemptionPeriod));
}

#[tokio::test]
async fn test_unreachable_whois_means_available() {
    let (classifier, whois) = fixture_classifier();
    let classification = classifier.assess("nothing.li").await;

    assert_eq!(classification.verdict, Verdict::Available);
    assert_eq!(classification.provenance, Provenance::NoData);
    // three attempts for the first pass, three for the re-check
    assert_eq!(whois.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_invalid_candidate_is_an_error_result() {
    let results = scanner(1).collect(vec!["-bad-.li".to_string()]).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].is_error());
    assert!(results[0].verdict.is_none());
}

#[tokio::test]
async fn test_generated_candidates_scan_and_write() {
    let candidates = generate_candidates(1, "li", Pattern::Digits, Some("^[0-4]")).unwrap();
    assert_eq!(candidates.len(), 5);

    let report = scanner(2).run(candidates, |_| {}).await;
    assert_eq!(report.summary.available, 5);

    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.output.output_dir = dir.path().display().to_string();

    let writer = ResultWriter::new(
        &config.output,
        &NamingContext {
            pattern: Pattern::Digits,
            length: 1,
            suffix: ".li".to_string(),
        },
    );
    let files = writer.write(&report.buckets, false).unwrap();

    let written = std::fs::read_to_string(&files.available).unwrap();
    let mut lines: Vec<&str> = written.lines().collect();
    lines.sort();
    assert_eq!(lines, vec!["0.li", "1.li", "2.li", "3.li", "4.li"]);
    assert!(files.available.ends_with("available_domains_d_1_li.txt"));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scanner.toml");
    std::fs::write(
        &path,
        "[domain]\nlength = 2\npattern = \"a\"\n\n[scanner]\nworkers = 4\nshow_registered = true\n",
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.domain.length, 2);
    assert_eq!(config.pattern().unwrap(), Pattern::Alphanumeric);
    assert_eq!(config.scan_config().workers, 4);
    assert!(config.scanner.show_registered);
    assert_eq!(config.domain.suffix, ".li");
}

#[test]
fn test_cli_rejects_unknown_pattern() {
    Command::cargo_bin("domain-scanner")
        .unwrap()
        .args(["-p", "x"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid pattern"));
}

#[test]
fn test_cli_rejects_bad_regex() {
    Command::cargo_bin("domain-scanner")
        .unwrap()
        .args(["-l", "1", "-r", "("])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_cli_rejects_oversized_length() {
    Command::cargo_bin("domain-scanner")
        .unwrap()
        .args(["-l", "20", "-p", "a"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("too many combinations"));
}

#[test]
fn test_cli_missing_config_file() {
    Command::cargo_bin("domain-scanner")
        .unwrap()
        .args(["--config", "/nonexistent/scanner.toml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration problem"));
}

#[test]
fn test_cli_help() {
    Command::cargo_bin("domain-scanner")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--show-registered"));
}
