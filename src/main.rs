//! Domain Scanner - find unregistered short domain names
//!
//! Generates every name for a length/pattern/suffix, checks each one through
//! DNS, TLS and WHOIS, and writes the available ones to a file.

use clap::Parser;
use domain_scanner::{
    config::AppConfig,
    domain::Classifier,
    generate_candidates,
    output::{NamingContext, ResultWriter},
    scan::{ScanProgress, Scanner},
    RetryPolicy, Result, Verdict,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Command line flags. Anything given here beats the config file.
#[derive(Parser, Debug)]
#[command(name = "domain-scanner", version, about = "A tool to check domain availability")]
struct Cli {
    /// Domain length (default: 3)
    #[arg(short = 'l', long = "length")]
    length: Option<usize>,

    /// Domain suffix (default: .li)
    #[arg(short = 's', long = "suffix")]
    suffix: Option<String>,

    /// Domain pattern: d = numbers (123.li), D = letters (abc.li), a = alphanumeric (a1b.li)
    #[arg(short = 'p', long = "pattern")]
    pattern: Option<String>,

    /// Regex filter applied to the full domain name
    #[arg(short = 'r', long = "regex")]
    regex: Option<String>,

    /// Delay between queries in milliseconds (default: 1000)
    #[arg(long)]
    delay: Option<u64>,

    /// Number of concurrent workers (default: 10)
    #[arg(long)]
    workers: Option<usize>,

    /// Show registered domains in output and write them to a file
    #[arg(long = "show-registered")]
    show_registered: bool,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the library
    if let Err(e) = domain_scanner::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            process::exit(1);
        }
    };

    init_tracing(config.output.verbose);

    if let Err(e) = run_scan(&config).await {
        eprintln!("{}", e.user_message());
        process::exit(1);
    }

    Ok(())
}

/// Defaults, then the config file, then explicit flags
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(length) = cli.length {
        config.domain.length = length;
    }
    if let Some(suffix) = &cli.suffix {
        config.domain.suffix = suffix.clone();
    }
    if let Some(pattern) = &cli.pattern {
        config.domain.pattern = pattern.clone();
    }
    if let Some(regex) = &cli.regex {
        config.domain.regex_filter = regex.clone();
    }
    if let Some(delay) = cli.delay {
        config.scanner.delay = delay;
    }
    if let Some(workers) = cli.workers {
        config.scanner.workers = workers;
    }
    if cli.show_registered {
        config.scanner.show_registered = true;
    }

    config.normalize();
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "domain_scanner=debug" } else { "domain_scanner=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_scan(config: &AppConfig) -> Result<()> {
    let pattern = config.pattern()?;
    let length = config.domain.length;
    let suffix = &config.domain.suffix;
    let show_registered = config.scanner.show_registered;

    let candidates = generate_candidates(length, suffix, pattern, config.regex_filter())?;

    let writer = ResultWriter::new(
        &config.output,
        &NamingContext {
            pattern,
            length,
            suffix: suffix.clone(),
        },
    );
    writer.prepare()?;

    print_banner();
    println!(
        "Checking {} domains with pattern {} and length {} using {} workers...",
        candidates.len(),
        pattern,
        length,
        config.scanner.workers
    );
    if let Some(regex) = config.regex_filter() {
        println!("Using regex filter: {}", regex);
    }

    let classifier = Classifier::new(config.check_methods(), RetryPolicy::default())?;
    let scanner = Scanner::new(Arc::new(classifier), config.scan_config());

    let progress = ProgressBar::new(candidates.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let report = scanner
        .run(candidates, |update| {
            if let Some(line) = progress_line(update, show_registered) {
                if progress.is_hidden() {
                    println!("{}", line);
                } else {
                    progress.println(line);
                }
            }
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    let files = writer.write(&report.buckets, show_registered)?;

    println!();
    println!("Results saved to:");
    println!("- Available domains: {}", files.available.display());
    if let Some(path) = &files.registered {
        println!("- Registered domains: {}", path.display());
    }
    if let Some(path) = &files.special_status {
        println!("- Special status domains: {}", path.display());
    }

    let summary = report.summary;
    println!();
    println!("📈 Summary:");
    println!("- Total domains checked: {}", summary.total);
    println!("- Available domains: {}", summary.available);
    if show_registered {
        println!("- Registered domains: {}", summary.registered);
    }
    if summary.special_status > 0 {
        println!("- Special status domains: {}", summary.special_status);
    }
    if summary.errors > 0 {
        println!("- Errors: {}", summary.errors);
    }
    println!("- Total time: {:.2}s", report.elapsed.as_secs_f32());
    if report.metrics.domains_checked > 0 {
        println!("- Average check time: {:.1}ms", report.metrics.avg_check_time_ms());
    }

    Ok(())
}

/// One `[i/N]` line per completion; registered domains only when asked for
fn progress_line(update: &ScanProgress<'_>, show_registered: bool) -> Option<String> {
    let counter = format!("[{}/{}]", update.completed, update.total);
    let result = update.result;

    if let Some(error) = &result.error {
        return Some(format!("{} Error checking domain {}: {}", counter, result.domain, error));
    }

    match &result.verdict {
        Some(Verdict::SpecialStatus { kind }) => Some(format!(
            "{} Domain {} is in SPECIAL STATUS [{}]",
            counter, result.domain, kind
        )),
        Some(Verdict::Available) => Some(format!("{} Domain {} is AVAILABLE!", counter, result.domain)),
        Some(Verdict::Registered { signatures }) if show_registered => Some(format!(
            "{} Domain {} is REGISTERED [{}]",
            counter,
            result.domain,
            signatures.joined()
        )),
        _ => None,
    }
}

fn print_banner() {
    println!("🔍 Domain Scanner v{}", domain_scanner::VERSION);
    println!("═══════════════════════════════════════════════════");
    println!();
}
