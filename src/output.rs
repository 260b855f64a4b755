//! Result files: one name per line, special statuses as `domain<TAB>label`

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::OutputSettings;
use crate::error::{Result, ScannerError};
use crate::scan::{Pattern, ResultBuckets};

/// Values substituted into `{pattern}`, `{length}` and `{suffix}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub pattern: Pattern,
    pub length: usize,
    /// With or without the leading dot; the dot is dropped when rendering
    pub suffix: String,
}

impl NamingContext {
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{pattern}", self.pattern.flag())
            .replace("{length}", &self.length.to_string())
            .replace("{suffix}", self.suffix.trim_start_matches('.'))
    }
}

/// Paths actually written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub available: PathBuf,
    pub registered: Option<PathBuf>,
    pub special_status: Option<PathBuf>,
}

/// Persists result buckets using the configured templates
#[derive(Debug, Clone)]
pub struct ResultWriter {
    dir: PathBuf,
    available: String,
    registered: String,
    special_status: String,
}

impl ResultWriter {
    pub fn new(settings: &OutputSettings, naming: &NamingContext) -> Self {
        Self {
            dir: PathBuf::from(&settings.output_dir),
            available: naming.render(&settings.available_file),
            registered: naming.render(&settings.registered_file),
            special_status: naming.render(&settings.special_status_file),
        }
    }

    pub fn available_path(&self) -> PathBuf {
        self.dir.join(&self.available)
    }

    pub fn registered_path(&self) -> PathBuf {
        self.dir.join(&self.registered)
    }

    pub fn special_status_path(&self) -> PathBuf {
        self.dir.join(&self.special_status)
    }

    /// Create the output directory up front so a bad path fails before any scanning
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ScannerError::io(
                format!("cannot create output directory: {}", e),
                Some(self.dir.display().to_string()),
            )
        })
    }

    /// The available file is always written (possibly empty); the registered
    /// file only when asked for; the special-status file only when non-empty.
    pub fn write(&self, buckets: &ResultBuckets, include_registered: bool) -> Result<WrittenFiles> {
        self.prepare()?;

        let available = self.available_path();
        write_lines(&available, buckets.available.iter().map(String::as_str))?;

        let registered = if include_registered {
            let path = self.registered_path();
            write_lines(&path, buckets.registered.iter().map(|r| r.domain.as_str()))?;
            Some(path)
        } else {
            None
        };

        let special_status = if buckets.special_status.is_empty() {
            None
        } else {
            let path = self.special_status_path();
            let lines: Vec<String> = buckets
                .special_status
                .iter()
                .map(|s| format!("{}\t{}", s.domain, s.kind.label()))
                .collect();
            write_lines(&path, lines.iter().map(String::as_str))?;
            Some(path)
        };

        Ok(WrittenFiles {
            available,
            registered,
            special_status,
        })
    }
}

fn write_lines<'a>(path: &Path, lines: impl Iterator<Item = &'a str>) -> Result<()> {
    let io_err = |e: std::io::Error| ScannerError::io(e.to_string(), Some(path.display().to_string()));

    let file = fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}
