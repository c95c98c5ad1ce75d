//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione degli strumenti batch.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri dei cinque tool
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default per soglie, worker e sostituzioni
//!
//! ## Parametri di configurazione:
//! - `compress_report_threshold`: byte risparmiati oltre cui stampare il file (default: 1 KiB)
//! - `convert_report_threshold`: idem per la conversione WebP (default: 10 KiB)
//! - `workers`: worker paralleli (default: numero di CPU dell'host)
//! - `png_compression`: livello di compressione PNG (default: `best`)
//! - `case_insensitive`: match dell'estensione `.png` senza distinzione maiuscole
//! - `dry_run`: simulazione senza scrivere file (default: false)
//! - `json_output`: output JSON line-delimited su stdout (default: false)
//! - `source_dir` / `source_extension`: dove cercare i sorgenti da aggiornare
//! - `replace_from` / `replace_to`: sottostringhe sostituite nei sorgenti
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     workers: 8,
//!     dry_run: true,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// PNG optimization effort used by the recompressor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl PngCompression {
    /// oxipng preset level (0-6); `Best` is the slowest, most thorough search
    pub fn oxipng_preset(&self) -> u8 {
        match self {
            Self::Fast => 1,
            Self::Default => 2,
            Self::Best => 6,
        }
    }
}

/// Configuration shared by every batch tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recompressor prints a file only when it saved more than this many bytes
    pub compress_report_threshold: u64,
    /// Converters print a file only when it saved more than this many bytes
    pub convert_report_threshold: u64,
    /// Number of parallel workers for `convert-parallel`
    pub workers: usize,
    /// PNG compression level used when recompressing in place
    pub png_compression: PngCompression,
    /// Match `.PNG`, `.Png`, ... as well as `.png`
    pub case_insensitive: bool,
    /// Dry run - don't write any file
    pub dry_run: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    /// Subdirectory (relative to the root) scanned by the reference updater
    pub source_dir: PathBuf,
    /// Extension of the source files scanned by the reference updater
    pub source_extension: String,
    /// Literal substring searched in source files
    pub replace_from: String,
    /// Replacement for every occurrence of `replace_from`
    pub replace_to: String,
}

/// Number of processing units available to this process
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compress_report_threshold: 1024,
            convert_report_threshold: 10 * 1024,
            workers: default_workers(),
            png_compression: PngCompression::Best,
            case_insensitive: false,
            dry_run: false,
            json_output: false,
            source_dir: PathBuf::from("js"),
            source_extension: "js".to_string(),
            replace_from: ".png".to_string(),
            replace_to: ".webp".to_string(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if self.source_extension.is_empty() || self.source_extension.starts_with('.') {
            return Err(anyhow::anyhow!(
                "Source extension must be non-empty and given without the leading dot"
            ));
        }

        if self.replace_from.is_empty() {
            return Err(anyhow::anyhow!("Replacement pattern must not be empty"));
        }

        if self.replace_from == self.replace_to {
            return Err(anyhow::anyhow!(
                "Replacement pattern and replacement are identical: {}",
                self.replace_from
            ));
        }

        if self.source_dir.is_absolute() {
            return Err(anyhow::anyhow!(
                "Source directory must be relative to the root: {}",
                self.source_dir.display()
            ));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
