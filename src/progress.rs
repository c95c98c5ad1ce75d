//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la progress bar e le statistiche aggregate di un batch.
//!
//! ## Componenti principali:
//! - `ProgressManager`: progress bar `indicatif` (nascosta in modalità JSON)
//! - `BatchStats`: somme e contatori aggregati da tutti i `FileOutcome`
//! - `AggregatePolicy`: quali file convertiti entrano nei totali
//!
//! ## Statistiche tracciate:
//! - **files_found**: PNG trovati dalla discovery
//! - **files_processed**: file convertiti inclusi nei totali
//! - **files_unchanged**: file convertiti ma esclusi dai totali (nessun risparmio)
//! - **files_skipped**: output già esistente (solo migrazione)
//! - **errors**: file falliti, mai inclusi nei totali
//! - **total_original_size / total_new_size**: somme in byte
//!
//! ## Invarianti:
//! - `total_saved() == total_original_size - total_new_size`
//! - `saved_percent()` divide solo se `total_original_size > 0`
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut stats = BatchStats::new(AggregatePolicy::AllConverted, files.len());
//! for outcome in &outcomes {
//!     stats.record(outcome);
//! }
//! println!("{}", stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use crate::outcome::{FileOutcome, ProcessedFile};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Manages the progress bar of one batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing (JSON output, tests)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Files counted so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Run `f` with the bar cleared, so log lines don't interleave with it
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Which successful conversions contribute to the size totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatePolicy {
    /// Every converted file counts, including ones that grew
    #[default]
    AllConverted,
    /// Only files that actually got smaller count
    PositiveSavingsOnly,
}

impl AggregatePolicy {
    pub fn includes(&self, processed: &ProcessedFile) -> bool {
        match self {
            Self::AllConverted => true,
            Self::PositiveSavingsOnly => processed.saved() > 0,
        }
    }
}

/// Aggregate statistics for one batch run
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BatchStats {
    pub policy: AggregatePolicy,
    pub files_found: usize,
    pub files_processed: usize,
    pub files_unchanged: usize,
    pub files_skipped: usize,
    pub errors: usize,
    pub total_original_size: u64,
    pub total_new_size: u64,
}

impl BatchStats {
    pub fn new(policy: AggregatePolicy, files_found: usize) -> Self {
        Self {
            policy,
            files_found,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Converted(processed) => {
                if self.policy.includes(processed) {
                    self.files_processed += 1;
                    self.total_original_size += processed.original_size;
                    self.total_new_size += processed.new_size;
                } else {
                    self.files_unchanged += 1;
                }
            }
            FileOutcome::Skipped { .. } => self.files_skipped += 1,
            FileOutcome::Failed { .. } => self.errors += 1,
        }
    }

    /// Bytes saved over the counted files; negative if they grew overall
    pub fn total_saved(&self) -> i64 {
        self.total_original_size as i64 - self.total_new_size as i64
    }

    pub fn saved_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_saved() as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Found: {} | Processed: {} | Unchanged: {} | Skipped: {} | Errors: {} | Total saved: {:.2} MB ({:.1}%)",
            self.files_found,
            self.files_processed,
            self.files_unchanged,
            self.files_skipped,
            self.errors,
            FileManager::to_mib(self.total_saved()),
            self.saved_percent()
        )
    }
}
