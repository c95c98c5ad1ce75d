//! # Batch Optimizer Main Orchestrator
//!
//! Orchestratore dei quattro tool sui PNG: trova i file, li passa al
//! `TaskOptimizer` (uno alla volta oppure su un worker pool limitato da
//! semaforo), aggrega gli esiti in `BatchStats` e stampa il riepilogo.
//!
//! ## Modalità
//! - `Compress`: ricompressione in place, totali solo sui file rimpiccioliti
//! - `Convert`: conversione WebP sequenziale
//! - `ConvertParallel`: conversione WebP su `workers` task concorrenti
//! - `Migrate`: conversione WebP che salta i file con WebP già presente
//!
//! Nessun errore per-file è fatale: solo la discovery iniziale può fallire.

use crate::{
    config::Config,
    file_manager::{ExtensionMatch, FileManager},
    image_processor::PNG_EXTENSION,
    json_output::{JsonConfig, JsonMessage},
    optimizer::{progress_tracker::ProgressTracker, task_optimizer::TaskOptimizer},
    outcome::FileOutcome,
    progress::{AggregatePolicy, BatchStats, ProgressManager},
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
    Compress,
    Convert,
    ConvertParallel,
    Migrate,
}

impl BatchMode {
    /// Subcommand name, also used in JSON messages
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::Convert => "convert",
            Self::ConvertParallel => "convert-parallel",
            Self::Migrate => "migrate",
        }
    }

    pub fn skip_existing(&self) -> bool {
        matches!(self, Self::Migrate)
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::ConvertParallel)
    }

    pub fn aggregate_policy(&self) -> AggregatePolicy {
        match self {
            Self::Compress => AggregatePolicy::PositiveSavingsOnly,
            Self::Convert | Self::ConvertParallel | Self::Migrate => AggregatePolicy::AllConverted,
        }
    }

    /// Saved-bytes threshold above which a file gets its own log line
    pub fn report_threshold(&self, config: &Config) -> Option<u64> {
        match self {
            Self::Compress => Some(config.compress_report_threshold),
            Self::Convert | Self::ConvertParallel => Some(config.convert_report_threshold),
            Self::Migrate => None,
        }
    }
}

/// Result of one batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub mode: BatchMode,
    pub stats: BatchStats,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.stats.files_found as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct BatchOptimizer {
    config: Config,
    mode: BatchMode,
    show_progress_bar: bool,
}

impl BatchOptimizer {
    pub fn new(config: Config, mode: BatchMode) -> Self {
        Self {
            config,
            mode,
            show_progress_bar: true,
        }
    }

    /// Disable the progress bar (tests, non-interactive callers)
    pub fn without_progress_bar(mut self) -> Self {
        self.show_progress_bar = false;
        self
    }

    /// Esegue il batch sulla directory `root`
    pub async fn run(&self, root: &Path) -> Result<BatchReport> {
        let start_time = Instant::now();

        let files = FileManager::find_files_with_extension(
            root,
            PNG_EXTENSION,
            ExtensionMatch::from_ignore_case(self.config.case_insensitive),
        )
        .with_context(|| format!("Failed to scan {}", root.display()))?;

        self.emit_start_message(root, &files);

        let tracker = self.create_tracker(files.len());
        let mut stats = BatchStats::new(self.mode.aggregate_policy(), files.len());

        if self.mode.is_parallel() {
            // Workers move the bar; logs and totals come after the whole pool has finished
            let outcomes = self
                .process_files_concurrently(files, tracker.progress_manager())
                .await?;
            for outcome in &outcomes {
                tracker.report_outcome(outcome);
                stats.record(outcome);
            }
        } else {
            let task_optimizer = TaskOptimizer::new(&self.config, self.mode);
            for file_path in files {
                let outcome = task_optimizer.process_single_file(file_path).await;
                tracker.handle_file_completion(&outcome);
                stats.record(&outcome);
            }
        }

        let report = BatchReport {
            mode: self.mode,
            stats,
            elapsed: start_time.elapsed(),
        };

        tracker.finish(&report.stats.format_summary());
        self.print_final_stats(&report);

        Ok(report)
    }

    fn create_tracker(&self, total_files: usize) -> ProgressTracker {
        let threshold = self.mode.report_threshold(&self.config);
        if self.show_progress_bar {
            ProgressTracker::new(total_files, self.mode, self.config.json_output, threshold)
        } else {
            ProgressTracker::without_bar(self.mode, self.config.json_output, threshold)
        }
    }

    /// Una task per file; al massimo `workers` conversioni in volo.
    /// Ogni task avanza la barra appena finisce.
    async fn process_files_concurrently(
        &self,
        files: Vec<PathBuf>,
        progress: ProgressManager,
    ) -> Result<Vec<FileOutcome>> {
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let task_optimizer = TaskOptimizer::new(&self.config, self.mode);
        let mut tasks = Vec::with_capacity(files.len());

        for file_path in &files {
            let permit = semaphore.clone().acquire_owned().await?;
            let worker = task_optimizer.clone();
            let file_path = file_path.clone();
            let progress = progress.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = worker.process_single_file(file_path).await;
                progress.update(&ProgressTracker::status_message(&outcome));
                outcome
            }));
        }

        let results = futures::future::join_all(tasks).await;

        Ok(files
            .into_iter()
            .zip(results)
            .map(|(path, result)| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    // The task never reached its own bar update
                    let outcome = FileOutcome::Failed {
                        path,
                        message: format!("worker task failed: {}", e),
                    };
                    progress.update(&ProgressTracker::status_message(&outcome));
                    outcome
                }
            })
            .collect())
    }

    fn emit_start_message(&self, root: &Path, files: &[PathBuf]) {
        if self.config.json_output {
            JsonMessage::start(
                self.mode.command_name(),
                root.to_path_buf(),
                files.len(),
                JsonConfig::from(&self.config),
            )
            .emit();
            return;
        }

        if self.config.dry_run {
            info!("Dry run mode: No files will be written");
        }

        match self.mode {
            BatchMode::Compress => info!("Found {} PNG files to compress...", files.len()),
            BatchMode::Convert => info!("Found {} PNG files to convert to WebP...", files.len()),
            BatchMode::ConvertParallel => {
                info!("Found {} PNG files", files.len());
                info!("Using {} workers for parallel processing", self.config.workers);
            }
            BatchMode::Migrate => info!("Starting WebP conversion in {}...", root.display()),
        }
        info!("{}", "=".repeat(80));
    }

    /// Stampa statistiche finali
    fn print_final_stats(&self, report: &BatchReport) {
        let stats = &report.stats;

        if self.config.json_output {
            JsonMessage::complete(
                self.mode.command_name(),
                stats,
                report.elapsed.as_secs_f64(),
                report.files_per_second(),
            )
            .emit();
            return;
        }

        info!("{}", "=".repeat(80));

        match self.mode {
            BatchMode::Compress => {
                info!("Compression Complete!");
                info!("Files processed: {}/{}", stats.files_processed, stats.files_found);
                Self::log_size_totals(stats);
            }
            BatchMode::Convert => {
                info!("Conversion Complete!");
                info!("Files converted: {}/{}", stats.files_processed, stats.files_found);
                Self::log_size_totals(stats);
            }
            BatchMode::ConvertParallel => {
                info!(
                    "Conversion Complete in {:.1} seconds!",
                    report.elapsed.as_secs_f64()
                );
                info!("Files converted: {}/{}", stats.files_processed, stats.files_found);
                Self::log_size_totals(stats);
                info!("Speed: {:.1} files/second", report.files_per_second());
            }
            BatchMode::Migrate => {
                info!("Migration Complete.");
                info!("Converted: {}", stats.files_processed);
                info!("Skipped: {}", stats.files_skipped);
            }
        }

        if stats.errors > 0 || self.mode == BatchMode::Migrate {
            info!("Errors: {}", stats.errors);
        }

        if matches!(self.mode, BatchMode::Convert | BatchMode::ConvertParallel) {
            info!("Next step: run `png-tools update-refs` to point references at .webp files");
        }
    }

    fn log_size_totals(stats: &BatchStats) {
        info!(
            "Total original size: {:.2} MB",
            FileManager::to_mib(stats.total_original_size as i64)
        );
        info!(
            "Total new size: {:.2} MB",
            FileManager::to_mib(stats.total_new_size as i64)
        );
        info!(
            "Total saved: {:.2} MB ({:.1}%)",
            FileManager::to_mib(stats.total_saved()),
            stats.saved_percent()
        );
    }
}
