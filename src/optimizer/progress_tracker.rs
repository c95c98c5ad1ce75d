//! # Progress Tracking Module
//!
//! Output per-file di un batch: righe di log, progress bar e messaggi JSON.
//! Non tiene contatori propri, le somme vivono in `BatchStats`.

use crate::{
    file_manager::FileManager,
    json_output::JsonMessage,
    optimizer::BatchMode,
    outcome::{FileOutcome, ProcessedFile},
    progress::ProgressManager,
};
use std::path::Path;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct ProgressTracker {
    mode: BatchMode,
    json_output: bool,
    /// Print a converted file only above this many saved bytes; `None` prints all
    report_threshold: Option<u64>,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    pub fn new(
        total_files: usize,
        mode: BatchMode,
        json_output: bool,
        report_threshold: Option<u64>,
    ) -> Self {
        let progress_manager = if json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(total_files as u64)
        };

        Self {
            mode,
            json_output,
            report_threshold,
            progress_manager,
        }
    }

    /// Tracker that never draws a bar; logs and JSON still flow
    pub fn without_bar(mode: BatchMode, json_output: bool, report_threshold: Option<u64>) -> Self {
        Self {
            mode,
            json_output,
            report_threshold,
            progress_manager: ProgressManager::hidden(),
        }
    }

    /// Gestisce completamento file: log, JSON e avanzamento della barra
    pub fn handle_file_completion(&self, outcome: &FileOutcome) {
        self.report_outcome(outcome);
        self.progress_manager.update(&Self::status_message(outcome));
    }

    /// Log and JSON output for one file, without moving the bar.
    /// The parallel pool advances the bar from its workers instead.
    pub fn report_outcome(&self, outcome: &FileOutcome) {
        if self.json_output {
            JsonMessage::file_complete(outcome).emit();
        }

        match outcome {
            FileOutcome::Converted(processed) => {
                if !self.json_output && self.is_worth_reporting(processed) {
                    let line = self.converted_line(processed);
                    self.progress_manager.suspend(|| info!("{}", line));
                }
            }
            FileOutcome::Skipped { path, output } => {
                debug!("Skipped {}: {} already exists", path.display(), output.display());
            }
            FileOutcome::Failed { path, message } => {
                if !self.json_output {
                    let line = self.failure_line(path, message);
                    self.progress_manager.suspend(|| error!("{}", line));
                }
            }
        }
    }

    /// Short status shown next to the bar
    pub fn status_message(outcome: &FileOutcome) -> String {
        let name = FileManager::display_name(outcome.path());
        match outcome {
            FileOutcome::Converted(processed) => {
                format!("[OK] {}: {:.1}% saved", name, processed.saved_percent())
            }
            FileOutcome::Skipped { .. } => format!("[SKIP] {}", name),
            FileOutcome::Failed { .. } => format!("[ERROR] {}", name),
        }
    }

    /// Handle on the bar for worker tasks
    pub fn progress_manager(&self) -> ProgressManager {
        self.progress_manager.clone()
    }

    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }

    fn is_worth_reporting(&self, processed: &ProcessedFile) -> bool {
        match self.report_threshold {
            Some(threshold) => processed.saved() > threshold as i64,
            None => true,
        }
    }

    fn failure_line(&self, path: &Path, message: &str) -> String {
        match self.mode {
            BatchMode::ConvertParallel => {
                format!("✗ {}: ERROR - {}", FileManager::display_name(path), message)
            }
            BatchMode::Compress => format!("Error compressing {}: {}", path.display(), message),
            BatchMode::Convert | BatchMode::Migrate => {
                format!("Error converting {}: {}", path.display(), message)
            }
        }
    }

    fn converted_line(&self, processed: &ProcessedFile) -> String {
        let name = FileManager::display_name(&processed.path);
        let saved_kb = FileManager::to_kib(processed.saved());
        let percent = processed.saved_percent();

        match self.mode {
            BatchMode::Compress | BatchMode::ConvertParallel => {
                format!("✓ {}: {:.1} KB saved ({:.1}%)", name, saved_kb, percent)
            }
            BatchMode::Convert => format!(
                "✓ {} → {}: {:.1} KB saved ({:.1}%)",
                name,
                FileManager::display_name(&processed.output),
                saved_kb,
                percent
            ),
            BatchMode::Migrate => format!(
                "Converted: {} -> {}",
                processed.path.display(),
                processed.output.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn processed(original: u64, new: u64) -> ProcessedFile {
        ProcessedFile::new(
            PathBuf::from("art/a.png"),
            PathBuf::from("art/a.webp"),
            original,
            new,
        )
    }

    #[test]
    fn test_threshold_is_strict() {
        let tracker = ProgressTracker::without_bar(BatchMode::Compress, false, Some(1024));
        assert!(!tracker.is_worth_reporting(&processed(3000, 3000 - 1024)));
        assert!(tracker.is_worth_reporting(&processed(3000, 3000 - 1025)));
        assert!(!tracker.is_worth_reporting(&processed(100, 5000)));

        let everything = ProgressTracker::without_bar(BatchMode::Migrate, false, None);
        assert!(everything.is_worth_reporting(&processed(100, 5000)));
    }

    #[test]
    fn test_failure_lines_per_mode() {
        let path = PathBuf::from("art/broken.png");
        let line = |mode| {
            ProgressTracker::without_bar(mode, false, None).failure_line(&path, "bad header")
        };

        assert_eq!(line(BatchMode::ConvertParallel), "✗ broken.png: ERROR - bad header");
        assert_eq!(
            line(BatchMode::Compress),
            format!("Error compressing {}: bad header", path.display())
        );
        assert_eq!(
            line(BatchMode::Convert),
            format!("Error converting {}: bad header", path.display())
        );
        assert_eq!(
            line(BatchMode::Migrate),
            format!("Error converting {}: bad header", path.display())
        );
    }

    #[test]
    fn test_only_completion_moves_the_bar() {
        let tracker = ProgressTracker::without_bar(BatchMode::ConvertParallel, false, Some(0));
        let outcome = FileOutcome::Converted(processed(4000, 1000));

        tracker.report_outcome(&outcome);
        assert_eq!(tracker.progress_manager().position(), 0);

        tracker.handle_file_completion(&outcome);
        assert_eq!(tracker.progress_manager().position(), 1);
        assert_eq!(ProgressTracker::status_message(&outcome), "[OK] a.png: 75.0% saved");
    }

    #[test]
    fn test_converted_lines_per_mode() {
        let p = processed(20 * 1024, 10 * 1024);

        let convert = ProgressTracker::without_bar(BatchMode::Convert, false, None);
        assert_eq!(convert.converted_line(&p), "✓ a.png → a.webp: 10.0 KB saved (50.0%)");

        let compress = ProgressTracker::without_bar(BatchMode::Compress, false, None);
        assert_eq!(compress.converted_line(&p), "✓ a.png: 10.0 KB saved (50.0%)");

        let migrate = ProgressTracker::without_bar(BatchMode::Migrate, false, None);
        assert_eq!(
            migrate.converted_line(&p),
            format!(
                "Converted: {} -> {}",
                PathBuf::from("art/a.png").display(),
                PathBuf::from("art/a.webp").display()
            )
        );
    }
}
