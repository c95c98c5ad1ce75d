//! # Task Optimizer Module
//!
//! Worker per l'elaborazione di un singolo PNG.
//! Il lavoro del codec gira su `spawn_blocking`; qualsiasi errore (codec,
//! I/O, task abortito) diventa un `FileOutcome::Failed` e non esce mai da qui.

use crate::{
    config::Config,
    image_processor::ImageProcessor,
    optimizer::{path_resolver::PathResolver, BatchMode},
    outcome::FileOutcome,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Worker per singoli file; cheap to clone into spawned tasks
#[derive(Debug, Clone)]
pub struct TaskOptimizer {
    pub mode: BatchMode,
    pub image_processor: ImageProcessor,
}

impl TaskOptimizer {
    pub fn new(config: &Config, mode: BatchMode) -> Self {
        Self {
            mode,
            image_processor: ImageProcessor::new(config),
        }
    }

    /// Processa un singolo file
    pub async fn process_single_file(&self, file_path: PathBuf) -> FileOutcome {
        let output_path = PathResolver::get_output_path(&file_path, self.mode);

        if self.should_skip_file(&output_path).await {
            debug!(
                "Skipping {}, output already exists: {}",
                file_path.display(),
                output_path.display()
            );
            return FileOutcome::Skipped {
                path: file_path,
                output: output_path,
            };
        }

        let worker = self.clone();
        let path = file_path.clone();
        match tokio::task::spawn_blocking(move || worker.run_codec(&path)).await {
            Ok(outcome) => outcome,
            Err(e) => FileOutcome::Failed {
                path: file_path,
                message: format!("worker task failed: {}", e),
            },
        }
    }

    /// Only the migration skips on an existing output; existence alone decides
    async fn should_skip_file(&self, output_path: &Path) -> bool {
        self.mode.skip_existing() && tokio::fs::try_exists(output_path).await.unwrap_or(false)
    }

    fn run_codec(&self, file_path: &Path) -> FileOutcome {
        let result = match self.mode {
            BatchMode::Compress => self.image_processor.recompress_png(file_path),
            BatchMode::Convert | BatchMode::ConvertParallel | BatchMode::Migrate => {
                self.image_processor.convert_to_webp(file_path)
            }
        };
        FileOutcome::from_result(file_path.to_path_buf(), result)
    }
}
