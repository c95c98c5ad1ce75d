//! # Per-file Outcome Module
//!
//! Risultato dell'elaborazione di un singolo file PNG.
//!
//! Ogni worker restituisce un `FileOutcome` invece di propagare l'errore:
//! un'immagine rotta non può interrompere il batch, e il controller separa
//! successi, skip ed errori con un semplice `match`.

use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Sizes measured around one successful encode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedFile {
    /// Source PNG
    pub path: PathBuf,
    /// File written by the encoder (same as `path` when recompressing in place)
    pub output: PathBuf,
    pub original_size: u64,
    pub new_size: u64,
}

impl ProcessedFile {
    pub fn new(path: PathBuf, output: PathBuf, original_size: u64, new_size: u64) -> Self {
        Self {
            path,
            output,
            original_size,
            new_size,
        }
    }

    /// Bytes saved; negative when the output is larger than the source
    pub fn saved(&self) -> i64 {
        self.original_size as i64 - self.new_size as i64
    }

    pub fn saved_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.original_size, self.new_size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Converted(ProcessedFile),
    /// Output already existed, nothing was encoded
    Skipped { path: PathBuf, output: PathBuf },
    Failed { path: PathBuf, message: String },
}

impl FileOutcome {
    /// Collapse a codec result into an outcome at the per-file boundary
    pub fn from_result(path: PathBuf, result: Result<ProcessedFile, OptimizeError>) -> Self {
        match result {
            Ok(processed) => Self::Converted(processed),
            Err(e) => Self::Failed {
                path,
                message: e.to_string(),
            },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Converted(processed) => &processed.path,
            Self::Skipped { path, .. } | Self::Failed { path, .. } => path,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
