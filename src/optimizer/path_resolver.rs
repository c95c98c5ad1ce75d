//! # Path Resolution Module
//!
//! Centralizza il calcolo del path di output, usato sia dal controllo
//! "esiste già" della migrazione sia dai log.

use crate::file_manager::FileManager;
use crate::image_processor::WEBP_EXTENSION;
use crate::optimizer::BatchMode;
use std::path::{Path, PathBuf};

pub struct PathResolver;

impl PathResolver {
    /// Path written when `input_path` is processed in `mode`
    pub fn get_output_path(input_path: &Path, mode: BatchMode) -> PathBuf {
        match mode {
            BatchMode::Compress => input_path.to_path_buf(),
            BatchMode::Convert | BatchMode::ConvertParallel | BatchMode::Migrate => {
                FileManager::sibling_path(input_path, WEBP_EXTENSION)
            }
        }
    }
}
