//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file e le utilità sulle dimensioni.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di file per estensione (PNG o sorgenti testuali)
//! - Match dell'estensione case-sensitive (default) o case-insensitive
//! - Calcolo dei path "sibling" (stesso path, estensione diversa)
//! - Formattazione human-readable delle dimensioni e percentuali
//!
//! ## Operazioni sui file:
//! - `find_files_with_extension()`: Trova tutti i file con una data estensione
//! - `sibling_path()`: `foto/a.png` -> `foto/a.webp`
//! - `get_file_size()` / `file_size()`: dimensione su disco (async / sync)
//!
//! ## Esempio:
//! ```rust,ignore
//! let pngs = FileManager::find_files_with_extension(root, "png", ExtensionMatch::CaseSensitive)?;
//! for png in pngs {
//!     let webp = FileManager::sibling_path(&png, "webp");
//! }
//! ```

use crate::error::OptimizeError;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// How a file extension is compared during discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionMatch {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

impl ExtensionMatch {
    pub fn from_ignore_case(ignore_case: bool) -> Self {
        if ignore_case {
            Self::CaseInsensitive
        } else {
            Self::CaseSensitive
        }
    }

    /// Check whether `path` carries the extension `ext` (given without the dot)
    pub fn matches(&self, path: &Path, ext: &str) -> bool {
        let Some(actual) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        match self {
            Self::CaseSensitive => actual == ext,
            Self::CaseInsensitive => actual.eq_ignore_ascii_case(ext),
        }
    }
}

/// Manages file discovery and size bookkeeping
pub struct FileManager;

impl FileManager {
    /// Get the on-disk size of a file
    pub async fn get_file_size(path: &Path) -> Result<u64, OptimizeError> {
        Ok(tokio::fs::metadata(path).await?.len())
    }

    /// Blocking variant of [`FileManager::get_file_size`], used inside codec workers
    pub fn file_size(path: &Path) -> Result<u64, OptimizeError> {
        Ok(std::fs::metadata(path)?.len())
    }

    /// Find all regular files below `root` whose extension matches `ext`.
    ///
    /// The root itself must be an existing directory; unreadable entries
    /// below it are logged and skipped. Symlinks to files are included,
    /// symlinked directories are not descended. Results are sorted by path.
    pub fn find_files_with_extension(
        root: &Path,
        ext: &str,
        mode: ExtensionMatch,
    ) -> Result<Vec<PathBuf>, OptimizeError> {
        if !root.is_dir() {
            return Err(OptimizeError::Validation(format!(
                "Root is not a directory: {}",
                root.display()
            )));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", OptimizeError::Walk(e));
                    continue;
                }
            };

            // `Path::is_file` follows symlinks, so linked files are listed too
            if entry.path().is_file() && mode.matches(entry.path(), ext) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Same path with the extension replaced
    pub fn sibling_path(path: &Path, ext: &str) -> PathBuf {
        path.with_extension(ext)
    }

    /// File name for display, falling back to the whole path
    pub fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    pub fn to_kib(bytes: i64) -> f64 {
        bytes as f64 / 1024.0
    }

    pub fn to_mib(bytes: i64) -> f64 {
        bytes as f64 / (1024.0 * 1024.0)
    }

    /// Calculate percentage reduction; negative when the file grew
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
