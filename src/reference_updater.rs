//! # Reference Updater Module
//!
//! Dopo la conversione in WebP, riscrive i riferimenti nei sorgenti testuali.
//!
//! ## Responsabilità:
//! - Trova ricorsivamente i sorgenti (`*.js` di default) sotto `root/js`
//! - Conta e sostituisce ogni occorrenza letterale di `.png` con `.webp`
//! - Riscrive il file solo se c'è almeno una sostituzione
//!
//! La sostituzione è cieca: nessuna conoscenza di stringhe,
//! commenti o identificatori. `"logo.png"` diventa `"logo.webp"`, ma anche
//! `// old.png files` diventa `// old.webp files`.

use crate::config::Config;
use crate::error::OptimizeError;
use crate::file_manager::{ExtensionMatch, FileManager};
use crate::json_output::JsonMessage;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Aggregate counters of one reference update run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateStats {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub total_replacements: usize,
    pub errors: usize,
}

pub struct ReferenceUpdater {
    source_dir: PathBuf,
    extension: String,
    from: String,
    to: String,
    dry_run: bool,
    json_output: bool,
}

impl ReferenceUpdater {
    pub fn new(config: &Config) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            extension: config.source_extension.clone(),
            from: config.replace_from.clone(),
            to: config.replace_to.clone(),
            dry_run: config.dry_run,
            json_output: config.json_output,
        }
    }

    /// Replace every non-overlapping occurrence of `from`; returns the new text and the count
    pub fn replace_references(content: &str, from: &str, to: &str) -> (String, usize) {
        let count = content.matches(from).count();
        if count == 0 {
            return (content.to_string(), 0);
        }
        (content.replace(from, to), count)
    }

    /// Rewrite one file in place; untouched when nothing matched
    pub async fn update_file(&self, path: &Path) -> Result<usize, OptimizeError> {
        let content = tokio::fs::read_to_string(path).await?;
        let (updated, replacements) = Self::replace_references(&content, &self.from, &self.to);

        if replacements > 0 && !self.dry_run {
            tokio::fs::write(path, updated).await?;
        }

        Ok(replacements)
    }

    pub async fn run(&self, root: &Path) -> Result<UpdateStats> {
        let scan_root = root.join(&self.source_dir);
        let files = FileManager::find_files_with_extension(
            &scan_root,
            &self.extension,
            ExtensionMatch::CaseSensitive,
        )
        .with_context(|| format!("Failed to scan {}", scan_root.display()))?;

        if !self.json_output {
            if self.dry_run {
                info!("Dry run mode: No files will be written");
            }
            info!(
                "Found {} .{} files under {}, replacing '{}' with '{}'",
                files.len(),
                self.extension,
                scan_root.display(),
                self.from,
                self.to
            );
        }

        let mut stats = UpdateStats::default();

        for file in &files {
            stats.files_scanned += 1;
            match self.update_file(file).await {
                Ok(0) => {}
                Ok(replacements) => {
                    stats.files_modified += 1;
                    stats.total_replacements += replacements;
                    if self.json_output {
                        JsonMessage::references_updated(file.clone(), replacements).emit();
                    } else {
                        info!(
                            "✓ {}: {} replacements",
                            FileManager::display_name(file),
                            replacements
                        );
                    }
                }
                Err(e) => {
                    stats.errors += 1;
                    if self.json_output {
                        JsonMessage::reference_failed(file.clone(), e.to_string()).emit();
                    } else {
                        error!("Error processing {}: {}", file.display(), e);
                    }
                }
            }
        }

        if self.json_output {
            JsonMessage::update_complete(&stats).emit();
        } else {
            info!(
                "Total: {} replacements in {} files",
                stats.total_replacements, stats.files_modified
            );
        }

        Ok(stats)
    }
}
