//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (`--json`) per chi
//! invoca i tool da script o da un'altra applicazione.
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout
//! - Riusa `ProcessedFile`, `FileOutcome` e `BatchStats` senza duplicarli
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio di un batch
//! - `file_complete`: Fine elaborazione di un PNG (convertito, saltato o fallito)
//! - `complete`: Fine batch con statistiche aggregate
//! - `references_updated`: Un sorgente riscritto dal reference updater
//! - `reference_failed`: Un sorgente non leggibile o non scrivibile
//! - `update_complete`: Fine aggiornamento riferimenti
//! - `error`: Errore fatale prima del riepilogo

use crate::config::{Config, PngCompression};
use crate::outcome::FileOutcome;
use crate::progress::BatchStats;
use crate::reference_updater::UpdateStats;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        command: String,
        root: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    FileComplete {
        path: PathBuf,
        output: Option<PathBuf>,
        original_size: u64,
        new_size: u64,
        reduction_percent: f64,
        skipped: bool,
        error: Option<String>,
    },

    Complete {
        command: String,
        stats: BatchStats,
        total_saved: i64,
        saved_percent: f64,
        duration_seconds: f64,
        files_per_second: f64,
    },

    ReferencesUpdated {
        path: PathBuf,
        replacements: usize,
    },

    ReferenceFailed {
        path: PathBuf,
        error: String,
    },

    UpdateComplete {
        files_scanned: usize,
        files_modified: usize,
        total_replacements: usize,
        errors: usize,
    },

    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione riportata nel messaggio `start`
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub workers: usize,
    pub png_compression: PngCompression,
    pub case_insensitive: bool,
    pub dry_run: bool,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(command: &str, root: PathBuf, total_files: usize, config: JsonConfig) -> Self {
        Self::Start {
            command: command.to_string(),
            root,
            total_files,
            config,
        }
    }

    /// Crea un messaggio di completamento file a partire dall'esito
    pub fn file_complete(outcome: &FileOutcome) -> Self {
        match outcome {
            FileOutcome::Converted(processed) => Self::FileComplete {
                path: processed.path.clone(),
                output: Some(processed.output.clone()),
                original_size: processed.original_size,
                new_size: processed.new_size,
                reduction_percent: processed.saved_percent(),
                skipped: false,
                error: None,
            },
            FileOutcome::Skipped { path, output } => Self::FileComplete {
                path: path.clone(),
                output: Some(output.clone()),
                original_size: 0,
                new_size: 0,
                reduction_percent: 0.0,
                skipped: true,
                error: None,
            },
            FileOutcome::Failed { path, message } => Self::FileComplete {
                path: path.clone(),
                output: None,
                original_size: 0,
                new_size: 0,
                reduction_percent: 0.0,
                skipped: false,
                error: Some(message.clone()),
            },
        }
    }

    pub fn complete(command: &str, stats: &BatchStats, duration_seconds: f64, files_per_second: f64) -> Self {
        Self::Complete {
            command: command.to_string(),
            stats: stats.clone(),
            total_saved: stats.total_saved(),
            saved_percent: stats.saved_percent(),
            duration_seconds,
            files_per_second,
        }
    }

    pub fn references_updated(path: PathBuf, replacements: usize) -> Self {
        Self::ReferencesUpdated { path, replacements }
    }

    pub fn reference_failed(path: PathBuf, error: String) -> Self {
        Self::ReferenceFailed { path, error }
    }

    pub fn update_complete(stats: &UpdateStats) -> Self {
        Self::UpdateComplete {
            files_scanned: stats.files_scanned,
            files_modified: stats.files_modified,
            total_replacements: stats.total_replacements,
            errors: stats.errors,
        }
    }

    /// Crea un messaggio di errore
    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.workers,
            png_compression: config.png_compression,
            case_insensitive: config.case_insensitive,
            dry_run: config.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ProcessedFile;

    #[test]
    fn test_messages_are_tagged() {
        let outcome = FileOutcome::Converted(ProcessedFile::new(
            PathBuf::from("a.png"),
            PathBuf::from("a.webp"),
            2000,
            1500,
        ));
        let value = serde_json::to_value(JsonMessage::file_complete(&outcome)).unwrap();

        assert_eq!(value["type"], "file_complete");
        assert_eq!(value["output"], "a.webp");
        assert_eq!(value["reduction_percent"], 25.0);
        assert_eq!(value["skipped"], false);
    }

    #[test]
    fn test_failed_outcome_carries_error() {
        let outcome = FileOutcome::Failed {
            path: PathBuf::from("bad.png"),
            message: "Image processing error: truncated".to_string(),
        };
        let value = serde_json::to_value(JsonMessage::file_complete(&outcome)).unwrap();

        assert_eq!(value["error"], "Image processing error: truncated");
        assert!(value["output"].is_null());
    }

    #[test]
    fn test_reference_failure_message() {
        let message = JsonMessage::reference_failed(
            PathBuf::from("js/bad.js"),
            "IO error: stream did not contain valid UTF-8".to_string(),
        );
        let value = serde_json::to_value(message).unwrap();

        assert_eq!(value["type"], "reference_failed");
        assert_eq!(value["path"], "js/bad.js");
        assert_eq!(value["error"], "IO error: stream did not contain valid UTF-8");
    }

    #[test]
    fn test_complete_includes_derived_totals() {
        let stats = BatchStats {
            files_found: 2,
            files_processed: 2,
            total_original_size: 4000,
            total_new_size: 3000,
            ..Default::default()
        };
        let value = serde_json::to_value(JsonMessage::complete("convert", &stats, 2.0, 1.0)).unwrap();

        assert_eq!(value["type"], "complete");
        assert_eq!(value["total_saved"], 1000);
        assert_eq!(value["saved_percent"], 25.0);
        assert_eq!(value["stats"]["policy"], "all_converted");
    }
}
