//! # PNG WebP Tools Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dei tool batch
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per-file
//! - `file_manager`: Discovery ricorsiva e utilità sulle dimensioni
//! - `image_processor`: Codec PNG / WebP lossless
//! - `outcome`: Esito tipizzato di ogni file
//! - `optimizer`: Orchestratore dei batch (sequenziale e parallelo)
//! - `progress`: Progress bar e statistiche aggregate
//! - `reference_updater`: Riscrittura `.png` -> `.webp` nei sorgenti
//! - `json_output`: Output JSON line-delimited
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use png_webp_tools::{BatchMode, BatchOptimizer, Config};
//!
//! let optimizer = BatchOptimizer::new(Config::default(), BatchMode::ConvertParallel);
//! let report = optimizer.run(Path::new("assets")).await?;
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod optimizer;
pub mod outcome;
pub mod progress;
pub mod reference_updater;

#[cfg(test)]
mod test_support;

pub use config::{Config, PngCompression};
pub use error::OptimizeError;
pub use optimizer::{BatchMode, BatchOptimizer, BatchReport};
pub use outcome::{FileOutcome, ProcessedFile};
pub use progress::{AggregatePolicy, BatchStats};
pub use reference_updater::{ReferenceUpdater, UpdateStats};
