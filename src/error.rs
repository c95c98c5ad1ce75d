//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare gli errori per-file
//! - Integra con `thiserror` per automatic error conversion
//! - Gli errori vengono catturati al confine del singolo file e trasformati
//!   in `FileOutcome::Failed`, quindi non interrompono mai il batch
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori di decodifica (PNG corrotto, formato non riconosciuto)
//! - `Png`: Errori di oxipng durante la ricompressione
//! - `Encoding`: Errori dell'encoder WebP (libwebp)
//! - `Walk`: Errori durante la scansione ricorsiva della directory
//! - `Validation`: Errori di validazione input/configurazione
//!
//! ## Esempio:
//! ```rust,ignore
//! if !root.is_dir() {
//!     return Err(OptimizeError::Validation(format!("not a directory: {}", root.display())));
//! }
//! ```

/// Custom error types for PNG recompression, WebP conversion and reference updates
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    Png(#[from] oxipng::PngError),

    #[error("WebP encoding error: {0}")]
    Encoding(String),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
