//! # Optimizer Module
//!
//! Orchestrazione dei batch sui PNG, separata in sottomoduli:
//! - `batch_optimizer`: Orchestratore (sequenziale o con worker pool)
//! - `task_optimizer`: Worker per il singolo file
//! - `progress_tracker`: Output per-file (log, progress bar, JSON)
//! - `path_resolver`: Calcolo del path di output per modalità

pub mod batch_optimizer;
pub mod path_resolver;
pub mod progress_tracker;
pub mod task_optimizer;

pub use batch_optimizer::{BatchMode, BatchOptimizer, BatchReport};
pub use path_resolver::PathResolver;
pub use progress_tracker::ProgressTracker;
pub use task_optimizer::TaskOptimizer;
