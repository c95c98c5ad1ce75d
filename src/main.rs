//! # PNG WebP Tools - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap` (un subcommand per tool)
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione (file JSON opzionale + flag CLI)
//! - Avvio del tool richiesto
//!
//! ## Esempio di utilizzo:
//! ```bash
//! png-tools compress assets/
//! png-tools convert-parallel assets/ --workers 8
//! png-tools migrate public/
//! png-tools update-refs . --dir src --ext ts
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use png_webp_tools::{
    json_output::JsonMessage, BatchMode, BatchOptimizer, Config, PngCompression, ReferenceUpdater,
};

#[derive(Parser)]
#[command(name = "png-tools")]
#[command(about = "Recompress PNG files, convert them to lossless WebP and update references")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Load defaults from a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dry run - report what would change without writing files
    #[arg(long, global = true)]
    dry_run: bool,

    /// Emit one JSON object per line on stdout (logs go to stderr)
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct ImageArgs {
    /// Root directory searched recursively for PNG files
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Match the .png extension case-insensitively
    #[arg(long)]
    ignore_case: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Losslessly recompress every PNG in place
    Compress {
        #[command(flatten)]
        images: ImageArgs,

        /// Print files that saved more than this many bytes
        #[arg(long)]
        threshold: Option<u64>,

        /// PNG compression level
        #[arg(long, value_enum)]
        level: Option<PngCompression>,
    },

    /// Write a lossless WebP next to every PNG, one file at a time
    Convert {
        #[command(flatten)]
        images: ImageArgs,

        /// Print files that saved more than this many bytes
        #[arg(long)]
        threshold: Option<u64>,
    },

    /// Write a lossless WebP next to every PNG using a worker pool
    ConvertParallel {
        #[command(flatten)]
        images: ImageArgs,

        /// Print files that saved more than this many bytes
        #[arg(long)]
        threshold: Option<u64>,

        /// Number of parallel workers (default: available CPUs)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Convert PNGs to WebP, skipping those that already have a WebP sibling
    Migrate {
        #[command(flatten)]
        images: ImageArgs,
    },

    /// Rewrite extension references inside source files
    UpdateRefs {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Subdirectory of the root to scan
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Extension of the files to scan, without the dot
        #[arg(long)]
        ext: Option<String>,

        /// Substring to replace
        #[arg(long)]
        from: Option<String>,

        /// Replacement
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.json)?;

    let json = args.json;
    if let Err(e) = run(args).await {
        if json {
            JsonMessage::error(e.to_string(), Some(format!("{:#}", e))).emit();
        }
        return Err(e);
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    config.dry_run |= args.dry_run;
    config.json_output |= args.json;

    match args.command {
        Command::Compress {
            images,
            threshold,
            level,
        } => {
            apply_image_args(&mut config, &images);
            if let Some(threshold) = threshold {
                config.compress_report_threshold = threshold;
            }
            if let Some(level) = level {
                config.png_compression = level;
            }
            run_batch(config, BatchMode::Compress, &images.root).await
        }
        Command::Convert { images, threshold } => {
            apply_image_args(&mut config, &images);
            if let Some(threshold) = threshold {
                config.convert_report_threshold = threshold;
            }
            run_batch(config, BatchMode::Convert, &images.root).await
        }
        Command::ConvertParallel {
            images,
            threshold,
            workers,
        } => {
            apply_image_args(&mut config, &images);
            if let Some(threshold) = threshold {
                config.convert_report_threshold = threshold;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            run_batch(config, BatchMode::ConvertParallel, &images.root).await
        }
        Command::Migrate { images } => {
            apply_image_args(&mut config, &images);
            run_batch(config, BatchMode::Migrate, &images.root).await
        }
        Command::UpdateRefs {
            root,
            dir,
            ext,
            from,
            to,
        } => {
            if let Some(dir) = dir {
                config.source_dir = dir;
            }
            if let Some(ext) = ext {
                config.source_extension = ext;
            }
            if let Some(from) = from {
                config.replace_from = from;
            }
            if let Some(to) = to {
                config.replace_to = to;
            }
            config.validate()?;
            validate_root(&root)?;

            ReferenceUpdater::new(&config).run(&root).await?;
            Ok(())
        }
    }
}

fn apply_image_args(config: &mut Config, images: &ImageArgs) {
    config.case_insensitive |= images.ignore_case;
}

async fn run_batch(config: Config, mode: BatchMode, root: &Path) -> Result<()> {
    config.validate()?;
    validate_root(root)?;

    BatchOptimizer::new(config, mode).run(root).await?;
    Ok(())
}

fn validate_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(anyhow::anyhow!("Directory does not exist: {}", root.display()));
    }
    if !root.is_dir() {
        return Err(anyhow::anyhow!("Path is not a directory: {}", root.display()));
    }
    Ok(())
}
