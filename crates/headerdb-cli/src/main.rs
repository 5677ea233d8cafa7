//! HeaderDB CLI
//!
//! Command-line interface for compilation-database augmentation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use headerdb_core::{AugmentConfig, AugmentMode, CompileDatabase};
use headerdb_engine::{Augmenter, Preprocessor};

#[derive(Parser)]
#[command(name = "headerdb")]
#[command(author, version, about = "Compilation database augmentation for header files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a plausible compile command for every project header
    Augment {
        /// Compilation database file to update
        #[arg(value_name = "DB")]
        database: PathBuf,

        /// Discover each unit's header closure through the preprocessor
        /// instead of scanning the build root
        #[arg(short, long)]
        accurate: bool,

        /// Where synthesized output arguments point (never written to)
        #[arg(long, default_value = "/tmp", value_name = "DIR")]
        scratch_root: PathBuf,

        /// Preprocessor executable to use in accurate mode
        #[arg(long, value_name = "PATH")]
        preprocessor: Option<PathBuf>,
    },

    /// Rewrite every entry's working directory
    Retarget {
        /// Compilation database file to update
        #[arg(value_name = "DB")]
        database: PathBuf,

        /// New working directory (defaults to the current directory)
        #[arg(short = 'C', long, value_name = "DIR")]
        directory: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Augment {
            database,
            accurate,
            scratch_root,
            preprocessor,
        } => {
            cmd_augment(&database, accurate, scratch_root, preprocessor)?;
        }
        Commands::Retarget {
            database,
            directory,
        } => {
            cmd_retarget(&database, directory)?;
        }
    }

    Ok(())
}

fn cmd_augment(
    database: &Path,
    accurate: bool,
    scratch_root: PathBuf,
    preprocessor: Option<PathBuf>,
) -> Result<()> {
    let db_path = database
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", database.display()))?;

    let mode = if accurate {
        AugmentMode::Accurate
    } else {
        AugmentMode::Approximate
    };
    let config = AugmentConfig::for_database(&db_path)
        .with_mode(mode)
        .with_scratch_root(scratch_root);

    let preprocessor = match preprocessor {
        Some(path) => Preprocessor::with_path(path),
        None if accurate => Preprocessor::new()?,
        None => Preprocessor::default(),
    };

    let report = Augmenter::with_preprocessor(config, preprocessor).augment_file(&db_path)?;

    println!("📂 Augmented: {}", db_path.display());
    println!(
        "   {} translation units, {} existing header entries",
        report.units, report.existing_headers
    );
    println!("   {} header entries synthesized", report.synthesized);
    if !report.skipped_units.is_empty() {
        println!(
            "   ⚠️  {} units skipped (dependency discovery failed)",
            report.skipped_units.len()
        );
    }
    if !report.skipped_headers.is_empty() {
        println!(
            "   ⚠️  {} headers skipped (command not rewritable)",
            report.skipped_headers.len()
        );
    }

    Ok(())
}

fn cmd_retarget(database: &Path, directory: Option<PathBuf>) -> Result<()> {
    let db_path = database
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", database.display()))?;
    let directory = match directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let mut db = CompileDatabase::load(&db_path)?;
    db.retarget(&directory);
    db.save(&db_path)?;

    println!(
        "📂 Retargeted {} entries to {}",
        db.len(),
        directory.display()
    );

    Ok(())
}
