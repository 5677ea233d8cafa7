//! Augmentation driver
//!
//! Orchestrates one augmentation pass over a compilation database:
//! classify entries, discover candidate headers (preprocessor-driven or by
//! scanning the build root), synthesize a command for every new header,
//! and persist the result.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use headerdb_core::{AugmentConfig, AugmentMode, CompileDatabase, CompileEntry};

use crate::preprocessor::Preprocessor;
use crate::synth::CommandRewriter;

/// Errors that abort an augmentation run
///
/// Per-unit discovery failures and per-header rewrite failures are not
/// here: those degrade gracefully and are reported via [`AugmentReport`].
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Database(#[from] headerdb_core::Error),

    #[error("no template entry available for approximate mode")]
    EmptyDatabase,

    #[error("failed to scan {}: {source}", .root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Summary of one augmentation pass
#[derive(Debug, Default, Clone)]
pub struct AugmentReport {
    /// Header entries already present in the input database
    pub existing_headers: usize,
    /// Translation-unit entries in the input database
    pub units: usize,
    /// Header entries synthesized this pass
    pub synthesized: usize,
    /// Units whose dependency discovery failed and was skipped
    pub skipped_units: Vec<PathBuf>,
    /// Headers whose template command could not be rewritten
    pub skipped_headers: Vec<PathBuf>,
}

/// Drives the augmentation pass
pub struct Augmenter {
    config: AugmentConfig,
    rewriter: CommandRewriter,
    preprocessor: Preprocessor,
}

impl Augmenter {
    pub fn new(config: AugmentConfig) -> Self {
        Self::with_preprocessor(config, Preprocessor::default())
    }

    pub fn with_preprocessor(config: AugmentConfig, preprocessor: Preprocessor) -> Self {
        let rewriter = CommandRewriter::new(&config);
        Self {
            config,
            rewriter,
            preprocessor,
        }
    }

    /// Load, augment, and rewrite a database file in place
    pub fn augment_file(&self, path: &Path) -> Result<AugmentReport, DriverError> {
        let mut db = CompileDatabase::load(path)?;
        let report = self.augment(&mut db)?;
        db.save(path)?;
        info!(
            "Augmented {:?}: {} header entries added",
            path, report.synthesized
        );
        Ok(report)
    }

    /// One augmentation pass over an in-memory database
    pub fn augment(&self, db: &mut CompileDatabase) -> Result<AugmentReport, DriverError> {
        db.retarget(&self.config.build_root);

        let (headers, units) = db.classify(&self.config.header_extensions);

        // Pre-existing header entries seed the set so they are never
        // duplicated or overwritten.
        let mut seen: HashSet<PathBuf> = headers.iter().map(|e| e.file.clone()).collect();

        let mut report = AugmentReport {
            existing_headers: headers.len(),
            units: units.len(),
            ..Default::default()
        };

        match self.config.mode {
            AugmentMode::Accurate => self.discover(&units, db, &mut seen, &mut report),
            AugmentMode::Approximate => self.scan(&units, db, &mut seen, &mut report)?,
        }

        Ok(report)
    }

    /// Accurate mode: per-unit dependency discovery
    ///
    /// Units are walked in reverse database order, so a header reached from
    /// several units inherits the command of the last-declared one.
    /// Existing baselines depend on this attribution order.
    fn discover(
        &self,
        units: &[CompileEntry],
        db: &mut CompileDatabase,
        seen: &mut HashSet<PathBuf>,
        report: &mut AugmentReport,
    ) {
        for unit in units.iter().rev() {
            let search_paths = self.rewriter.extract_flags(&unit.command);
            let file = unit.resolved_file();

            let found = match self
                .preprocessor
                .discover_headers(&file, &search_paths, &self.config)
            {
                Ok(found) => found,
                Err(err) => {
                    // One broken unit must not block headers reachable
                    // from the rest of the project.
                    warn!("Skipping dependency discovery for {:?}: {}", unit.file, err);
                    report.skipped_units.push(unit.file.clone());
                    continue;
                }
            };

            for header in found {
                if !seen.insert(header.clone()) {
                    continue;
                }
                self.synthesize_into(unit, &header, db, report);
            }
        }
    }

    /// Approximate mode: every header under the build root gets the
    /// template selected by the configured policy
    fn scan(
        &self,
        units: &[CompileEntry],
        db: &mut CompileDatabase,
        seen: &mut HashSet<PathBuf>,
        report: &mut AugmentReport,
    ) -> Result<(), DriverError> {
        let template = self
            .config
            .template_policy
            .select(units)
            .cloned()
            .ok_or(DriverError::EmptyDatabase)?;

        for header in self.scan_headers()? {
            if !seen.insert(header.clone()) {
                continue;
            }
            self.synthesize_into(&template, &header, db, report);
        }

        Ok(())
    }

    /// All header-extension files under the build root, sorted for
    /// deterministic output order
    fn scan_headers(&self) -> Result<Vec<PathBuf>, DriverError> {
        let root = &self.config.build_root;
        let mut headers = Vec::new();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|source| DriverError::Scan {
                root: root.clone(),
                source,
            })?;
            if entry.file_type().is_file() && self.config.is_header(entry.path()) {
                headers.push(entry.into_path());
            }
        }

        headers.sort();
        Ok(headers)
    }

    fn synthesize_into(
        &self,
        template: &CompileEntry,
        header: &Path,
        db: &mut CompileDatabase,
        report: &mut AugmentReport,
    ) {
        match self.rewriter.synthesize(template, header, &self.config) {
            Ok(entry) => {
                debug!("Adding entry for {:?}", header);
                db.push(entry);
                report.synthesized += 1;
            }
            Err(err) => {
                warn!("Skipping {:?}: {}", header, err);
                report.skipped_headers.push(header.to_path_buf());
            }
        }
    }
}
