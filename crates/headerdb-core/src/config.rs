//! Configuration types
//!
//! Build root, scratch location, and extension sets are explicit
//! configuration handed to the driver at construction; there is no ambient
//! global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{CompileDatabase, CompileEntry};

/// Augmentation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AugmentMode {
    /// Scan the build root for header files and give each one a single
    /// representative command. Fast, trades accuracy for speed.
    #[default]
    Approximate,
    /// Run the preprocessor per translation unit to discover the exact
    /// header closure.
    Accurate,
}

/// How the template entry is chosen for headers in approximate mode
///
/// Named as a policy rather than hidden in the scan loop so tests can
/// target it directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultTemplatePolicy {
    /// Every header inherits the command of the first translation-unit
    /// entry in the database
    #[default]
    FirstUnit,
}

impl DefaultTemplatePolicy {
    /// Select the template from the classified unit entries, if any
    pub fn select<'a>(&self, units: &'a [CompileEntry]) -> Option<&'a CompileEntry> {
        match self {
            DefaultTemplatePolicy::FirstUnit => units.first(),
        }
    }
}

/// Augmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Project build root; only headers under this path get entries
    pub build_root: PathBuf,

    /// Where synthesized output arguments point. Nothing is ever written
    /// there; the paths only satisfy the compiler driver's `-o` argument.
    pub scratch_root: PathBuf,

    /// Extensions identifying header files (no leading dot)
    pub header_extensions: Vec<String>,

    /// Extensions identifying translation-unit sources (no leading dot)
    pub source_extensions: Vec<String>,

    /// Discovery mode
    pub mode: AugmentMode,

    /// Template selection for approximate mode
    pub template_policy: DefaultTemplatePolicy,
}

impl AugmentConfig {
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
            scratch_root: PathBuf::from("/tmp"),
            header_extensions: vec!["h".into(), "hpp".into()],
            source_extensions: vec!["cpp".into(), "cc".into(), "c".into()],
            mode: AugmentMode::default(),
            template_policy: DefaultTemplatePolicy::default(),
        }
    }

    /// Configuration for a database file, rooting the build at the
    /// directory containing it
    pub fn for_database(db_path: &Path) -> Self {
        let build_root = db_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        Self::new(build_root)
    }

    pub fn with_mode(mut self, mode: AugmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_scratch_root(mut self, scratch_root: impl Into<PathBuf>) -> Self {
        self.scratch_root = scratch_root.into();
        self
    }

    /// Whether the path names a header file
    pub fn is_header(&self, path: &Path) -> bool {
        crate::types::path_has_extension(path, &self.header_extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_policy_selects_first_unit() {
        let db = CompileDatabase::from_entries(vec![
            CompileEntry::new("/build", "cc -o u.h.o -c u.h", "/build/u.h"),
            CompileEntry::new("/build", "cc -o a.o -c a.c", "/build/a.c"),
            CompileEntry::new("/build", "cc -o b.o -c b.c", "/build/b.c"),
        ]);
        let exts = vec!["h".to_string(), "hpp".to_string()];
        let (_, units) = db.classify(&exts);

        let policy = DefaultTemplatePolicy::FirstUnit;
        let template = policy.select(&units).unwrap();
        assert_eq!(template.file, PathBuf::from("/build/a.c"));

        assert!(policy.select(&[]).is_none());
    }

    #[test]
    fn test_for_database_roots_at_parent() {
        let config = AugmentConfig::for_database(Path::new("/build/compile_commands.json"));
        assert_eq!(config.build_root, PathBuf::from("/build"));

        let config = AugmentConfig::for_database(Path::new("compile_commands.json"));
        assert_eq!(config.build_root, PathBuf::from("."));
    }

    #[test]
    fn test_is_header() {
        let config = AugmentConfig::new("/build");
        assert!(config.is_header(Path::new("/build/a.h")));
        assert!(config.is_header(Path::new("/build/sub/b.hpp")));
        assert!(!config.is_header(Path::new("/build/main.cpp")));
        assert!(!config.is_header(Path::new("/build/Makefile")));
    }
}
