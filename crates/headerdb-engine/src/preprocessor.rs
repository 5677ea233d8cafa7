//! Preprocessor-driven dependency discovery
//!
//! Runs a C preprocessor in dependency-listing mode (`-M`) to find the
//! header closure of a translation unit, then keeps the headers that belong
//! to the project under analysis.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

use headerdb_core::AugmentConfig;

/// Errors that can occur during dependency discovery
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("preprocessor not found. Please install cpp or clang.")]
    PreprocessorNotFound,

    #[error("dependency listing failed: {0}")]
    DependencyListing(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Preprocessor wrapper for dependency listing
pub struct Preprocessor {
    /// Path to the preprocessor executable
    path: PathBuf,
}

impl Preprocessor {
    /// Create a new preprocessor, auto-detecting the executable
    pub fn new() -> Result<Self, PreprocessError> {
        let path = Self::find_preprocessor()?;
        debug!("Found preprocessor at: {:?}", path);
        Ok(Self { path })
    }

    /// Create a preprocessor with a specific executable path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Find a preprocessor executable
    fn find_preprocessor() -> Result<PathBuf, PreprocessError> {
        // cpp is the conventional entry point; compiler drivers accept -M too
        let candidates = [
            "cpp",
            "/usr/bin/cpp",
            "/usr/local/bin/cpp",
            "clang",
            "gcc",
        ];

        for candidate in candidates {
            if let Ok(output) = Command::new(candidate).arg("--version").output() {
                if output.status.success() {
                    return Ok(PathBuf::from(candidate));
                }
            }
        }

        Err(PreprocessError::PreprocessorNotFound)
    }

    /// Check if the preprocessor is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.path)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Get the preprocessor version line
    pub fn version(&self) -> Option<String> {
        Command::new(&self.path)
            .arg("--version")
            .output()
            .ok()
            .and_then(|o| {
                String::from_utf8(o.stdout)
                    .ok()
                    .and_then(|s| s.lines().next().map(|l| l.to_string()))
            })
    }

    /// List the project headers included by a translation unit
    ///
    /// Invokes the preprocessor in dependency-listing mode with the given
    /// search-path directives and parses the emitted make rule. Headers
    /// outside the configured build root (system and toolchain locations)
    /// are excluded; the result has set semantics.
    pub fn discover_headers(
        &self,
        file: &Path,
        search_paths: &[String],
        config: &AugmentConfig,
    ) -> Result<BTreeSet<PathBuf>, PreprocessError> {
        let mut cmd = Command::new(&self.path);
        cmd.arg("-M");
        for directive in search_paths {
            // "-isystem /dir" arrives as one directive but two argv tokens
            for token in directive.split_whitespace() {
                cmd.arg(token);
            }
        }
        cmd.arg(file);

        debug!("Listing dependencies of {:?} with {:?}", file, self.path);

        let output = cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PreprocessError::DependencyListing(
                stderr.trim().to_string(),
            ));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| {
            PreprocessError::DependencyListing("undecodable preprocessor output".to_string())
        })?;

        Ok(parse_dependencies(&stdout, config))
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| {
            warn!("Preprocessor not found, using placeholder path");
            Self::with_path(PathBuf::from("cpp"))
        })
    }
}

/// Extract project header paths from a make dependency rule
///
/// The rule lists one path per whitespace-separated token, with `\`
/// line continuations and the object target ending in `:`. Only absolute
/// paths with a header extension, rooted under the build root, are kept.
fn parse_dependencies(output: &str, config: &AugmentConfig) -> BTreeSet<PathBuf> {
    let mut headers = BTreeSet::new();

    for token in output.split_whitespace() {
        if token == "\\" {
            continue;
        }
        let token = token.trim_end_matches(':');
        if !token.starts_with('/') {
            continue;
        }

        let path = Path::new(token);
        if config.is_header(path) && path.starts_with(&config.build_root) {
            headers.insert(path.to_path_buf());
        }
    }

    headers
}
