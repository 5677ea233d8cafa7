//! Command synthesis for header entries
//!
//! Rewrites a template compile command so it targets a header instead of
//! the translation unit it was recorded for.

use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use headerdb_core::{AugmentConfig, CompileEntry};

use crate::flags;

/// Errors that can occur while rewriting a template command
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("no recognizable output argument in command: {0}")]
    MissingOutputArgument(String),

    #[error("no recognizable input argument in command: {0}")]
    MissingInputArgument(String),
}

/// Which command argument a substitution targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// The `-o <path>.o` output argument
    Output,
    /// The `-c <file>` compiled-input argument
    Input,
}

/// Regex-backed command rewriting
///
/// Stands in for full command-line tokenization. The driver only depends
/// on `extract_flags` and `substitute_argument`, so a proper tokenizer
/// could replace this implementation without changing the driver contract.
pub struct CommandRewriter {
    output_arg: Regex,
    input_arg: Regex,
}

impl CommandRewriter {
    pub fn new(config: &AugmentConfig) -> Self {
        // Longer extensions first so ".hpp" is not consumed as ".h"
        let mut extensions: Vec<String> = config
            .source_extensions
            .iter()
            .chain(&config.header_extensions)
            .map(|e| regex::escape(e))
            .collect();
        extensions.sort_by(|a, b| b.len().cmp(&a.len()));

        let input_arg =
            Regex::new(&format!(r"-c\s+\S+\.(?:{})", extensions.join("|"))).unwrap();
        let output_arg = Regex::new(r"-o\s+\S+\.o\b").unwrap();

        Self {
            output_arg,
            input_arg,
        }
    }

    /// Include search-path directives of a command, in original order
    pub fn extract_flags(&self, command: &str) -> Vec<String> {
        flags::extract_search_paths(command)
    }

    /// Replace the first occurrence of the given argument with
    /// `replacement`, taken verbatim. Returns `None` when the command does
    /// not contain a recognizable argument of that kind.
    pub fn substitute_argument(
        &self,
        kind: ArgumentKind,
        command: &str,
        replacement: &str,
    ) -> Option<String> {
        let pattern = match kind {
            ArgumentKind::Output => &self.output_arg,
            ArgumentKind::Input => &self.input_arg,
        };
        if !pattern.is_match(command) {
            return None;
        }
        Some(pattern.replace(command, NoExpand(replacement)).into_owned())
    }

    /// Fabricate an entry for `header` from a template entry
    ///
    /// The output argument is redirected to a scratch path derived from the
    /// header's location under the build root and the input argument is
    /// replaced with the header itself. The template's directory carries
    /// over unchanged.
    pub fn synthesize(
        &self,
        template: &CompileEntry,
        header: &Path,
        config: &AugmentConfig,
    ) -> Result<CompileEntry, RewriteError> {
        let output = format!("-o {}", scratch_object_path(header, config).display());
        let command = self
            .substitute_argument(ArgumentKind::Output, &template.command, &output)
            .ok_or_else(|| RewriteError::MissingOutputArgument(template.command.clone()))?;

        let input = format!("-c {}", header.display());
        let command = self
            .substitute_argument(ArgumentKind::Input, &command, &input)
            .ok_or_else(|| RewriteError::MissingInputArgument(template.command.clone()))?;

        debug!("Synthesized command for {:?}", header);

        Ok(CompileEntry {
            directory: template.directory.clone(),
            command,
            file: header.to_path_buf(),
        })
    }
}

/// Scratch object path for a header
///
/// The header's path relative to the build root, relocated under the
/// scratch root, with `.o` appended. Distinct per header and never created
/// on disk; it only satisfies the compiler driver's `-o` argument.
fn scratch_object_path(header: &Path, config: &AugmentConfig) -> PathBuf {
    let rel = header.strip_prefix(&config.build_root).unwrap_or(header);
    let mut path = config.scratch_root.join(rel).into_os_string();
    path.push(".o");
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_config() -> AugmentConfig {
        AugmentConfig::new("/build")
    }

    fn template() -> CompileEntry {
        CompileEntry::new(
            "/build",
            "/usr/bin/c++ -I/build/include -O2 -o CMakeFiles/app.dir/main.cpp.o -c /build/main.cpp",
            "/build/main.cpp",
        )
    }

    #[test]
    fn test_synthesize_rewrites_both_arguments() {
        let config = test_config();
        let rewriter = CommandRewriter::new(&config);

        let entry = rewriter
            .synthesize(&template(), Path::new("/build/sub/util.h"), &config)
            .unwrap();

        assert_eq!(entry.file, PathBuf::from("/build/sub/util.h"));
        assert_eq!(entry.directory, PathBuf::from("/build"));
        assert_eq!(
            entry.command,
            "/usr/bin/c++ -I/build/include -O2 -o /tmp/sub/util.h.o -c /build/sub/util.h"
        );
    }

    #[test]
    fn test_synthesize_header_template() {
        // The input class covers header spellings too, so an already
        // synthesized entry can serve as template
        let config = test_config();
        let rewriter = CommandRewriter::new(&config);
        let template = CompileEntry::new(
            "/build",
            "cc -o /tmp/old.h.o -c /build/old.h",
            "/build/old.h",
        );

        let entry = rewriter
            .synthesize(&template, Path::new("/build/new.hpp"), &config)
            .unwrap();

        assert_eq!(entry.command, "cc -o /tmp/new.hpp.o -c /build/new.hpp");
    }

    #[test]
    fn test_missing_output_argument() {
        let config = test_config();
        let rewriter = CommandRewriter::new(&config);
        let template = CompileEntry::new("/build", "cc -c /build/main.c", "/build/main.c");

        let err = rewriter
            .synthesize(&template, Path::new("/build/a.h"), &config)
            .unwrap_err();
        assert!(matches!(err, RewriteError::MissingOutputArgument(_)));
    }

    #[test]
    fn test_missing_input_argument() {
        let config = test_config();
        let rewriter = CommandRewriter::new(&config);
        let template = CompileEntry::new("/build", "cc -o main.o /build/main.rs", "/build/main.rs");

        let err = rewriter
            .synthesize(&template, Path::new("/build/a.h"), &config)
            .unwrap_err();
        assert!(matches!(err, RewriteError::MissingInputArgument(_)));
    }

    #[test]
    fn test_scratch_paths_are_distinct() {
        let config = test_config();
        let a = scratch_object_path(Path::new("/build/a.h"), &config);
        let b = scratch_object_path(Path::new("/build/sub/a.h"), &config);

        assert_eq!(a, PathBuf::from("/tmp/a.h.o"));
        assert_eq!(b, PathBuf::from("/tmp/sub/a.h.o"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_substitute_argument_is_verbatim() {
        // Replacement text must not be treated as a capture-group template
        let config = test_config();
        let rewriter = CommandRewriter::new(&config);

        let rewritten = rewriter
            .substitute_argument(ArgumentKind::Output, "cc -o a.o -c a.c", "-o /tmp/$weird.o")
            .unwrap();
        assert_eq!(rewritten, "cc -o /tmp/$weird.o -c a.c");
    }
}
