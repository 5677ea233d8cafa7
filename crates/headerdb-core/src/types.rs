//! Compilation database types
//!
//! In-memory model of a compilation database: an ordered sequence of
//! entries, each naming a file, the command used to process it, and the
//! working directory the command assumes.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One record of a compilation database
///
/// `command` is kept as the raw invocation string so that rewrites preserve
/// the exact spelling of every argument the build system emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileEntry {
    /// Working directory the command assumes
    pub directory: PathBuf,
    /// Full compiler invocation used to process `file`
    pub command: String,
    /// Source or header file this entry covers
    pub file: PathBuf,
}

impl CompileEntry {
    pub fn new(
        directory: impl Into<PathBuf>,
        command: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            directory: directory.into(),
            command: command.into(),
            file: file.into(),
        }
    }

    /// Absolute path of `file`, resolved against `directory` when relative
    pub fn resolved_file(&self) -> PathBuf {
        if self.file.is_absolute() {
            self.file.clone()
        } else {
            self.directory.join(&self.file)
        }
    }

    /// Whether `file` carries one of the given extensions
    pub fn has_extension(&self, extensions: &[String]) -> bool {
        path_has_extension(&self.file, extensions)
    }
}

/// Check a path's extension against an extension set (no leading dot)
pub fn path_has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x == e))
        .unwrap_or(false)
}

/// Ordered sequence of compile entries
///
/// Insertion order from the source database is preserved; synthesized
/// header entries are appended at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompileDatabase {
    entries: Vec<CompileEntry>,
}

impl CompileDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<CompileEntry>) -> Self {
        Self { entries }
    }

    /// Load a database from a JSON file
    ///
    /// Fails with [`Error::MalformedDatabase`] when the file is not a JSON
    /// array of entries or an entry is missing a required field.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<CompileEntry> = serde_json::from_str(&content)
            .map_err(|e| Error::MalformedDatabase(e.to_string()))?;
        Ok(Self { entries })
    }

    /// Write the database back to `path`
    ///
    /// The serialization is built fully in memory before the file is
    /// touched, so a failure while serializing never truncates the target.
    /// Output uses four-space indentation for human diffability.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries.serialize(&mut ser)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        file.write_all(&buf)?;
        file.set_len(buf.len() as u64)?;
        Ok(())
    }

    pub fn entries(&self) -> &[CompileEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: CompileEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompileEntry> {
        self.entries.iter()
    }

    /// Split entries into header entries and translation-unit entries
    ///
    /// An entry is a header entry when its file extension is in the given
    /// header-extension set; everything else is a unit entry.
    pub fn classify(&self, header_extensions: &[String]) -> (Vec<CompileEntry>, Vec<CompileEntry>) {
        let mut headers = Vec::new();
        let mut units = Vec::new();
        for entry in &self.entries {
            if entry.has_extension(header_extensions) {
                headers.push(entry.clone());
            } else {
                units.push(entry.clone());
            }
        }
        (headers, units)
    }

    /// Rewrite every entry's working directory
    pub fn retarget(&mut self, directory: &Path) {
        for entry in &mut self.entries {
            entry.directory = directory.to_path_buf();
        }
    }
}

impl<'a> IntoIterator for &'a CompileDatabase {
    type Item = &'a CompileEntry;
    type IntoIter = std::slice::Iter<'a, CompileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
