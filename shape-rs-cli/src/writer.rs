//! Output sink for command results.
//!
//! Documents go to a file when a path is given and to stdout otherwise. In
//! dry-run mode nothing is written and the content is handed back to the
//! caller for preview.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CliResult, WriteError};

/// Result of a write operation.
#[derive(Debug)]
pub enum WriteResult {
    /// File was written successfully.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// Content went to stdout.
    Printed {
        /// Number of bytes printed.
        bytes: usize,
    },
    /// Dry run - content was not written.
    DryRun {
        /// Content that would have been written.
        content: String,
        /// Path where content would have been written, if any.
        path: Option<PathBuf>,
    },
}

/// File writer with dry-run support.
#[derive(Debug)]
pub struct FileWriter {
    dry_run: bool,
}

impl FileWriter {
    /// Create a new file writer.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Write content to `path`, or to stdout when `path` is `None`.
    ///
    /// In dry-run mode, returns the content without writing.
    pub fn write(&self, path: Option<&Path>, content: &str) -> CliResult<WriteResult> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: content.to_string(),
                path: path.map(Path::to_path_buf),
            });
        }

        let Some(path) = path else {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content)?;
            return Ok(WriteResult::Printed {
                bytes: content.len(),
            });
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| WriteError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "wrote output");

        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: content.len(),
        })
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl WriteResult {
    /// Get the file path associated with this result.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WriteResult::Written { path, .. } => Some(path),
            WriteResult::Printed { .. } => None,
            WriteResult::DryRun { path, .. } => path.as_deref(),
        }
    }

    /// Check if the content left the process (not dry-run).
    pub fn was_written(&self) -> bool {
        !matches!(self, WriteResult::DryRun { .. })
    }

    /// Get the number of bytes written (0 for dry-run).
    pub fn bytes(&self) -> usize {
        match self {
            WriteResult::Written { bytes, .. } | WriteResult::Printed { bytes } => *bytes,
            WriteResult::DryRun { .. } => 0,
        }
    }
}
