//! File collections backing local file dependencies
//!
//! Contents may only be known once producing tasks ran, so listing can fail.

use arx_artifact::TaskId;
use std::fmt::Debug;
use std::io;
use std::path::PathBuf;

/// Set of files produced by tasks or found on disk
pub trait FileCollection: Send + Sync + Debug {
    /// Name used in diagnostics
    fn display_name(&self) -> &str;

    /// Current contents
    ///
    /// # Errors
    /// Returns the I/O failure hit while listing the files
    fn files(&self) -> io::Result<Vec<PathBuf>>;

    /// Tasks producing the files
    fn build_dependencies(&self) -> &[TaskId] {
        &[]
    }
}

/// Collection with a fixed list of files
#[derive(Debug, Clone)]
pub struct FixedFileCollection {
    display_name: String,
    files: Vec<PathBuf>,
    build_dependencies: Vec<TaskId>,
}

impl FixedFileCollection {
    /// Create collection
    #[must_use]
    pub fn new(display_name: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            files,
            build_dependencies: Vec::new(),
        }
    }

    /// Set producing tasks
    #[must_use]
    pub fn with_build_dependencies(mut self, tasks: Vec<TaskId>) -> Self {
        self.build_dependencies = tasks;
        self
    }
}

impl FileCollection for FixedFileCollection {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn files(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self.files.clone())
    }

    fn build_dependencies(&self) -> &[TaskId] {
        &self.build_dependencies
    }
}

/// Regular files directly inside a directory, sorted by name
#[derive(Debug, Clone)]
pub struct DirectoryFileCollection {
    display_name: String,
    directory: PathBuf,
    build_dependencies: Vec<TaskId>,
}

impl DirectoryFileCollection {
    /// Create collection listing `directory`
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        Self {
            display_name: format!("directory '{}'", directory.display()),
            directory,
            build_dependencies: Vec::new(),
        }
    }

    /// Set producing tasks
    #[must_use]
    pub fn with_build_dependencies(mut self, tasks: Vec<TaskId>) -> Self {
        self.build_dependencies = tasks;
        self
    }
}

impl FileCollection for DirectoryFileCollection {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn build_dependencies(&self) -> &[TaskId] {
        &self.build_dependencies
    }
}
