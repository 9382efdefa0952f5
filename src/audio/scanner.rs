use crate::error::ScanError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Lists the playable files of a directory.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    supported_extensions: Vec<String>,
    recursive: bool,
}

impl DirectoryScanner {
    pub fn new() -> Self {
        Self {
            supported_extensions: vec![
                "mp3".to_string(),
                "wav".to_string(),
                "flac".to_string(),
            ],
            recursive: false,
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        if !extensions.is_empty() {
            self.supported_extensions = extensions;
        }
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Sorted paths of every supported file in `directory`. Directories and
    /// dotfiles are skipped.
    pub fn list<P: AsRef<Path>>(&self, directory: P) -> Result<Vec<PathBuf>, ScanError> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(ScanError::NotADirectory(directory.to_path_buf()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(directory)
            .follow_links(true)
            .min_depth(1)
            .max_depth(max_depth)
        {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself failing is fatal, anything below is just skipped
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with('.'));

            if !hidden && self.is_supported_file(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        debug!("Found {} audio files in {}", files.len(), directory.display());
        Ok(files)
    }

    fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let normalized = ext.to_ascii_lowercase();
                self.supported_extensions.contains(&normalized)
            })
            .unwrap_or(false)
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new()
    }
}
