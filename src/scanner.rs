use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Finds the Rust sources of a project.
///
/// The `SourceScanner` recursively walks a source directory and collects `.rs` files. Hidden
/// directories (those starting with `.`) are always skipped, and so is every directory whose
/// name is in the exclusion list (`target` by default).
///
/// # Example
///
/// ```no_run
/// use apidoc_extract::scanner::SourceScanner;
/// use std::path::PathBuf;
///
/// let scanner = SourceScanner::new(PathBuf::from("./my-api/src"))
///     .exclude(vec!["target".to_string(), "migrations".to_string()]);
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct SourceScanner {
    root_path: PathBuf,
    excluded: Vec<String>,
}

/// Result of a scan.
pub struct ScanResult {
    /// Paths of all discovered `.rs` files, sorted
    pub rust_files: Vec<PathBuf>,
    /// Paths that could not be read; scanning continued past them
    pub warnings: Vec<String>,
}

impl SourceScanner {
    /// Creates a scanner for `root_path` excluding `target` directories.
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            excluded: vec!["target".to_string()],
        }
    }

    /// Replaces the list of excluded directory names.
    pub fn exclude(mut self, excluded: Vec<String>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Walks the directory tree and collects all `.rs` files.
    ///
    /// Unreadable entries are logged and recorded as warnings; they never abort the scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            anyhow::bail!("Source directory does not exist: {}", self.root_path.display());
        }

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.') && !self.excluded.iter().any(|excluded| *excluded == name)
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("rs")
                    {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Found {} Rust file(s) under {}",
            rust_files.len(),
            self.root_path.display()
        );

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}
