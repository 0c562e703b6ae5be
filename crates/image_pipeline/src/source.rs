use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Extensions accepted by default, matching the formats the bundled image
/// capabilities can decode.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// Enumerates image file paths from a directory (with optional recursion and
/// extension filtering).
///
/// The pipeline enumerates its identifier list exactly once before startup,
/// so this source collects eagerly into a `Vec` rather than streaming.
/// Symlinks and non-regular files are skipped.
///
/// # Example
/// ```ignore
/// let source = ImageDirSource::new(
///     "./photos",
///     &["jpg", "png"], // Allowed extensions (case-insensitive)
///     false,           // Top-level only
/// );
/// let ids = source.paths()?;
/// ```
pub struct ImageDirSource {
    dir_path: PathBuf,
    extensions: Vec<String>,
    recurse: bool,
}

impl ImageDirSource {
    /// Creates a new image directory source.
    ///
    /// # Arguments
    /// - `dir_path`: Directory to scan.
    /// - `extensions`: File extensions to include (e.g., `["jpg", "png"]`). Case-insensitive.
    /// - `recurse`: If `true`, scans subdirectories recursively.
    pub fn new(dir_path: impl Into<PathBuf>, extensions: &[&str], recurse: bool) -> Self {
        Self {
            dir_path: dir_path.into(),
            extensions: extensions.iter().map(|s| s.to_lowercase()).collect(),
            recurse,
        }
    }

    /// Source accepting every extension in [`IMAGE_EXTENSIONS`], top level only.
    pub fn with_default_extensions(dir_path: impl Into<PathBuf>) -> Self {
        Self::new(dir_path, IMAGE_EXTENSIONS, false)
    }

    /// Collects the matching file paths, sorted for a stable enumeration
    /// order across runs.
    ///
    /// Fails if the directory is missing or not a directory; unreadable
    /// entries inside it fail the enumeration too, since a partial
    /// identifier list would silently shrink the run.
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        let dir_metadata = fs::metadata(&self.dir_path)
            .with_context(|| format!("Failed to access directory: {}", self.dir_path.display()))?;
        if !dir_metadata.is_dir() {
            bail!("Path is not a directory: {}", self.dir_path.display());
        }

        let candidates: Vec<PathBuf> = if self.recurse {
            WalkDir::new(&self.dir_path)
                .into_iter()
                .map(|entry| {
                    entry
                        .map(|e| e.path().to_path_buf())
                        .map_err(|e| anyhow!("Failed to read directory entry: {}", e))
                })
                .collect::<Result<_>>()?
        } else {
            fs::read_dir(&self.dir_path)?
                .map(|entry| {
                    entry
                        .map(|e| e.path())
                        .map_err(|e| anyhow!("Failed to read directory entry: {}", e))
                })
                .collect::<Result<_>>()?
        };

        let mut paths: Vec<PathBuf> = candidates
            .into_iter()
            .filter(|path| {
                if path.is_symlink() {
                    return false;
                }
                let is_file = path
                    .metadata()
                    .map(|metadata| metadata.is_file())
                    .unwrap_or(false);
                is_file && self.extension_matches(path)
            })
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn extension_matches(&self, path: &PathBuf) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| self.extensions.contains(&e.to_lowercase()))
    }
}
