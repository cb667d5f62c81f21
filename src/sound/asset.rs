//! Asset identity and resolution.
//!
//! An [`AssetIdentity`] is the registry key for a sound: a normalized
//! absolute path. Resolvers map a `(name, extension)` pair to an identity
//! the way an application bundle would.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use super::error::SoundError;

/// Extensions tried, in order, when a name is resolved without one.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "aiff", "mp3", "flac", "ogg", "m4a"];

/// Normalized key identifying one audio resource.
///
/// Two identities are equal iff they point at the same file: existing
/// paths are canonicalized, relative paths are anchored at the current
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetIdentity {
    path: PathBuf,
}

impl AssetIdentity {
    /// Creates an identity from a filesystem path.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: normalize(path.as_ref()),
        }
    }

    /// Creates an identity from a `file://` URL or a bare path.
    ///
    /// Percent-escapes in file URLs are decoded, so `my%20dog.wav` names the
    /// same file as `my dog.wav`.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::UnsupportedUrl` for any other URL scheme, or for
    /// a file URL with no local path (e.g. a remote host).
    ///
    /// # Example
    ///
    /// ```rust
    /// use soundpool::sound::AssetIdentity;
    ///
    /// let a = AssetIdentity::from_url("file:///sounds/dog.wav").unwrap();
    /// let b = AssetIdentity::from_url("/sounds/dog.wav").unwrap();
    /// assert_eq!(a, b);
    ///
    /// assert!(AssetIdentity::from_url("https://example.com/dog.wav").is_err());
    /// ```
    pub fn from_url(url: &str) -> Result<Self, SoundError> {
        match Url::parse(url) {
            // `C:\sounds\dog.wav` parses with the drive letter as its scheme
            Ok(parsed) if cfg!(windows) && parsed.scheme().len() == 1 => Ok(Self::from_path(url)),
            Ok(parsed) if parsed.scheme() == "file" => parsed
                .to_file_path()
                .map(Self::from_path)
                .map_err(|()| SoundError::UnsupportedUrl(url.to_string())),
            Ok(_) => Err(SoundError::UnsupportedUrl(url.to_string())),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Self::from_path(url)),
            Err(e) => Err(SoundError::UnsupportedUrl(format!("{}: {}", url, e))),
        }
    }

    /// Returns the normalized path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the lowercase file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

impl fmt::Display for AssetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            return cwd.join(path);
        }
    }
    path.to_path_buf()
}

/// Maps an asset name and optional extension to an identity.
///
/// Returning `None` means the asset does not exist; callers treat that as a
/// silent no-op rather than an error.
pub trait AssetResolver: Send + Sync {
    /// Resolves `name` (with `extension` appended when given).
    fn resolve(&self, name: &str, extension: Option<&str>) -> Option<AssetIdentity>;
}

/// Resolves assets relative to a single directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    /// Creates a resolver rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolver rooted at the running executable's directory, falling back
    /// to the current directory.
    #[must_use]
    pub fn application_default() -> Self {
        let root = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self { root }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn with_extension(&self, name: &str, ext: &str) -> PathBuf {
        self.root.join(format!("{name}.{ext}"))
    }

    fn find(&self, name: &str, extension: Option<&str>) -> Option<PathBuf> {
        let extension = extension
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty());
        if let Some(ext) = extension {
            return Some(self.with_extension(name, ext)).filter(|p| p.is_file());
        }

        let exact = self.root.join(name);
        if exact.is_file() {
            return Some(exact);
        }
        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.with_extension(name, ext))
            .find(|p| p.is_file())
    }
}

impl Default for DirectoryResolver {
    fn default() -> Self {
        Self::application_default()
    }
}

impl AssetResolver for DirectoryResolver {
    fn resolve(&self, name: &str, extension: Option<&str>) -> Option<AssetIdentity> {
        if name.is_empty() {
            return None;
        }
        match self.find(name, extension) {
            Some(path) => Some(AssetIdentity::from_path(path)),
            None => {
                debug!(
                    "Asset not found: {} (extension: {:?}) in {}",
                    name,
                    extension,
                    self.root.display()
                );
                None
            }
        }
    }
}
