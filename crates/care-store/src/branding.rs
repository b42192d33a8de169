//! Optional branding image
//!
//! The form shows a logo when one is present at the configured path. A
//! missing or unreadable file never blocks the form.

use std::path::{Path, PathBuf};

/// A loaded branding image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandingAsset {
    /// Where it was read from
    pub path: PathBuf,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl BrandingAsset {
    /// Load the image at `path`, or `None` when it is absent or unreadable
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => Some(Self {
                path: path.to_path_buf(),
                bytes,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no branding image");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "branding image unreadable");
                None
            }
        }
    }

    /// Size in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file was empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_logo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BrandingAsset::load(dir.path().join("logo.png")).is_none());
    }

    #[test]
    fn present_logo_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let asset = BrandingAsset::load(&path).unwrap();
        assert_eq!(asset.len(), 4);
        assert_eq!(asset.path, path);
    }
}
