//! Content digests for change detection.
//!
//! A package's digest is a BLAKE3 hash of its dependency sections and of
//! every `(target path, content)` pair in target-path order. The package's
//! own version is not part of it, so a digest only changes when what would
//! be published changes.

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::files::PackageFile;
use crate::manifest::dependency_sections;

/// Bump when the hashed layout changes.
const DIGEST_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Leading characters, for display.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digest of a package about to be published.
///
/// `files` must be sorted by target path, as returned by
/// [`collect_files`](crate::collect_files).
pub fn content_digest(manifest: &Value, files: &[PackageFile]) -> ContentDigest {
    let mut hasher = Hasher::new();
    hasher.update(&DIGEST_FORMAT_VERSION.to_le_bytes());

    // serde_json keeps insertion order, and the manifest builder sorts
    // dependency sections, so this is stable.
    hasher.update(dependency_sections(manifest).to_string().as_bytes());

    for file in files {
        hasher.update(file.target.as_bytes());
        hasher.update(b"\0");
        hasher.update(blake3::hash(&file.contents).as_bytes());
    }

    ContentDigest(hasher.finalize().to_hex().to_string())
}
