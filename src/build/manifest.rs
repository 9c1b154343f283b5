//! Build manifest for incremental builds.
//!
//! The manifest records, for every path token that was built, the content
//! hash of each file the output depends on, the files that were written and
//! when. A token whose recorded dependencies and outputs are unchanged is
//! skipped on the next build.
//!
//! # Manifest Format
//!
//! Stored as JSON in `.multicss-manifest.json` in the output directory:
//!
//! ```json
//! {
//!   "version": 1,
//!   "created_at": "2024-01-15T10:30:00Z",
//!   "updated_at": "2024-01-15T10:35:00Z",
//!   "entries": {
//!     "/p/src/foo.css:/p/src:foo.css": {
//!       "dependencies": {
//!         "/p/src/foo.css": "9f1c7a02b3e4d5c6",
//!         "/p/src/lib/vars.css": "0a1b2c3d4e5f6071"
//!       },
//!       "outputs": ["/p/dist/foo.css", "/p/dist/foo.css.meta.json"],
//!       "built_at": "2024-01-15T10:35:00Z",
//!       "duration_ms": 4
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use xxhash_rust::xxh3::xxh3_64;

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// Hash recorded for a dependency that could not be read.
pub const UNHASHED: &str = "unhashed";

/// Default manifest filename.
pub const MANIFEST_FILENAME: &str = ".multicss-manifest.json";

/// Error during manifest operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Version mismatch
    #[error("Manifest version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Build manifest tracking every built token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Manifest format version
    pub version: u32,
    /// When the manifest was first created
    pub created_at: String,
    /// When the manifest was last updated
    pub updated_at: String,
    /// Entry per path token
    pub entries: BTreeMap<String, EntryManifest>,
}

/// Manifest entry for a single path token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryManifest {
    /// Dependency path to content hash
    pub dependencies: BTreeMap<String, String>,
    /// Files written for this token
    pub outputs: Vec<String>,
    /// When this token was last built
    pub built_at: String,
    /// Build duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl BuildManifest {
    /// Create a new empty manifest.
    pub fn new() -> Self {
        let now = format_timestamp(SystemTime::now());
        Self {
            version: MANIFEST_VERSION,
            created_at: now.clone(),
            updated_at: now,
            entries: BTreeMap::new(),
        }
    }

    /// Load a manifest from a file.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ManifestError> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let manifest: BuildManifest = serde_json::from_reader(reader)?;

        if manifest.version != MANIFEST_VERSION {
            return Err(ManifestError::VersionMismatch {
                expected: MANIFEST_VERSION,
                found: manifest.version,
            });
        }

        Ok(Some(manifest))
    }

    /// Load a manifest from the default location in the output directory.
    pub fn load_from_dir(out_dir: &Path) -> Result<Option<Self>, ManifestError> {
        Self::load(&out_dir.join(MANIFEST_FILENAME))
    }

    /// Load from the output directory, starting over when the stored
    /// manifest is missing, unreadable or from another format version.
    pub fn load_or_new(out_dir: &Path) -> Self {
        match Self::load_from_dir(out_dir) {
            Ok(Some(manifest)) => manifest,
            Ok(None) => Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding build manifest, rebuilding everything");
                Self::new()
            }
        }
    }

    /// Save the manifest to a file.
    pub fn save(&mut self, path: &Path) -> Result<(), ManifestError> {
        self.updated_at = format_timestamp(SystemTime::now());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;

        Ok(())
    }

    /// Save the manifest to the default location in the output directory.
    pub fn save_to_dir(&mut self, out_dir: &Path) -> Result<(), ManifestError> {
        self.save(&out_dir.join(MANIFEST_FILENAME))
    }

    /// Record a successful build for a token.
    ///
    /// A dependency that is missing or cannot be read is recorded as
    /// [`UNHASHED`], which keeps the entry stale until it can be hashed.
    pub fn record_build(
        &mut self,
        token: &str,
        dependencies: &[PathBuf],
        outputs: &[PathBuf],
        duration_ms: Option<u64>,
    ) {
        let mut hashes = BTreeMap::new();
        for dependency in dependencies {
            let hash = match hash_file(dependency) {
                Ok(Some(hash)) => hash,
                Ok(None) => UNHASHED.to_string(),
                Err(e) => {
                    tracing::warn!(path = %dependency.display(), error = %e, "cannot hash dependency");
                    UNHASHED.to_string()
                }
            };
            hashes.insert(dependency.to_string_lossy().to_string(), hash);
        }

        let entry = EntryManifest {
            dependencies: hashes,
            outputs: outputs.iter().map(|p| p.to_string_lossy().to_string()).collect(),
            built_at: format_timestamp(SystemTime::now()),
            duration_ms,
        };

        self.entries.insert(token.to_string(), entry);
    }

    /// Check if a token needs to be rebuilt.
    ///
    /// A token needs rebuilding if:
    /// - It has never been built
    /// - Any recorded output is missing
    /// - Any recorded dependency is missing, unreadable or has different content
    pub fn needs_rebuild(&self, token: &str) -> bool {
        let entry = match self.entries.get(token) {
            Some(e) => e,
            None => return true,
        };

        if entry.outputs.iter().any(|output| !Path::new(output).exists()) {
            return true;
        }

        entry.dependencies.iter().any(|(dependency, old_hash)| {
            match hash_file(Path::new(dependency)) {
                Ok(Some(hash)) => old_hash == UNHASHED || &hash != old_hash,
                Ok(None) => true,
                Err(e) => {
                    tracing::warn!(path = %dependency, error = %e, "cannot hash dependency");
                    true
                }
            }
        })
    }

    /// Drop entries whose token is not in `live`.
    ///
    /// Returns the outputs of the dropped entries that no remaining entry
    /// also claims, so the caller can delete them.
    pub fn prune(&mut self, live: &HashSet<&str>) -> Vec<PathBuf> {
        let dead: Vec<String> =
            self.entries.keys().filter(|token| !live.contains(token.as_str())).cloned().collect();

        let mut orphaned = Vec::new();
        for token in &dead {
            if let Some(entry) = self.entries.remove(token) {
                orphaned.extend(entry.outputs);
            }
        }

        let claimed: HashSet<&str> =
            self.entries.values().flat_map(|e| e.outputs.iter().map(String::as_str)).collect();
        orphaned.retain(|output| !claimed.contains(output.as_str()));
        orphaned.sort();
        orphaned.dedup();
        orphaned.into_iter().map(PathBuf::from).collect()
    }

    /// Get the manifest entry for a token.
    pub fn get_entry(&self, token: &str) -> Option<&EntryManifest> {
        self.entries.get(token)
    }

    /// Get the number of entries in the manifest.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BuildManifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute a hash of a file's contents.
///
/// Returns `Ok(None)` when the file does not exist.
fn hash_file(path: &Path) -> Result<Option<String>, ManifestError> {
    match fs::read(path) {
        Ok(contents) => Ok(Some(format!("{:016x}", xxh3_64(&contents)))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Format a SystemTime as an ISO 8601 timestamp string.
pub(crate) fn format_timestamp(time: SystemTime) -> String {
    let duration = time.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
    let secs = duration.as_secs();

    let days = secs / 86400;
    let remaining = secs % 86400;
    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    let seconds = remaining % 60;

    let (year, month, day) = civil_from_days(days as i64);

    format!("{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z", year, month, day, hours, minutes, seconds)
}

/// Convert days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
