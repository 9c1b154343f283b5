//! Build caches.
//!
//! A [`BuildCache`] receives the full token set of a build and decides which
//! tokens are stale. Only those are handed to the per-file routine, at most
//! `concurrency` at a time.

use crate::build::{BuildError, BuildManifest, BuildOutcome, BuildResult, FileResult, PathToken};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

/// Runs a per-file routine for the stale subset of a token set.
pub trait BuildCache {
    /// Build every stale token with `routine` and remember the outcomes.
    ///
    /// The first failing routine fails the whole call.
    fn build_and_cache<F>(
        &mut self,
        tokens: &[PathToken],
        out_dir: &Path,
        concurrency: usize,
        routine: F,
    ) -> Result<BuildResult, BuildError>
    where
        F: Fn(&PathToken, &Path) -> Result<BuildOutcome, BuildError> + Sync;
}

/// Cache backed by a JSON manifest in the output directory.
///
/// See [`BuildManifest`] for when a token counts as stale. Tokens that were
/// built before but are no longer part of the set are dropped and their
/// outputs deleted.
#[derive(Debug, Clone, Default)]
pub struct ManifestCache {
    force: bool,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every token regardless of the manifest.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }
}

impl BuildCache for ManifestCache {
    fn build_and_cache<F>(
        &mut self,
        tokens: &[PathToken],
        out_dir: &Path,
        concurrency: usize,
        routine: F,
    ) -> Result<BuildResult, BuildError>
    where
        F: Fn(&PathToken, &Path) -> Result<BuildOutcome, BuildError> + Sync,
    {
        let start = Instant::now();
        fs::create_dir_all(out_dir).map_err(BuildError::io(out_dir))?;

        let mut seen = HashSet::new();
        let tokens: Vec<&PathToken> = tokens.iter().filter(|t| seen.insert(t.as_str())).collect();

        let mut manifest = BuildManifest::load_or_new(out_dir);
        let removed = manifest.prune(&seen);
        for path in &removed {
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed stale output"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove stale output"),
            }
        }

        let mut files: Vec<Option<FileResult>> = vec![None; tokens.len()];
        let mut stale = Vec::new();
        for (idx, token) in tokens.iter().enumerate() {
            if self.force || manifest.needs_rebuild(token.as_str()) {
                stale.push(idx);
            } else {
                files[idx] = Some(FileResult::skipped(token.to_string()));
            }
        }
        tracing::debug!(stale = stale.len(), fresh = tokens.len() - stale.len(), "checked manifest");

        let pool = rayon::ThreadPoolBuilder::new().num_threads(concurrency.max(1)).build()?;
        let outcomes: Vec<(usize, Duration, Result<BuildOutcome, BuildError>)> = pool.install(|| {
            stale
                .par_iter()
                .map(|&idx| {
                    let started = Instant::now();
                    let outcome = routine(tokens[idx], out_dir);
                    (idx, started.elapsed(), outcome)
                })
                .collect()
        });

        let mut first_error = None;
        for (idx, duration, outcome) in outcomes {
            let token = tokens[idx].as_str();
            match outcome {
                Ok(outcome) => {
                    let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                    manifest.record_build(
                        token,
                        &outcome.dependencies,
                        &outcome.outputs,
                        Some(duration_ms),
                    );
                    files[idx] = Some(FileResult::built(token.to_string(), outcome.outputs, duration));
                }
                Err(e) => {
                    tracing::debug!(token, error = %e, "file failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        let saved = manifest.save_to_dir(out_dir);
        if let Some(e) = first_error {
            return Err(e);
        }
        saved?;

        let mut result = BuildResult::new();
        result.files = files.into_iter().flatten().collect();
        result.removed = removed;
        Ok(result.with_duration(start.elapsed()))
    }
}
