//! Core functionality for finding duplicate and near-duplicate images.
//!
//! This library provides the foundational components for image deduplication:
//! - Metadata extraction (size, pixel dimensions, modification time)
//! - Exact (BLAKE3) and perceptual (pHash, dHash) fingerprints
//! - Grouping by identical digest and clustering by Hamming distance
//! - A deterministic suggestion of which copy to keep
//!
//! The engine only recommends. Directory discovery and moving files to a trash
//! directory live in the [`discovery`] and [`action`] modules and are never
//! called by the engine itself.

// -- External Dependencies --
use log::info;
use rayon::prelude::*;

// -- Standard Library --
use std::path::{Path, PathBuf};
use std::time::Instant;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

// -- Public Modules --
pub mod action;
pub mod config;
pub mod deduplication;
pub mod discovery;
pub mod logging;
pub mod processing;
pub mod types;

use crate::deduplication::find_duplicate_groups;
use crate::processing::{exact_digest, phash_from_file, read_file_record};

/// Main entry point for the deduplication process
pub struct ImageDeduper {
    config: Config,
    pool: rayon::ThreadPool,
}

impl ImageDeduper {
    /// Create a new ImageDeduper, rejecting an invalid configuration up front
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| Error::Configuration(format!("cannot build thread pool: {}", e)))?;

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover all images in the provided directories
    pub fn discover_images(&self, directories: &[impl AsRef<Path>]) -> Result<Vec<PathBuf>> {
        discovery::discover_images(directories, &self.config)
    }

    /// Fingerprint every path and group the duplicates.
    ///
    /// Files that cannot be read, decoded or hashed are reported in
    /// [`ScanReport::skipped`] and take no part in grouping.
    pub fn find_duplicates<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> ScanReport {
        let start = Instant::now();
        let method = self.config.method;

        // Input order is preserved by the indexed collect
        let outcomes: Vec<Result<FileRecord>> = self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| fingerprint_file(path.as_ref(), method))
                .collect()
        });

        let mut records = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (path, outcome) in paths.iter().zip(outcomes) {
            match outcome {
                Ok(record) => records.push(record),
                Err(error) => {
                    logging::log_skipped_file(path.as_ref(), &error);
                    skipped.push(SkippedFile {
                        path: path.as_ref().to_path_buf(),
                        error,
                    });
                }
            }
        }

        let compared = records.len();
        let groups = find_duplicate_groups(records, method, self.config.threshold);

        if method.is_perceptual() {
            info!(
                "{} comparison of {} files ({} skipped) at distance {}: {} groups in {:.2?}",
                method,
                compared,
                skipped.len(),
                self.config.threshold,
                groups.len(),
                start.elapsed()
            );
        } else {
            info!(
                "{} comparison of {} files ({} skipped): {} groups in {:.2?}",
                method,
                compared,
                skipped.len(),
                groups.len(),
                start.elapsed()
            );
        }

        ScanReport {
            groups,
            skipped,
            compared,
        }
    }
}

/// Find duplicate groups among `paths` using a method name and raw threshold.
///
/// `method` is "exact", "phash" or "dhash"; `threshold` is the maximum Hamming
/// distance for perceptual matches and is ignored in exact mode. A bad method or
/// threshold fails with [`Error::Configuration`] before any file is read.
pub fn group_duplicates<P: AsRef<Path> + Sync>(
    paths: &[P],
    method: &str,
    threshold: i64,
) -> Result<ScanReport> {
    let config = Config::new(method.parse()?, 0).with_raw_threshold(threshold)?;
    Ok(ImageDeduper::new(config)?.find_duplicates(paths))
}

/// Read metadata for one file and attach the fingerprint for `method`.
///
/// A hashing failure after a successful metadata read is reported as [`Error::Decode`].
pub fn fingerprint_file(path: &Path, method: HashMethod) -> Result<FileRecord> {
    let mut record = read_file_record(path)?;

    let fingerprinted = match method {
        HashMethod::Exact => exact_digest(path).map(|digest| record.exact_hash = Some(digest)),
        HashMethod::Phash | HashMethod::Dhash => {
            phash_from_file(path, method).map(|hash| record.perceptual_hash = Some(hash))
        }
    };

    match fingerprinted {
        Ok(()) => Ok(record),
        Err(e @ Error::Decode { .. }) => Err(e),
        Err(other) => Err(Error::decode(path, other)),
    }
}
