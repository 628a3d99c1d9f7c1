use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::config::HashMethod;
use crate::error::Error;
use crate::processing::PHash;

/// Supported image formats
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Tiff,
    Other(String),
}

impl ImageFormat {
    /// Determine format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "bmp" => Self::Bmp,
            "webp" => Self::Webp,
            "tif" | "tiff" => Self::Tiff,
            other => Self::Other(other.to_string()),
        }
    }

    /// Check if format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// One scanned image file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Full path to the image file
    pub path: PathBuf,

    /// File size in bytes
    pub size: u64,

    /// Pixel width
    pub width: u32,

    /// Pixel height
    pub height: u32,

    /// Last modified timestamp
    pub modified: SystemTime,

    /// BLAKE3 digest as lowercase hex, only set in exact mode
    pub exact_hash: Option<String>,

    /// Perceptual fingerprint, only set in perceptual modes
    pub perceptual_hash: Option<PHash>,
}

impl FileRecord {
    pub fn new(path: PathBuf, size: u64, width: u32, height: u32, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            width,
            height,
            modified,
            exact_hash: None,
            perceptual_hash: None,
        }
    }

    /// Pixel area, widened so it cannot overflow
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A maximal set of files judged identical or visually similar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Run-scoped identifier
    pub id: String,

    /// Comparison method that produced the group
    pub method: HashMethod,

    /// Members in input order, always at least two
    pub images: Vec<FileRecord>,

    /// Index into `images` of the suggested file to keep
    pub suggested_keep: usize,
}

impl DuplicateGroup {
    /// The suggested keep, or `None` if `suggested_keep` is out of range
    pub fn kept(&self) -> Option<&FileRecord> {
        self.images.get(self.suggested_keep)
    }

    /// Members other than the suggested keep
    pub fn redundant(&self) -> impl Iterator<Item = &FileRecord> {
        let keep = self.suggested_keep;
        self.images
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != keep)
            .map(|(_, record)| record)
    }
}

/// A file excluded from a run, with the reason
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: Error,
}

/// Outcome of one duplicate search
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Groups in deterministic order
    pub groups: Vec<DuplicateGroup>,

    /// Files that could not be read, decoded or hashed
    pub skipped: Vec<SkippedFile>,

    /// Number of files that made it into the comparison
    pub compared: usize,
}

impl ScanReport {
    /// Total number of files that could be removed if every suggestion were followed
    pub fn redundant_count(&self) -> usize {
        self.groups.iter().map(|g| g.redundant().count()).sum()
    }

    /// Bytes reclaimed if every suggestion were followed
    pub fn reclaimable_bytes(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|g| g.redundant())
            .map(|record| record.size)
            .sum()
    }
}
