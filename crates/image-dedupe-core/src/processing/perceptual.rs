//! # Perceptual Hashing Module
//!
//! Perceptual hashing generates "fingerprints" that remain similar for visually similar images,
//! unlike cryptographic hashes where minor changes produce completely different outputs.
//!
//! Two 64-bit methods are provided:
//!
//! 1. pHash: 2-D DCT of a 32×32 grayscale thumbnail, thresholded on the median of the
//!    lowest 8×8 frequencies. Robust against rescaling and recompression.
//! 2. dHash: sign of the horizontal gradient on a 9×8 grayscale thumbnail. Cheaper and
//!    sensitive to structural edits.
//!
//! ## Hamming Distance Interpretation
//!
//! - 0-3: Nearly identical images (same image with minor modifications)
//! - 4-10: Similar images (same subject with moderate differences)
//! - >10: Different images
//!
//! Distances are a heuristic. They are only ever compared against a threshold.

use image::imageops::FilterType;
use image::DynamicImage;
use rustdct::{Dct2, DctPlanner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::config::HashMethod;
use crate::error::{Error, Result};

const DCT_SIZE: usize = 32;
const LOW_FREQ_SIZE: usize = 8;

/// A perceptual hash represented as a 64-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PHash(pub u64);

impl PHash {
    /// Fingerprint length in bits
    pub const BITS: u32 = u64::BITS;

    /// Calculate the Hamming distance between two perceptual hashes
    pub fn distance(&self, other: &PHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Check if two images are perceptually similar based on a threshold
    pub fn is_similar(&self, other: &PHash, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }
}

impl fmt::Display for PHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// DCT-based perceptual hash
pub fn calculate_phash(img: &DynamicImage) -> PHash {
    let small = img
        .grayscale()
        .resize_exact(DCT_SIZE as u32, DCT_SIZE as u32, FilterType::Lanczos3)
        .to_luma8();

    let mut matrix: Vec<f32> = small.pixels().map(|p| f32::from(p[0])).collect();

    let mut planner = DctPlanner::new();
    let dct = planner.plan_dct2(DCT_SIZE);

    // Rows, then columns
    for row in matrix.chunks_exact_mut(DCT_SIZE) {
        dct.process_dct2(row);
    }
    let mut column = [0f32; DCT_SIZE];
    for x in 0..DCT_SIZE {
        for (y, value) in column.iter_mut().enumerate() {
            *value = matrix[y * DCT_SIZE + x];
        }
        dct.process_dct2(&mut column);
        for (y, value) in column.iter().enumerate() {
            matrix[y * DCT_SIZE + x] = *value;
        }
    }

    let mut low = Vec::with_capacity(LOW_FREQ_SIZE * LOW_FREQ_SIZE);
    for y in 0..LOW_FREQ_SIZE {
        low.extend_from_slice(&matrix[y * DCT_SIZE..y * DCT_SIZE + LOW_FREQ_SIZE]);
    }

    let median = median(&low);

    let mut hash: u64 = 0;
    for (bit_pos, &coefficient) in low.iter().enumerate() {
        if coefficient > median {
            hash |= 1u64 << bit_pos;
        }
    }

    PHash(hash)
}

/// Gradient-based difference hash
pub fn calculate_dhash(img: &DynamicImage) -> PHash {
    let width = LOW_FREQ_SIZE as u32 + 1;
    let height = LOW_FREQ_SIZE as u32;
    let small = img
        .grayscale()
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_luma8();

    let mut hash: u64 = 0;
    for y in 0..height {
        for x in 0..width - 1 {
            let left = small.get_pixel(x, y)[0];
            let right = small.get_pixel(x + 1, y)[0];
            if right > left {
                hash |= 1u64 << (y * (width - 1) + x);
            }
        }
    }

    PHash(hash)
}

/// Hash a decoded image with the given method. `Exact` is not perceptual and falls back to pHash.
pub fn phash_from_img(img: &DynamicImage, method: HashMethod) -> PHash {
    match method {
        HashMethod::Dhash => calculate_dhash(img),
        HashMethod::Phash | HashMethod::Exact => calculate_phash(img),
    }
}

/// Calculate a perceptual hash from an image file
pub fn phash_from_file<P: AsRef<Path>>(path: P, method: HashMethod) -> Result<PHash> {
    let img = open_image(path.as_ref())?;
    Ok(phash_from_img(&img, method))
}

/// Decode an image, sniffing the format from content before trusting the extension
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    let reader = image::io::Reader::open(path)
        .map_err(|e| Error::read(path, e))?
        .with_guessed_format()
        .map_err(|e| Error::read(path, e))?;
    reader.decode().map_err(|e| Error::decode(path, e))
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
