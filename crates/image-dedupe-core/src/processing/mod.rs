//! Per-file work: metadata extraction and fingerprinting
pub mod cryptographic;
pub mod metadata;
pub mod perceptual;

pub use cryptographic::{compute_cryptographic, exact_digest, DIGEST_ID_LEN};
pub use metadata::read_file_record;
pub use perceptual::{calculate_dhash, calculate_phash, open_image, phash_from_file, PHash};
