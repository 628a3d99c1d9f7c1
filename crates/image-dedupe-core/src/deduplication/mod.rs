//! Turning fingerprinted records into duplicate groups
mod exact;
mod keep;
mod similarity;

pub use exact::group_exact;
pub use keep::suggest_keep;
pub use similarity::{cluster_similar, connected_components, pairs_within, UnionFind};

use crate::config::HashMethod;
use crate::types::{DuplicateGroup, FileRecord};

/// Group fingerprinted records with the strategy matching `method`
pub fn find_duplicate_groups(
    records: Vec<FileRecord>,
    method: HashMethod,
    threshold: u32,
) -> Vec<DuplicateGroup> {
    match method {
        HashMethod::Exact => group_exact(records),
        HashMethod::Phash | HashMethod::Dhash => cluster_similar(records, method, threshold),
    }
}
