use std::collections::HashMap;

use crate::config::HashMethod;
use crate::deduplication::keep::suggest_keep;
use crate::processing::DIGEST_ID_LEN;
use crate::types::{DuplicateGroup, FileRecord};

/// Group records by identical content digest.
///
/// Buckets are emitted in order of first-seen digest, members in input order.
/// Records without a digest are ignored. Unique content produces no group.
pub fn group_exact(records: Vec<FileRecord>) -> Vec<DuplicateGroup> {
    let mut bucket_index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<FileRecord>)> = Vec::new();

    for record in records {
        let Some(digest) = record.exact_hash.clone() else {
            continue;
        };
        match bucket_index.get(&digest) {
            Some(&index) => buckets[index].1.push(record),
            None => {
                bucket_index.insert(digest.clone(), buckets.len());
                buckets.push((digest, vec![record]));
            }
        }
    }

    buckets
        .into_iter()
        .filter(|(_, images)| images.len() >= 2)
        .map(|(digest, images)| DuplicateGroup {
            id: digest.chars().take(DIGEST_ID_LEN).collect(),
            method: HashMethod::Exact,
            suggested_keep: suggest_keep(&images),
            images,
        })
        .collect()
}
