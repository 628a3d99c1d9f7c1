use std::cmp::Reverse;
use std::time::SystemTime;

use crate::types::FileRecord;

/// Ranking key, larger is better: pixel area, then byte size, then older mtime
fn rank(record: &FileRecord) -> (u64, u64, Reverse<SystemTime>) {
    (record.area(), record.size, Reverse(record.modified))
}

/// Pick the index of the file to keep.
///
/// Highest resolution wins, then the largest file, then the oldest. Remaining
/// ties go to the first occurrence. Returns 0 for an empty slice.
pub fn suggest_keep(images: &[FileRecord]) -> usize {
    let mut best = 0;
    for (index, record) in images.iter().enumerate().skip(1) {
        if rank(record) > rank(&images[best]) {
            best = index;
        }
    }
    best
}
