//! Connectivity clustering over a pairwise "distance ≤ threshold" relation.
//!
//! The pairwise scan is quadratic in the number of records. Rows are scanned in
//! parallel, matches are collected in (i, j) order and unioned sequentially, so
//! the partition is identical to a single-threaded run.

use rayon::prelude::*;
use std::collections::HashMap;

use crate::config::HashMethod;
use crate::deduplication::keep::suggest_keep;
use crate::types::{DuplicateGroup, FileRecord};

/// Disjoint-set forest over dense indices, with path halving
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the classes of `a` and `b`. Returns false if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }
        self.parent[root_a] = root_b;
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// All classes, ordered by their lowest member, members ascending
    pub fn classes(&mut self) -> Vec<Vec<usize>> {
        let mut class_of_root: HashMap<usize, usize> = HashMap::new();
        let mut classes: Vec<Vec<usize>> = Vec::new();
        for index in 0..self.len() {
            let root = self.find(index);
            let class = *class_of_root.entry(root).or_insert_with(|| {
                classes.push(Vec::new());
                classes.len() - 1
            });
            classes[class].push(index);
        }
        classes
    }
}

/// Every pair (i, j), i < j, whose distance is within `threshold`, in row-major order
pub fn pairs_within<F>(len: usize, threshold: u32, distance: F) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> u32 + Sync,
{
    let distance = &distance;
    (0..len)
        .into_par_iter()
        .flat_map_iter(|i| {
            (i + 1..len)
                .filter(move |&j| distance(i, j) <= threshold)
                .map(move |j| (i, j))
        })
        .collect()
}

/// Connectivity classes of `len` nodes under the given matching pairs
pub fn connected_components(
    len: usize,
    pairs: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::new(len);
    for (a, b) in pairs {
        sets.union(a, b);
    }
    sets.classes()
}

/// Cluster records whose perceptual fingerprints chain together within `threshold`.
///
/// Records without a fingerprint are ignored. Group ids are `<method>_<n>`,
/// counting from 1 in first-encountered class order.
pub fn cluster_similar(
    records: Vec<FileRecord>,
    method: HashMethod,
    threshold: u32,
) -> Vec<DuplicateGroup> {
    let (hashes, records): (Vec<_>, Vec<_>) = records
        .into_iter()
        .filter_map(|record| record.perceptual_hash.map(|hash| (hash, record)))
        .unzip();

    let pairs = pairs_within(hashes.len(), threshold, |i, j| hashes[i].distance(&hashes[j]));
    log::debug!(
        "{} of {} pairs within distance {}",
        pairs.len(),
        hashes.len() * hashes.len().saturating_sub(1) / 2,
        threshold
    );

    let mut slots: Vec<Option<FileRecord>> = records.into_iter().map(Some).collect();
    let mut groups = Vec::new();

    for class in connected_components(slots.len(), pairs) {
        if class.len() < 2 {
            continue;
        }
        let images: Vec<FileRecord> = class
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();
        groups.push(DuplicateGroup {
            id: format!("{}_{}", method, groups.len() + 1),
            method,
            suggested_keep: suggest_keep(&images),
            images,
        });
    }

    groups
}
