mod common;

use std::collections::HashSet;
use std::path::PathBuf;

use common::*;
use image::ImageFormat;
use image_dedupe_core::processing::exact_digest;
use image_dedupe_core::{group_duplicates, Config, Error, HashMethod, ImageDeduper, ScanReport};
use tempfile::tempdir;

fn run(paths: &[PathBuf], method: HashMethod, threshold: u32) -> ScanReport {
    ImageDeduper::new(Config::new(method, threshold))
        .unwrap()
        .find_duplicates(paths)
}

fn member_paths(report: &ScanReport) -> Vec<Vec<PathBuf>> {
    report
        .groups
        .iter()
        .map(|g| g.images.iter().map(|r| r.path.clone()).collect())
        .collect()
}

#[test]
fn test_exact_pair_among_distinct_files() {
    let dir = tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", &pattern(40, 30, 0));
    let b = copy_file(&a, dir.path(), "b.png");
    let c = write_png(dir.path(), "c.png", &pattern(40, 30, 1));
    let d = write_png(dir.path(), "d.png", &pattern(40, 30, 2));

    let report = run(&[a.clone(), b.clone(), c, d], HashMethod::Exact, 5);

    assert_eq!(member_paths(&report), vec![vec![a.clone(), b]]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.compared, 4);

    let group = &report.groups[0];
    assert_eq!(group.method, HashMethod::Exact);
    assert_eq!(group.id, exact_digest(&a).unwrap()[..12]);
    assert_eq!(report.redundant_count(), 1);
}

#[test]
fn test_exact_mode_is_idempotent() {
    let dir = tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", &pattern(20, 20, 0));
    let paths = vec![
        a.clone(),
        copy_file(&a, dir.path(), "b.png"),
        write_png(dir.path(), "c.png", &pattern(20, 20, 1)),
        copy_file(&a, dir.path(), "d.png"),
    ];

    let first = run(&paths, HashMethod::Exact, 5);
    let second = run(&paths, HashMethod::Exact, 5);
    assert_eq!(first.groups, second.groups);
    assert_eq!(first.groups[0].images.len(), 3);
}

#[test]
fn test_exact_groups_partition_by_digest() {
    let dir = tempdir().unwrap();
    let x = write_png(dir.path(), "x.png", &pattern(16, 16, 0));
    let y = write_png(dir.path(), "y.png", &pattern(16, 16, 1));
    let z = write_png(dir.path(), "z.png", &pattern(16, 16, 2));
    let paths = vec![
        x.clone(),
        y.clone(),
        copy_file(&x, dir.path(), "x2.png"),
        z,
        copy_file(&y, dir.path(), "y2.png"),
        copy_file(&x, dir.path(), "x3.png"),
    ];

    let report = run(&paths, HashMethod::Exact, 0);
    assert_eq!(report.groups.len(), 2);

    let mut seen = HashSet::new();
    let mut digests = HashSet::new();
    for group in &report.groups {
        let digest = group.images[0].exact_hash.clone().unwrap();
        assert!(group
            .images
            .iter()
            .all(|r| r.exact_hash.as_deref() == Some(digest.as_str())));
        assert!(digests.insert(digest));
        for record in &group.images {
            assert!(seen.insert(record.path.clone()), "record in two groups");
        }
    }

    // First-seen digest order: x before y
    assert_eq!(report.groups[0].images[0].path, x);
    assert_eq!(report.groups[1].images[0].path, y);
}

#[test]
fn test_corrupt_file_is_skipped() {
    let dir = tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", &pattern(24, 24, 0));
    let b = copy_file(&a, dir.path(), "b.png");
    let broken = write_corrupt(dir.path(), "broken.png");
    let missing = dir.path().join("missing.png");

    for method in [HashMethod::Exact, HashMethod::Phash, HashMethod::Dhash] {
        let clean = run(&[a.clone(), b.clone()], method, 5);
        let report = run(
            &[a.clone(), broken.clone(), b.clone(), missing.clone()],
            method,
            5,
        );

        assert_eq!(report.groups.len(), clean.groups.len());
        assert_eq!(member_paths(&report), vec![vec![a.clone(), b.clone()]]);

        let skipped: Vec<_> = report.skipped.iter().map(|s| s.path.clone()).collect();
        assert_eq!(skipped, vec![broken.clone(), missing.clone()]);
        assert!(matches!(report.skipped[0].error, Error::Decode { .. }));
        assert!(matches!(report.skipped[1].error, Error::Read { .. }));
        assert!(report.skipped.iter().all(|s| s.error.is_per_file()));
    }
}

#[test]
fn test_perceptual_matches_reencoded_copy() {
    let dir = tempdir().unwrap();
    let img = pattern(64, 64, 0);
    let png = write_png(dir.path(), "photo.png", &img);
    let other = write_png(dir.path(), "other.png", &pattern(64, 64, 2));
    let bmp = write_image(dir.path(), "photo.bmp", &img, ImageFormat::Bmp);
    let paths = vec![png.clone(), other, bmp.clone()];

    assert!(run(&paths, HashMethod::Exact, 5).groups.is_empty());

    for method in [HashMethod::Phash, HashMethod::Dhash] {
        let report = run(&paths, method, 0);
        assert_eq!(member_paths(&report), vec![vec![png.clone(), bmp.clone()]]);

        let group = &report.groups[0];
        assert_eq!(group.id, format!("{}_1", method));
        assert_eq!(group.method, method);
        assert!(group.images.iter().all(|r| r.perceptual_hash.is_some()));
        assert!(group.images.iter().all(|r| r.exact_hash.is_none()));

        // Same pixels, the uncompressed BMP is the larger file
        assert_eq!(group.kept().unwrap().path, bmp);
    }
}

#[test]
fn test_keep_prefers_older_identical_copy() {
    let dir = tempdir().unwrap();
    let newer = write_png(dir.path(), "newer.png", &pattern(32, 32, 0));
    let older = copy_file(&newer, dir.path(), "older.png");
    set_mtime(&newer, 2_000_000);
    set_mtime(&older, 1_000_000);

    let report = run(&[newer, older.clone()], HashMethod::Exact, 5);
    assert_eq!(report.groups[0].suggested_keep, 1);
    assert_eq!(report.groups[0].kept().unwrap().path, older);
}

#[test]
fn test_keep_prefers_higher_resolution() {
    let dir = tempdir().unwrap();
    let small = write_png(dir.path(), "small.png", &pattern(32, 32, 0));
    let large = write_png(dir.path(), "large.png", &pattern(64, 64, 0));

    // Generous threshold so the two renditions cluster regardless of resampling
    let report = run(&[small, large.clone()], HashMethod::Phash, 64);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].kept().unwrap().path, large);
    assert_eq!(report.groups[0].kept().unwrap().width, 64);
}

#[test]
fn test_parallel_run_matches_single_thread() {
    let dir = tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..12u32 {
        let seed = i % 3;
        paths.push(write_png(
            dir.path(),
            &format!("img{:02}.png", i),
            &pattern(32 + (i % 2) * 32, 32, seed),
        ));
    }

    for method in [HashMethod::Exact, HashMethod::Phash, HashMethod::Dhash] {
        let single = ImageDeduper::new(Config {
            threads: 1,
            ..Config::new(method, 6)
        })
        .unwrap()
        .find_duplicates(&paths);
        let parallel = ImageDeduper::new(Config {
            threads: 4,
            ..Config::new(method, 6)
        })
        .unwrap()
        .find_duplicates(&paths);
        assert_eq!(single.groups, parallel.groups);
    }
}

#[test]
fn test_no_duplicates_is_not_an_error() {
    let dir = tempdir().unwrap();
    let paths = vec![
        write_png(dir.path(), "a.png", &pattern(16, 16, 0)),
        write_png(dir.path(), "b.png", &pattern(16, 16, 1)),
    ];

    let report = group_duplicates(&paths, "exact", 5).unwrap();
    assert!(report.groups.is_empty());
    assert_eq!(report.reclaimable_bytes(), 0);

    let empty: Vec<PathBuf> = Vec::new();
    assert!(group_duplicates(&empty, "phash", 5).unwrap().groups.is_empty());
}

#[test]
fn test_configuration_errors_abort_the_run() {
    let paths = vec![PathBuf::from("/path/that/does/not/exist.png")];

    assert!(matches!(
        group_duplicates(&paths, "md5", 5),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        group_duplicates(&paths, "phash", -1),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        group_duplicates(&paths, "dhash", 65),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        ImageDeduper::new(Config::new(HashMethod::Phash, 100)),
        Err(Error::Configuration(_))
    ));
}
