//! Moving redundant files into a trash directory, and back.
//!
//! Consumes a resolved [`DuplicateGroup`]. Nothing in the grouping engine calls
//! into this module.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::logging::{log_file_error, log_fs_modification};
use crate::types::DuplicateGroup;

/// Name of the holding directory created inside the scanned root
pub const TRASH_DIR_NAME: &str = ".dedupe_trash";

/// One file moved into the trash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashEntry {
    pub src: PathBuf,
    pub dest: PathBuf,
}

/// Record of a resolved group, enough to undo it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashLog {
    pub group_id: String,
    pub kept: PathBuf,
    pub moved: Vec<TrashEntry>,
}

impl TrashLog {
    /// Write a set of logs as JSON
    pub fn save_all(logs: &[TrashLog], path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(logs)?)?;
        Ok(())
    }

    /// Read logs written by [`TrashLog::save_all`]
    pub fn load_all(path: &Path) -> Result<Vec<TrashLog>> {
        let contents = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// The trash directory for a scan root
pub fn trash_dir(root: &Path) -> PathBuf {
    root.join(TRASH_DIR_NAME)
}

/// Move every member of `group` except `keep` into the trash directory under `root`.
///
/// Members that resolve to the kept file are left alone. If any move fails,
/// the moves already made for this group are reversed before the error is returned.
pub fn move_to_trash(group: &DuplicateGroup, keep: usize, root: &Path) -> Result<TrashLog> {
    let kept = group.images.get(keep).ok_or_else(|| {
        Error::Configuration(format!(
            "keep index {} out of range for group {} with {} images",
            keep,
            group.id,
            group.images.len()
        ))
    })?;
    let kept_identity = identity(&kept.path);

    let trash = trash_dir(root);
    fs::create_dir_all(&trash)?;

    let mut moved: Vec<TrashEntry> = Vec::with_capacity(group.images.len() - 1);
    for (index, image) in group.images.iter().enumerate() {
        if index == keep || identity(&image.path) == kept_identity {
            continue;
        }
        let dest = unique_destination(&trash, &image.path);
        if let Err(e) = move_file(&image.path, &dest) {
            roll_back(&moved);
            return Err(e);
        }
        log_fs_modification(
            "trash",
            &image.path,
            Some(&format!("group {} -> {}", group.id, dest.display())),
        );
        moved.push(TrashEntry {
            src: image.path.clone(),
            dest,
        });
    }

    Ok(TrashLog {
        group_id: group.id.clone(),
        kept: kept.path.clone(),
        moved,
    })
}

/// Canonical form of a path, or the path itself when it cannot be resolved
fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn roll_back(moved: &[TrashEntry]) {
    for entry in moved.iter().rev() {
        match move_file(&entry.dest, &entry.src) {
            Ok(()) => log_fs_modification("rollback", &entry.src, None),
            Err(e) => log_file_error(&entry.dest, "rollback", &e),
        }
    }
}

/// Move trashed files back. Entries whose trashed copy is gone are skipped.
pub fn restore(log: &TrashLog) -> Result<usize> {
    let mut restored = 0;
    for entry in &log.moved {
        if !entry.dest.is_file() {
            log_file_error(
                &entry.dest,
                "restore",
                &io::Error::new(io::ErrorKind::NotFound, "trashed file no longer exists"),
            );
            continue;
        }
        if let Some(parent) = entry.src.parent() {
            fs::create_dir_all(parent)?;
        }
        move_file(&entry.dest, &entry.src)?;
        log_fs_modification("restore", &entry.src, Some(&log.group_id));
        restored += 1;
    }
    Ok(restored)
}

/// `<trash>/<name>`, or `<trash>/<stem>_<n><.ext>` for the first free n
fn unique_destination(trash: &Path, src: &Path) -> PathBuf {
    let file_name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());
    let mut dest = trash.join(&file_name);

    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());
    let suffix = src
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    while dest.exists() {
        dest = trash.join(format!("{}_{}{}", stem, counter, suffix));
        counter += 1;
    }
    dest
}

/// Rename, falling back to copy and remove across filesystems
fn move_file(src: &Path, dest: &Path) -> Result<()> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    fs::copy(src, dest).map_err(|e| {
        log_file_error(src, "copy", &e);
        Error::Io(e)
    })?;
    fs::remove_file(src).map_err(|e| {
        log_file_error(src, "remove", &e);
        Error::Io(e)
    })?;
    Ok(())
}
