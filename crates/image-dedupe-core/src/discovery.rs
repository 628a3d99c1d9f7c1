use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::action::TRASH_DIR_NAME;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::ImageFormat;

/// Discover image files in the provided directories, sorted and without repeats
pub fn discover_images<P: AsRef<Path>>(directories: &[P], config: &Config) -> Result<Vec<PathBuf>> {
    // Convert to a collection of PathBufs first
    let roots: Vec<PathBuf> = directories
        .iter()
        .map(|dir| dir.as_ref().to_path_buf())
        .collect();

    let per_root: Vec<Result<Vec<PathBuf>>> = roots
        .par_iter()
        .map(|dir| discover_images_in_directory(dir, config))
        .collect();

    let mut image_paths = Vec::new();
    for result in per_root {
        image_paths.extend(result?);
    }
    image_paths.sort();
    image_paths.dedup();

    Ok(image_paths)
}

/// Discover images in a single directory
///
/// The root is canonicalized first so one file reached through two spellings
/// of a root (symlink, `.` or `..` components) yields one path.
fn discover_images_in_directory(directory: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(Error::FileNotFound(directory.to_path_buf()));
    }
    let directory = fs::canonicalize(directory).map_err(|e| Error::read(directory, e))?;

    let max_depth = config.max_depth.unwrap_or(usize::MAX);

    let image_paths = WalkDir::new(&directory)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| !is_trash_dir(entry))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| is_image_path(path))
        .collect();

    Ok(image_paths)
}

fn is_trash_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == TRASH_DIR_NAME
}

/// Get image format from file extension
fn get_image_format(path: &Path) -> Option<ImageFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(ImageFormat::from_extension)
}

/// Returns if the given path has an image extension
pub fn is_image_path(path: &Path) -> bool {
    match get_image_format(path) {
        Some(format) => format.is_supported(),
        None => false,
    }
}

// -- Tests --
