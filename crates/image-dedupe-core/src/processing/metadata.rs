use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::FileRecord;

/// Read size, modification time and pixel dimensions of one image.
///
/// Only the image header is decoded. Fails with [`Error::Read`] when the file
/// cannot be opened and [`Error::Decode`] when the header is not a known image.
pub fn read_file_record(path: &Path) -> Result<FileRecord> {
    let metadata = fs::metadata(path).map_err(|e| Error::read(path, e))?;
    if !metadata.is_file() {
        return Err(Error::read(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    let size = metadata.len();
    let modified = metadata.modified().map_err(|e| Error::read(path, e))?;
    let (width, height) = image_dimensions(path)?;

    Ok(FileRecord::new(
        path.to_path_buf(),
        size,
        width,
        height,
        modified,
    ))
}

fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    let reader = image::io::Reader::open(path)
        .map_err(|e| Error::read(path, e))?
        .with_guessed_format()
        .map_err(|e| Error::read(path, e))?;

    reader.into_dimensions().map_err(|e| match e {
        image::ImageError::IoError(io_err) => Error::read(path, io_err),
        other => Error::decode(path, other),
    })
}
