use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A deterministic picture; different seeds give visually unrelated images
pub fn pattern(width: u32, height: u32, seed: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let fx = x * 256 / width.max(1);
        let fy = y * 256 / height.max(1);
        match seed % 3 {
            0 => Rgb([fx as u8, fy as u8, 128]),
            1 => Rgb([(255 - fy) as u8, fx as u8, (fx ^ fy) as u8]),
            _ => {
                let band = ((fx / 32) + (fy / 64)) % 2 == 0;
                if band {
                    Rgb([250, 250, 250])
                } else {
                    Rgb([5, 5, 5])
                }
            }
        }
    })
}

/// Save `img` under `dir/name` in the given format
pub fn write_image(dir: &Path, name: &str, img: &RgbImage, format: ImageFormat) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    img.save_with_format(&path, format).unwrap();
    path
}

pub fn write_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    write_image(dir, name, img, ImageFormat::Png)
}

/// Byte-for-byte copy of an existing file
pub fn copy_file(src: &Path, dir: &Path, name: &str) -> PathBuf {
    let dest = dir.join(name);
    fs::copy(src, &dest).unwrap();
    dest
}

/// A file with an image extension that is not an image
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(b"DUMMY IMAGE DATA").unwrap();
    path
}

/// Set a file's modification time to `secs` after the epoch
pub fn set_mtime(path: &Path, secs: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}
