/// Exact content fingerprints
use crate::error::{Error, Result};
use blake3::Hash as Blake3Hash;

use std::{fs::File, io::Read, path::Path};

/// Length of the digest prefix used as an exact group id
pub const DIGEST_ID_LEN: usize = 12;

/// Compute the cryptographic hash of a file using the Blake3 algorithm
pub fn compute_cryptographic<P: AsRef<Path>>(path: P) -> Result<Blake3Hash> {
    let path = path.as_ref();

    // Open the file with explicit scope to ensure it's closed promptly
    let hash = {
        let mut file = File::open(path).map_err(|e| Error::read(path, e))?;
        let mut hasher = blake3::Hasher::new();

        let mut buffer = [0; 8192]; // 8KB buffer
        loop {
            let bytes_read = file.read(&mut buffer).map_err(|e| Error::read(path, e))?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        hasher.finalize()
    };

    Ok(hash)
}

/// Digest of the file content as a 64 character lowercase hex string
pub fn exact_digest<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(compute_cryptographic(path)?.to_hex().to_string())
}
