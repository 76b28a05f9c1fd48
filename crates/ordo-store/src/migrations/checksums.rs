//! SHA256 checksums of migration SQL, stored at apply time and re-checked
//! on every open

use sha2::{Digest, Sha256};

pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
