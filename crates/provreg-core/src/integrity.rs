//! Streaming SHA-256 of on-disk artifacts.

use std::path::{Path, PathBuf};

use provreg_schema::{ChecksumList, Sha256Digest};
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

const READ_BUF_SIZE: usize = 64 * 1024;

/// Errors produced while hashing an artifact.
#[derive(thiserror::Error, Debug)]
pub enum IntegrityError {
    /// The file could not be opened or read to the end.
    #[error("Artifact unreadable: {}", path.display())]
    Unreadable {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Hash a file without loading it into memory.
///
/// The file handle is dropped on every return path.
pub async fn sha256_file(path: &Path) -> Result<Sha256Digest, IntegrityError> {
    let unreadable = |source| IntegrityError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).await.map_err(unreadable)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_BUF_SIZE];

    loop {
        let n = file.read(&mut buf).await.map_err(unreadable)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let bytes: [u8; 32] = hasher.finalize().into();
    Ok(Sha256Digest::from_bytes(&bytes))
}

/// Outcome of comparing a computed digest with a published checksum list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumCheck {
    /// The list carries the same digest for the file.
    Match,
    /// The list carries a different digest for the file.
    Mismatch {
        /// Digest found in the list.
        listed: Sha256Digest,
    },
    /// The file does not appear in the list.
    NotListed,
}

/// Compare `digest` with the entry for `filename` in `list`.
pub fn cross_check(list: &ChecksumList, filename: &str, digest: &Sha256Digest) -> ChecksumCheck {
    match list.digest_for(filename) {
        Some(listed) if listed == digest => ChecksumCheck::Match,
        Some(listed) => ChecksumCheck::Mismatch {
            listed: listed.clone(),
        },
        None => ChecksumCheck::NotListed,
    }
}
