//! Line-filtered cryptographic hash computation.
//!
//! The digest of a trace file must stay stable when the stored hash itself
//! changes, so hashing walks the file line by line and skips every line
//! containing the hash field name. Streaming keeps memory flat even for
//! large traces.

use crate::error::{Result, ResultExt as _};
use crate::trace::TraceDocument;
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::{BufRead as _, BufReader};
use std::path::Path;

/// Lines containing this substring are excluded from the digest.
pub const HASH_FIELD: &str = "hash value";

/// Hash algorithm identifier used in reports.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Compute the SHA-256 hash of a trace file, excluding hash-field lines.
///
/// Lines are fed to the hasher in order including their trailing newline;
/// any line containing [`HASH_FIELD`] is skipped entirely.
///
/// # Errors
///
/// Returns error if the file can't be opened or read.
pub fn hash_from_trace(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        if bytes_read == 0 {
            break; // EOF
        }

        if !line.contains(HASH_FIELD) {
            hasher.update(line.as_bytes());
        }
    }

    let hash = hasher.finalize();
    Ok(format!("{hash:x}"))
}

/// Computes the file's digest and stores it in the trace's metainformation.
///
/// The trace is rewritten in place. Rewriting only touches the hash-field
/// line, which is excluded from the digest, so a later recomputation still
/// matches the stored value.
pub fn add_hash_to_trace(path: &Path) -> Result<()> {
    let mut trace = TraceDocument::load(path)?;
    trace.traceheader.metainformation.hash_value = hash_from_trace(path)?;
    trace.save(path)?;
    tracing::info!("Hash value added to {}", path.display());
    Ok(())
}
