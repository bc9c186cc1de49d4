//! File content equality predicate.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// Chunk size for content comparison. Large enough to avoid many small
/// reads, small enough to bound memory per comparison.
pub const COMPARE_CHUNK_SIZE: usize = 1024 * 1024;

/// Compare two files for byte equality, cheapest check first: differing
/// lengths settle it without touching content.
///
/// Purely a predicate; both handles are released before returning on every
/// path, including errors. Errors are returned to the caller, which decides
/// what a half-visible file means for the current cycle.
pub fn files_equal(source: &Path, replica: &Path) -> io::Result<bool> {
    let source_len = fs::metadata(source)?.len();
    let replica_len = fs::metadata(replica)?.len();
    if source_len != replica_len {
        return Ok(false);
    }

    contents_equal(File::open(source)?, File::open(replica)?)
}

/// Compare two streams chunk by chunk until a mismatch or simultaneous EOF.
fn contents_equal(mut source: impl Read, mut replica: impl Read) -> io::Result<bool> {
    let mut source_buf = vec![0u8; COMPARE_CHUNK_SIZE];
    let mut replica_buf = vec![0u8; COMPARE_CHUNK_SIZE];

    loop {
        let source_read = read_chunk(&mut source, &mut source_buf)?;
        let replica_read = read_chunk(&mut replica, &mut replica_buf)?;

        if source_read != replica_read {
            return Ok(false);
        }
        if source_read == 0 {
            return Ok(true);
        }
        if source_buf[..source_read] != replica_buf[..replica_read] {
            return Ok(false);
        }
    }
}

/// Fill as much of `buf` as the stream will give; a zero return is EOF.
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
