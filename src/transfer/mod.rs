//! Chunked file transfer.
//!
//! Model files are stored on the server as an ordered list of chunks. Uploads
//! announce an open upload (`chunkCount = -1`), PUT chunks `0..n` one at a
//! time and then close the upload with the final count. Downloads read the
//! chunk count from the file listing and GET the chunks in order.

mod chunker;
mod download;
mod upload;

pub use chunker::LineChunker;
pub use download::{ChunkSink, DownloadSummary, FileSink, TableSink};
pub use upload::{StreamUpload, UploadSummary};

use crate::error::ApiError;

pub const MIB: usize = 1024 * 1024;

/// Hard cap the server accepts for a single chunk
pub const MAX_CHUNK_SIZE: usize = 50 * MIB;

pub const DEFAULT_CHUNK_SIZE: usize = 10 * MIB;

/// Checks a requested chunk size against the hard cap
pub fn validate_chunk_size(chunk_size: usize) -> Result<usize, ApiError> {
    if chunk_size == 0 {
        return Err(ApiError::InvalidChunkSize);
    }
    if chunk_size > MAX_CHUNK_SIZE {
        return Err(ApiError::ChunkTooLarge {
            size: chunk_size,
            limit: MAX_CHUNK_SIZE,
        });
    }
    Ok(chunk_size)
}
