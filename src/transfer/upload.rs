use std::path::Path;

use tokio::io::BufReader;
use tracing::{debug, info, trace, warn};

use super::{validate_chunk_size, LineChunker, MAX_CHUNK_SIZE};
use crate::{
    client::AnaplanClient,
    connection::Connection,
    error::ApiError,
    http_utils::Transport,
    model::FileMetadata,
    table::{Table, TableOptions},
};

/// Outcome of a finished upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub file_id: String,
    /// Chunk count sent with the completion call
    pub chunk_count: usize,
}

impl<T: Transport> AnaplanClient<T> {
    /// Uploads a local file in line-aligned chunks of at most `chunk_size` bytes.
    ///
    /// The chunk size is checked before anything is sent. Chunks are PUT one
    /// at a time; the first failure stops the upload and is reported as
    /// [`ApiError::PartialTransfer`] carrying the number of chunks that made
    /// it. The completion call is only made when every chunk succeeded.
    pub async fn upload_file(
        &self,
        connection: &Connection,
        file_id: &str,
        path: impl AsRef<Path>,
        chunk_size: usize,
    ) -> Result<UploadSummary, ApiError> {
        let chunk_size = validate_chunk_size(chunk_size)?;
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        info!(
            "Uploading {} to file {} in chunks of up to {} bytes",
            path.display(),
            file_id,
            chunk_size
        );

        let mut chunker = LineChunker::new(BufReader::new(file), chunk_size);
        self.start_upload(connection, file_id).await?;

        let mut index = 0;
        loop {
            // a read failure leaves the server-side upload open, so report how far it got
            let chunk = match chunker.next_chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => return Err(partial_upload(file_id, index, e.into())),
            };
            self.put_chunk(connection, file_id, index, chunk)
                .await
                .map_err(|e| partial_upload(file_id, index, e))?;
            index += 1;
        }

        self.complete_upload(connection, file_id, index).await?;
        info!("File upload complete, {} chunk(s) uploaded", index);

        Ok(UploadSummary {
            file_id: file_id.to_string(),
            chunk_count: index,
        })
    }

    /// Uploads each buffer as one chunk, in order
    pub async fn upload_buffers<I>(
        &self,
        connection: &Connection,
        file_id: &str,
        buffers: I,
    ) -> Result<UploadSummary, ApiError>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut upload = StreamUpload::new(file_id);
        for buffer in buffers {
            upload.send_chunk(self, connection, buffer).await?;
        }
        upload.complete(self, connection).await
    }

    /// Uploads a table as CSV, `rows_per_chunk` rows per chunk.
    ///
    /// Only the first chunk carries the header row. A table without rows is
    /// still sent as one header-only chunk, so the server-side file keeps its
    /// columns and completes with a chunk count of 1.
    pub async fn upload_table(
        &self,
        connection: &Connection,
        file_id: &str,
        table: &Table,
        rows_per_chunk: usize,
        options: TableOptions,
    ) -> Result<UploadSummary, ApiError> {
        if rows_per_chunk == 0 {
            return Err(ApiError::InvalidChunkSize);
        }

        let mut upload = StreamUpload::new(file_id);
        let mut start = 0;
        loop {
            let end = (start + rows_per_chunk).min(table.len());
            let payload = table.to_csv(start..end, start == 0, options)?;
            upload.send_chunk(self, connection, payload).await?;
            start = end;
            if start >= table.len() {
                break;
            }
        }
        upload.complete(self, connection).await
    }

    async fn start_upload(&self, connection: &Connection, file_id: &str) -> Result<(), ApiError> {
        let url = self.model_url(connection, &format!("/files/{}", file_id));
        let metadata = FileMetadata {
            id: file_id.to_string(),
            chunk_count: -1,
        };
        debug!("Announcing upload start for file {}", file_id);
        let response = self.post_json(connection.token(), &url, &metadata).await?;
        if !response.is_success() {
            warn!(
                "Upload start for file {} rejected with status {}",
                file_id, response.status
            );
        }
        response.error_for_status()?;
        Ok(())
    }

    async fn put_chunk(
        &self,
        connection: &Connection,
        file_id: &str,
        index: usize,
        payload: Vec<u8>,
    ) -> Result<(), ApiError> {
        let url = self.model_url(connection, &format!("/files/{}/chunks/{}", file_id, index));
        let size = payload.len();
        let response = self.put_bytes(connection.token(), &url, payload).await?;
        debug!(
            "Uploading chunk {} ({} bytes), status: {}",
            index + 1,
            size,
            response.status
        );
        response.error_for_status()?;
        Ok(())
    }

    async fn complete_upload(
        &self,
        connection: &Connection,
        file_id: &str,
        chunk_count: usize,
    ) -> Result<(), ApiError> {
        let url = self.model_url(connection, &format!("/files/{}/complete", file_id));
        let metadata = FileMetadata {
            id: file_id.to_string(),
            chunk_count: chunk_count as i64,
        };
        trace!("Completing upload of file {} with {} chunk(s)", file_id, chunk_count);
        self.post_json(connection.token(), &url, &metadata)
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn partial_upload(file_id: &str, index: usize, cause: ApiError) -> ApiError {
    warn!("Chunk {} of file {} failed: {}", index, file_id, cause);
    ApiError::PartialTransfer {
        file_id: file_id.to_string(),
        completed: index,
        failed_chunk: index,
        reason: cause.to_string(),
    }
}

/// An upload fed one buffer at a time.
///
/// The session owns the chunk counter, so independent uploads never share
/// state. The first chunk opens the upload on the server; [`complete`]
/// closes it with the number of chunks sent. A failed chunk closes the
/// session for good.
///
/// [`complete`]: StreamUpload::complete
#[derive(Debug)]
pub struct StreamUpload {
    file_id: String,
    next_chunk_index: usize,
    started: bool,
    closed: bool,
}

impl StreamUpload {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            next_chunk_index: 0,
            started: false,
            closed: false,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn chunks_sent(&self) -> usize {
        self.next_chunk_index
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Sends one chunk and returns its index.
    ///
    /// Buffers above 50 MiB are refused without touching the network.
    pub async fn send_chunk<T: Transport>(
        &mut self,
        client: &AnaplanClient<T>,
        connection: &Connection,
        payload: Vec<u8>,
    ) -> Result<usize, ApiError> {
        if self.closed {
            return Err(ApiError::SessionClosed {
                file_id: self.file_id.clone(),
            });
        }
        if payload.len() > MAX_CHUNK_SIZE {
            return Err(ApiError::ChunkTooLarge {
                size: payload.len(),
                limit: MAX_CHUNK_SIZE,
            });
        }

        self.ensure_started(client, connection).await?;

        let index = self.next_chunk_index;
        if let Err(e) = client
            .put_chunk(connection, &self.file_id, index, payload)
            .await
        {
            self.closed = true;
            return Err(partial_upload(&self.file_id, index, e));
        }
        self.next_chunk_index += 1;
        Ok(index)
    }

    /// Closes the upload with the number of chunks sent so far
    pub async fn complete<T: Transport>(
        mut self,
        client: &AnaplanClient<T>,
        connection: &Connection,
    ) -> Result<UploadSummary, ApiError> {
        if self.closed {
            return Err(ApiError::SessionClosed {
                file_id: self.file_id.clone(),
            });
        }
        self.ensure_started(client, connection).await?;
        client
            .complete_upload(connection, &self.file_id, self.next_chunk_index)
            .await?;
        info!(
            "Upload complete, {} chunk(s) uploaded to file {}",
            self.next_chunk_index, self.file_id
        );

        Ok(UploadSummary {
            file_id: self.file_id,
            chunk_count: self.next_chunk_index,
        })
    }

    async fn ensure_started<T: Transport>(
        &mut self,
        client: &AnaplanClient<T>,
        connection: &Connection,
    ) -> Result<(), ApiError> {
        if self.started {
            return Ok(());
        }
        if let Err(e) = client.start_upload(connection, &self.file_id).await {
            self.closed = true;
            return Err(e);
        }
        self.started = true;
        Ok(())
    }
}
