use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{
    client::AnaplanClient,
    connection::Connection,
    error::ApiError,
    http_utils::Transport,
    model::FileResource,
    table::{Table, TableOptions},
};

/// Destination for downloaded chunks, fed in index order
#[async_trait]
pub trait ChunkSink: Send {
    async fn accept(&mut self, index: usize, payload: Vec<u8>) -> Result<(), ApiError>;

    /// Called once after the last chunk
    async fn finish(&mut self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Writes chunk payloads back to back into any async writer
pub struct FileSink<W> {
    writer: W,
    bytes_written: u64,
}

impl<W: AsyncWrite + Unpin + Send> FileSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ChunkSink for FileSink<W> {
    async fn accept(&mut self, _index: usize, payload: Vec<u8>) -> Result<(), ApiError> {
        self.writer.write_all(&payload).await?;
        self.bytes_written += payload.len() as u64;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), ApiError> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Accumulates CSV chunks into a [`Table`].
///
/// Chunk 0 supplies the header row; every later chunk is parsed headerless
/// against those columns.
pub struct TableSink {
    options: TableOptions,
    table: Option<Table>,
}

impl TableSink {
    pub fn new(options: TableOptions) -> Self {
        Self {
            options,
            table: None,
        }
    }

    /// The accumulated table, empty if no chunk arrived
    pub fn into_table(self) -> Table {
        self.table.unwrap_or_default()
    }
}

#[async_trait]
impl ChunkSink for TableSink {
    async fn accept(&mut self, index: usize, payload: Vec<u8>) -> Result<(), ApiError> {
        match self.table.as_mut() {
            None => {
                let table = Table::parse_with_header(&payload, self.options)?;
                debug!(
                    "Chunk {} defines {} column(s), {} row(s)",
                    index,
                    table.columns().len(),
                    table.len()
                );
                self.table = Some(table);
            }
            Some(table) => {
                let added = table.append_headerless(&payload, self.options)?;
                debug!("Chunk {} added {} row(s)", index, added);
            }
        }
        Ok(())
    }
}

/// Outcome of a finished download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub file_id: String,
    pub name: String,
    pub chunk_count: usize,
    pub bytes: u64,
    /// Set when the download was written to disk
    pub path: Option<PathBuf>,
}

impl<T: Transport> AnaplanClient<T> {
    /// Fetches every chunk of a file in order and hands it to `sink`.
    ///
    /// A failed chunk stops the download with [`ApiError::PartialTransfer`];
    /// whatever the sink already received is left in place.
    pub async fn download<S: ChunkSink>(
        &self,
        connection: &Connection,
        file_id: &str,
        sink: &mut S,
    ) -> Result<DownloadSummary, ApiError> {
        let file = self.file_details(connection, file_id).await?;
        self.fetch_chunks(connection, file, sink).await
    }

    async fn fetch_chunks<S: ChunkSink>(
        &self,
        connection: &Connection,
        file: FileResource,
        sink: &mut S,
    ) -> Result<DownloadSummary, ApiError> {
        let file_id = file.id.as_str();
        if file.chunk_count < 0 {
            return Err(ApiError::Protocol(format!(
                "file {} has an upload in progress",
                file_id
            )));
        }
        let chunk_count = file.chunk_count as usize;
        info!(
            "Fetching file {} ({}) in {} chunk(s)...",
            file_id, file.name, chunk_count
        );

        let mut bytes = 0u64;
        for index in 0..chunk_count {
            let url = self.model_url(connection, &format!("/files/{}/chunks/{}", file_id, index));
            let response = self.get(connection.token(), &url).await.map_err(|e| {
                partial_download(file_id, index, e.to_string())
            })?;
            if !response.is_success() {
                return Err(partial_download(
                    file_id,
                    index,
                    format!("status {}: {}", response.status, response.text().trim()),
                ));
            }
            debug!("Fetched chunk {} ({} bytes)", index, response.body.len());
            bytes += response.body.len() as u64;
            sink.accept(index, response.body).await?;
        }
        sink.finish().await?;

        Ok(DownloadSummary {
            file_id: file_id.to_string(),
            name: file.name.clone(),
            chunk_count,
            bytes,
            path: None,
        })
    }

    /// Downloads a file into `directory`, under the file's server-side name
    pub async fn download_to_dir(
        &self,
        connection: &Connection,
        file_id: &str,
        directory: impl AsRef<Path>,
    ) -> Result<DownloadSummary, ApiError> {
        let file = self.file_details(connection, file_id).await?;
        let path = directory.as_ref().join(&file.name);
        let output = tokio::fs::File::create(&path).await?;
        let mut sink = FileSink::new(output);

        let mut summary = self.fetch_chunks(connection, file, &mut sink).await?;
        info!("File successfully downloaded to {}", path.display());
        summary.path = Some(path);
        Ok(summary)
    }

    /// Downloads a CSV file into a [`Table`], preserving row order
    pub async fn download_table(
        &self,
        connection: &Connection,
        file_id: &str,
        options: TableOptions,
    ) -> Result<Table, ApiError> {
        let mut sink = TableSink::new(options);
        self.download(connection, file_id, &mut sink).await?;
        Ok(sink.into_table())
    }
}

fn partial_download(file_id: &str, index: usize, reason: String) -> ApiError {
    warn!("There was a problem fetching chunk {} of file {}: {}", index, file_id, reason);
    ApiError::PartialTransfer {
        file_id: file_id.to_string(),
        completed: index,
        failed_chunk: index,
        reason,
    }
}
