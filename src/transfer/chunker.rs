use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Groups whole lines into chunks of at most `limit` bytes.
///
/// Lines keep their terminators, so concatenating the chunks reproduces the
/// input byte for byte. A single line longer than `limit` is the only thing
/// ever cut, at exactly `limit` bytes.
pub struct LineChunker<R> {
    reader: R,
    limit: usize,
    pending: Vec<u8>,
    finished: bool,
}

impl<R: AsyncBufRead + Unpin> LineChunker<R> {
    pub fn new(reader: R, limit: usize) -> Self {
        Self {
            reader,
            limit: limit.max(1),
            pending: Vec::new(),
            finished: false,
        }
    }

    /// Reads the next chunk. Returns `None` once the input is exhausted.
    pub async fn next_chunk(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let mut chunk = Vec::new();

        loop {
            if self.pending.is_empty() {
                if self.finished {
                    break;
                }
                let read = self.reader.read_until(b'\n', &mut self.pending).await?;
                if read == 0 {
                    self.finished = true;
                    break;
                }
            }

            if self.pending.len() > self.limit {
                // oversized line
                if !chunk.is_empty() {
                    return Ok(Some(chunk));
                }
                let rest = self.pending.split_off(self.limit);
                let head = std::mem::replace(&mut self.pending, rest);
                return Ok(Some(head));
            }

            if chunk.len() + self.pending.len() > self.limit {
                return Ok(Some(chunk));
            }

            chunk.append(&mut self.pending);
        }

        if chunk.is_empty() {
            Ok(None)
        } else {
            Ok(Some(chunk))
        }
    }
}
