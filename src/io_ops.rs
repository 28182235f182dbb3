//! read, write, read_stream, write_stream.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::permission::Op;
use crate::service::{Caller, Filesystem};
use crate::{Error, Result, MAX_READ_SIZE};

impl Filesystem {
    /// Read up to `size` bytes (capped at [`MAX_READ_SIZE`]) starting at
    /// `offset`. Offsets at or past EOF return an empty buffer.
    pub async fn read(&self, ino: u64, offset: u64, size: u64, caller: &Caller) -> Result<Vec<u8>> {
        let file = self.require_file(ino).await?;
        Self::check(&file, Op::Read, caller)?;
        let path = self.path_of(ino).await?;
        self.backing.read(&path, offset, size.min(MAX_READ_SIZE)).await
    }

    /// Write `bytes` at `offset`, without truncating the file first.
    /// Returns the number of bytes written.
    pub async fn write(&self, ino: u64, offset: u64, bytes: &[u8], caller: &Caller) -> Result<u64> {
        let file = self.require_file(ino).await?;
        Self::check(&file, Op::Write, caller)?;
        let path = self.path_of(ino).await?;
        let written = self.backing.write(&path, offset, bytes).await?;
        self.maybe_signup_side_effect(&path).await?;
        Ok(written)
    }

    /// Stream `ino`'s contents as a chunked body, for `axum::body::Body`.
    pub async fn read_stream(&self, ino: u64, caller: &Caller) -> Result<ReaderStream<tokio::fs::File>> {
        let file = self.require_file(ino).await?;
        Self::check(&file, Op::Read, caller)?;
        let path = self.path_of(ino).await?;
        let handle = self.backing.open_read_write(&path).await?;
        Ok(ReaderStream::new(handle))
    }

    /// Consume an incoming byte stream in fixed-size chunks and write it to
    /// `ino` starting at offset 0. Returns the total bytes written.
    pub async fn write_stream(
        &self,
        ino: u64,
        mut chunks: impl Stream<Item = std::io::Result<Bytes>> + Unpin,
        caller: &Caller,
    ) -> Result<u64> {
        let file = self.require_file(ino).await?;
        Self::check(&file, Op::Write, caller)?;
        let path = self.path_of(ino).await?;
        let mut handle = self.backing.open_read_write(&path).await?;
        handle.seek(std::io::SeekFrom::Start(0)).await.map_err(Error::from_io)?;

        let mut total = 0u64;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(Error::from_io)?;
            handle.write_all(&chunk).await.map_err(Error::from_io)?;
            total += chunk.len() as u64;
        }
        handle.flush().await.map_err(Error::from_io)?;
        self.maybe_signup_side_effect(&path).await?;
        Ok(total)
    }

    /// Read the whole file at `path` for the reserved-file side channel to
    /// inspect after a write. A no-op for anything that isn't a reserved
    /// path — callers check that first.
    async fn reread(&self, path: &str) -> Result<Vec<u8>> {
        let mut handle = self.backing.open_read_write(path).await?;
        let mut buf = Vec::new();
        handle.read_to_end(&mut buf).await.map_err(Error::from_io)?;
        Ok(buf)
    }

    async fn maybe_signup_side_effect(&self, path: &str) -> Result<()> {
        use crate::signup::ReservedFile;
        let Some(reserved) = ReservedFile::classify(path) else { return Ok(()) };
        let contents = self.reread(path).await?;
        self.run_signup_side_effect(reserved, &contents).await
    }
}
