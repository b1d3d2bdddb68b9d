//! Bounded streaming reads over resolved media files.
//!
//! A [`FileSlice`] is an open file plus a byte range; it yields the range's
//! bytes as a chunked stream suitable for an HTTP response body. The stream
//! owns the file handle, so dropping the response mid-transfer (client
//! disconnect) closes the file and stops all reads immediately.

use std::io::SeekFrom;
use std::path::Path;

use bytes::Bytes;
use futures::{Stream, stream};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::warn;

use crate::range::ByteRange;

/// Errors from opening a file slice.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to open media file: {0}")]
    Open(#[source] std::io::Error),

    #[error("failed to seek to range start: {0}")]
    Seek(#[source] std::io::Error),
}

/// An open file positioned at the start of a byte range.
pub struct FileSlice {
    file: File,
    remaining: u64,
    buffer_size: usize,
}

impl FileSlice {
    /// Opens `path` and seeks to the start of `range`.
    ///
    /// The caller has already validated the range against the file's size;
    /// a file that shrank in between surfaces as a short read, which
    /// terminates the stream with an error.
    ///
    /// # Errors
    ///
    /// - `StreamError::Open` - the file could not be opened
    /// - `StreamError::Seek` - seeking to the range start failed
    pub async fn open(
        path: &Path,
        range: ByteRange,
        buffer_size: usize,
    ) -> Result<Self, StreamError> {
        let mut file = File::open(path).await.map_err(StreamError::Open)?;
        file.seek(SeekFrom::Start(range.start))
            .await
            .map_err(StreamError::Seek)?;

        Ok(Self {
            file,
            remaining: range.content_length(),
            buffer_size,
        })
    }

    /// Converts the slice into a chunked byte stream of exactly the range's
    /// length.
    ///
    /// Each item is one buffered read; an I/O failure or premature EOF ends
    /// the stream with the error as its final item.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        stream::unfold(self, |mut slice| async move {
            if slice.remaining == 0 {
                return None;
            }

            let read_len = (slice.buffer_size as u64).min(slice.remaining) as usize;
            let mut buffer = vec![0u8; read_len];

            match slice.file.read(&mut buffer).await {
                Ok(0) => {
                    warn!("file ended with {} bytes of the range unserved", slice.remaining);
                    slice.remaining = 0;
                    Some((
                        Err(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "file ended before range was fully served",
                        )),
                        slice,
                    ))
                }
                Ok(n) => {
                    buffer.truncate(n);
                    slice.remaining -= n as u64;
                    Some((Ok(Bytes::from(buffer)), slice))
                }
                Err(e) => {
                    warn!("read failed mid-stream: {e}");
                    slice.remaining = 0;
                    Some((Err(e), slice))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use tempfile::NamedTempFile;

    use super::*;

    async fn collect(slice: FileSlice) -> Vec<u8> {
        let mut out = Vec::new();
        let mut stream = Box::pin(slice.into_stream());
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    fn fixture(len: usize) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        std::fs::write(file.path(), &data).unwrap();
        file
    }

    #[tokio::test]
    async fn test_serves_exact_range() {
        let file = fixture(1000);
        let range = ByteRange { start: 10, end: 19 };

        let slice = FileSlice::open(file.path(), range, 4).await.unwrap();
        let bytes = collect(slice).await;

        assert_eq!(bytes.len(), 10);
        let expected: Vec<u8> = (10..20u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(bytes, expected);
    }

    #[tokio::test]
    async fn test_chunking_respects_buffer_size() {
        let file = fixture(100);
        let range = ByteRange { start: 0, end: 99 };

        let slice = FileSlice::open(file.path(), range, 32).await.unwrap();
        let mut stream = Box::pin(slice.into_stream());

        let mut sizes = Vec::new();
        while let Some(chunk) = stream.next().await {
            sizes.push(chunk.unwrap().len());
        }
        assert_eq!(sizes, vec![32, 32, 32, 4]);
    }

    #[tokio::test]
    async fn test_tail_range_single_byte() {
        let file = fixture(100);
        let range = ByteRange { start: 99, end: 99 };

        let slice = FileSlice::open(file.path(), range, 65536).await.unwrap();
        let bytes = collect(slice).await;
        assert_eq!(bytes, vec![99 % 251]);
    }

    #[tokio::test]
    async fn test_shrunken_file_surfaces_error() {
        let file = fixture(100);
        // Range validated against a stale larger size
        let range = ByteRange { start: 50, end: 149 };

        let slice = FileSlice::open(file.path(), range, 64).await.unwrap();
        let mut stream = Box::pin(slice.into_stream());

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 50);
        let second = stream.next().await.unwrap();
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_fails_open() {
        let range = ByteRange { start: 0, end: 0 };
        let result = FileSlice::open(Path::new("/nonexistent/file.mp4"), range, 64).await;
        assert!(matches!(result, Err(StreamError::Open(_))));
    }
}
