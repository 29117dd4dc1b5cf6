//! Stream wrapper that removes its backing file once the stream is gone

use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info};

/// Owns a downloaded file for the lifetime of a response body.
///
/// The file is deleted when the wrapper is dropped: after the last chunk
/// has been sent, when the client disconnects, or when the body errors.
pub struct DeleteOnDrop<S> {
    inner: Option<S>,
    path: PathBuf,
}

impl<S> DeleteOnDrop<S> {
    pub fn new(inner: S, path: PathBuf) -> Self {
        Self {
            inner: Some(inner),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeleteOnDrop<ReaderStream<File>> {
    /// Open `path` and stream its bytes, deleting it afterwards.
    ///
    /// If opening fails the file is left for the janitor.
    pub async fn open(path: PathBuf) -> std::io::Result<Self> {
        let file = File::open(&path).await?;
        Ok(Self::new(ReaderStream::new(file), path))
    }
}

impl<S> Stream for DeleteOnDrop<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut() {
            Some(inner) => Pin::new(inner).poll_next(cx),
            None => Poll::Ready(None),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(inner) => inner.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl<S> Drop for DeleteOnDrop<S> {
    fn drop(&mut self) {
        // Release the open handle before unlinking.
        drop(self.inner.take());

        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("Successfully removed temporary file: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Temporary file already gone: {}", self.path.display())
            }
            Err(e) => error!("Error removing file {}: {}", self.path.display(), e),
        }
    }
}
