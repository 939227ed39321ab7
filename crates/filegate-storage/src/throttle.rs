//! Bandwidth throttling for streamed downloads.
//!
//! [`ThrottledReader`] wraps any `AsyncRead` and releases bytes only after a
//! GCRA token bucket (`governor`) admits them. Bytes are first staged from the
//! inner reader, then held until the limiter is ready, so the caller never
//! sees more than `rate` bytes per second beyond the initial burst.

use std::future::Future;
use std::io::{self, SeekFrom};
use std::num::NonZeroU32;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};
use tokio_util::sync::CancellationToken;

type Admission = Pin<Box<dyn Future<Output = io::Result<()>> + Send>>;

pin_project! {
    /// An `AsyncRead` limited to a fixed byte rate.
    pub struct ThrottledReader<R> {
        #[pin]
        inner: R,
        limiter: Arc<DefaultDirectRateLimiter>,
        cancel: CancellationToken,
        max_chunk: usize,
        staged: Vec<u8>,
        pos: usize,
        admission: Option<Admission>,
    }
}

impl<R> ThrottledReader<R> {
    /// Limit `inner` to `bytes_per_second`, with a burst of the same size.
    pub fn new(inner: R, bytes_per_second: NonZeroU32, cancel: CancellationToken) -> Self {
        let quota = Quota::per_second(bytes_per_second).allow_burst(bytes_per_second);
        Self {
            inner,
            limiter: Arc::new(RateLimiter::direct(quota)),
            cancel,
            max_chunk: bytes_per_second.get() as usize,
            staged: Vec::new(),
            pos: 0,
            admission: None,
        }
    }

    /// Limit `inner` to `kib_per_second` KiB/s. `None` when the rate is zero
    /// (unlimited).
    pub fn kib_per_second(inner: R, kib_per_second: u64, cancel: CancellationToken) -> Option<Self> {
        let bytes = kib_per_second.saturating_mul(1024).min(u64::from(u32::MAX));
        let rate = NonZeroU32::new(bytes as u32)?;
        Some(Self::new(inner, rate, cancel))
    }

    /// Bytes read from the inner reader but not yet handed out.
    fn pending(&self) -> usize {
        self.staged.len() - self.pos
    }
}

impl<R> std::fmt::Debug for ThrottledReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottledReader")
            .field("max_chunk", &self.max_chunk)
            .field("pending", &self.pending())
            .finish()
    }
}

async fn admit(
    limiter: Arc<DefaultDirectRateLimiter>,
    cancel: CancellationToken,
    cells: NonZeroU32,
) -> io::Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => Err(io::Error::new(io::ErrorKind::Interrupted, "transfer cancelled")),
        admitted = limiter.until_n_ready(cells) => admitted.map_err(|e| io::Error::other(e.to_string())),
    }
}

impl<R: AsyncRead> AsyncRead for ThrottledReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut this = self.project();
        loop {
            if let Some(admission) = this.admission.as_mut() {
                let result = ready!(admission.as_mut().poll(cx));
                *this.admission = None;
                if let Err(e) = result {
                    this.staged.clear();
                    *this.pos = 0;
                    return Poll::Ready(Err(e));
                }
            }

            if *this.pos < this.staged.len() {
                let remaining = &this.staged[*this.pos..];
                let n = remaining.len().min(buf.remaining());
                buf.put_slice(&remaining[..n]);
                *this.pos += n;
                if *this.pos == this.staged.len() {
                    this.staged.clear();
                    *this.pos = 0;
                }
                return Poll::Ready(Ok(()));
            }

            if this.cancel.is_cancelled() {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "transfer cancelled",
                )));
            }

            let want = buf.remaining().min(*this.max_chunk);
            if want == 0 {
                return Poll::Ready(Ok(()));
            }

            this.staged.resize(want, 0);
            let read = {
                let mut staging = ReadBuf::new(&mut this.staged[..]);
                match this.inner.as_mut().poll_read(cx, &mut staging) {
                    Poll::Ready(Ok(())) => Ok(staging.filled().len()),
                    Poll::Ready(Err(e)) => Err(e),
                    Poll::Pending => {
                        this.staged.clear();
                        return Poll::Pending;
                    }
                }
            };
            let n = match read {
                Ok(n) => n,
                Err(e) => {
                    this.staged.clear();
                    return Poll::Ready(Err(e));
                }
            };
            this.staged.truncate(n);

            // EOF
            let Some(cells) = NonZeroU32::new(n as u32) else {
                return Poll::Ready(Ok(()));
            };
            *this.admission = Some(Box::pin(admit(
                Arc::clone(this.limiter),
                this.cancel.clone(),
                cells,
            )));
        }
    }
}

impl<R: AsyncSeek> AsyncSeek for ThrottledReader<R> {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        let this = self.project();
        let pending = (this.staged.len() - *this.pos) as i64;
        this.staged.clear();
        *this.pos = 0;
        *this.admission = None;
        // The inner cursor is ahead of the caller by the staged bytes.
        let position = match position {
            SeekFrom::Current(offset) => SeekFrom::Current(offset - pending),
            other => other,
        };
        this.inner.start_seek(position)
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        self.project().inner.poll_complete(cx)
    }
}
