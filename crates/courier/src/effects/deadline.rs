//! Request deadline enforcement for streamed bodies.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;
use tokio::time::{Instant, Sleep, sleep_until};
use tracing::warn;

use super::BoxStream;
use crate::error::{Error, Result};

/// A body stream bounded by the request deadline.
///
/// When the deadline passes before the inner stream ends, the inner stream is
/// dropped (aborting the transport), one [`Error::TimeoutExceeded`] is
/// yielded, and the stream ends.
pub struct DeadlineStream {
    inner: Option<BoxStream<'static, Result<Bytes>>>,
    sleep: Pin<Box<Sleep>>,
    timeout: Duration,
}

impl DeadlineStream {
    pub fn new(inner: BoxStream<'static, Result<Bytes>>, deadline: Instant, timeout: Duration) -> Self {
        Self {
            inner: Some(inner),
            sleep: Box::pin(sleep_until(deadline)),
            timeout,
        }
    }
}

impl Stream for DeadlineStream {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        if let Poll::Ready(item) = inner.as_mut().poll_next(cx) {
            if item.is_none() {
                this.inner = None;
            }
            return Poll::Ready(item);
        }

        match this.sleep.as_mut().poll(cx) {
            Poll::Ready(()) => {
                warn!(timeout = ?this.timeout, "stream deadline reached, aborting transport");
                this.inner = None;
                Poll::Ready(Some(Err(Error::TimeoutExceeded(this.timeout))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
