use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::deadline::DeadlineStream;
use super::http::{BoxStream, Transport, TransportResponse};
use crate::core::{Accumulator, apply_body_headers, negotiate};
use crate::data::{
    Outcome, Request, RequestParts, ResponseBuffer, ResponseStream, TransportOptions,
};
use crate::error::{Error, Result};
use crate::transform::DecompressStream;

/// Performs one request/response cycle per [`send`](Self::send) over a
/// [`Transport`].
///
/// The executor holds no per-request state, so one instance can serve any
/// number of concurrent sends.
#[derive(Debug, Clone)]
pub struct Executor<T: Transport> {
    transport: T,
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch `request` and settle it exactly once.
    ///
    /// Resolves with [`Outcome::Stream`] when the request asked for a stream,
    /// otherwise with [`Outcome::Buffered`] once the whole body has arrived.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidOption`] / [`Error::UnsupportedProtocol`] before any
    ///   transport call.
    /// - [`Error::Transport`] or [`Error::AbortedByPeer`] from the exchange.
    /// - [`Error::BufferLimitExceeded`] when a buffered body outgrows the limit.
    /// - [`Error::TimeoutExceeded`] when the request deadline passes.
    pub async fn send(&self, request: Request) -> Result<Outcome> {
        let parts = request.into_parts();
        let options = resolve_options(&parts)?;

        debug!(method = %options.method, url = %options.target(), "dispatching request");

        let result = match parts.timeout {
            Some(timeout) => self.send_with_deadline(options, &parts, timeout).await,
            None => self.exchange(options, &parts, None).await,
        };

        match &result {
            Ok(outcome) => debug!(status = outcome.status(), "request settled"),
            Err(e) if e.is_guard() => warn!(error = %e, "request failed"),
            Err(e) => debug!(error = %e, "request failed"),
        }
        result
    }

    async fn send_with_deadline(
        &self,
        options: TransportOptions,
        parts: &RequestParts,
        timeout: Duration,
    ) -> Result<Outcome> {
        let deadline = Instant::now() + timeout;
        tokio::time::timeout_at(deadline, self.exchange(options, parts, Some((deadline, timeout))))
            .await
            .map_err(|_| Error::TimeoutExceeded(timeout))?
    }

    async fn exchange(
        &self,
        options: TransportOptions,
        parts: &RequestParts,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<Outcome> {
        let TransportResponse { head, body } = self.transport.open(options).await?;
        trace!(status = head.status, "response head received");

        let body: BoxStream<'static, Result<Bytes>> = match negotiate(parts.compress, &head) {
            Some(encoding) => {
                debug!(%encoding, "decompressing response body");
                Box::pin(DecompressStream::new(body, encoding))
            }
            None => body,
        };

        if parts.stream {
            let body: BoxStream<'static, Result<Bytes>> = match deadline {
                Some((at, timeout)) => Box::pin(DeadlineStream::new(body, at, timeout)),
                None => body,
            };
            return Ok(Outcome::Stream(ResponseStream::new(head, body)));
        }

        let mut acc = Accumulator::new(parts.response.max_buffer);
        acc.start(head);
        let buffer = accumulate(&mut acc, body).await?;
        Ok(Outcome::Buffered(buffer))
    }
}

/// Drain `body` into the accumulator. Any failure drops the stream, which
/// aborts the transport.
async fn accumulate(
    acc: &mut Accumulator,
    mut body: BoxStream<'static, Result<Bytes>>,
) -> Result<ResponseBuffer> {
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                acc.fail();
                return Err(e);
            }
        };
        acc.push(&chunk)?;
        trace!(len = acc.len(), phase = %acc.phase(), "chunk buffered");
    }

    acc.finish().ok_or_else(|| {
        Error::transport(std::io::Error::other("response ended in a terminal phase"))
    })
}

/// Compute the transport options for a request: body headers first, then the
/// URL-derived defaults, then the raw overrides on top.
fn resolve_options(parts: &RequestParts) -> Result<TransportOptions> {
    let mut headers = parts.headers.clone();
    if let Some(body) = &parts.body {
        apply_body_headers(&mut headers, body);
    }

    let body = parts.body.as_ref().map(|b| b.bytes().clone());
    let mut options = TransportOptions::from_url(&parts.url, &parts.method, headers, body)?;
    for (name, value) in &parts.overrides {
        options.apply_override(name, value)?;
    }
    Ok(options)
}

#[cfg(feature = "reqwest")]
impl Executor<super::ReqwestTransport> {
    /// An executor over a reqwest client with default settings.
    pub fn with_reqwest() -> Result<Self> {
        Ok(Self::new(super::ReqwestTransport::new()?))
    }

    pub fn from_config(config: crate::config::ClientConfig) -> Result<Self> {
        Ok(Self::new(super::ReqwestTransport::from_config(config)?))
    }
}
