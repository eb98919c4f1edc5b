//! Stream decompression of response bodies.
//!
//! Decoders are push-style: each compressed chunk is written in and whatever
//! plain bytes are ready come out, so a body never has to be held whole.

use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use flate2::write::{GzDecoder, ZlibDecoder};
use futures_util::Stream;

use crate::data::ContentEncoding;
use crate::error::{Error, Result};

/// Stream transform trait for decompression.
pub trait StreamTransform: Send {
    /// Feed one chunk of input, returning any output it produced.
    fn transform(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Signal end of input, returning any trailing output.
    fn finish(&mut self) -> Result<Vec<u8>>;
}

/// Gzip decompressor.
pub struct GzipDecoder {
    inner: GzDecoder<Vec<u8>>,
}

impl GzipDecoder {
    pub fn new() -> Self {
        Self {
            inner: GzDecoder::new(Vec::new()),
        }
    }
}

impl Default for GzipDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTransform for GzipDecoder {
    fn transform(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.inner.write_all(input).map_err(gzip_error)?;
        Ok(std::mem::take(self.inner.get_mut()))
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        self.inner.try_finish().map_err(gzip_error)?;
        Ok(std::mem::take(self.inner.get_mut()))
    }
}

/// Deflate decompressor. HTTP `deflate` is the zlib-wrapped format.
pub struct DeflateDecoder {
    inner: ZlibDecoder<Vec<u8>>,
}

impl DeflateDecoder {
    pub fn new() -> Self {
        Self {
            inner: ZlibDecoder::new(Vec::new()),
        }
    }
}

impl Default for DeflateDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTransform for DeflateDecoder {
    fn transform(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.inner.write_all(input).map_err(deflate_error)?;
        Ok(std::mem::take(self.inner.get_mut()))
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        self.inner.try_finish().map_err(deflate_error)?;
        Ok(std::mem::take(self.inner.get_mut()))
    }
}

fn gzip_error(source: io::Error) -> Error {
    Error::Decompression {
        encoding: ContentEncoding::Gzip,
        source,
    }
}

fn deflate_error(source: io::Error) -> Error {
    Error::Decompression {
        encoding: ContentEncoding::Deflate,
        source,
    }
}

/// Build the decoder for a content coding.
pub fn decoder_for(encoding: ContentEncoding) -> Box<dyn StreamTransform> {
    match encoding {
        ContentEncoding::Gzip => Box::new(GzipDecoder::new()),
        ContentEncoding::Deflate => Box::new(DeflateDecoder::new()),
    }
}

/// A stream that decompresses the chunks of an inner body stream.
///
/// Empty decoder output is skipped. The first error, from either the inner
/// stream or the decoder, is yielded and ends the stream.
pub struct DecompressStream<S> {
    inner: S,
    decoder: Box<dyn StreamTransform>,
    done: bool,
}

impl<S> DecompressStream<S>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    pub fn new(inner: S, encoding: ContentEncoding) -> Self {
        Self::with_decoder(inner, decoder_for(encoding))
    }

    pub fn with_decoder(inner: S, decoder: Box<dyn StreamTransform>) -> Self {
        Self {
            inner,
            decoder,
            done: false,
        }
    }
}

impl<S> Stream for DecompressStream<S>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => match this.decoder.transform(&chunk) {
                    Ok(out) if out.is_empty() => continue,
                    Ok(out) => return Poll::Ready(Some(Ok(Bytes::from(out)))),
                    Err(e) => {
                        this.done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    return match this.decoder.finish() {
                        Ok(out) if out.is_empty() => Poll::Ready(None),
                        Ok(out) => Poll::Ready(Some(Ok(Bytes::from(out)))),
                        Err(e) => Poll::Ready(Some(Err(e))),
                    };
                }
            }
        }
    }
}
