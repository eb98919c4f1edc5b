//! Response models.
//!
//! A request resolves to an [`Outcome`]: either a [`ResponseBuffer`] holding
//! the whole body, or a [`ResponseStream`] the caller drains.
//!
//! ## Notes
//! - Header names are lower-cased. Repeated headers are joined with `", "`.
//! - `status_text` is the canonical reason phrase for the status code and may
//!   be `"Unknown"` for non-standard codes.

use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;
use serde::de::DeserializeOwned;

use crate::effects::BoxStream;
use crate::error::{Error, Result};

/// Status line and headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub status_text: String,

    /// Lower-cased header name to value.
    pub headers: BTreeMap<String, String>,
}

impl ResponseHead {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Add a header, joining repeated names with `", "`.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.append_header(name, value);
        self
    }

    pub fn append_header(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBuffer {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    /// Raw body bytes, after decompression when it was negotiated.
    pub body: Vec<u8>,
}

impl ResponseBuffer {
    /// Start an empty buffer for a response head.
    pub fn new(head: ResponseHead) -> Self {
        Self {
            status: head.status,
            status_text: head.status_text,
            headers: head.headers,
            body: Vec::new(),
        }
    }

    pub(crate) fn add_chunk(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::Decode)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A live response body.
///
/// Yields chunks after decompression when it was negotiated. Nothing is
/// buffered and no size limit applies; the caller owns consumption.
pub struct ResponseStream {
    head: ResponseHead,
    body: BoxStream<'static, Result<Bytes>>,
}

impl ResponseStream {
    pub(crate) fn new(head: ResponseHead, body: BoxStream<'static, Result<Bytes>>) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn status(&self) -> u16 {
        self.head.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    pub fn into_parts(self) -> (ResponseHead, BoxStream<'static, Result<Bytes>>) {
        (self.head, self.body)
    }
}

impl fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream")
            .field("head", &self.head)
            .field("body", &"{ ... }")
            .finish()
    }
}

impl Stream for ResponseStream {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().body.as_mut().poll_next(cx)
    }
}

/// The terminal success value of a request.
#[derive(Debug)]
pub enum Outcome {
    Buffered(ResponseBuffer),
    Stream(ResponseStream),
}

impl Outcome {
    pub fn into_buffered(self) -> Option<ResponseBuffer> {
        match self {
            Outcome::Buffered(buffer) => Some(buffer),
            Outcome::Stream(_) => None,
        }
    }

    pub fn into_stream(self) -> Option<ResponseStream> {
        match self {
            Outcome::Stream(stream) => Some(stream),
            Outcome::Buffered(_) => None,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Outcome::Buffered(buffer) => buffer.status,
            Outcome::Stream(stream) => stream.status(),
        }
    }
}
