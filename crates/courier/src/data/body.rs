use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Caller-supplied request payload, before encoding.
///
/// The variant is what drives encoding inference: a structured value is sent
/// as JSON unless the caller asks for a form, while text and raw bytes are
/// sent unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyData {
    /// A structured value (object, array, number, ...).
    Structured(Value),
    /// Text that is already in its wire form.
    Text(String),
    /// Raw bytes that are already in their wire form.
    Bytes(Bytes),
}

impl BodyData {
    /// Convert any serializable value into a structured payload.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Structured)
            .map_err(Error::Encode)
    }
}

impl From<Value> for BodyData {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<String> for BodyData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for BodyData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for BodyData {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for BodyData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for BodyData {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes))
    }
}

/// Explicit encoding hint for [`Request::body_as`](crate::Request::body_as).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeAs {
    Json,
    Form,
}

/// How a request body is represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Buffer,
    Json,
    Form,
}

impl BodyEncoding {
    /// The `content-type` implied by this encoding, if any.
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            BodyEncoding::Buffer => None,
            BodyEncoding::Json => Some("application/json"),
            BodyEncoding::Form => Some("application/x-www-form-urlencoded"),
        }
    }
}

impl From<EncodeAs> for BodyEncoding {
    fn from(hint: EncodeAs) -> Self {
        match hint {
            EncodeAs::Json => BodyEncoding::Json,
            EncodeAs::Form => BodyEncoding::Form,
        }
    }
}

impl fmt::Display for BodyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyEncoding::Buffer => write!(f, "buffer"),
            BodyEncoding::Json => write!(f, "json"),
            BodyEncoding::Form => write!(f, "form"),
        }
    }
}

/// An encoded request body: final wire bytes plus the encoding they were
/// produced with. Built once when the body is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    encoding: BodyEncoding,
    bytes: Bytes,
}

impl Body {
    pub(crate) fn new(encoding: BodyEncoding, bytes: Bytes) -> Self {
        Self { encoding, bytes }
    }

    pub fn encoding(&self) -> BodyEncoding {
        self.encoding
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
