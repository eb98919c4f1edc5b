//! Stream transformations applied to response bodies.

mod decompress;

pub use decompress::{DecompressStream, DeflateDecoder, GzipDecoder, StreamTransform, decoder_for};
