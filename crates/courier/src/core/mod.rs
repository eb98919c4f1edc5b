//! Pure transformations for request building and response handling.
//!
//! Nothing in this module performs I/O; the executor composes these pieces
//! around the transport.

mod accumulate;
mod body;
mod compression;
pub mod headers;
mod path;

pub use accumulate::{Accumulator, Phase};
pub use body::{encode_body, encode_form, infer_encoding};
pub use compression::negotiate;
pub use headers::apply_body_headers;
pub use path::join_path;
