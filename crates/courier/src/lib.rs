//! Declarative HTTP/HTTPS requests with buffered or streaming responses.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Request builder, body and response types
//! - [`core`] - Pure transformations (paths, body encoding, headers, buffering)
//! - [`effects`] - I/O operations behind the [`Transport`] trait
//!
//! with [`transform`] holding the streaming decompressors.
//!
//! # Key Features
//!
//! - **Single Settlement**: every [`Executor::send`] resolves exactly once, with
//!   a buffered body, a live stream, or an [`Error`]
//! - **Bounded Buffering**: buffered bodies are capped (50 MB by default) and
//!   the connection is dropped as soon as the cap is crossed
//! - **Transparent Decompression**: `gzip` and `deflate` bodies are decoded on
//!   the fly when compression was negotiated
//! - **Request Deadlines**: one timeout covers connect, head and body
//!
//! # Example
//!
//! ```no_run
//! use courier::{Executor, Request};
//!
//! # async fn run() -> courier::Result<()> {
//! let executor = Executor::with_reqwest()?;
//! let response = executor
//!     .send(Request::get("https://example.com/")?.compress())
//!     .await?
//!     .into_buffered()
//!     .expect("buffered by default");
//! println!("{} {}", response.status, response.text());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "reqwest")]
pub mod config;
pub mod core;
pub mod data;
pub mod effects;
mod error;
pub mod transform;

#[cfg(feature = "reqwest")]
pub use config::ClientConfig;
pub use data::{
    BodyData, BodyEncoding, ContentEncoding, EncodeAs, Outcome, Request, ResponseBuffer,
    ResponseHead, ResponseOptions, ResponseStream, TransportOptions,
};
pub use effects::{BoxStream, Executor, Transport, TransportResponse};
#[cfg(feature = "reqwest")]
pub use effects::ReqwestTransport;
pub use error::{Error, Result};
