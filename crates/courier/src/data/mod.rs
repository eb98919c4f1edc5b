//! Configuration and result types for HTTP requests.
//!
//! These types carry no I/O. A [`Request`] is assembled here, consumed by the
//! executor, and answered with an [`Outcome`].

pub mod body;
pub mod options;
pub mod request;
pub mod response;

pub use body::{Body, BodyData, BodyEncoding, EncodeAs};
pub use options::{
    ContentEncoding, DEFAULT_MAX_BUFFER, ResponseOptions, Scheme, TransportOptions,
};
pub use request::{Request, RequestParts};
pub use response::{Outcome, ResponseBuffer, ResponseHead, ResponseStream};
