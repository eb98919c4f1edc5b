//! I/O for HTTP requests.
//!
//! Everything that touches the network or a timer lives here; the pieces it
//! composes come from [`core`](crate::core) and [`transform`](crate::transform).

mod deadline;
mod executor;
mod http;

pub use deadline::DeadlineStream;
pub use executor::Executor;
pub use http::{BoxStream, Transport, TransportResponse};
#[cfg(feature = "reqwest")]
pub use http::ReqwestTransport;
