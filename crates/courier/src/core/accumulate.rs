use std::fmt;

use crate::data::{ResponseBuffer, ResponseHead};
use crate::error::{Error, Result};

/// Phases of a buffered response.
///
/// Buffering moves through these phases in order:
/// Idle → HeadersReceived → Accumulating → Completed | Failed
///
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No response head yet.
    #[default]
    Idle,

    /// Status and headers are known, no body bytes seen.
    HeadersReceived,

    /// At least one body chunk has been appended.
    Accumulating,

    /// The body ended and the buffer was handed out.
    Completed,

    /// Limit, stream error, abort or timeout. The buffer is discarded.
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::HeadersReceived => write!(f, "HeadersReceived"),
            Phase::Accumulating => write!(f, "Accumulating"),
            Phase::Completed => write!(f, "Completed"),
            Phase::Failed => write!(f, "Failed"),
        }
    }
}

/// Collects body chunks into a [`ResponseBuffer`] under a size ceiling.
///
/// The buffer only leaves through [`finish`](Self::finish); once the ceiling
/// is crossed or [`fail`](Self::fail) is called, the partial body is dropped.
#[derive(Debug, Default)]
pub struct Accumulator {
    buffer: Option<ResponseBuffer>,
    limit: Option<usize>,
    phase: Phase,
}

impl Accumulator {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            buffer: None,
            limit,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Bytes held so far.
    pub fn len(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.body.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record the response head. Only valid while idle.
    pub fn start(&mut self, head: ResponseHead) {
        if self.phase != Phase::Idle {
            return;
        }
        self.buffer = Some(ResponseBuffer::new(head));
        self.phase = Phase::HeadersReceived;
    }

    /// Append one chunk, then enforce the ceiling.
    ///
    /// Exceeding the ceiling moves to `Failed`, discards the partial body and
    /// returns [`Error::BufferLimitExceeded`]. Chunks offered outside the
    /// `HeadersReceived`/`Accumulating` phases are ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        if !matches!(self.phase, Phase::HeadersReceived | Phase::Accumulating) {
            return Ok(());
        }
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(());
        };

        buffer.add_chunk(chunk);
        self.phase = Phase::Accumulating;

        let received = buffer.body.len();
        if let Some(limit) = self.limit
            && received > limit
        {
            self.fail();
            return Err(Error::BufferLimitExceeded { limit, received });
        }
        Ok(())
    }

    /// Discard the partial body and move to `Failed`.
    pub fn fail(&mut self) {
        self.buffer = None;
        self.phase = Phase::Failed;
    }

    /// Hand out the completed buffer. Returns `None` when the accumulator
    /// never saw a head or already reached a terminal phase.
    pub fn finish(&mut self) -> Option<ResponseBuffer> {
        if self.phase.is_terminal() {
            return None;
        }
        let buffer = self.buffer.take()?;
        self.phase = Phase::Completed;
        Some(buffer)
    }
}
