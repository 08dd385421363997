//! Line framer for the Storm Audio ISP byte stream.
//!
//! TCP is a stream protocol without message boundaries. A single read may
//! contain a partial line, one line, several concatenated lines, or a line
//! split across reads. The framer accumulates bytes in an internal buffer,
//! splits on the line feed terminator, and carries any trailing fragment
//! over to the next [`feed`](LineFramer::feed) call.
//!
//! Empty lines (a fully empty buffer, consecutive terminators) are
//! discarded, never forwarded. The framer performs no protocol-aware
//! validation: any non-empty line is handed to the parser as-is.
//!
//! # Buffer bound
//!
//! The carry-over buffer is bounded by
//! [`MAX_LINE_LENGTH`](stormlink_core::constants::MAX_LINE_LENGTH). A line
//! that grows past the bound without a terminator is reported as
//! [`Error::LineTooLong`] and the buffer is reset, so a malformed or
//! endless line cannot exhaust memory while the connection stays usable.
//!
//! # Usage
//!
//! ```
//! use stormlink_protocol::LineFramer;
//!
//! let mut framer = LineFramer::new();
//!
//! // Feed partial data from the TCP stream
//! assert!(framer.feed(b"ssp.pow").unwrap().is_empty());
//! let lines = framer.feed(b"er.on\nssp.mute.[0]\n").unwrap();
//! assert_eq!(lines, vec!["ssp.power.on", "ssp.mute.[0]"]);
//! ```

use bytes::BytesMut;
use stormlink_core::constants::{INITIAL_BUFFER_CAPACITY, LINE_TERMINATOR, MAX_LINE_LENGTH};
use stormlink_core::{Error, Result};
use tracing::warn;

/// Stateful line framer with partial-message carry-over.
#[derive(Debug)]
pub struct LineFramer {
    /// Bytes awaiting a terminator; owned exclusively by the framer and
    /// cleared of complete lines after each framing pass.
    buffer: BytesMut,

    /// Maximum accepted length of a single unterminated line.
    max_line: usize,
}

impl LineFramer {
    /// Create a framer with the default line bound.
    pub fn new() -> Self {
        Self::with_max_line(MAX_LINE_LENGTH)
    }

    /// Create a framer with a custom line bound.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_line,
        }
    }

    /// Feed bytes from the stream and return the complete lines they close.
    ///
    /// Lines are returned in wire order. A trailing fragment without a
    /// terminator stays buffered for the next call. An unterminated
    /// remainder exceeding the configured bound is discarded and the buffer
    /// reset; completed lines framed in the same pass always survive the
    /// discard.
    ///
    /// # Errors
    /// Returns `Error::LineTooLong` when an oversized fragment was the only
    /// content of the pass. The error is recoverable and subsequent feeds
    /// start clean.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self
            .buffer
            .iter()
            .position(|&b| b == LINE_TERMINATOR)
        {
            let line = self.buffer.split_to(pos + 1);
            // drop the terminator itself
            let line = &line[..line.len() - 1];
            if !line.is_empty() {
                lines.push(String::from_utf8_lossy(line).into_owned());
            }
        }

        if self.buffer.len() > self.max_line {
            let length = self.buffer.len();
            warn!(length, max = self.max_line, "discarding oversized partial line");
            self.buffer.clear();
            if lines.is_empty() {
                return Err(Error::LineTooLong {
                    length,
                    max: self.max_line,
                });
            }
        }

        Ok(lines)
    }

    /// Number of buffered bytes still waiting for a terminator.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}
