//! Tokio codec for the Storm Audio ISP line protocol.
//!
//! A thin integration layer between the [`LineFramer`] and Tokio's codec
//! traits, for use with `tokio_util::codec::Framed`:
//!
//! - [`Decoder`]: extracts complete message lines from the TCP byte stream
//! - [`Encoder<Command>`]: writes commands in wire form with the terminator
//!
//! ```text
//! TCP stream -> Decoder -> String (one protocol message)
//! Command    -> Encoder -> TCP stream (line-feed terminated)
//! ```
//!
//! Decoding one item per `decode` call preserves the ordering contract:
//! the reactor fully processes message N before message N+1 is surfaced.
//!
//! An oversized unterminated line is dropped inside `decode` rather than
//! surfaced as an error: `Framed` treats a decoder error as fatal to the
//! stream, while losing one malformed line must not cost the session.

use bytes::BytesMut;
use std::collections::VecDeque;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::{command::Command, framer::LineFramer};
use stormlink_core::{Error, Result};

/// Codec pairing the line framer with command encoding.
#[derive(Debug, Default)]
pub struct IspCodec {
    framer: LineFramer,
    /// Lines framed but not yet handed out, oldest first.
    pending: VecDeque<String>,
}

impl IspCodec {
    /// Create a codec with the default line bound.
    pub fn new() -> Self {
        Self {
            framer: LineFramer::new(),
            pending: VecDeque::new(),
        }
    }
}

impl Decoder for IspCodec {
    type Item = String;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !src.is_empty() {
            // feed() owns buffering; src is fully consumed each pass
            match self.framer.feed(src) {
                Ok(lines) => self.pending.extend(lines),
                // `Framed` terminates its stream permanently after a decode
                // error, but an oversized line costs only itself: the framer
                // has already reset, so swallow it and keep the session
                Err(e) => warn!("dropping undecodable input: {e}"),
            }
            src.clear();
        }
        Ok(self.pending.pop_front())
    }
}

impl Encoder<Command> for IspCodec {
    type Error = Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&item.to_wire());
        Ok(())
    }
}
