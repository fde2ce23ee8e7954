// src/core/protocol/chunk_codec.rs

//! The wire format of the chat relay: raw bytes, no framing.
//!
//! Each decoded item is whatever the peer has sent so far, capped at the read
//! buffer size. Longer input is split into independent messages; nothing is
//! reassembled across reads.

use crate::core::ChatError;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The per-read cap used when none is configured.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 256;

/// A `tokio_util::codec` implementation that passes bytes through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ChunkCodec {
    max_chunk: usize,
}

impl ChunkCodec {
    pub fn new(max_chunk: usize) -> Self {
        Self {
            max_chunk: max_chunk.max(1),
        }
    }

    pub fn max_chunk(&self) -> usize {
        self.max_chunk
    }
}

impl Default for ChunkCodec {
    fn default() -> Self {
        Self::new(DEFAULT_READ_BUFFER_SIZE)
    }
}

impl Decoder for ChunkCodec {
    type Item = Bytes;
    type Error = ChatError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let len = src.len().min(self.max_chunk);
        Ok(Some(src.split_to(len).freeze()))
    }
}

impl Encoder<Bytes> for ChunkCodec {
    type Error = ChatError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}
