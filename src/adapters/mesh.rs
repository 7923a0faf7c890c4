//! In-memory mesh transport.
//!
//! Simulation backend for [`MeshTransport`]: inbound messages are queued by
//! the caller, outbound messages and raw chunks are recorded, and either
//! send path can be told to fail.

use std::collections::VecDeque;

use log::debug;

use crate::app::ports::MeshTransport;
use crate::protocol::frame::{MeshMessage, NodeId};

/// A raw buffer handed to [`MeshTransport::send_with_retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentChunk {
    pub target: NodeId,
    pub data: Vec<u8>,
    pub retries: u8,
    pub retry_interval_ms: u32,
}

#[derive(Debug, Default)]
pub struct MemoryMesh {
    inbound: VecDeque<MeshMessage>,
    sent: Vec<MeshMessage>,
    chunks: Vec<SentChunk>,
    reject_messages: bool,
    /// Number of chunk sends that succeed before every later one fails.
    chunk_budget: Option<usize>,
}

impl MemoryMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message as if a node had sent it to the gateway.
    pub fn deliver(&mut self, msg: MeshMessage) {
        self.inbound.push_back(msg);
    }

    /// Make every `send_message` fail (or succeed again).
    pub fn reject_messages(&mut self, reject: bool) {
        self.reject_messages = reject;
    }

    /// Let `n` more chunk sends succeed, then fail the rest.
    pub fn fail_chunks_after(&mut self, n: usize) {
        self.chunk_budget = Some(n);
    }

    pub fn sent(&self) -> &[MeshMessage] {
        &self.sent
    }

    pub fn chunks(&self) -> &[SentChunk] {
        &self.chunks
    }

    /// All chunk bytes concatenated in send order.
    pub fn chunk_bytes(&self) -> Vec<u8> {
        self.chunks.iter().flat_map(|c| c.data.iter().copied()).collect()
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }
}

impl MeshTransport for MemoryMesh {
    fn send_message(&mut self, msg: &MeshMessage) -> bool {
        if self.reject_messages {
            debug!("mesh(sim): rejecting message to node {}", msg.to);
            return false;
        }
        self.sent.push(*msg);
        true
    }

    fn receive_message(&mut self) -> Option<MeshMessage> {
        self.inbound.pop_front()
    }

    fn send_with_retry(
        &mut self,
        target: NodeId,
        data: &[u8],
        retries: u8,
        retry_interval_ms: u32,
    ) -> bool {
        if let Some(budget) = self.chunk_budget.as_mut() {
            if *budget == 0 {
                debug!("mesh(sim): chunk to node {} dropped", target);
                return false;
            }
            *budget -= 1;
        }
        self.chunks.push(SentChunk {
            target,
            data: data.to_vec(),
            retries,
            retry_interval_ms,
        });
        true
    }
}
