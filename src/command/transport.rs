//! Message transport seam
//!
//! The byte-level link lives outside this crate. Implementations must
//! deliver lines in send order, at most once.

use std::collections::VecDeque;

/// Outbound/inbound text line queues for one peer
pub trait Transport {
    /// Queue a line for the remote peer; never blocks
    fn enqueue_outbound(&mut self, text: String);

    /// Take every line received since the last call, oldest first
    fn drain_inbound(&mut self) -> Vec<String>;
}

/// Hotseat play: nothing to talk to, so outbound lines are dropped
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn enqueue_outbound(&mut self, _text: String) {}

    fn drain_inbound(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory queues, connected to a peer with [`pump`]
#[derive(Debug, Clone, Default)]
pub struct QueueTransport {
    outbound: VecDeque<String>,
    inbound: VecDeque<String>,
}

impl QueueTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines waiting to be delivered
    pub fn pending_outbound(&self) -> usize {
        self.outbound.len()
    }

    /// Hand a line to this peer as if it had arrived over the wire
    pub fn deliver(&mut self, text: String) {
        self.inbound.push_back(text);
    }

    /// Everything sent so far that has not been pumped
    pub fn outbound(&self) -> impl Iterator<Item = &String> {
        self.outbound.iter()
    }
}

impl Transport for QueueTransport {
    fn enqueue_outbound(&mut self, text: String) {
        self.outbound.push_back(text);
    }

    fn drain_inbound(&mut self) -> Vec<String> {
        self.inbound.drain(..).collect()
    }
}

/// Move every pending outbound line of `from` into the inbound queue of `to`
///
/// Returns the number of lines moved.
pub fn pump(from: &mut QueueTransport, to: &mut QueueTransport) -> usize {
    let count = from.outbound.len();
    to.inbound.extend(from.outbound.drain(..));
    count
}
