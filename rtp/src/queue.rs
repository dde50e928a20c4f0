//! FIFO of packets waiting for the transport.

use crate::packet::PacketBuffer;
use std::collections::VecDeque;

/// Ordered queue of packet references.
///
/// Not synchronized on its own; the sender keeps it behind its state lock.
/// The head is the packet in flight (if any) and is only popped once its
/// completion has arrived.
#[derive(Debug, Default)]
pub struct SendQueue {
    packets: VecDeque<PacketBuffer>,
    queued_bytes: usize,
}

impl SendQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, packet: PacketBuffer) {
        self.queued_bytes += packet.len();
        self.packets.push_back(packet);
    }

    pub fn front(&self) -> Option<&PacketBuffer> {
        self.packets.front()
    }

    pub fn pop(&mut self) -> Option<PacketBuffer> {
        let packet = self.packets.pop_front()?;
        self.queued_bytes -= packet.len();
        Some(packet)
    }

    /// Empties the queue, handing back every reference it held.
    pub fn drain(&mut self) -> Vec<PacketBuffer> {
        self.queued_bytes = 0;
        self.packets.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Total payload bytes currently queued.
    pub fn queued_bytes(&self) -> usize {
        self.queued_bytes
    }
}
