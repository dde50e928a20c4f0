//! Send statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated from producer and completion threads alike.
#[derive(Debug, Default)]
pub(crate) struct SenderStats {
    packets_sent: AtomicU64,
    bytes_sent: AtomicU64,
    packets_failed: AtomicU64,
    bytes_failed: AtomicU64,
}

impl SenderStats {
    pub fn record_sent(&self, bytes: usize) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self, bytes: usize) {
        self.packets_failed.fetch_add(1, Ordering::Relaxed);
        self.bytes_failed.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn packets_failed(&self) -> u64 {
        self.packets_failed.load(Ordering::Relaxed)
    }

    pub fn bytes_failed(&self) -> u64 {
        self.bytes_failed.load(Ordering::Relaxed)
    }

    pub fn packets_sent(&self) -> u64 {
        self.packets_sent.load(Ordering::Relaxed)
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of a sender, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendStatistics {
    pub packets_sent: u64,
    pub bytes_sent: u64,
    /// Packets the transport rejected or failed to deliver.
    pub packets_failed: u64,
    pub bytes_failed: u64,
    /// Packets waiting in the queue, the in-flight one included.
    pub queued_packets: usize,
    pub queued_bytes: usize,
    /// Latched transport status, 0 while healthy.
    pub status: i32,
}
