use super::Destination;
use super::dispatch::DispatchState;
use super::stats::SenderStats;
use crate::registry::SessionSources;
use crate::transport::AsyncSocket;
use logging::Logger;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything a sender owns. Fields drop in declaration order: sockets
/// close first, then the source lists and the self source go back to the
/// registry.
pub(crate) struct SenderCore {
    pub(super) rtp_socket: Box<dyn AsyncSocket>,
    pub(super) rtcp_socket: Box<dyn AsyncSocket>,
    pub(super) rtcp_buffer: Mutex<Box<[u8]>>,
    pub(super) sources: SessionSources,
    pub(super) destination: Destination,
    pub(super) state: Mutex<DispatchState>,
    pub(super) stats: SenderStats,
    pub(super) logger: Logger,
}

impl SenderCore {
    /// Poisoning is ignored: every critical section leaves the state
    /// consistent between statements.
    pub(super) fn lock_state(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SenderCore {
    fn drop(&mut self) {
        self.logger.info(&format!(
            "sender for {} released ({} packets sent, {} failed)",
            self.destination,
            self.stats.packets_sent(),
            self.stats.packets_failed()
        ));
    }
}

/// A strong reference that keeps a sender's core alive.
///
/// The owner's [`UnicastSender`](super::UnicastSender) holds one pin and
/// every accepted dispatch retains another, carried by its completion. The
/// core is torn down when the last pin is released, so destroying the
/// sender while a send is outstanding is safe. Retaining and releasing pins
/// is the only way to extend a sender's lifetime across an async gap.
pub(crate) struct SenderPin(Arc<SenderCore>);

impl SenderPin {
    pub(super) fn new(core: SenderCore) -> Self {
        SenderPin(Arc::new(core))
    }

    pub(super) fn retain(&self) -> SenderPin {
        SenderPin(Arc::clone(&self.0))
    }

    pub(super) fn release(self) {
        drop(self);
    }

    /// Live pins: the owner plus outstanding completions.
    pub(super) fn count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl Deref for SenderPin {
    type Target = SenderCore;

    fn deref(&self) -> &SenderCore {
        &self.0
    }
}
