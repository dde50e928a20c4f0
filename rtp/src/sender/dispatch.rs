//! Serialized dispatch.
//!
//! At most one packet per sender is with the transport. Dispatches are
//! driven by a single loop: whichever thread finds the sender idle (a
//! producer in `enqueue`, or a transport thread delivering a completion
//! while no loop is running) submits the head and keeps submitting until
//! the transport holds a packet it has not completed yet. A completion
//! that arrives while the loop is on the stack only retires its packet;
//! the loop picks up the next one, so inline completions never nest.
//!
//! The in-flight packet stays at the head of the queue until its
//! completion pops it, which keeps the order seen by the transport
//! identical to the enqueue order.

use super::lifetime::SenderPin;
use crate::packet::PacketBuffer;
use crate::queue::SendQueue;
use crate::transport::{SendCompletion, code};

/// Mutable sender state, guarded by the sender's lock.
#[derive(Debug, Default)]
pub(crate) struct DispatchState {
    pub queue: SendQueue,
    /// The queue head has been handed to the transport.
    pub in_flight: bool,
    /// A dispatch loop is running and will pick up the next packet.
    pub dispatching: bool,
    /// First transport failure; `code::OK` while healthy.
    pub status: i32,
}

/// A dispatch decided under the lock, submitted after it is dropped.
struct Dispatch {
    payload: PacketBuffer,
    pin: SenderPin,
}

impl SenderPin {
    /// Queues `packet` and starts it if the transport is idle.
    /// Returns the sender status afterwards.
    pub(super) fn enqueue(&self, packet: &PacketBuffer) -> i32 {
        let residency = packet.acquire();
        let dispatch = {
            let mut state = self.lock_state();
            state.queue.push(residency);
            self.start_dispatching(&mut state)
        };

        if let Some(dispatch) = dispatch {
            self.run_dispatch(dispatch);
        }
        self.lock_state().status
    }

    /// Claims the dispatch loop if no one is running it and the head can go.
    fn start_dispatching(&self, state: &mut DispatchState) -> Option<Dispatch> {
        if state.dispatching {
            return None;
        }
        let dispatch = self.begin_dispatch(state)?;
        state.dispatching = true;
        Some(dispatch)
    }

    /// Submits `first`, then every packet that becomes ready while the loop
    /// runs. Gives the loop up under the same lock that finds nothing to do.
    fn run_dispatch(&self, first: Dispatch) {
        let mut next = Some(first);
        while let Some(dispatch) = next {
            self.submit(dispatch);
            let mut state = self.lock_state();
            next = self.begin_dispatch(&mut state);
            if next.is_none() {
                state.dispatching = false;
            }
        }
    }

    /// Marks the head in flight and pins the sender for the async gap.
    /// Refuses once a failure has been latched.
    fn begin_dispatch(&self, state: &mut DispatchState) -> Option<Dispatch> {
        if state.status != code::OK || state.in_flight {
            return None;
        }
        let payload = state.queue.front()?.acquire();
        state.in_flight = true;
        Some(Dispatch {
            payload,
            pin: self.retain(),
        })
    }

    fn submit(&self, dispatch: Dispatch) {
        let Dispatch { payload, pin } = dispatch;
        let length = payload.len();
        let target = self.destination.rtp_addr();
        self.logger
            .debug(&format!("dispatching {} bytes to {}", length, target));

        let completion = SendCompletion::new(move |status, sent| pin.finish_dispatch(status, sent));
        if let Err(rejected) = self.rtp_socket.send_to(target, payload, completion) {
            // Drops the dispatch pin without running the completion.
            rejected.completion.cancel();
            let mut state = self.lock_state();
            state.in_flight = false;
            self.record_failure(&mut state, rejected.code, length);
        }
    }

    /// Completion of the in-flight packet. Consumes the dispatch pin.
    fn finish_dispatch(self, status: i32, sent: usize) {
        let (completed, next) = {
            let mut state = self.lock_state();
            state.in_flight = false;
            let completed = state.queue.pop();
            match &completed {
                Some(packet) if status != code::OK => {
                    self.record_failure(&mut state, status, packet.len())
                }
                Some(packet) => {
                    if sent != packet.len() {
                        self.logger.warn(&format!(
                            "short write: {} of {} bytes",
                            sent,
                            packet.len()
                        ));
                    }
                    self.stats.record_sent(sent);
                }
                None => self.logger.error("completion arrived with an empty queue"),
            }
            // A running loop submits the next packet itself.
            let next = self.start_dispatching(&mut state);
            (completed, next)
        };

        if let Some(packet) = completed {
            packet.release();
        }
        if let Some(dispatch) = next {
            self.run_dispatch(dispatch);
        }
        self.release();
    }

    /// Counts the failure and latches `status` if nothing is latched yet.
    fn record_failure(&self, state: &mut DispatchState, status: i32, length: usize) {
        let status = if status == code::OK { code::IO } else { status };
        self.stats.record_failure(length);
        if state.status == code::OK {
            state.status = status;
            self.logger.error(&format!(
                "transport failure {} on a {}-byte packet, sender stopped with {} queued",
                status,
                length,
                state.queue.len()
            ));
        } else {
            self.logger.warn(&format!(
                "transport failure {} on a {}-byte packet after latching {}",
                status, length, state.status
            ));
        }
    }

    /// Releases every queued packet once the sender has latched a failure.
    pub(super) fn discard_pending(&self) -> usize {
        let dropped = {
            let mut state = self.lock_state();
            if state.status == code::OK || state.in_flight {
                return 0;
            }
            state.queue.drain()
        };
        let count = dropped.len();
        for packet in dropped {
            packet.release();
        }
        if count > 0 {
            self.logger
                .info(&format!("discarded {} packets queued behind a failure", count));
        }
        count
    }
}
