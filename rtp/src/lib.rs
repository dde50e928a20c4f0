//! RTP/AVP unicast sender.
//!
//! Delivers pre-encoded RTP datagrams to a single destination over
//! non-blocking UDP sockets. Sends are serialized: one datagram is in flight
//! per sender, the next one is dispatched from the completion of the
//! previous, so the transport sees packets in exactly the order they were
//! queued.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod packet;
pub mod queue;
pub mod registry;
pub mod sender;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{LoggingConfig, SenderConfig};
pub use error::{Result, RtpError};
pub use lifecycle::{cleanup, init};
pub use packet::PacketBuffer;
pub use queue::SendQueue;
pub use registry::{RtpSource, SessionRegistry, SourceDescriptor, SourceList, SourceRegistry};
pub use sender::{Destination, SendStatistics, UnicastSender};
pub use transport::{
    AsyncSocket, AsyncSocketLayer, MAX_UDP_BYTES, Rejected, SendCompletion, ThreadedUdpLayer, code,
};
