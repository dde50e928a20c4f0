//! Async socket boundary used by the sender.
//!
//! A socket accepts a datagram together with a [`SendCompletion`] and
//! reports the outcome later, from whatever thread it likes. Dropping an
//! [`AsyncSocket`] destroys it.

mod completion;
mod udp;

pub use completion::SendCompletion;
pub use udp::{ThreadedUdpLayer, ThreadedUdpSocket};

use crate::packet::PacketBuffer;
use std::fmt;
use std::io;
use std::net::{SocketAddr, UdpSocket};

/// Largest datagram the transport accepts, and the RTCP receive buffer size.
pub const MAX_UDP_BYTES: usize = 65_507;

/// Transport status codes.
///
/// `OK` is success. Negative values are raised by this crate; positive
/// values are OS error numbers passed through from the socket.
pub mod code {
    use std::io;

    pub const OK: i32 = 0;
    /// The socket's send path has shut down.
    pub const CLOSED: i32 = -1;
    /// Payload larger than [`MAX_UDP_BYTES`](super::MAX_UDP_BYTES).
    pub const MESSAGE_TOO_LONG: i32 = -2;
    /// The transport dropped a completion without reporting an outcome.
    pub const ABANDONED: i32 = -3;
    /// I/O failure without an OS error number.
    pub const IO: i32 = -4;

    pub fn from_io_error(err: &io::Error) -> i32 {
        match err.raw_os_error() {
            Some(errno) if errno != 0 => errno,
            _ => IO,
        }
    }
}

/// Synchronous refusal of a send. Hands the unfired completion back.
pub struct Rejected {
    pub code: i32,
    pub completion: SendCompletion,
}

impl Rejected {
    pub fn new(code: i32, completion: SendCompletion) -> Self {
        Self { code, completion }
    }
}

impl fmt::Debug for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected").field("code", &self.code).finish()
    }
}

/// A non-blocking datagram socket with completion-based sends.
pub trait AsyncSocket: Send + Sync {
    /// Starts sending `payload` to `target`.
    ///
    /// `Ok(())` means the send was accepted and `completion` will fire
    /// exactly once with `(code, bytes_transferred)`. On `Err` the
    /// completion has not fired and is returned inside [`Rejected`].
    fn send_to(
        &self,
        target: SocketAddr,
        payload: PacketBuffer,
        completion: SendCompletion,
    ) -> Result<(), Rejected>;

    /// Reads one pending datagram without blocking. `Ok(None)` when nothing
    /// is waiting.
    fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>>;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// Wraps raw, already bound sockets as [`AsyncSocket`]s.
pub trait AsyncSocketLayer: Send + Sync {
    fn create_socket(&self, socket: UdpSocket, non_blocking: bool)
    -> io::Result<Box<dyn AsyncSocket>>;
}
