//! Unicast RTP sender.

mod dispatch;
mod lifetime;
mod stats;

pub use stats::SendStatistics;

use self::dispatch::DispatchState;
use self::lifetime::{SenderCore, SenderPin};
use self::stats::SenderStats;
use crate::error::{Result, RtpError};
use crate::packet::PacketBuffer;
use crate::registry::{SessionRegistry, SessionSources, SourceRegistry};
use crate::transport::{AsyncSocketLayer, MAX_UDP_BYTES, ThreadedUdpLayer, code};
use logging::Logger;
use std::fmt;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};

/// Remote address with its RTP and RTCP ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub address: IpAddr,
    pub rtp_port: u16,
    pub rtcp_port: u16,
}

impl Destination {
    pub fn new(address: IpAddr, rtp_port: u16, rtcp_port: u16) -> Self {
        Self {
            address,
            rtp_port,
            rtcp_port,
        }
    }

    /// Parses `address` and rejects port 0 on either channel.
    pub fn parse(address: &str, rtp_port: u16, rtcp_port: u16) -> Result<Self> {
        let address: IpAddr = address
            .trim()
            .parse()
            .map_err(|e| RtpError::Config(format!("invalid destination '{}': {}", address, e)))?;
        if rtp_port == 0 || rtcp_port == 0 {
            return Err(RtpError::Config(format!(
                "destination ports must be non-zero (rtp {}, rtcp {})",
                rtp_port, rtcp_port
            )));
        }
        Ok(Self::new(address, rtp_port, rtcp_port))
    }

    pub fn rtp_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.rtp_port)
    }

    pub fn rtcp_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.rtcp_port)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            IpAddr::V4(ip) => write!(f, "{}:{}/{}", ip, self.rtp_port, self.rtcp_port),
            IpAddr::V6(ip) => write!(f, "[{}]:{}/{}", ip, self.rtp_port, self.rtcp_port),
        }
    }
}

/// Delivers queued datagrams to one destination, one at a time, in order.
///
/// `send` never blocks on the network. Each packet is handed to the RTP
/// socket only after the previous one has completed. The first transport
/// failure is latched: from then on nothing is dispatched and every `send`
/// reports that failure. Packets queued behind it stay queued until
/// [`discard_pending`](UnicastSender::discard_pending) is called or the
/// sender is torn down.
///
/// Dropping or [`destroy`](UnicastSender::destroy)ing the handle releases
/// the owner's pin; the sockets and source lists are closed once the
/// outstanding completion, if any, has run.
pub struct UnicastSender {
    core: SenderPin,
}

impl UnicastSender {
    /// Builds a sender from two bound sockets and its collaborators.
    ///
    /// Either every resource is created or none is: on failure, whatever
    /// was already set up is handed back before the error is returned.
    pub fn create(
        destination: Destination,
        rtp_socket: UdpSocket,
        rtcp_socket: UdpSocket,
        layer: &dyn AsyncSocketLayer,
        registry: Arc<dyn SourceRegistry>,
        logger: &Logger,
    ) -> Result<Self> {
        let logger = logger.for_component("UnicastSender");
        let ssrc: u32 = rand::random();

        let sources = SessionSources::create(registry, ssrc)?;
        let rtp_socket = layer
            .create_socket(rtp_socket, true)
            .map_err(|e| RtpError::Allocation(format!("RTP socket: {}", e)))?;
        let rtcp_socket = layer
            .create_socket(rtcp_socket, true)
            .map_err(|e| RtpError::Allocation(format!("RTCP socket: {}", e)))?;

        logger.info(&format!(
            "sender created for {} (ssrc {:08x})",
            destination, ssrc
        ));

        Ok(UnicastSender {
            core: SenderPin::new(SenderCore {
                rtp_socket,
                rtcp_socket,
                rtcp_buffer: Mutex::new(vec![0u8; MAX_UDP_BYTES].into_boxed_slice()),
                sources,
                destination,
                state: Mutex::new(DispatchState::default()),
                stats: SenderStats::default(),
                logger,
            }),
        })
    }

    /// [`create`](UnicastSender::create) with thread-backed UDP sockets and
    /// an in-process source registry.
    pub fn new(
        destination: Destination,
        rtp_socket: UdpSocket,
        rtcp_socket: UdpSocket,
        logger: &Logger,
    ) -> Result<Self> {
        Self::create(
            destination,
            rtp_socket,
            rtcp_socket,
            &ThreadedUdpLayer::new(logger.clone()),
            Arc::new(SessionRegistry::new()),
            logger,
        )
    }

    /// Queues `packet` for transmission.
    ///
    /// One reference to `packet` is taken for its time in the queue and
    /// given back once its send has completed. `Err(RtpError::Transport)`
    /// carries the latched failure; the packet was still queued but will
    /// not be transmitted.
    pub fn send(&self, packet: &PacketBuffer) -> Result<()> {
        match self.core.enqueue(packet) {
            code::OK => Ok(()),
            status => Err(RtpError::Transport(status)),
        }
    }

    /// Releases the owner's handle. Teardown waits for any outstanding
    /// completion.
    pub fn destroy(self) {
        self.core
            .logger
            .debug(&format!("owner released sender for {}", self.core.destination));
        self.core.release();
    }

    /// Latched transport status, `code::OK` while healthy.
    pub fn status(&self) -> i32 {
        self.core.lock_state().status
    }

    pub fn is_failed(&self) -> bool {
        self.status() != code::OK
    }

    pub fn failed_packets(&self) -> u64 {
        self.core.stats.packets_failed()
    }

    pub fn failed_bytes(&self) -> u64 {
        self.core.stats.bytes_failed()
    }

    pub fn statistics(&self) -> SendStatistics {
        let state = self.core.lock_state();
        SendStatistics {
            packets_sent: self.core.stats.packets_sent(),
            bytes_sent: self.core.stats.bytes_sent(),
            packets_failed: self.core.stats.packets_failed(),
            bytes_failed: self.core.stats.bytes_failed(),
            queued_packets: state.queue.len(),
            queued_bytes: state.queue.queued_bytes(),
            status: state.status,
        }
    }

    /// Packets waiting, the in-flight one included.
    pub fn queued(&self) -> usize {
        self.core.lock_state().queue.len()
    }

    /// The owner's pin plus one per outstanding completion.
    pub fn lifetime_count(&self) -> usize {
        self.core.count()
    }

    pub fn ssrc(&self) -> u32 {
        self.core.sources.ssrc().unwrap_or_default()
    }

    pub fn destination(&self) -> &Destination {
        &self.core.destination
    }

    pub fn rtp_local_addr(&self) -> Result<SocketAddr> {
        self.core
            .rtp_socket
            .local_addr()
            .map_err(|e| RtpError::Io(e.to_string()))
    }

    pub fn rtcp_local_addr(&self) -> Result<SocketAddr> {
        self.core
            .rtcp_socket
            .local_addr()
            .map_err(|e| RtpError::Io(e.to_string()))
    }

    /// Reads one waiting RTCP datagram, unparsed. `Ok(None)` if none.
    pub fn receive_rtcp(&self) -> Result<Option<(Vec<u8>, SocketAddr)>> {
        let mut buffer = self
            .core
            .rtcp_buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let received = self
            .core
            .rtcp_socket
            .try_recv_from(&mut buffer[..])
            .map_err(|e| RtpError::Io(format!("RTCP receive: {}", e)))?;
        Ok(received.map(|(size, from)| (buffer[..size].to_vec(), from)))
    }

    /// After a latched failure, releases every queued packet and returns
    /// how many there were. Does nothing on a healthy sender.
    pub fn discard_pending(&self) -> usize {
        self.core.discard_pending()
    }
}

impl fmt::Debug for UnicastSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnicastSender")
            .field("destination", &self.core.destination)
            .field("ssrc", &self.ssrc())
            .field("status", &self.status())
            .finish()
    }
}
