//! Thread-backed async UDP sockets.

use super::{AsyncSocket, AsyncSocketLayer, MAX_UDP_BYTES, Rejected, SendCompletion, code};
use crate::packet::PacketBuffer;
use logging::Logger;
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const BACKOFF_START: Duration = Duration::from_micros(200);
const BACKOFF_MAX: Duration = Duration::from_millis(20);

/// Default [`AsyncSocketLayer`]: every socket gets its own send thread.
#[derive(Clone)]
pub struct ThreadedUdpLayer {
    logger: Logger,
}

impl ThreadedUdpLayer {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.for_component("UdpSocket"),
        }
    }
}

impl Default for ThreadedUdpLayer {
    fn default() -> Self {
        Self::new(Logger::disabled())
    }
}

impl AsyncSocketLayer for ThreadedUdpLayer {
    fn create_socket(
        &self,
        socket: UdpSocket,
        non_blocking: bool,
    ) -> io::Result<Box<dyn AsyncSocket>> {
        Ok(Box::new(ThreadedUdpSocket::new(
            socket,
            non_blocking,
            self.logger.clone(),
        )?))
    }
}

struct SendJob {
    target: SocketAddr,
    payload: PacketBuffer,
    completion: SendCompletion,
}

/// UDP socket whose sends are carried out by a dedicated worker thread.
///
/// The worker is spawned by the first `send_to`, so a socket that only
/// receives never gets one. Jobs travel over an unbounded channel and
/// `send_to` never blocks. The worker stops once the socket is dropped and
/// the channel drains; it is never joined, since the last completion may
/// itself drop the socket.
pub struct ThreadedUdpSocket {
    socket: Arc<UdpSocket>,
    jobs: Mutex<Option<Sender<SendJob>>>,
    logger: Logger,
}

impl ThreadedUdpSocket {
    pub fn new(socket: UdpSocket, non_blocking: bool, logger: Logger) -> io::Result<Self> {
        socket.set_nonblocking(non_blocking)?;
        Ok(Self {
            socket: Arc::new(socket),
            jobs: Mutex::new(None),
            logger,
        })
    }

    fn worker(&self) -> io::Result<Sender<SendJob>> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(jobs) = jobs.as_ref() {
            return Ok(jobs.clone());
        }

        let (sender, queue) = mpsc::channel();
        let socket = Arc::clone(&self.socket);
        let logger = self.logger.clone();
        thread::Builder::new()
            .name("rtp-udp-send".to_string())
            .spawn(move || run_worker(socket, queue, logger))?;
        *jobs = Some(sender.clone());
        Ok(sender)
    }

    #[cfg(test)]
    fn has_worker(&self) -> bool {
        self.jobs
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }
}

impl AsyncSocket for ThreadedUdpSocket {
    fn send_to(
        &self,
        target: SocketAddr,
        payload: PacketBuffer,
        completion: SendCompletion,
    ) -> Result<(), Rejected> {
        if payload.len() > MAX_UDP_BYTES {
            return Err(Rejected::new(code::MESSAGE_TOO_LONG, completion));
        }
        let jobs = match self.worker() {
            Ok(jobs) => jobs,
            Err(e) => {
                self.logger
                    .error(&format!("cannot start send worker: {}", e));
                return Err(Rejected::new(code::from_io_error(&e), completion));
            }
        };
        jobs.send(SendJob {
            target,
            payload,
            completion,
        })
        .map_err(|mpsc::SendError(job)| Rejected::new(code::CLOSED, job.completion))
    }

    fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        match self.socket.recv_from(buf) {
            Ok(received) => Ok(Some(received)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

/// How a worker send ended.
#[derive(Debug)]
enum SendOutcome {
    Sent(usize),
    Failed(io::Error),
    /// The owning socket went away while the kernel buffer was full.
    Closed,
}

fn run_worker(socket: Arc<UdpSocket>, queue: Receiver<SendJob>, logger: Logger) {
    for job in queue {
        let SendJob {
            target,
            payload,
            completion,
        } = job;

        // The worker holds the only other reference to the socket.
        let outcome = send_with_retry(
            || socket.send_to(payload.as_bytes(), target),
            || Arc::strong_count(&socket) == 1,
        );
        let (status, sent) = match outcome {
            SendOutcome::Sent(sent) => (code::OK, sent),
            SendOutcome::Failed(e) => {
                logger.warn(&format!("send to {} failed: {}", target, e));
                (code::from_io_error(&e), 0)
            }
            SendOutcome::Closed => (code::CLOSED, 0),
        };

        // The transport's reference goes before the owner hears back.
        payload.release();
        completion.complete(status, sent);
    }
    logger.debug("send worker stopped");
}

/// Retries a full send buffer until it drains, a hard error comes back, or
/// `closed` reports the socket gone. Backoff doubles up to `BACKOFF_MAX`.
fn send_with_retry<S, C>(mut send: S, closed: C) -> SendOutcome
where
    S: FnMut() -> io::Result<usize>,
    C: Fn() -> bool,
{
    let mut backoff = BACKOFF_START;
    loop {
        match send() {
            Ok(sent) => return SendOutcome::Sent(sent),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                if closed() {
                    return SendOutcome::Closed;
                }
                thread::sleep(backoff);
                backoff = (backoff * 2).min(BACKOFF_MAX);
            }
            Err(e) => return SendOutcome::Failed(e),
        }
    }
}
