//! Scripted collaborators for unit tests.

use crate::error::{Result, RtpError};
use crate::packet::PacketBuffer;
use crate::registry::{SessionRegistry, SourceDescriptor, SourceList, SourceRegistry};
use crate::transport::{AsyncSocket, AsyncSocketLayer, Rejected, SendCompletion, code};
use std::collections::VecDeque;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A send the scripted socket accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: SocketAddr,
    pub payload: Vec<u8>,
}

#[derive(Default)]
pub struct Script {
    submissions: Mutex<Vec<Submission>>,
    pending: Mutex<VecDeque<(SendCompletion, usize)>>,
    reject_with: Mutex<Option<i32>>,
    complete_inline: AtomicBool,
    max_pending: AtomicUsize,
    live_sockets: AtomicUsize,
    created_sockets: AtomicUsize,
    fail_socket_at: Mutex<Option<usize>>,
}

impl Script {
    /// Every submission so far, accepted or not, in call order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Most completions ever outstanding at once.
    pub fn max_pending(&self) -> usize {
        self.max_pending.load(Ordering::SeqCst)
    }

    pub fn live_sockets(&self) -> usize {
        self.live_sockets.load(Ordering::SeqCst)
    }

    /// Rejects every following send synchronously with `code`.
    pub fn reject_with(&self, code: i32) {
        *self.reject_with.lock().unwrap() = Some(code);
    }

    /// Completes every following accepted send with success before
    /// `send_to` returns.
    pub fn complete_inline(&self) {
        self.complete_inline.store(true, Ordering::SeqCst);
    }

    /// Makes the `index`-th socket creation (0-based) fail.
    pub fn fail_socket_at(&self, index: usize) {
        *self.fail_socket_at.lock().unwrap() = Some(index);
    }

    /// Fires the oldest pending completion. The queue lock is not held
    /// while it runs, so the sender may submit the next packet from inside.
    pub fn complete_next(&self, code: i32, bytes: usize) -> bool {
        let next = self.pending.lock().unwrap().pop_front();
        match next {
            Some((completion, _)) => {
                completion.complete(code, bytes);
                true
            }
            None => false,
        }
    }

    /// Completes the oldest pending send with its full length.
    pub fn complete_ok(&self) -> bool {
        let next = self.pending.lock().unwrap().pop_front();
        match next {
            Some((completion, length)) => {
                completion.complete(code::OK, length);
                true
            }
            None => false,
        }
    }

    /// Drops the oldest pending completion without firing it.
    pub fn abandon_next(&self) -> bool {
        let next = self.pending.lock().unwrap().pop_front();
        next.is_some()
    }
}

/// Socket layer whose completions are fired by the test.
#[derive(Clone, Default)]
pub struct ScriptedLayer {
    pub script: Arc<Script>,
}

impl ScriptedLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AsyncSocketLayer for ScriptedLayer {
    fn create_socket(
        &self,
        socket: UdpSocket,
        _non_blocking: bool,
    ) -> io::Result<Box<dyn AsyncSocket>> {
        let index = self.script.created_sockets.fetch_add(1, Ordering::SeqCst);
        if *self.script.fail_socket_at.lock().unwrap() == Some(index) {
            return Err(io::Error::new(io::ErrorKind::Other, "scripted failure"));
        }
        self.script.live_sockets.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSocket {
            script: Arc::clone(&self.script),
            socket,
        }))
    }
}

struct ScriptedSocket {
    script: Arc<Script>,
    socket: UdpSocket,
}

impl AsyncSocket for ScriptedSocket {
    fn send_to(
        &self,
        target: SocketAddr,
        payload: PacketBuffer,
        completion: SendCompletion,
    ) -> std::result::Result<(), Rejected> {
        let length = payload.len();
        self.script.submissions.lock().unwrap().push(Submission {
            target,
            payload: payload.as_bytes().to_vec(),
        });
        payload.release();

        if let Some(code) = *self.script.reject_with.lock().unwrap() {
            return Err(Rejected::new(code, completion));
        }
        if self.script.complete_inline.load(Ordering::SeqCst) {
            completion.complete(code::OK, length);
            return Ok(());
        }
        let mut pending = self.script.pending.lock().unwrap();
        pending.push_back((completion, length));
        self.script
            .max_pending
            .fetch_max(pending.len(), Ordering::SeqCst);
        Ok(())
    }

    fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        self.socket.set_nonblocking(true)?;
        match self.socket.recv_from(buf) {
            Ok(received) => Ok(Some(received)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Drop for ScriptedSocket {
    fn drop(&mut self) {
        self.script.live_sockets.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Registry that fails its `fail_at`-th creation call (0-based).
pub struct FailingRegistry {
    pub inner: SessionRegistry,
    fail_at: usize,
    calls: AtomicUsize,
}

impl FailingRegistry {
    pub fn failing_at(fail_at: usize) -> Self {
        Self {
            inner: SessionRegistry::new(),
            fail_at,
            calls: AtomicUsize::new(0),
        }
    }

    fn check(&self, what: &str) -> Result<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_at {
            return Err(RtpError::Allocation(format!("scripted {} failure", what)));
        }
        Ok(())
    }
}

impl SourceRegistry for FailingRegistry {
    fn create_self_descriptor(&self, ssrc: u32) -> Result<SourceDescriptor> {
        self.check("descriptor")?;
        self.inner.create_self_descriptor(ssrc)
    }

    fn create_list(&self) -> Result<SourceList> {
        self.check("list")?;
        self.inner.create_list()
    }

    fn destroy_list(&self, list: SourceList) {
        self.inner.destroy_list(list);
    }

    fn release_descriptor(&self, descriptor: SourceDescriptor) {
        self.inner.release_descriptor(descriptor);
    }
}

pub fn bind_local() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_complete_ok_reports_each_pending_length() {
        let layer = ScriptedLayer::new();
        let socket = layer.create_socket(bind_local(), true).unwrap();
        let target: SocketAddr = "10.0.0.5:5004".parse().unwrap();
        let (tx, rx) = channel();

        for len in [172usize, 60] {
            let tx = tx.clone();
            let completion = SendCompletion::new(move |code, bytes| {
                let _ = tx.send((code, bytes));
            });
            socket
                .send_to(target, PacketBuffer::new(vec![0; len]), completion)
                .unwrap();
        }
        assert_eq!(layer.script.max_pending(), 2);

        assert!(layer.script.complete_ok());
        assert!(layer.script.complete_ok());
        assert!(!layer.script.complete_ok());
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![(code::OK, 172), (code::OK, 60)]);
    }
}
