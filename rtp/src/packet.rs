//! Shared, immutable datagram buffers.

use std::fmt;
use std::sync::Arc;

/// One wire-ready datagram behind an atomic reference count.
///
/// The handle returned by [`PacketBuffer::new`] is the caller's reference.
/// Every other reference is taken with [`acquire`](PacketBuffer::acquire)
/// and given back with [`release`](PacketBuffer::release); the bytes are
/// freed when the last reference is released, on whichever thread that
/// happens. The payload never changes after construction.
pub struct PacketBuffer {
    payload: Arc<[u8]>,
}

impl PacketBuffer {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    pub fn from_slice(payload: &[u8]) -> Self {
        Self {
            payload: Arc::from(payload),
        }
    }

    /// Takes one more reference to the same bytes.
    pub fn acquire(&self) -> PacketBuffer {
        PacketBuffer {
            payload: Arc::clone(&self.payload),
        }
    }

    /// Gives this reference back. The storage goes away with the last one.
    pub fn release(self) {
        drop(self);
    }

    /// Number of live references, the caller's included.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.payload)
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// True when both handles refer to the same storage.
    pub fn same_buffer(&self, other: &PacketBuffer) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl AsRef<[u8]> for PacketBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.payload
    }
}

impl From<Vec<u8>> for PacketBuffer {
    fn from(payload: Vec<u8>) -> Self {
        PacketBuffer::new(payload)
    }
}

impl fmt::Debug for PacketBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketBuffer")
            .field("len", &self.len())
            .field("refs", &self.ref_count())
            .finish()
    }
}
