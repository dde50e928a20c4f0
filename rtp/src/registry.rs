//! RTP source bookkeeping owned by a sender.
//!
//! The sender's own source is a member and an active sender of its session
//! from creation to teardown. The dispatch path never reads these.

use crate::error::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A participant identified by its SSRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpSource {
    pub ssrc: u32,
}

impl RtpSource {
    pub fn new(ssrc: u32) -> Self {
        Self { ssrc }
    }
}

/// Shared handle to an [`RtpSource`].
pub type SourceDescriptor = Arc<RtpSource>;

/// Set of sources (session members, or active senders).
#[derive(Debug, Default)]
pub struct SourceList {
    sources: Mutex<Vec<SourceDescriptor>>,
}

impl SourceList {
    pub(crate) fn insert(&self, source: SourceDescriptor) -> bool {
        let mut sources = self.sources.lock().unwrap_or_else(|p| p.into_inner());
        if sources.iter().any(|s| s.ssrc == source.ssrc) {
            return false;
        }
        sources.push(source);
        true
    }

    pub(crate) fn remove(&self, ssrc: u32) -> Option<SourceDescriptor> {
        let mut sources = self.sources.lock().unwrap_or_else(|p| p.into_inner());
        let index = sources.iter().position(|s| s.ssrc == ssrc)?;
        Some(sources.remove(index))
    }

    pub fn contains(&self, ssrc: u32) -> bool {
        let sources = self.sources.lock().unwrap_or_else(|p| p.into_inner());
        sources.iter().any(|s| s.ssrc == ssrc)
    }

    pub fn len(&self) -> usize {
        self.sources.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates and disposes of source descriptors and lists.
pub trait SourceRegistry: Send + Sync {
    fn create_self_descriptor(&self, ssrc: u32) -> Result<SourceDescriptor>;
    fn create_list(&self) -> Result<SourceList>;
    fn destroy_list(&self, list: SourceList);
    fn release_descriptor(&self, descriptor: SourceDescriptor);
}

/// In-process registry. Keeps counts of what is outstanding.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    live_lists: AtomicUsize,
    live_descriptors: AtomicUsize,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_lists(&self) -> usize {
        self.live_lists.load(Ordering::Acquire)
    }

    pub fn live_descriptors(&self) -> usize {
        self.live_descriptors.load(Ordering::Acquire)
    }
}

impl SourceRegistry for SessionRegistry {
    fn create_self_descriptor(&self, ssrc: u32) -> Result<SourceDescriptor> {
        self.live_descriptors.fetch_add(1, Ordering::AcqRel);
        Ok(Arc::new(RtpSource::new(ssrc)))
    }

    fn create_list(&self) -> Result<SourceList> {
        self.live_lists.fetch_add(1, Ordering::AcqRel);
        Ok(SourceList::default())
    }

    fn destroy_list(&self, list: SourceList) {
        self.live_lists.fetch_sub(1, Ordering::AcqRel);
        drop(list);
    }

    fn release_descriptor(&self, descriptor: SourceDescriptor) {
        self.live_descriptors.fetch_sub(1, Ordering::AcqRel);
        drop(descriptor);
    }
}

/// The self source and the two lists a sender owns. The self source sits
/// in both lists while the set is alive.
///
/// Whatever has been created is handed back to the registry on drop, so a
/// half-built set unwinds cleanly when construction fails midway.
pub(crate) struct SessionSources {
    registry: Arc<dyn SourceRegistry>,
    self_source: Option<SourceDescriptor>,
    members: Option<SourceList>,
    senders: Option<SourceList>,
}

impl SessionSources {
    pub fn create(registry: Arc<dyn SourceRegistry>, ssrc: u32) -> Result<Self> {
        let mut sources = SessionSources {
            registry,
            self_source: None,
            members: None,
            senders: None,
        };
        let self_source = sources.registry.create_self_descriptor(ssrc)?;
        sources.self_source = Some(Arc::clone(&self_source));

        let members = sources.registry.create_list()?;
        members.insert(Arc::clone(&self_source));
        sources.members = Some(members);

        let senders = sources.registry.create_list()?;
        senders.insert(self_source);
        sources.senders = Some(senders);
        Ok(sources)
    }

    pub fn ssrc(&self) -> Option<u32> {
        self.self_source.as_ref().map(|s| s.ssrc)
    }

    #[cfg(test)]
    pub fn members(&self) -> Option<&SourceList> {
        self.members.as_ref()
    }

    #[cfg(test)]
    pub fn senders(&self) -> Option<&SourceList> {
        self.senders.as_ref()
    }
}

impl Drop for SessionSources {
    fn drop(&mut self) {
        let ssrc = self.ssrc();
        for list in [self.members.take(), self.senders.take()].into_iter().flatten() {
            if let Some(ssrc) = ssrc {
                list.remove(ssrc);
            }
            self.registry.destroy_list(list);
        }
        if let Some(source) = self.self_source.take() {
            self.registry.release_descriptor(source);
        }
    }
}
