//! Test doubles for live sources and clip storage.

use crate::{
    ClipError, ClipRecord, ClipResult, ClipStorage, ClipStore, ClipSummary, FragmentSender,
    LiveSource, LiveStream, StoreLocation,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;

#[derive(Default)]
struct ManualInner {
    sender: Option<FragmentSender>,
    events: Vec<&'static str>,
}

/// Test-side handle for pushing fragments into a [`ManualStream`].
#[derive(Clone, Default)]
pub(crate) struct ManualHandle {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualHandle {
    /// Emit a fragment; returns `false` if no stream is currently started.
    pub(crate) fn emit(&self, fragment: Vec<u8>) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.sender.as_ref() {
            Some(sender) => sender.send(fragment).is_ok(),
            None => false,
        }
    }

    /// Stream calls observed so far, in order.
    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .events
            .clone()
    }

    fn record(&self, event: &'static str) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .events
            .push(event);
    }
}

/// Live source whose stream availability is decided by the test.
pub(crate) struct ManualSource {
    available: bool,
    handle: ManualHandle,
}

impl ManualSource {
    pub(crate) fn available() -> Self {
        Self {
            available: true,
            handle: ManualHandle::default(),
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            available: false,
            handle: ManualHandle::default(),
        }
    }

    pub(crate) fn handle(&self) -> ManualHandle {
        self.handle.clone()
    }
}

impl LiveSource for ManualSource {
    type Stream = ManualStream;

    fn acquire(&mut self) -> Option<ManualStream> {
        self.available.then(|| ManualStream {
            handle: self.handle.clone(),
        })
    }
}

pub(crate) struct ManualStream {
    handle: ManualHandle,
}

impl LiveStream for ManualStream {
    fn start(&mut self, fragments: FragmentSender) -> ClipResult<()> {
        self.handle
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sender = Some(fragments);
        self.handle.record("start");
        Ok(())
    }

    fn pause(&mut self) -> ClipResult<()> {
        self.handle.record("pause");
        Ok(())
    }

    fn resume(&mut self) -> ClipResult<()> {
        self.handle.record("resume");
        Ok(())
    }

    fn stop(&mut self) -> ClipResult<()> {
        self.handle
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sender = None;
        self.handle.record("stop");
        Ok(())
    }
}

/// Open a fresh in-memory store.
#[allow(clippy::unwrap_used)]
pub(crate) async fn memory_store() -> ClipStore {
    let store = ClipStore::new(StoreLocation::InMemory, "clips").unwrap();
    store.open().await.unwrap();
    store
}

/// In-memory store that counts inserts and fails on demand.
pub(crate) struct ScriptedStore {
    inner: ClipStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    inserts: AtomicUsize,
}

impl ScriptedStore {
    pub(crate) async fn new() -> Self {
        Self {
            inner: memory_store().await,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            inserts: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    #[track_caller]
    fn check_reads(&self) -> ClipResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClipError::ReadFailed {
                reason: "scripted read failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Insert attempts, successful or not.
    pub(crate) fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

impl ClipStorage for ScriptedStore {
    async fn insert(&self, name: String, data: Vec<u8>) -> ClipResult<i64> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClipError::WriteFailed {
                reason: "scripted insert failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.inner.insert(name, data).await
    }

    async fn list_all(&self) -> ClipResult<Vec<ClipRecord>> {
        self.check_reads()?;
        self.inner.list_all().await
    }

    async fn list_summaries(&self) -> ClipResult<Vec<ClipSummary>> {
        self.check_reads()?;
        self.inner.list_summaries().await
    }

    async fn get_by_id(&self, id: i64) -> ClipResult<Option<ClipRecord>> {
        self.check_reads()?;
        self.inner.get_by_id(id).await
    }

    async fn delete_by_id(&self, id: i64) -> ClipResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClipError::WriteFailed {
                reason: "scripted delete failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.inner.delete_by_id(id).await
    }
}
