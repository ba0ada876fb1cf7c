//! Session controller: tracks items, runs conversion jobs, owns handles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::batch::export_filename;
use super::handles::{DisplayHandle, HandleStore};
use crate::codec::Codec;
use crate::convert::convert;
use crate::models::ConversionRequest;
use crate::models::OutputFormat;

/// Identifier of a loaded item within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(u64);

/// A finished conversion, referenced through a revocable handle.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub handle: DisplayHandle,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub size: usize,
}

/// Per-job state machine. A failure is terminal; a new request starts a
/// fresh cycle rather than resuming.
#[derive(Debug, Clone)]
pub enum JobState {
    Pending,
    Processing,
    Done(ConversionResult),
    Failed(String),
}

/// One loaded source image plus its conversion settings and state.
struct ConversionItem {
    source_name: String,
    source: Arc<Vec<u8>>,
    original_handle: DisplayHandle,
    request: ConversionRequest,
    state: JobState,
}

/// Conversion session controller.
///
/// Jobs are fire-and-forget tokio tasks with no concurrency cap and no
/// cancellation: a stale job that finishes after a newer one simply
/// overwrites the item's state, so the effective ordering is
/// last-resolved-wins, not last-issued-wins.
pub struct ConversionController {
    codec: Arc<dyn Codec>,
    handles: Arc<HandleStore>,
    items: Arc<RwLock<HashMap<u64, ConversionItem>>>,
    next_item_id: AtomicU64,
}

impl ConversionController {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self {
            codec,
            handles: Arc::new(HandleStore::new()),
            items: Arc::new(RwLock::new(HashMap::new())),
            next_item_id: AtomicU64::new(1),
        }
    }

    pub fn handles(&self) -> &HandleStore {
        &self.handles
    }

    /// Register a source image. Installs a display handle for the original
    /// and leaves the item pending until a conversion is requested.
    pub async fn add_item(
        &self,
        source_name: impl Into<String>,
        source: Vec<u8>,
        request: ConversionRequest,
    ) -> ItemId {
        let source = Arc::new(source);
        let original_handle = self.handles.install(source.clone());
        let id = self.next_item_id.fetch_add(1, Ordering::Relaxed);

        let item = ConversionItem {
            source_name: source_name.into(),
            source,
            original_handle,
            request,
            state: JobState::Pending,
        };
        self.items.write().await.insert(id, item);
        ItemId(id)
    }

    /// Replace an item's conversion settings. Does not start a job; callers
    /// re-trigger [`request_conversion`](Self::request_conversion) after.
    pub async fn update_request(&self, id: ItemId, request: ConversionRequest) {
        if let Some(item) = self.items.write().await.get_mut(&id.0) {
            item.request = request;
        }
    }

    /// Kick off a conversion job for an item.
    ///
    /// The returned task handle resolves when the job has finished and its
    /// result (or failure) has been recorded. Dropping it does not cancel
    /// the job.
    pub async fn request_conversion(&self, id: ItemId) -> Option<tokio::task::JoinHandle<()>> {
        let (source, request) = {
            let mut items = self.items.write().await;
            let item = items.get_mut(&id.0)?;
            item.state = JobState::Processing;
            (item.source.clone(), item.request.clone())
        };

        let codec = self.codec.clone();
        let handles = self.handles.clone();
        let items = self.items.clone();

        Some(tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                convert(codec.as_ref(), &source, &request)
            })
            .await;

            let mut items = items.write().await;
            let Some(item) = items.get_mut(&id.0) else {
                // Item was removed while the job ran; nothing to install.
                return;
            };

            match outcome {
                Ok(Ok(output)) => {
                    // Release the superseded result's handle before
                    // installing the replacement.
                    if let JobState::Done(previous) = &item.state {
                        handles.revoke(previous.handle);
                    }
                    let size = output.bytes.len();
                    let handle = handles.install(Arc::new(output.bytes));
                    item.state = JobState::Done(ConversionResult {
                        handle,
                        format: output.format,
                        width: output.width,
                        height: output.height,
                        size,
                    });
                }
                Ok(Err(e)) => {
                    tracing::warn!(item = id.0, error = %e, "Conversion failed");
                    if let JobState::Done(previous) = &item.state {
                        handles.revoke(previous.handle);
                    }
                    item.state = JobState::Failed(e.to_string());
                }
                Err(e) => {
                    tracing::error!(item = id.0, error = %e, "Conversion task panicked");
                    item.state = JobState::Failed("conversion task failed".to_string());
                }
            }
        }))
    }

    pub async fn item_state(&self, id: ItemId) -> Option<JobState> {
        self.items.read().await.get(&id.0).map(|i| i.state.clone())
    }

    /// The original source bytes, as long as the item exists.
    pub async fn original(&self, id: ItemId) -> Option<Arc<Vec<u8>>> {
        let items = self.items.read().await;
        let item = items.get(&id.0)?;
        self.handles.resolve(item.original_handle)
    }

    /// Remove an item, revoking the handles it owned (original and, when
    /// present, converted). Handles owned by other items stay live.
    pub async fn remove_item(&self, id: ItemId) {
        if let Some(item) = self.items.write().await.remove(&id.0) {
            self.handles.revoke(item.original_handle);
            if let JobState::Done(result) = &item.state {
                self.handles.revoke(result.handle);
            }
        }
    }

    /// Drop every item and revoke every handle the session owns.
    pub async fn clear(&self) {
        let mut items = self.items.write().await;
        for (_, item) in items.drain() {
            self.handles.revoke(item.original_handle);
            if let JobState::Done(result) = &item.state {
                self.handles.revoke(result.handle);
            }
        }
    }

    /// Export filenames and bytes of every successfully converted item, for
    /// archive bundling.
    pub async fn completed_exports(&self) -> Vec<(String, Arc<Vec<u8>>)> {
        let items = self.items.read().await;
        let mut exports = Vec::new();
        for item in items.values() {
            if let JobState::Done(result) = &item.state {
                if let Some(bytes) = self.handles.resolve(result.handle) {
                    exports.push((export_filename(&item.source_name, result.format), bytes));
                }
            }
        }
        exports.sort_by(|a, b| a.0.cmp(&b.0));
        exports
    }
}
