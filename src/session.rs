//! Session state owned by the HTTP adapter
//!
//! One session holds at most one storage sink (installed when credentials
//! load) and at most one upload suspended on a replace-or-cancel question.
//! The state lives behind a mutex and is passed explicitly as axum state;
//! nothing here is process-global.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::storage::StorageSink;
use crate::upload::UploadFlow;

/// An upload flow parked in `AwaitingConfirmation`, keyed by a one-time id.
///
/// The flow keeps the buffered candidate bytes alive until the user
/// answers; dropping the entry releases them.
struct PendingUpload {
    id: Uuid,
    flow: UploadFlow,
    mode: &'static str,
}

#[derive(Default)]
struct Inner {
    sink: Option<Arc<dyn StorageSink>>,
    pending: Option<PendingUpload>,
}

/// Mutable per-session state: the sink handle and the pending confirmation
pub struct Session {
    inner: Mutex<Inner>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Install a freshly built sink, fixing the backend for the session.
    /// Any pending confirmation belonged to the previous sink and is
    /// discarded without touching the remote object.
    pub async fn install_sink(&self, sink: Arc<dyn StorageSink>) {
        let mut inner = self.inner.lock().await;
        if let Some(pending) = inner.pending.take() {
            warn!(upload_id = %pending.id, "discarding pending upload on credential reload");
        }
        inner.sink = Some(sink);
    }

    /// The current sink, if credentials have been loaded
    pub async fn sink(&self) -> Option<Arc<dyn StorageSink>> {
        self.inner.lock().await.sink.clone()
    }

    /// Park a flow awaiting confirmation, returning its one-time id.
    /// A single confirmation slot exists; a newer upload displaces an
    /// unanswered one.
    pub async fn park(&self, flow: UploadFlow, mode: &'static str) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self.inner.lock().await;
        if let Some(previous) = inner.pending.replace(PendingUpload { id, flow, mode }) {
            warn!(upload_id = %previous.id, "discarding pending upload displaced by a new attempt");
        }
        id
    }

    /// Claim the parked flow and its upload mode, if the id matches. A
    /// stale or unknown id leaves the slot untouched.
    pub async fn take_pending(&self, id: Uuid) -> Option<(UploadFlow, &'static str)> {
        let mut inner = self.inner.lock().await;
        if inner.pending.as_ref().is_some_and(|p| p.id == id) {
            inner.pending.take().map(|p| (p.flow, p.mode))
        } else {
            None
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
