//! Registry of in-flight dispatches.
//!
//! Every dispatch that reaches the transport owns exactly one entry, keyed by
//! its [`TaskId`]. The entry is removed once, by whichever of completion or
//! cancellation takes it first; the other side then finds nothing and does
//! nothing.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::logging::targets;

/// Opaque identifier of a dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh random identifier.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The sentinel returned when a request could not be built.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the sentinel identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Handle that aborts one in-flight dispatch.
#[derive(Debug)]
pub struct CancelHandle {
    cancel_tx: oneshot::Sender<()>,
}

impl CancelHandle {
    /// Create a handle and the receiver the dispatch task waits on.
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        (Self { cancel_tx }, cancel_rx)
    }

    /// Signal the dispatch to abort.
    ///
    /// Returns `false` if the dispatch task is already gone.
    pub fn cancel(self) -> bool {
        self.cancel_tx.send(()).is_ok()
    }
}

/// Concurrency-safe map from [`TaskId`] to [`CancelHandle`].
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<TaskId, CancelHandle>>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dispatch.
    pub fn insert(&self, id: TaskId, handle: CancelHandle) {
        let replaced = self.tasks.lock().insert(id, handle);
        debug_assert!(replaced.is_none(), "task id {id} registered twice");
    }

    /// Remove and return the entry for `id`, if present.
    pub fn take(&self, id: TaskId) -> Option<CancelHandle> {
        self.tasks.lock().remove(&id)
    }

    /// Remove the entry for `id` and signal its dispatch to abort.
    ///
    /// Returns `true` if an entry was found. Unknown or already finished ids
    /// are a no-op.
    pub fn cancel(&self, id: TaskId) -> bool {
        match self.take(id) {
            Some(handle) => {
                if !handle.cancel() {
                    tracing::trace!(target: targets::REGISTRY, "Task {} exited before cancel signal", id);
                }
                true
            }
            None => false,
        }
    }

    /// Whether `id` is in flight.
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.lock().contains_key(&id)
    }

    /// Number of in-flight dispatches.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}
