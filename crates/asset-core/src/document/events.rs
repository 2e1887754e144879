//! Document lifecycle notifications.

use crate::document::Document;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Callback invoked after the document was written to disk.
pub type SaveHandler = Arc<dyn Fn(&Document) + Send + Sync + 'static>;

/// Handle returned by [`SaveHandlerRegistry::add`], used to remove the
/// handler again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveHandlerId(u64);

/// Registry of post-save handlers, owned by the host application.
#[derive(Default)]
pub struct SaveHandlerRegistry {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SaveHandlerId, SaveHandler)>>,
}

impl SaveHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handler: SaveHandler) -> SaveHandlerId {
        let id = SaveHandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, handler));
        debug!("Registered save handler {:?}", id);
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn remove(&self, id: SaveHandlerId) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        let removed = handlers.len() != before;
        if removed {
            debug!("Removed save handler {:?}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Invoke every handler for a document that was just saved.
    ///
    /// Handlers run outside the registry lock, so they may add or remove
    /// handlers themselves.
    pub fn notify_save_post(&self, document: &Document) {
        let snapshot: Vec<SaveHandler> = self
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(document);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SaveHandlerId, SaveHandler)>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SaveHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveHandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}
