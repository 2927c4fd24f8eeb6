//! In-process annotation store.

use std::cell::{Cell, RefCell};

use crate::backend::traits::{AnnotationBackend, SaveReceipt};
use crate::constants::SAVE_SUCCESS_MESSAGE;
use crate::error::BackendError;
use crate::model::AnnotationCollection;

/// Keeps the collection in memory. Single-threaded by construction.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    collection: RefCell<AnnotationCollection>,
    saves: Cell<usize>,
}

impl InMemoryBackend {
    pub fn new(collection: AnnotationCollection) -> Self {
        Self {
            collection: RefCell::new(collection),
            saves: Cell::new(0),
        }
    }

    /// Copy of what is currently stored.
    pub fn stored(&self) -> AnnotationCollection {
        self.collection.borrow().clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl AnnotationBackend for InMemoryBackend {
    fn fetch_all(&self) -> Result<AnnotationCollection, BackendError> {
        Ok(self.collection.borrow().clone())
    }

    fn persist(&self, collection: &AnnotationCollection) -> Result<SaveReceipt, BackendError> {
        *self.collection.borrow_mut() = collection.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(SaveReceipt::new(SAVE_SUCCESS_MESSAGE))
    }
}
