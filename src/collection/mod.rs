//! Ordered, lock-guarded document sequence for one namespace.

use crate::types::Namespace;
use bson::Document;
use parking_lot::RwLock;

pub struct Collection {
    namespace: Namespace,
    docs: RwLock<Vec<Document>>,
}

impl Collection {
    pub fn new(namespace: Namespace) -> Self {
        Self { namespace, docs: RwLock::new(Vec::new()) }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the collection's `database@collection` name.
    pub fn name_str(&self) -> String {
        self.namespace.to_string()
    }

    /// Appends a document and returns its index.
    pub fn insert_document(&self, document: Document) -> usize {
        let mut docs = self.docs.write();
        docs.push(document);
        log::info!(target: "memdoc::audit", "insert ns={} index={}", self.namespace, docs.len() - 1);
        docs.len() - 1
    }

    pub fn insert_many(&self, documents: impl IntoIterator<Item = Document>) -> usize {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.extend(documents);
        let n = docs.len() - before;
        log::info!(target: "memdoc::audit", "insert_many ns={} count={n}", self.namespace);
        n
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Stable copy of the current contents for readers.
    pub fn snapshot(&self) -> Vec<Document> {
        self.docs.read().clone()
    }

    pub fn get(&self, index: usize) -> Option<Document> {
        self.docs.read().get(index).cloned()
    }

    pub fn replace_at(&self, index: usize, document: Document) -> bool {
        let mut docs = self.docs.write();
        match docs.get_mut(index) {
            Some(slot) => {
                *slot = document;
                log::info!(target: "memdoc::audit", "replace ns={} index={index}", self.namespace);
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&self, index: usize) -> Option<Document> {
        let mut docs = self.docs.write();
        if index >= docs.len() {
            return None;
        }
        log::info!(target: "memdoc::audit", "delete ns={} index={index}", self.namespace);
        Some(docs.remove(index))
    }

    /// Removes every document matching `pred`; returns how many were removed.
    pub fn remove_where(&self, mut pred: impl FnMut(&Document) -> bool) -> usize {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|d| !pred(d));
        let n = before - docs.len();
        if n > 0 {
            log::info!(target: "memdoc::audit", "delete ns={} count={n}", self.namespace);
        }
        n
    }

    pub fn clear(&self) {
        self.docs.write().clear();
        log::info!(target: "memdoc::audit", "clear ns={}", self.namespace);
    }

    /// Swaps in a whole new content set, as `$out` does.
    pub fn replace_all(&self, documents: Vec<Document>) {
        let n = documents.len();
        *self.docs.write() = documents;
        log::info!(target: "memdoc::audit", "replace_all ns={} count={n}", self.namespace);
    }

    /// Runs `f` with shared access to the documents.
    pub fn read<R>(&self, f: impl FnOnce(&[Document]) -> R) -> R {
        f(&self.docs.read())
    }

    /// Runs `f` holding the write lock, so every mutation inside it is serialised
    /// against other writers and readers.
    pub fn write<R>(&self, f: impl FnOnce(&mut Vec<Document>) -> R) -> R {
        f(&mut self.docs.write())
    }
}
