use crate::aggregate::{AggregateOutput, Pipeline};
use crate::collection::Collection;
use crate::errors::DbError;
use crate::types::Namespace;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of collections keyed by namespace.
#[derive(Default)]
pub struct Engine {
    collections: RwLock<HashMap<Namespace, Arc<Collection>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("collections", &self.list_namespaces()).finish()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collection for `ns`, creating it empty on first access.
    pub fn get_or_create(&self, ns: &Namespace) -> Arc<Collection> {
        if let Some(c) = self.collections.read().get(ns) {
            return c.clone();
        }
        let mut map = self.collections.write();
        map.entry(ns.clone())
            .or_insert_with(|| {
                log::info!(target: "memdoc::audit", "create ns={ns}");
                Arc::new(Collection::new(ns.clone()))
            })
            .clone()
    }

    pub fn get_collection(&self, ns: &Namespace) -> Option<Arc<Collection>> {
        self.collections.read().get(ns).cloned()
    }

    pub fn drop_collection(&self, ns: &Namespace) -> bool {
        let dropped = self.collections.write().remove(ns).is_some();
        if dropped {
            log::info!(target: "memdoc::audit", "drop ns={ns}");
        }
        dropped
    }

    pub fn list_namespaces(&self) -> Vec<Namespace> {
        let mut names: Vec<Namespace> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Runs `pipeline` over a snapshot of `ns`. When the pipeline names an `$out`
    /// target, that collection (in the same database) is replaced with the result.
    ///
    /// # Errors
    /// `NoSuchCollection` when `ns` has never been created.
    pub fn aggregate(&self, ns: &Namespace, pipeline: &Pipeline) -> Result<AggregateOutput, DbError> {
        let source = self.get_collection(ns).ok_or_else(|| DbError::NoSuchCollection(ns.to_string()))?;
        let output = pipeline.run(source.snapshot());
        if let Some(target) = &output.out {
            let target = Namespace::new(ns.database.clone(), target.clone());
            self.get_or_create(&target).replace_all(output.documents.clone());
        }
        Ok(output)
    }
}
