//! Copy-on-write holder for the current reference catalog.

use std::sync::{Arc, RwLock};

use crate::catalog::ReferenceCatalog;

/// Readers take an `Arc` snapshot and resolve against it for the whole call;
/// writers swap in a complete new catalog. A resolution never sees a partial
/// update.
#[derive(Debug)]
pub struct SharedCatalog {
    current: RwLock<Arc<ReferenceCatalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: ReferenceCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<ReferenceCatalog> {
        // The guarded value is a single Arc, so a poisoned lock still holds a
        // complete catalog.
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in `catalog`, returning the previous one.
    pub fn replace(&self, catalog: ReferenceCatalog) -> Arc<ReferenceCatalog> {
        let next = Arc::new(catalog);
        let nodes = next.node_count();
        let previous = match self.current.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                std::mem::replace(&mut *guard, next)
            }
        };
        tracing::info!(nodes, "replaced reference catalog");
        previous
    }
}

impl Default for SharedCatalog {
    fn default() -> Self {
        Self::new(ReferenceCatalog::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSnapshot;
    use refdata_auth::SupervisoryNode;
    use refdata_core::{Code, SupervisoryNodeId};

    #[test]
    fn readers_keep_their_snapshot_across_a_swap() {
        let shared = SharedCatalog::default();
        let before = shared.snapshot();

        let snapshot = CatalogSnapshot {
            supervisory_nodes: vec![SupervisoryNode::new(
                SupervisoryNodeId::new(),
                Code::new("SN1").unwrap(),
                "Region",
            )],
            ..CatalogSnapshot::default()
        };
        let previous = shared.replace(ReferenceCatalog::from_snapshot(snapshot).unwrap());

        assert_eq!(before.node_count(), 0);
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(shared.snapshot().node_count(), 1);
    }
}
