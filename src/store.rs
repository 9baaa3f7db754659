// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::{Error, Graph, GraphSource};

#[derive(Debug)]
struct Snapshot {
    descriptor: String,
    graph: Arc<Graph>,
}

/// Holds the most recently loaded [Graph], keyed by the descriptor it was loaded from.
///
/// Loading the same descriptor again returns the very same graph, without consulting
/// the [GraphSource]. Loading a different descriptor replaces the graph as a whole.
///
/// The store may be shared between threads. Readers always observe either the old
/// or the new graph, as the snapshot is swapped with a single assignment. Routes
/// are computed on an `Arc<Graph>`, so no lock is held during searches.
#[derive(Debug, Default)]
pub struct GraphStore {
    snapshot: RwLock<Option<Arc<Snapshot>>>,

    /// Serializes loaders, so that a descriptor is fetched only once
    /// even if requested concurrently.
    loading: Mutex<()>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the graph for the provided descriptor, fetching it from `source`
    /// only if the store doesn't already hold it.
    ///
    /// On failure the store keeps the previous graph.
    pub fn load<S: GraphSource + ?Sized>(
        &self,
        descriptor: &str,
        source: &S,
    ) -> Result<Arc<Graph>, Error> {
        if let Some(g) = self.cached(descriptor) {
            log::debug!("reusing cached graph for {}", descriptor);
            return Ok(g);
        }

        let _guard = self.loading.lock().unwrap_or_else(PoisonError::into_inner);

        // Another loader might have finished while we were waiting
        if let Some(g) = self.cached(descriptor) {
            log::debug!("reusing cached graph for {}", descriptor);
            return Ok(g);
        }

        let description = source.fetch(descriptor).map_err(|cause| Error::GraphLoad {
            descriptor: descriptor.to_string(),
            cause,
        })?;

        let graph = Graph::from_description(&description)
            .map_err(|e| Error::from_build(descriptor, e))?;

        log::info!("loaded graph with {} nodes from {}", graph.len(), descriptor);

        let graph = Arc::new(graph);
        let snapshot = Arc::new(Snapshot {
            descriptor: descriptor.to_string(),
            graph: Arc::clone(&graph),
        });
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);

        Ok(graph)
    }

    /// Returns the currently held graph, if any.
    pub fn current(&self) -> Option<Arc<Graph>> {
        self.snapshot().map(|s| Arc::clone(&s.graph))
    }

    /// Returns the descriptor of the currently held graph, if any.
    pub fn descriptor(&self) -> Option<String> {
        self.snapshot().map(|s| s.descriptor.clone())
    }

    /// Drops the currently held graph, forcing the next [load](GraphStore::load) to fetch.
    pub fn invalidate(&self) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn cached(&self, descriptor: &str) -> Option<Arc<Graph>> {
        self.snapshot()
            .filter(|s| s.descriptor == descriptor)
            .map(|s| Arc::clone(&s.graph))
    }
}
