// ABOUTME: Registry that manages the running backend instances
// ABOUTME: Starts them, reports their health, and routes replies back through a message's origin

use crate::error::BackendError;
use crate::message::{IncomingMessage, OutgoingMessage};
use crate::traits::{Backend, BackendState, SendOutcome};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Health status for a single backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendHealth {
    pub backend_id: String,
    pub kind: &'static str,
    pub state: BackendState,
}

/// Registry of configured backends, keyed by backend id
#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend. Uses backend_id() as the key and replaces any previous entry.
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        let id = backend.backend_id().to_string();
        if self.backends.insert(id.clone(), backend).is_some() {
            tracing::warn!(backend = %id, "Replacing previously registered backend");
        }
    }

    /// Get a backend by its ID.
    pub fn get(&self, backend_id: &str) -> Option<Arc<dyn Backend>> {
        self.backends.get(backend_id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// All registered backend IDs, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    /// Start every registered backend concurrently.
    ///
    /// Nothing is retried. Every registered backend gets exactly one result,
    /// sorted by id, so the caller decides whether a failure is fatal. A start
    /// that panics is reported as an `Initialization` error.
    pub async fn start_all(&self) -> Vec<(String, Result<(), BackendError>)> {
        let mut tasks = tokio::task::JoinSet::new();
        for (id, backend) in &self.backends {
            let id = id.clone();
            let backend = Arc::clone(backend);
            tasks.spawn(async move {
                let result = backend.start().await;
                (id, result)
            });
        }

        let mut results: BTreeMap<String, Result<(), BackendError>> = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, result)) => {
                    results.insert(id, result);
                }
                Err(e) => tracing::error!(error = %e, "Backend start task panicked"),
            }
        }

        // A panicked task loses its id along with its result
        for id in self.backends.keys() {
            results.entry(id.clone()).or_insert_with(|| {
                Err(BackendError::Initialization {
                    detail: "start task panicked".to_string(),
                })
            });
        }
        results.into_iter().collect()
    }

    /// Send through a specific backend
    pub async fn send(
        &self,
        backend_id: &str,
        message: &OutgoingMessage,
    ) -> Result<SendOutcome, BackendError> {
        let backend = self
            .get(backend_id)
            .ok_or_else(|| BackendError::UnknownBackend(backend_id.to_string()))?;
        backend.send(message).await
    }

    /// Answer an incoming message through the backend it arrived on
    pub async fn reply(
        &self,
        incoming: &IncomingMessage,
        text: impl Into<String>,
    ) -> Result<SendOutcome, BackendError> {
        self.send(&incoming.origin, &incoming.reply(text)).await
    }

    /// Lifecycle state of every registered backend
    pub fn health(&self) -> Vec<BackendHealth> {
        self.backends
            .iter()
            .map(|(id, backend)| BackendHealth {
                backend_id: id.clone(),
                kind: backend.kind(),
                state: backend.state(),
            })
            .collect()
    }
}
