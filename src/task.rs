//! Async units keyed by node identity.
//!
//! A task node's future starts on the first committed traversal that
//! contains its identity and is aborted on the first one that does not.
//! Completion is reported on a channel so the host can schedule another
//! traversal; the resolver itself never blocks on a future.

use std::collections::HashMap;

use async_channel::{Receiver, Sender};
use futures::future::{AbortHandle, abortable};
use futures::task::{Spawn, SpawnExt};

use brook_core::ViewId;
use brook_core::node::TaskAction;

use crate::error::TaskError;
use crate::resolver::isolate;

/// Sent when an async unit finishes, asking the host for a new traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdateRequest {
    /// Identity of the task node whose unit completed.
    pub id: ViewId,
}

pub(crate) struct TaskRegistry {
    spawner: Option<Box<dyn Spawn + Send>>,
    running: HashMap<ViewId, AbortHandle>,
    sender: Sender<UpdateRequest>,
    receiver: Receiver<UpdateRequest>,
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("spawner", &self.spawner.is_some())
            .field("running", &self.running.len())
            .finish_non_exhaustive()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        let (sender, receiver) = async_channel::unbounded();
        Self {
            spawner: None,
            running: HashMap::new(),
            sender,
            receiver,
        }
    }
}

impl TaskRegistry {
    pub fn set_spawner(&mut self, spawner: Box<dyn Spawn + Send>) {
        self.spawner = Some(spawner);
    }

    pub fn receiver(&self) -> Receiver<UpdateRequest> {
        self.receiver.clone()
    }

    /// Identities whose unit has been started and not aborted.
    pub fn running(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.running.keys().copied()
    }

    /// Starts units for new identities and aborts units whose identity is
    /// gone. Finished units stay registered until their node disappears.
    pub fn reconcile(&mut self, current: Vec<(ViewId, TaskAction)>) {
        let present: HashMap<ViewId, TaskAction> = current.into_iter().collect();

        self.running.retain(|id, handle| {
            let keep = present.contains_key(id);
            if !keep {
                tracing::debug!(%id, "aborting task");
                handle.abort();
            }
            keep
        });

        for (id, action) in present {
            if self.running.contains_key(&id) {
                continue;
            }
            match self.start(id, &action) {
                Ok(handle) => {
                    self.running.insert(id, handle);
                }
                Err(TaskError::NoSpawner(id)) => {
                    tracing::debug!(%id, "no spawner configured, task ignored");
                }
                Err(error) => tracing::error!(%id, %error, "task failed to start"),
            }
        }
    }

    fn start(&self, id: ViewId, action: &TaskAction) -> Result<AbortHandle, TaskError> {
        let spawner = self.spawner.as_ref().ok_or(TaskError::NoSpawner(id))?;
        let future = isolate(id, "task", || action()).ok_or(TaskError::ActionPanicked(id))?;
        let (future, handle) = abortable(future);
        let sender = self.sender.clone();
        spawner.spawn(async move {
            if future.await.is_ok() {
                // The receiver lives as long as the registry.
                let _ = sender.send(UpdateRequest { id }).await;
            }
        })?;
        tracing::debug!(%id, "task started");
        Ok(handle)
    }
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        for handle in self.running.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::{ThreadPool, block_on};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(started: &Arc<AtomicUsize>) -> TaskAction {
        let started = started.clone();
        Arc::new(move || {
            started.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        })
    }

    #[test]
    fn finished_unit_requests_update_and_is_not_restarted() {
        let pool = ThreadPool::new().unwrap();
        let mut registry = TaskRegistry::default();
        registry.set_spawner(Box::new(pool));
        let started = Arc::new(AtomicUsize::new(0));
        let id = ViewId::ROOT.child(1);

        registry.reconcile(vec![(id, counting(&started))]);
        let request = block_on(registry.receiver().recv()).unwrap();
        assert_eq!(request, UpdateRequest { id });

        registry.reconcile(vec![(id, counting(&started))]);
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(registry.running().count(), 1);
    }

    #[test]
    fn removed_identity_aborts_its_unit() {
        let pool = ThreadPool::new().unwrap();
        let mut registry = TaskRegistry::default();
        registry.set_spawner(Box::new(pool));
        let pending: TaskAction = Arc::new(|| Box::pin(futures::future::pending()));

        registry.reconcile(vec![(ViewId::ROOT, pending)]);
        assert_eq!(registry.running().count(), 1);
        registry.reconcile(Vec::new());
        assert_eq!(registry.running().count(), 0);
        assert!(registry.receiver().try_recv().is_err());
    }

    #[test]
    fn without_spawner_tasks_are_ignored() {
        let mut registry = TaskRegistry::default();
        let started = Arc::new(AtomicUsize::new(0));
        registry.reconcile(vec![(ViewId::ROOT, counting(&started))]);
        assert_eq!(started.load(Ordering::SeqCst), 0);
        assert_eq!(registry.running().count(), 0);
    }
}
