//! Appear/disappear bookkeeping keyed by identity.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use brook_core::ViewId;

use crate::resolver::isolate;

pub(crate) type Handler = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle nodes found by one traversal, in document order.
#[derive(Default)]
pub(crate) struct LifecycleScan {
    pub appear: Vec<(ViewId, Handler)>,
    pub disappear: Vec<(ViewId, Handler)>,
}

/// Tracks which lifecycle identities were present in the last committed
/// traversal.
#[derive(Default)]
pub(crate) struct LifecycleTracker {
    appeared: BTreeSet<ViewId>,
    disappear: BTreeMap<ViewId, Handler>,
}

impl std::fmt::Debug for LifecycleTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleTracker")
            .field("appeared", &self.appeared.len())
            .field("disappear", &self.disappear.len())
            .finish()
    }
}

impl LifecycleTracker {
    /// Fires `on_appear` for identities new in `scan` and `on_disappear` for
    /// identities that vanished since the previous commit.
    pub fn reconcile(&mut self, scan: LifecycleScan) {
        let mut appeared = BTreeSet::new();
        for (id, handler) in scan.appear {
            if !self.appeared.contains(&id) {
                tracing::trace!(%id, "appear");
                isolate(id, "on_appear", || handler());
            }
            appeared.insert(id);
        }

        let disappear: BTreeMap<ViewId, Handler> = scan.disappear.into_iter().collect();
        let previous = std::mem::replace(&mut self.disappear, disappear);
        for (id, handler) in previous {
            if !self.disappear.contains_key(&id) {
                tracing::trace!(%id, "disappear");
                isolate(id, "on_disappear", || handler());
            }
        }
        self.appeared = appeared;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> Handler {
        let log = log.clone();
        Arc::new(move || log.lock().unwrap().push(label))
    }

    #[test]
    fn appear_fires_once_and_disappear_on_removal() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let id = ViewId::ROOT.child(3);
        let mut tracker = LifecycleTracker::default();

        let scan = || LifecycleScan {
            appear: vec![(id, recorder(&log, "appear"))],
            disappear: vec![(id, recorder(&log, "disappear"))],
        };
        tracker.reconcile(scan());
        tracker.reconcile(scan());
        assert_eq!(*log.lock().unwrap(), ["appear"]);

        tracker.reconcile(LifecycleScan::default());
        assert_eq!(*log.lock().unwrap(), ["appear", "disappear"]);

        tracker.reconcile(scan());
        assert_eq!(*log.lock().unwrap(), ["appear", "disappear", "appear"]);
    }

    #[test]
    fn panicking_handler_is_contained() {
        let mut tracker = LifecycleTracker::default();
        tracker.reconcile(LifecycleScan {
            appear: vec![(ViewId::ROOT, Arc::new(|| panic!("boom")))],
            disappear: Vec::new(),
        });
        assert!(tracker.appeared.contains(&ViewId::ROOT));
    }
}
