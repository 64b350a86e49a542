//! Turns a view graph into a render plan.
//!
//! One [`Resolver::resolve`] call is one traversal:
//!
//! 1. **Layout.** The root is offered the viewport and the graph is measured
//!    and placed top-down, threading the environment along.
//! 2. **Emission.** The placed tree is walked depth first. Preference writes
//!    are folded into the nearest reader, render entries are produced with
//!    bounds snapped to the pixel grid.
//! 3. **Derived content.** If a reader draws content from its aggregated
//!    value, the first pass only collects the values and a second pass lays
//!    the derived content out. Nothing of the first pass is committed.
//! 4. **Commit.** Reader callbacks run once, lifecycle handlers and async
//!    units are reconciled against the previous traversal, and the plan
//!    becomes [`last_plan`](Resolver::last_plan).
//!
//! Panics raised by user closures are contained at the node that raised them.
//! Only recursion and budget overruns abort a traversal, and they leave the
//! previous plan in place.

mod emit;
mod measure;

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use async_channel::Receiver;
use futures::task::Spawn;

use brook_core::env::defaults;
use brook_core::preference::AnyValue;
use brook_core::{
    Dimensions, Environment, MonospaceMeasurer, Node, PlatformTextMeasurer, PreferenceKey,
    PreferenceSlot, ProposalSize, Rect, RenderPlan, Renderer, Size, SubView, ViewId, traverse,
};

use self::emit::{Emission, Emitter};
use self::measure::{NodeProxy, Pass};
use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::lifecycle::LifecycleTracker;
use crate::logging::panic_message;
use crate::task::{TaskRegistry, UpdateRequest};

/// Resolved geometry of one node in the last committed traversal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    /// Bounds in root coordinates, before pixel snapping.
    pub rect: Rect,
    /// What the node answered, guides included.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub dimensions: Dimensions,
    /// The proposal the node was placed with.
    pub proposal: ProposalSize,
}

/// Runs `f`, turning a panic into `None` and an error log attributed to `id`.
pub(crate) fn isolate<T>(id: ViewId, what: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::error!(
                %id,
                what,
                message = %panic_message(&*payload),
                "contained panic in user code"
            );
            None
        }
    }
}

/// Resolves view graphs against a viewport.
///
/// A resolver owns everything that outlives one traversal: the last plan,
/// per-node geometry, lifecycle state and running async units. Independent
/// resolvers share nothing and can live on different threads.
pub struct Resolver {
    config: ResolverConfig,
    measurer: Arc<dyn PlatformTextMeasurer>,
    observers: Vec<PreferenceSlot>,
    observed: HashMap<TypeId, AnyValue>,
    geometry: BTreeMap<ViewId, Geometry>,
    last_plan: Option<Arc<RenderPlan>>,
    lifecycle: LifecycleTracker,
    tasks: TaskRegistry,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("observers", &self.observers)
            .field("nodes", &self.geometry.len())
            .field("lifecycle", &self.lifecycle)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl Resolver {
    /// Creates a resolver. Seals the environment-defaults registry.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        defaults::seal();
        Self {
            config,
            measurer: Arc::new(MonospaceMeasurer::default()),
            observers: Vec::new(),
            observed: HashMap::new(),
            geometry: BTreeMap::new(),
            last_plan: None,
            lifecycle: LifecycleTracker::default(),
            tasks: TaskRegistry::default(),
        }
    }

    /// Uses `measurer` for text leaves.
    #[must_use]
    pub fn with_measurer(mut self, measurer: impl PlatformTextMeasurer + 'static) -> Self {
        self.measurer = Arc::new(measurer);
        self
    }

    /// Runs async units on `spawner`.
    #[must_use]
    pub fn with_spawner(mut self, spawner: impl Spawn + Send + 'static) -> Self {
        self.tasks.set_spawner(Box::new(spawner));
        self
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Aggregates `K` over the whole graph on every traversal, readable with
    /// [`preference`](Self::preference).
    pub fn observe<K: PreferenceKey>(&mut self) {
        let slot = PreferenceSlot::of::<K>();
        if !self.observers.contains(&slot) {
            self.observers.push(slot);
        }
    }

    /// Value of an observed key after the last committed traversal.
    ///
    /// Returns `None` if `K` is not observed or nothing was committed yet.
    #[must_use]
    pub fn preference<K: PreferenceKey>(&self) -> Option<K::Value> {
        self.observed
            .get(&TypeId::of::<K>())
            .and_then(|value| value.downcast_ref::<K::Value>())
            .cloned()
    }

    /// The plan of the last successful traversal.
    #[must_use]
    pub fn last_plan(&self) -> Option<Arc<RenderPlan>> {
        self.last_plan.clone()
    }

    /// Geometry of `id` in the last successful traversal.
    #[must_use]
    pub fn geometry(&self, id: ViewId) -> Option<&Geometry> {
        self.geometry.get(&id)
    }

    /// Receives a request whenever an async unit finishes.
    #[must_use]
    pub fn update_requests(&self) -> Receiver<UpdateRequest> {
        self.tasks.receiver()
    }

    /// Identities whose async unit is currently registered.
    #[must_use]
    pub fn running_tasks(&self) -> Vec<ViewId> {
        let mut running: Vec<ViewId> = self.tasks.running().collect();
        running.sort_unstable();
        running
    }

    /// Resolves `graph` against `viewport` and commits the result.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the viewport is invalid, the graph nests
    /// deeper than `max_depth`, or layout needs more than `measure_budget`
    /// measurements. The previous plan stays current in every case.
    pub fn resolve(
        &mut self,
        graph: &Node,
        viewport: Size,
    ) -> Result<Arc<RenderPlan>, ResolveError> {
        let span = tracing::debug_span!("resolve", width = viewport.width, height = viewport.height);
        let _enter = span.enter();

        let valid = |value: f32| value.is_finite() && value >= 0.0;
        if !valid(viewport.width) || !valid(viewport.height) {
            return Err(ResolveError::InvalidViewport(viewport));
        }

        let mut emission = self.run_pass(graph, viewport, &HashMap::new())?;
        if !emission.derived.is_empty() {
            tracing::debug!(
                readers = emission.derived.len(),
                "laying out preference-derived content"
            );
            let derived = std::mem::take(&mut emission.derived);
            emission = self.run_pass(graph, viewport, &derived)?;
        }
        Ok(self.commit(emission))
    }

    /// Resolves and hands the plan to `renderer` once on success.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve). Nothing is presented on error.
    pub fn update(
        &mut self,
        graph: &Node,
        viewport: Size,
        renderer: &mut dyn Renderer,
    ) -> Result<(), ResolveError> {
        let plan = self.resolve(graph, viewport)?;
        renderer.present(plan);
        Ok(())
    }

    fn run_pass(
        &self,
        graph: &Node,
        viewport: Size,
        derived: &HashMap<ViewId, AnyValue>,
    ) -> Result<Emission, ResolveError> {
        let pass = Pass::new(&self.config, &*self.measurer, &self.geometry, derived);
        let root = NodeProxy::root(&pass, graph.clone(), Environment::new());
        let proposal = ProposalSize::exact(viewport);
        let dimensions = root.measure(proposal);
        let origin = self
            .config
            .root_alignment
            .position(&Rect::from_size(viewport), &dimensions);
        let tree = root.place(proposal, Rect::new(origin, dimensions.size()));
        if let Some(error) = pass.take_failure() {
            return Err(error);
        }
        tracing::trace!(measured = pass.measured(), "layout done");

        let mut emitter = Emitter::new(&self.config, &*self.measurer, &self.observers);
        traverse(&tree, &mut emitter);
        Ok(emitter.finish())
    }

    fn commit(&mut self, emission: Emission) -> Arc<RenderPlan> {
        let Emission {
            entries,
            callbacks,
            derived: _,
            observed,
            geometry,
            lifecycle,
            tasks,
        } = emission;

        for (id, callback, value) in callbacks {
            isolate(id, "preference callback", || callback(&value));
        }
        self.observed = observed
            .into_iter()
            .map(|(slot, value)| (slot.type_id(), value))
            .collect();
        self.geometry = geometry;
        self.lifecycle.reconcile(lifecycle);
        self.tasks.reconcile(tasks);

        let plan = Arc::new(RenderPlan::new(entries));
        tracing::debug!(entries = plan.len(), nodes = self.geometry.len(), "committed plan");
        self.last_plan = Some(plan.clone());
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn resolver_is_send() {
        assert_send::<Resolver>();
    }

    #[test]
    fn invalid_viewport_is_rejected() {
        let mut resolver = Resolver::default();
        let error = resolver
            .resolve(&Node::empty(), Size::new(f32::NAN, 10.0))
            .unwrap_err();
        assert!(matches!(error, ResolveError::InvalidViewport(_)));
        assert!(resolver.last_plan().is_none());
    }

    #[test]
    fn isolate_reports_panics_as_none() {
        assert_eq!(isolate(ViewId::ROOT, "test", || 4), Some(4));
        assert_eq!(isolate(ViewId::ROOT, "test", || -> i32 { panic!("nope") }), None);
    }
}
