//! Layout phase: size negotiation and placement.
//!
//! Every node of the graph is wrapped in a [`NodeProxy`] that implements
//! [`SubView`], so layout algorithms negotiate with the resolver exactly as
//! they do with test mocks. Answers are memoised per `(identity, proposal)`
//! for the duration of one pass.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use brook_core::node::{DerivedPlacement, GeometryProxy, PreferenceReader, ReaderAction};
use brook_core::preference::AnyValue;
use brook_core::{
    AlignmentGuide, ChildPlacement, Dimensions, Environment, FontKey, Layout, Node, NodeKind,
    PlatformTextMeasurer, ProposalSize, Rect, Size, StretchAxis, SubView, Traversable, ViewId,
};
use brook_layout::OverlayLayout;

use super::{Geometry, isolate};
use crate::config::ResolverConfig;
use crate::error::ResolveError;

/// Ideal size of a geometry reader asked for its ideal size.
const GEOMETRY_READER_IDEAL: Size = Size::new(10.0, 10.0);

type CacheKey = (ViewId, Option<u32>, Option<u32>);

fn cache_key(id: ViewId, proposal: ProposalSize) -> CacheKey {
    (
        id,
        proposal.width.map(f32::to_bits),
        proposal.height.map(f32::to_bits),
    )
}

/// State shared by every proxy of one layout pass.
pub(crate) struct Pass<'r> {
    config: &'r ResolverConfig,
    measurer: &'r dyn PlatformTextMeasurer,
    committed: &'r BTreeMap<ViewId, Geometry>,
    derived: &'r HashMap<ViewId, AnyValue>,
    cache: RefCell<HashMap<CacheKey, Dimensions>>,
    expansions: RefCell<HashMap<ViewId, Node>>,
    measured: Cell<usize>,
    failure: RefCell<Option<ResolveError>>,
}

impl<'r> Pass<'r> {
    pub fn new(
        config: &'r ResolverConfig,
        measurer: &'r dyn PlatformTextMeasurer,
        committed: &'r BTreeMap<ViewId, Geometry>,
        derived: &'r HashMap<ViewId, AnyValue>,
    ) -> Self {
        Self {
            config,
            measurer,
            committed,
            derived,
            cache: RefCell::new(HashMap::new()),
            expansions: RefCell::new(HashMap::new()),
            measured: Cell::new(0),
            failure: RefCell::new(None),
        }
    }

    /// Number of uncached measurements performed so far.
    pub fn measured(&self) -> usize {
        self.measured.get()
    }

    /// The structural failure that aborted the pass, if any.
    pub fn take_failure(&self) -> Option<ResolveError> {
        self.failure.borrow_mut().take()
    }

    fn failed(&self) -> bool {
        self.failure.borrow().is_some()
    }

    fn fail(&self, error: ResolveError) {
        let mut failure = self.failure.borrow_mut();
        if failure.is_none() {
            tracing::error!(%error, "layout pass aborted");
            *failure = Some(error);
        }
    }

    /// Checks the recursion guard. Returns false once the pass is aborted.
    fn enter(&self, id: ViewId, depth: usize) -> bool {
        if self.failed() {
            return false;
        }
        if depth > self.config.max_depth {
            self.fail(ResolveError::DepthExceeded {
                max_depth: self.config.max_depth,
                id,
            });
            return false;
        }
        true
    }

    fn fallback(&self, id: ViewId) -> Dimensions {
        self.committed
            .get(&id)
            .map_or_else(Dimensions::zero, |geometry| geometry.dimensions.clone())
    }

    /// Content a derived-value reader draws in this pass, built once.
    fn derived_content(&self, id: ViewId, reader: &PreferenceReader) -> Option<Node> {
        let ReaderAction::Derived { build, .. } = reader.action() else {
            return None;
        };
        let value = self.derived.get(&id)?;
        if let Some(node) = self.expansions.borrow().get(&id) {
            return Some(node.clone());
        }
        let node = isolate(id, "derived content", || build(value)).unwrap_or_else(Node::empty);
        self.expansions.borrow_mut().insert(id, node.clone());
        Some(node)
    }

    fn measure(&self, proxy: &NodeProxy<'_, 'r>, proposal: ProposalSize) -> Dimensions {
        if !self.enter(proxy.id, proxy.depth) {
            return Dimensions::zero();
        }
        let key = cache_key(proxy.id, proposal);
        let cached = self.cache.borrow().get(&key).cloned();
        if let Some(dimensions) = cached {
            return dimensions;
        }

        let count = self.measured.get() + 1;
        self.measured.set(count);
        if count > self.config.measure_budget {
            self.fail(ResolveError::BudgetExhausted {
                budget: self.config.measure_budget,
            });
            return Dimensions::zero();
        }

        let dimensions = isolate(proxy.id, "measure", || proxy.measure_uncached(proposal))
            .unwrap_or_else(|| self.fallback(proxy.id));
        let dimensions = sanitize(proxy, proposal, dimensions);
        self.cache.borrow_mut().insert(key, dimensions.clone());
        dimensions
    }
}

/// How a node relates to its children during layout.
enum Structure<'p, 'r> {
    Leaf,
    /// Transparent to layout: measures and places as its content.
    Wrapper(Option<NodeProxy<'p, 'r>>),
    Container(Arc<dyn Layout>, Vec<NodeProxy<'p, 'r>>),
}

/// A node at a concrete position, answering layout queries.
#[derive(Clone)]
pub(crate) struct NodeProxy<'p, 'r> {
    pass: &'p Pass<'r>,
    node: Node,
    id: ViewId,
    env: Environment,
    depth: usize,
    derived: bool,
}

impl<'p, 'r> NodeProxy<'p, 'r> {
    pub fn root(pass: &'p Pass<'r>, node: Node, env: Environment) -> Self {
        Self {
            pass,
            node,
            id: ViewId::ROOT,
            env,
            depth: 0,
            derived: false,
        }
    }

    /// The child at `index`. A keyed child is identified by its key within
    /// this node, wherever it sits among its siblings.
    fn nested(&self, node: Node, index: usize, env: Environment) -> Self {
        let id = match node.kind() {
            NodeKind::Identity(key) => self.id.explicit(*key),
            _ => self.id.child(index),
        };
        Self {
            pass: self.pass,
            node,
            id,
            env,
            depth: self.depth + 1,
            derived: false,
        }
    }

    fn content(&self) -> Option<Self> {
        let child = self.node.child(0)?.clone();
        let env = match self.node.kind() {
            NodeKind::Environment(write) => {
                isolate(self.id, "environment", || write.apply(&self.env))
                    .unwrap_or_else(|| self.env.clone())
            }
            _ => self.env.clone(),
        };
        Some(self.nested(child, 0, env))
    }

    fn structure(&self) -> Structure<'p, 'r> {
        match self.node.kind() {
            NodeKind::Empty
            | NodeKind::Shape { .. }
            | NodeKind::Text(_)
            | NodeKind::Spacer { .. }
            | NodeKind::Custom(_)
            | NodeKind::GeometryReader(_) => Structure::Leaf,
            NodeKind::Layout(layout) => {
                let children = self
                    .node
                    .children()
                    .iter()
                    .enumerate()
                    .map(|(index, child)| {
                        self.nested(child.clone(), index, self.env.clone())
                    })
                    .collect();
                Structure::Container(layout.clone(), children)
            }
            NodeKind::PreferenceReader(reader) => {
                let (Some(extra), ReaderAction::Derived {
                    placement,
                    alignment,
                    ..
                }) = (self.pass.derived_content(self.id, reader), reader.action())
                else {
                    return Structure::Wrapper(self.content());
                };
                let content = self
                    .content()
                    .unwrap_or_else(|| self.nested(Node::empty(), 0, self.env.clone()));
                let mut extra = self.nested(extra, 1, self.env.clone());
                extra.derived = true;
                match placement {
                    DerivedPlacement::Overlay => Structure::Container(
                        Arc::new(OverlayLayout::overlay(*alignment)),
                        vec![content, extra],
                    ),
                    DerivedPlacement::Background => Structure::Container(
                        Arc::new(OverlayLayout::background(*alignment)),
                        vec![extra, content],
                    ),
                }
            }
            _ => Structure::Wrapper(self.content()),
        }
    }

    fn measure_uncached(&self, proposal: ProposalSize) -> Dimensions {
        match self.node.kind() {
            NodeKind::Empty => Dimensions::zero(),
            NodeKind::Shape { sizing, .. } => Dimensions::new(sizing.size_for(proposal)),
            NodeKind::Text(text) => {
                let font = self.env.lookup::<FontKey>();
                let max_width = proposal.width.filter(|width| width.is_finite());
                let metrics = self.pass.measurer.measure(text, &font, max_width);
                let mut dimensions = Dimensions::new(metrics.size);
                dimensions.set_guide(AlignmentGuide::FirstTextBaseline, metrics.first_baseline);
                dimensions.set_guide(AlignmentGuide::LastTextBaseline, metrics.last_baseline);
                dimensions
            }
            NodeKind::Spacer { min_length } => {
                let min = min_length.max(0.0);
                Dimensions::new(Size::new(
                    proposal.width.map_or(min, |width| width.max(min)),
                    proposal.height.map_or(min, |height| height.max(min)),
                ))
            }
            NodeKind::Custom(measure) => {
                let size = measure(proposal);
                Dimensions::new(clamp_to_proposal(self.id, size, proposal))
            }
            NodeKind::GeometryReader(_) => {
                Dimensions::new(proposal.replace_unspecified(GEOMETRY_READER_IDEAL))
            }
            NodeKind::AlignmentGuide(guide) => {
                let mut dimensions = self
                    .content()
                    .map_or_else(Dimensions::zero, |content| content.measure(proposal));
                match isolate(self.id, "alignment guide", || (guide.compute)(&dimensions)) {
                    Some(value) if value.is_finite() => dimensions.set_guide(guide.guide, value),
                    Some(value) => {
                        tracing::warn!(id = %self.id, value, "ignoring non-finite alignment guide");
                    }
                    None => {}
                }
                dimensions
            }
            _ => match self.structure() {
                Structure::Leaf | Structure::Wrapper(None) => Dimensions::zero(),
                Structure::Wrapper(Some(content)) => content.measure(proposal),
                Structure::Container(layout, children) => {
                    let refs: Vec<&dyn SubView> =
                        children.iter().map(|child| child as &dyn SubView).collect();
                    let size = layout.size_that_fits(proposal, &refs);
                    if let [only] = refs.as_slice() {
                        // Re-export the single child's explicit guides in our space.
                        let bounds = Rect::from_size(size);
                        if let Some(placement) = layout.place(bounds, proposal, &refs).first() {
                            let child = only.measure(placement.proposal);
                            let guides = child.guides().translated(placement.rect.origin());
                            return Dimensions::with_guides(size, guides);
                        }
                    }
                    Dimensions::new(size)
                }
            },
        }
    }

    /// Places this node at `rect` (root coordinates) and everything below it.
    pub fn place(&self, proposal: ProposalSize, rect: Rect) -> ResolvedNode {
        let dimensions = self.measure(proposal);
        let children = if self.pass.enter(self.id, self.depth) {
            self.place_children(proposal, rect)
        } else {
            Vec::new()
        };
        ResolvedNode {
            id: self.id,
            node: self.node.clone(),
            env: self.env.clone(),
            rect,
            dimensions,
            proposal,
            derived: self.derived,
            children,
        }
    }

    fn place_children(&self, proposal: ProposalSize, rect: Rect) -> Vec<ResolvedNode> {
        if let NodeKind::GeometryReader(build) = self.node.kind() {
            let geometry = GeometryProxy {
                size: rect.size(),
                frame: rect,
            };
            let content =
                isolate(self.id, "geometry reader", || build(geometry)).unwrap_or_else(Node::empty);
            let content = self.nested(content, 0, self.env.clone());
            let offer = ProposalSize::exact(rect.size());
            let size = content.measure(offer).size();
            return vec![content.place(offer, Rect::new(rect.origin(), size))];
        }

        match self.structure() {
            Structure::Leaf | Structure::Wrapper(None) => Vec::new(),
            Structure::Wrapper(Some(content)) => vec![content.place(proposal, rect)],
            Structure::Container(layout, children) => {
                let refs: Vec<&dyn SubView> =
                    children.iter().map(|child| child as &dyn SubView).collect();
                let placements = isolate(self.id, "place", || layout.place(rect, proposal, &refs))
                    .filter(|placements| {
                        let complete = placements.len() == children.len();
                        if !complete {
                            tracing::warn!(
                                id = %self.id,
                                expected = children.len(),
                                got = placements.len(),
                                "layout returned the wrong number of placements"
                            );
                        }
                        complete
                    })
                    .unwrap_or_else(|| {
                        let offer = ProposalSize::exact(rect.size());
                        vec![ChildPlacement::new(rect, offer); children.len()]
                    });
                children
                    .iter()
                    .zip(placements)
                    .map(|(child, placement)| child.place(placement.proposal, placement.rect))
                    .collect()
            }
        }
    }
}

impl SubView for NodeProxy<'_, '_> {
    fn measure(&self, proposal: ProposalSize) -> Dimensions {
        self.pass.measure(self, proposal)
    }

    fn stretch_axis(&self) -> StretchAxis {
        match self.node.kind() {
            NodeKind::Empty | NodeKind::Text(_) => StretchAxis::None,
            NodeKind::Shape { sizing, .. } => sizing.stretch_axis(),
            NodeKind::Spacer { .. } => StretchAxis::MainAxis,
            NodeKind::Custom(_) | NodeKind::GeometryReader(_) => StretchAxis::Both,
            NodeKind::Layout(layout) => layout.stretch_axis(),
            _ => self
                .content()
                .map_or(StretchAxis::None, |content| content.stretch_axis()),
        }
    }

    fn priority(&self) -> i32 {
        match self.node.kind() {
            NodeKind::LayoutPriority(priority) => *priority,
            NodeKind::Environment(_)
            | NodeKind::PreferenceWrite(_)
            | NodeKind::PreferenceReader(_)
            | NodeKind::AlignmentGuide(_)
            | NodeKind::ZIndex(_)
            | NodeKind::Hidden
            | NodeKind::Identity(_)
            | NodeKind::Lifecycle { .. }
            | NodeKind::Task(_) => self.content().map_or(0, |content| content.priority()),
            _ => 0,
        }
    }
}

fn clamp_to_proposal(id: ViewId, size: Size, proposal: ProposalSize) -> Size {
    let clamp = |value: f32, proposed: Option<f32>, axis: &'static str| match proposed {
        Some(limit) if limit.is_finite() && value > limit => {
            tracing::warn!(%id, axis, value, limit, "custom measure exceeded its proposal");
            limit
        }
        _ => value,
    };
    Size::new(
        clamp(size.width, proposal.width, "width"),
        clamp(size.height, proposal.height, "height"),
    )
}

fn sanitize_axis(id: ViewId, axis: &'static str, value: f32, proposed: Option<f32>) -> f32 {
    if value.is_nan() || value < 0.0 {
        tracing::warn!(%id, axis, value, "negative or NaN size clamped to zero");
        return 0.0;
    }
    if value.is_infinite() {
        return match proposed {
            Some(limit) if limit.is_infinite() => value,
            Some(limit) => {
                tracing::warn!(%id, axis, limit, "infinite size for a finite proposal");
                limit
            }
            None => {
                tracing::warn!(%id, axis, "infinite size for an unspecified proposal");
                0.0
            }
        };
    }
    value
}

fn sanitize(proxy: &NodeProxy<'_, '_>, proposal: ProposalSize, dimensions: Dimensions) -> Dimensions {
    let size = dimensions.size();
    let checked = Size::new(
        sanitize_axis(proxy.id, "width", size.width, proposal.width),
        sanitize_axis(proxy.id, "height", size.height, proposal.height),
    );
    if checked == size {
        dimensions
    } else {
        dimensions.resized(checked)
    }
}

/// A node after layout: where it sits and what it was told.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedNode {
    pub id: ViewId,
    pub node: Node,
    pub env: Environment,
    /// Bounds in root coordinates, unrounded.
    pub rect: Rect,
    pub dimensions: Dimensions,
    pub proposal: ProposalSize,
    /// Root of content built from a derived preference value.
    pub derived: bool,
    pub children: Vec<ResolvedNode>,
}

impl Traversable for ResolvedNode {
    fn children(&self) -> &[Self] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_core::{MonospaceMeasurer, Sizing};

    fn run(node: Node, proposal: ProposalSize) -> (Dimensions, usize) {
        let config = ResolverConfig::default();
        let measurer = MonospaceMeasurer::default();
        let committed = BTreeMap::new();
        let derived = HashMap::new();
        let pass = Pass::new(&config, &measurer, &committed, &derived);
        let root = NodeProxy::root(&pass, node, Environment::new());
        let first = root.measure(proposal);
        let second = root.measure(proposal);
        assert_eq!(first, second);
        (first, pass.measured())
    }

    #[test]
    fn repeated_proposals_hit_the_cache() {
        let leaf = Node::leaf(NodeKind::Shape {
            paint: brook_core::Paint::Clear,
            sizing: Sizing::Fixed(Size::new(3.0, 4.0)),
        });
        let (dimensions, measured) = run(leaf, ProposalSize::UNSPECIFIED);
        assert_eq!(dimensions.size(), Size::new(3.0, 4.0));
        assert_eq!(measured, 1);
    }

    #[test]
    fn contract_violations_are_clamped() {
        let nan = Node::leaf(NodeKind::Custom(Arc::new(|_| Size::new(f32::NAN, -3.0))));
        let (dimensions, _) = run(nan, ProposalSize::new(50.0, 50.0));
        assert_eq!(dimensions.size(), Size::zero());

        let greedy = Node::leaf(NodeKind::Custom(Arc::new(|_| Size::new(500.0, 5.0))));
        let (dimensions, _) = run(greedy, ProposalSize::new(50.0, 50.0));
        assert_eq!(dimensions.size(), Size::new(50.0, 5.0));

        let unbounded = Node::leaf(NodeKind::Spacer { min_length: 0.0 });
        let (dimensions, _) = run(unbounded.clone(), ProposalSize::INFINITY);
        assert_eq!(dimensions.width(), f32::INFINITY);
        let (dimensions, _) = run(unbounded, ProposalSize::new(None, 30.0));
        assert_eq!(dimensions.size(), Size::new(0.0, 30.0));
    }

    #[test]
    fn geometry_reader_ideal_size() {
        let reader = Node::leaf(NodeKind::GeometryReader(Arc::new(|_| Node::empty())));
        let (dimensions, _) = run(reader, ProposalSize::new(80.0, None));
        assert_eq!(dimensions.size(), Size::new(80.0, 10.0));
    }

    #[test]
    fn text_reports_baselines() {
        let text = Node::leaf(NodeKind::Text("hello".into()));
        let (dimensions, _) = run(text, ProposalSize::UNSPECIFIED);
        assert!(dimensions.guides().get(AlignmentGuide::FirstTextBaseline).is_some());
        assert!(dimensions.width() > 0.0);
    }
}
