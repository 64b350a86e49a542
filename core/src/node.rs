//! The immutable view-description graph.
//!
//! Every modifier application produces a new [`Node`] wrapping the previous
//! one. A node's [`NodeKind`] is fixed at construction and its parameters are
//! typed per variant, so a malformed modifier is a compile error rather than
//! a runtime one.
//!
//! Nodes are cheap to clone: the payload lives behind an [`Arc`], and a
//! modified graph shares every untouched subtree with the original.

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{
    alignment::{Alignment, AlignmentGuide, Dimensions},
    color::Color,
    env::EnvironmentWrite,
    layout::{Layout, ProposalSize, Rect, Size, StretchAxis},
    preference::{AnyValue, PreferenceKey, PreferenceSlot},
};

/// A boxed future driven by the host executor.
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Measure closure of a custom leaf.
pub type MeasureFn = dyn Fn(ProposalSize) -> Size + Send + Sync;

/// How a shape leaf answers proposals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sizing {
    /// Always the same size, whatever is proposed.
    Fixed(Size),
    /// Takes the proposal clamped to `min..=max`, and `ideal` for an
    /// unspecified axis.
    Flexible {
        /// Smallest acceptable size.
        min: Size,
        /// Size reported for an unspecified proposal.
        ideal: Size,
        /// Largest acceptable size.
        max: Size,
    },
}

impl Default for Sizing {
    fn default() -> Self {
        Self::Flexible {
            min: Size::zero(),
            ideal: Size::new(10.0, 10.0),
            max: Size::new(f32::INFINITY, f32::INFINITY),
        }
    }
}

fn clamp_axis(proposed: Option<f32>, min: f32, ideal: f32, max: f32) -> f32 {
    proposed.map_or(ideal, |value| value.min(max).max(min))
}

impl Sizing {
    /// The size reported for `proposal`.
    #[must_use]
    pub fn size_for(&self, proposal: ProposalSize) -> Size {
        match *self {
            Self::Fixed(size) => size,
            Self::Flexible { min, ideal, max } => Size::new(
                clamp_axis(proposal.width, min.width, ideal.width, max.width),
                clamp_axis(proposal.height, min.height, ideal.height, max.height),
            ),
        }
    }

    /// Axes on which the leaf can grow.
    #[must_use]
    pub fn stretch_axis(&self) -> StretchAxis {
        match *self {
            Self::Fixed(_) => StretchAxis::None,
            Self::Flexible { min, max, .. } => {
                match (max.width > min.width, max.height > min.height) {
                    (true, true) => StretchAxis::Both,
                    (true, false) => StretchAxis::Horizontal,
                    (false, true) => StretchAxis::Vertical,
                    (false, false) => StretchAxis::None,
                }
            }
        }
    }
}

/// What a shape leaf paints.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Fill with the environment's foreground color.
    Foreground,
    /// Fill with a fixed color.
    Fill(Color),
    /// Stroke the outline.
    Stroke {
        /// Stroke color.
        color: Color,
        /// Line width.
        width: f32,
    },
    /// A named image.
    Image(Arc<str>),
    /// Nothing; the leaf only takes up space.
    Clear,
}

// ============================================================================
// Preferences
// ============================================================================

/// Where a preference write gets its value from.
#[derive(Clone)]
pub enum PreferenceSource {
    /// A value known at construction.
    Value(Arc<dyn Fn() -> AnyValue + Send + Sync>),
    /// A value computed from the writer's resolved bounds in root space.
    Anchor(Arc<dyn Fn(Rect) -> AnyValue + Send + Sync>),
}

/// Parameters of a preference-writing node.
#[derive(Clone)]
pub struct PreferenceWrite {
    slot: PreferenceSlot,
    source: PreferenceSource,
}

impl fmt::Debug for PreferenceWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            PreferenceSource::Value(_) => "value",
            PreferenceSource::Anchor(_) => "anchor",
        };
        f.debug_struct("PreferenceWrite")
            .field("key", &self.slot)
            .field("source", &source)
            .finish()
    }
}

impl PreferenceWrite {
    /// Writes a constant value for `K`.
    #[must_use]
    pub fn value<K: PreferenceKey>(value: K::Value) -> Self {
        Self {
            slot: PreferenceSlot::of::<K>(),
            source: PreferenceSource::Value(Arc::new(move || Box::new(value.clone()))),
        }
    }

    /// Writes a value for `K` derived from the writer's bounds.
    #[must_use]
    pub fn anchor<K: PreferenceKey>(f: impl Fn(Rect) -> K::Value + Send + Sync + 'static) -> Self {
        Self {
            slot: PreferenceSlot::of::<K>(),
            source: PreferenceSource::Anchor(Arc::new(move |rect| Box::new(f(rect)))),
        }
    }

    /// The written key.
    #[must_use]
    pub const fn slot(&self) -> PreferenceSlot {
        self.slot
    }

    /// The value source.
    #[must_use]
    pub const fn source(&self) -> &PreferenceSource {
        &self.source
    }

    /// Produces the value for a writer resolved at `bounds`.
    #[must_use]
    pub fn evaluate(&self, bounds: Rect) -> AnyValue {
        match &self.source {
            PreferenceSource::Value(value) => value(),
            PreferenceSource::Anchor(anchor) => anchor(bounds),
        }
    }
}

/// Where content derived from a preference value is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivedPlacement {
    /// Above the reader's content.
    Overlay,
    /// Behind the reader's content.
    Background,
}

/// Builds content from an aggregated preference value.
pub type DeriveFn = dyn Fn(&AnyValue) -> Node + Send + Sync;

/// What a reader does with its aggregated value.
#[derive(Clone)]
pub enum ReaderAction {
    /// Invokes a side effect once per traversal.
    Callback(Arc<dyn Fn(&AnyValue) + Send + Sync>),
    /// Builds content laid out over or under the reader's content.
    Derived {
        /// Overlay or background.
        placement: DerivedPlacement,
        /// Alignment of the derived content inside the reader's bounds.
        alignment: Alignment,
        /// The builder.
        build: Arc<DeriveFn>,
    },
    /// Only scopes the key.
    Observe,
}

impl fmt::Debug for ReaderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback"),
            Self::Derived {
                placement,
                alignment,
                ..
            } => f
                .debug_struct("Derived")
                .field("placement", placement)
                .field("alignment", alignment)
                .finish_non_exhaustive(),
            Self::Observe => f.write_str("Observe"),
        }
    }
}

/// Parameters of a preference-reading node.
#[derive(Clone, Debug)]
pub struct PreferenceReader {
    slot: PreferenceSlot,
    terminal: bool,
    action: ReaderAction,
}

fn typed<K: PreferenceKey>(value: &AnyValue) -> Option<&K::Value> {
    let typed = value.downcast_ref::<K::Value>();
    if typed.is_none() {
        tracing::warn!(key = type_name::<K>(), "preference reader got a foreign value");
    }
    typed
}

impl PreferenceReader {
    /// Calls `f` with the aggregated value of `K`. The value keeps flowing
    /// to enclosing readers.
    #[must_use]
    pub fn on_change<K: PreferenceKey>(f: impl Fn(&K::Value) + Send + Sync + 'static) -> Self {
        Self {
            slot: PreferenceSlot::of::<K>(),
            terminal: false,
            action: ReaderAction::Callback(Arc::new(move |value| {
                if let Some(value) = typed::<K>(value) {
                    f(value);
                }
            })),
        }
    }

    /// Stops `K` from propagating past this node.
    #[must_use]
    pub fn intercept<K: PreferenceKey>() -> Self {
        Self {
            slot: PreferenceSlot::of::<K>(),
            terminal: true,
            action: ReaderAction::Observe,
        }
    }

    /// Draws content built from the aggregated value of `K`.
    #[must_use]
    pub fn derived<K: PreferenceKey>(
        placement: DerivedPlacement,
        alignment: Alignment,
        build: impl Fn(&K::Value) -> Node + Send + Sync + 'static,
    ) -> Self {
        Self {
            slot: PreferenceSlot::of::<K>(),
            terminal: false,
            action: ReaderAction::Derived {
                placement,
                alignment,
                build: Arc::new(move |value| typed::<K>(value).map_or_else(Node::empty, &build)),
            },
        }
    }

    /// Marks the reader as the last stop for its key.
    #[must_use]
    pub const fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// The read key.
    #[must_use]
    pub const fn slot(&self) -> PreferenceSlot {
        self.slot
    }

    /// Returns true if the aggregated value stops here.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// What happens to the aggregated value.
    #[must_use]
    pub const fn action(&self) -> &ReaderAction {
        &self.action
    }
}

// ============================================================================
// Other parameter types
// ============================================================================

/// Overrides one alignment guide of the wrapped content.
#[derive(Clone)]
pub struct GuideOverride {
    /// The overridden guide.
    pub guide: AlignmentGuide,
    /// Computes the guide from the content's measured dimensions.
    pub compute: Arc<dyn Fn(&Dimensions) -> f32 + Send + Sync>,
}

impl fmt::Debug for GuideOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuideOverride")
            .field("guide", &self.guide)
            .finish_non_exhaustive()
    }
}

/// What a geometry reader's builder is told.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryProxy {
    /// Size offered to the reader.
    pub size: Size,
    /// The reader's bounds in root coordinates.
    pub frame: Rect,
}

/// Builds content from the space offered to a geometry reader.
pub type GeometryFn = dyn Fn(GeometryProxy) -> Node + Send + Sync;

/// Lifecycle moments a node can observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The node's identity entered the resolved tree.
    Appear,
    /// The node's identity left the resolved tree.
    Disappear,
}

/// Produces the future of an async unit.
pub type TaskAction = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

// ============================================================================
// NodeKind
// ============================================================================

/// The operation a node performs, with its typed parameters.
#[derive(Clone)]
pub enum NodeKind {
    /// Draws nothing and takes no space.
    Empty,
    /// A painted rectangle with explicit sizing.
    Shape {
        /// What to paint.
        paint: Paint,
        /// How proposals are answered.
        sizing: Sizing,
    },
    /// A run of text, measured by the platform text measurer.
    Text(Arc<str>),
    /// Flexible space along a stack's main axis.
    Spacer {
        /// Smallest length along the main axis.
        min_length: f32,
    },
    /// A leaf with a user-supplied measure closure.
    Custom(Arc<MeasureFn>),
    /// A container arranging its children with a layout algorithm.
    Layout(Arc<dyn Layout>),
    /// Derives the environment for the subtree.
    Environment(EnvironmentWrite),
    /// Contributes a preference value.
    PreferenceWrite(PreferenceWrite),
    /// Scopes and consumes a preference key.
    PreferenceReader(PreferenceReader),
    /// Overrides an alignment guide of the content.
    AlignmentGuide(GuideOverride),
    /// Claims slack space ahead of lower-priority siblings.
    LayoutPriority(i32),
    /// Draw order among siblings.
    ZIndex(f64),
    /// Keeps layout, skips drawing and everything below.
    Hidden,
    /// Replaces positional identity with an explicit key.
    Identity(u64),
    /// Builds its content from the offered space.
    GeometryReader(Arc<GeometryFn>),
    /// Runs a handler when the node's identity appears or disappears.
    Lifecycle {
        /// Which moment.
        event: LifecycleEvent,
        /// The handler.
        handler: Arc<dyn Fn() + Send + Sync>,
    },
    /// Starts an async unit keyed by the node's identity.
    Task(TaskAction),
}

impl NodeKind {
    /// Short tag used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Shape { .. } => "shape",
            Self::Text(_) => "text",
            Self::Spacer { .. } => "spacer",
            Self::Custom(_) => "custom",
            Self::Layout(_) => "layout",
            Self::Environment(_) => "environment",
            Self::PreferenceWrite(_) => "preference-write",
            Self::PreferenceReader(_) => "preference-reader",
            Self::AlignmentGuide(_) => "alignment-guide",
            Self::LayoutPriority(_) => "layout-priority",
            Self::ZIndex(_) => "z-index",
            Self::Hidden => "hidden",
            Self::Identity(_) => "identity",
            Self::GeometryReader(_) => "geometry-reader",
            Self::Lifecycle { .. } => "lifecycle",
            Self::Task(_) => "task",
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape { paint, sizing } => f
                .debug_struct("Shape")
                .field("paint", paint)
                .field("sizing", sizing)
                .finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Spacer { min_length } => f
                .debug_struct("Spacer")
                .field("min_length", min_length)
                .finish(),
            Self::Layout(layout) => f.debug_tuple("Layout").field(layout).finish(),
            Self::Environment(write) => write.fmt(f),
            Self::PreferenceWrite(write) => write.fmt(f),
            Self::PreferenceReader(reader) => reader.fmt(f),
            Self::AlignmentGuide(guide) => guide.fmt(f),
            Self::LayoutPriority(priority) => {
                f.debug_tuple("LayoutPriority").field(priority).finish()
            }
            Self::ZIndex(z) => f.debug_tuple("ZIndex").field(z).finish(),
            Self::Identity(key) => f.debug_tuple("Identity").field(key).finish(),
            Self::Lifecycle { event, .. } => f.debug_tuple("Lifecycle").field(event).finish(),
            other => f.write_str(other.name()),
        }
    }
}

// ============================================================================
// Node
// ============================================================================

struct Inner {
    kind: NodeKind,
    children: Vec<Node>,
}

/// An immutable node of the view-description graph.
#[derive(Clone)]
pub struct Node(Arc<Inner>);

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.children.is_empty() {
            return self.0.kind.fmt(f);
        }
        f.debug_struct("Node")
            .field("kind", &self.0.kind)
            .field("children", &self.0.children)
            .finish()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::empty()
    }
}

impl Node {
    /// A node without children.
    #[must_use]
    pub fn leaf(kind: NodeKind) -> Self {
        Self::with_children(kind, Vec::new())
    }

    /// Wraps `child` in a new node of `kind`.
    #[must_use]
    pub fn wrap(kind: NodeKind, child: Self) -> Self {
        Self::with_children(kind, vec![child])
    }

    /// A node of `kind` owning `children` in order.
    #[must_use]
    pub fn with_children(kind: NodeKind, children: Vec<Self>) -> Self {
        Self(Arc::new(Inner { kind, children }))
    }

    /// The empty node.
    #[must_use]
    pub fn empty() -> Self {
        Self::leaf(NodeKind::Empty)
    }

    /// The node's operation.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Children in order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.0.children
    }

    /// The child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Self> {
        self.0.children.get(index)
    }

    /// Number of nodes in the subtree, this one included.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.0.children.iter().map(Self::len).sum::<usize>()
    }

    /// Always false; a node counts itself.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Count;
    impl PreferenceKey for Count {
        type Value = u32;
        fn default_value() -> u32 {
            0
        }
    }

    #[test]
    fn wrapping_leaves_the_child_untouched() {
        let leaf = Node::leaf(NodeKind::Text("hi".into()));
        let wrapped = Node::wrap(NodeKind::Hidden, leaf.clone());

        assert!(matches!(leaf.kind(), NodeKind::Text(_)));
        assert!(matches!(wrapped.kind(), NodeKind::Hidden));
        assert!(wrapped.child(0).unwrap().ptr_eq(&leaf));
        assert_eq!(wrapped.len(), 2);
        assert_eq!(leaf.len(), 1);
    }

    #[test]
    fn flexible_sizing_clamps_proposals() {
        let sizing = Sizing::Flexible {
            min: Size::new(10.0, 0.0),
            ideal: Size::new(50.0, 20.0),
            max: Size::new(80.0, f32::INFINITY),
        };
        assert_eq!(sizing.size_for(ProposalSize::UNSPECIFIED), Size::new(50.0, 20.0));
        assert_eq!(sizing.size_for(ProposalSize::ZERO), Size::new(10.0, 0.0));
        assert_eq!(sizing.size_for(ProposalSize::new(200.0, 30.0)), Size::new(80.0, 30.0));
        assert_eq!(sizing.stretch_axis(), StretchAxis::Both);
    }

    #[test]
    fn fixed_sizing_ignores_proposals() {
        let sizing = Sizing::Fixed(Size::new(4.0, 5.0));
        assert_eq!(sizing.size_for(ProposalSize::INFINITY), Size::new(4.0, 5.0));
        assert_eq!(sizing.stretch_axis(), StretchAxis::None);
    }

    #[test]
    fn anchor_writes_see_bounds() {
        let write = PreferenceWrite::anchor::<Count>(|rect| rect.width() as u32);
        let value = write.evaluate(Rect::from_size(Size::new(12.0, 1.0)));
        assert_eq!(value.downcast_ref::<u32>(), Some(&12));
        assert!(write.slot().is::<Count>());
    }

    #[test]
    fn callback_reader_downcasts() {
        use std::sync::atomic::{AtomicU32, Ordering};
        let seen = Arc::new(AtomicU32::new(0));
        let sink = seen.clone();
        let reader = PreferenceReader::on_change::<Count>(move |v| {
            sink.store(*v, Ordering::SeqCst);
        });
        let ReaderAction::Callback(callback) = reader.action() else {
            panic!("expected a callback");
        };
        callback(&(Box::new(9_u32) as AnyValue));
        assert_eq!(seen.load(Ordering::SeqCst), 9);
        assert!(!reader.is_terminal());
    }
}
