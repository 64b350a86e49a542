//! Building view graphs.
//!
//! Leaves and containers are created with the free functions of this module;
//! modifiers are chained through [`ViewExt`]. Every call returns a new
//! [`Node`] that wraps (and shares) the previous one.
//!
//! ```ignore
//! use brook::view::*;
//!
//! let row = hstack([text("Title"), spacer(), color(Color::RED).frame(20.0, 20.0)])
//!     .padding(8.0)
//!     .foreground(Color::BLUE);
//! ```

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use brook_core::node::{
    DerivedPlacement, GeometryProxy, GuideOverride, LifecycleEvent, PreferenceReader,
    PreferenceWrite, TaskFuture,
};
use brook_core::{
    Alignment, AlignmentGuide, Color, Dimensions, EnvKey, EnvironmentWrite, Font, FontKey,
    ForegroundKey, HorizontalAlignment, Layout, Node, NodeKind, Paint, PreferenceKey,
    ProposalSize, Rect, Size, Sizing, VerticalAlignment, ViewId,
};
use brook_layout::{
    EdgeInsets, FixedSizeLayout, HStackLayout, OffsetLayout, OverlayLayout,
    PaddingLayout, VStackLayout, ZStackLayout,
};

pub use brook_layout::FrameLayout as Frame;

/// Something that turns a node into a modified node.
pub trait Modifier {
    /// Applies the modifier.
    fn apply(self, node: Node) -> Node;
}

impl<F> Modifier for F
where
    F: FnOnce(Node) -> Node,
{
    fn apply(self, node: Node) -> Node {
        self(node)
    }
}

fn wrap(node: impl Into<Node>, kind: NodeKind) -> Node {
    Node::wrap(kind, node.into())
}

fn with_layout(layout: impl Layout + 'static, children: Vec<Node>) -> Node {
    Node::with_children(NodeKind::Layout(Arc::new(layout)), children)
}

/// Modifier methods for anything that converts into a [`Node`].
pub trait ViewExt: Into<Node> + Sized {
    /// Applies a custom modifier.
    fn modifier(self, modifier: impl Modifier) -> Node {
        modifier.apply(self.into())
    }

    /// Insets the content by `amount` on every edge.
    fn padding(self, amount: f32) -> Node {
        self.padding_edges(EdgeInsets::all(amount))
    }

    /// Insets the content by per-edge amounts.
    fn padding_edges(self, insets: EdgeInsets) -> Node {
        with_layout(PaddingLayout::new(insets), vec![self.into()])
    }

    /// Gives the content a fixed size, centering it.
    fn frame(self, width: f32, height: f32) -> Node {
        self.frame_flexible(Frame::fixed(Some(width), Some(height)))
    }

    /// Constrains the content with a min/ideal/max frame.
    fn frame_flexible(self, frame: Frame) -> Node {
        with_layout(frame, vec![self.into()])
    }

    /// Proposes nothing on both axes, so the content takes its ideal size.
    fn fixed_size(self) -> Node {
        with_layout(FixedSizeLayout::default(), vec![self.into()])
    }

    /// Moves the drawn content without affecting layout.
    fn offset(self, dx: f32, dy: f32) -> Node {
        with_layout(OffsetLayout::new(dx, dy), vec![self.into()])
    }

    /// Sets the priority stacks use when distributing space.
    fn layout_priority(self, priority: i32) -> Node {
        wrap(self, NodeKind::LayoutPriority(priority))
    }

    /// Overrides `guide` with a value computed from the content's dimensions.
    fn alignment_guide(
        self,
        guide: AlignmentGuide,
        compute: impl Fn(&Dimensions) -> f32 + Send + Sync + 'static,
    ) -> Node {
        wrap(
            self,
            NodeKind::AlignmentGuide(GuideOverride {
                guide,
                compute: Arc::new(compute),
            }),
        )
    }

    /// Draw order among siblings. Higher draws later.
    fn z_index(self, z: f64) -> Node {
        wrap(self, NodeKind::ZIndex(z))
    }

    /// Keeps the layout slot, draws nothing below this point.
    fn hidden(self) -> Node {
        wrap(self, NodeKind::Hidden)
    }

    /// Gives the content an explicit identity.
    fn id(self, key: impl Hash) -> Node {
        wrap(self, NodeKind::Identity(ViewId::key_of(&key)))
    }

    /// Sets `K` for the subtree.
    fn environment<K: EnvKey>(self, value: K::Value) -> Node {
        wrap(self, NodeKind::Environment(EnvironmentWrite::set::<K>(value)))
    }

    /// Composes onto the inherited value of `K` for the subtree.
    fn transform_environment<K: EnvKey>(
        self,
        f: impl Fn(K::Value) -> K::Value + Send + Sync + 'static,
    ) -> Node {
        wrap(self, NodeKind::Environment(EnvironmentWrite::transform::<K>(f)))
    }

    /// Sets the text font for the subtree.
    fn font(self, font: Font) -> Node {
        self.environment::<FontKey>(font)
    }

    /// Sets the foreground color for the subtree.
    fn foreground(self, color: Color) -> Node {
        self.environment::<ForegroundKey>(color)
    }

    /// Contributes `value` for `K`.
    fn preference<K: PreferenceKey>(self, value: K::Value) -> Node {
        wrap(self, NodeKind::PreferenceWrite(PreferenceWrite::value::<K>(value)))
    }

    /// Contributes a value for `K` computed from this node's bounds.
    fn anchor_preference<K: PreferenceKey>(
        self,
        f: impl Fn(Rect) -> K::Value + Send + Sync + 'static,
    ) -> Node {
        wrap(self, NodeKind::PreferenceWrite(PreferenceWrite::anchor::<K>(f)))
    }

    /// Calls `f` with the aggregated value of `K` after every traversal.
    fn on_preference_change<K: PreferenceKey>(
        self,
        f: impl Fn(&K::Value) + Send + Sync + 'static,
    ) -> Node {
        wrap(self, NodeKind::PreferenceReader(PreferenceReader::on_change::<K>(f)))
    }

    /// Stops `K` from reaching readers above this node.
    fn intercept_preference<K: PreferenceKey>(self) -> Node {
        wrap(self, NodeKind::PreferenceReader(PreferenceReader::intercept::<K>()))
    }

    /// Draws content built from the aggregated value of `K` above this node.
    fn overlay_preference_value<K: PreferenceKey>(
        self,
        alignment: Alignment,
        build: impl Fn(&K::Value) -> Node + Send + Sync + 'static,
    ) -> Node {
        wrap(
            self,
            NodeKind::PreferenceReader(PreferenceReader::derived::<K>(
                DerivedPlacement::Overlay,
                alignment,
                build,
            )),
        )
    }

    /// Draws content built from the aggregated value of `K` behind this node.
    fn background_preference_value<K: PreferenceKey>(
        self,
        alignment: Alignment,
        build: impl Fn(&K::Value) -> Node + Send + Sync + 'static,
    ) -> Node {
        wrap(
            self,
            NodeKind::PreferenceReader(PreferenceReader::derived::<K>(
                DerivedPlacement::Background,
                alignment,
                build,
            )),
        )
    }

    /// Draws `content` above this node, sized to it.
    fn overlay(self, content: impl Into<Node>, alignment: Alignment) -> Node {
        with_layout(
            OverlayLayout::overlay(alignment),
            vec![self.into(), content.into()],
        )
    }

    /// Draws `content` behind this node, sized to it.
    fn background(self, content: impl Into<Node>, alignment: Alignment) -> Node {
        with_layout(
            OverlayLayout::background(alignment),
            vec![content.into(), self.into()],
        )
    }

    /// Runs `f` when this node's identity enters the resolved tree.
    fn on_appear(self, f: impl Fn() + Send + Sync + 'static) -> Node {
        wrap(
            self,
            NodeKind::Lifecycle {
                event: LifecycleEvent::Appear,
                handler: Arc::new(f),
            },
        )
    }

    /// Runs `f` when this node's identity leaves the resolved tree.
    fn on_disappear(self, f: impl Fn() + Send + Sync + 'static) -> Node {
        wrap(
            self,
            NodeKind::Lifecycle {
                event: LifecycleEvent::Disappear,
                handler: Arc::new(f),
            },
        )
    }

    /// Runs the future produced by `f` while this node's identity is present.
    fn task<F, Fut>(self, f: F) -> Node
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action = move || -> TaskFuture { Box::pin(f()) };
        wrap(self, NodeKind::Task(Arc::new(action)))
    }
}

impl<T: Into<Node>> ViewExt for T {}

// ============================================================================
// Leaves
// ============================================================================

/// Draws nothing, takes no space.
#[must_use]
pub fn empty() -> Node {
    Node::empty()
}

/// A run of text.
#[must_use]
pub fn text(content: impl Into<Arc<str>>) -> Node {
    Node::leaf(NodeKind::Text(content.into()))
}

/// A flexible rectangle filled with `color`.
#[must_use]
pub fn color(color: Color) -> Node {
    shape(Paint::Fill(color), Sizing::default())
}

/// A flexible rectangle filled with the foreground color.
#[must_use]
pub fn rectangle() -> Node {
    shape(Paint::Foreground, Sizing::default())
}

/// An invisible leaf of exactly `width` x `height`.
#[must_use]
pub fn fixed(width: f32, height: f32) -> Node {
    shape(Paint::Clear, Sizing::Fixed(Size::new(width, height)))
}

/// A leaf with explicit paint and sizing.
#[must_use]
pub fn shape(paint: Paint, sizing: Sizing) -> Node {
    Node::leaf(NodeKind::Shape { paint, sizing })
}

/// Flexible space along the enclosing stack's main axis.
#[must_use]
pub fn spacer() -> Node {
    spacer_min(0.0)
}

/// Flexible space that never shrinks below `min_length`.
#[must_use]
pub fn spacer_min(min_length: f32) -> Node {
    Node::leaf(NodeKind::Spacer { min_length })
}

/// A leaf measured by `measure`.
#[must_use]
pub fn custom(measure: impl Fn(ProposalSize) -> Size + Send + Sync + 'static) -> Node {
    Node::leaf(NodeKind::Custom(Arc::new(measure)))
}

/// Fills the offered space and builds its content from it.
#[must_use]
pub fn geometry_reader(build: impl Fn(GeometryProxy) -> Node + Send + Sync + 'static) -> Node {
    Node::leaf(NodeKind::GeometryReader(Arc::new(build)))
}

// ============================================================================
// Containers
// ============================================================================

/// Arranges `children` with a custom layout algorithm.
#[must_use]
pub fn layout(layout: impl Layout + 'static, children: impl IntoIterator<Item = Node>) -> Node {
    with_layout(layout, children.into_iter().collect())
}

/// Children left to right, centered vertically, default spacing.
#[must_use]
pub fn hstack(children: impl IntoIterator<Item = Node>) -> Node {
    layout(HStackLayout::default(), children)
}

/// Children left to right with explicit alignment and spacing.
#[must_use]
pub fn hstack_with(
    alignment: VerticalAlignment,
    spacing: f32,
    children: impl IntoIterator<Item = Node>,
) -> Node {
    layout(HStackLayout::new(alignment, spacing), children)
}

/// Children top to bottom, centered horizontally, default spacing.
#[must_use]
pub fn vstack(children: impl IntoIterator<Item = Node>) -> Node {
    layout(VStackLayout::default(), children)
}

/// Children top to bottom with explicit alignment and spacing.
#[must_use]
pub fn vstack_with(
    alignment: HorizontalAlignment,
    spacing: f32,
    children: impl IntoIterator<Item = Node>,
) -> Node {
    layout(VStackLayout::new(alignment, spacing), children)
}

/// Children layered on top of each other, centered.
#[must_use]
pub fn zstack(children: impl IntoIterator<Item = Node>) -> Node {
    zstack_with(Alignment::CENTER, children)
}

/// Children layered on top of each other with an explicit alignment.
#[must_use]
pub fn zstack_with(alignment: Alignment, children: impl IntoIterator<Item = Node>) -> Node {
    layout(ZStackLayout::new(alignment), children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_wrap_outward() {
        let node = text("a").padding(4.0).hidden().z_index(2.0);
        assert!(matches!(node.kind(), NodeKind::ZIndex(z) if *z == 2.0));
        let hidden = node.child(0).unwrap();
        assert!(matches!(hidden.kind(), NodeKind::Hidden));
        assert!(matches!(hidden.child(0).unwrap().kind(), NodeKind::Layout(_)));
    }

    #[test]
    fn closures_are_modifiers() {
        let node = text("b").modifier(|node: Node| node.layout_priority(3));
        assert!(matches!(node.kind(), NodeKind::LayoutPriority(3)));
    }

    #[test]
    fn background_puts_content_first() {
        let node = text("front").background(color(Color::RED), Alignment::CENTER);
        assert!(matches!(node.child(0).unwrap().kind(), NodeKind::Shape { .. }));
        assert!(matches!(node.child(1).unwrap().kind(), NodeKind::Text(_)));
    }
}
