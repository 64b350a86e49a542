//! Padding layouts that inset a child by fixed edge distances.

use alloc::{vec, vec::Vec};

use crate::{ChildPlacement, Layout, Point, ProposalSize, Rect, Size, SubView};

bitflags::bitflags! {
    /// A set of rectangle edges.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Edges: u8 {
        /// Top edge
        const TOP = 0b0001;
        /// Bottom edge
        const BOTTOM = 0b0010;
        /// Leading edge
        const LEADING = 0b0100;
        /// Trailing edge
        const TRAILING = 0b1000;
        /// Both horizontal edges
        const HORIZONTAL = Self::LEADING.bits() | Self::TRAILING.bits();
        /// Both vertical edges
        const VERTICAL = Self::TOP.bits() | Self::BOTTOM.bits();
        /// All edges
        const ALL = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

/// Insets applied to the four edges of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeInsets {
    top: f32,
    bottom: f32,
    leading: f32,
    trailing: f32,
}

#[allow(clippy::cast_possible_truncation)]
impl<T: Into<f64>> From<T> for EdgeInsets {
    fn from(value: T) -> Self {
        let v = value.into() as f32;
        Self::all(v)
    }
}

impl EdgeInsets {
    /// Creates an [`EdgeInsets`] value with explicit edges.
    ///
    /// Negative amounts are treated as zero.
    #[must_use]
    pub fn new(top: f32, bottom: f32, leading: f32, trailing: f32) -> Self {
        Self {
            top: top.max(0.0),
            bottom: bottom.max(0.0),
            leading: leading.max(0.0),
            trailing: trailing.max(0.0),
        }
    }

    /// Returns equal insets on every edge.
    #[must_use]
    pub fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Returns symmetric vertical and horizontal insets.
    #[must_use]
    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self::new(vertical, vertical, horizontal, horizontal)
    }

    /// Insets `amount` on the selected `edges` only.
    #[must_use]
    pub fn edges(edges: Edges, amount: f32) -> Self {
        let pick = |edge: Edges| if edges.contains(edge) { amount } else { 0.0 };
        Self::new(
            pick(Edges::TOP),
            pick(Edges::BOTTOM),
            pick(Edges::LEADING),
            pick(Edges::TRAILING),
        )
    }

    /// Top inset.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.top
    }

    /// Bottom inset.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Leading inset.
    #[must_use]
    pub const fn leading(&self) -> f32 {
        self.leading
    }

    /// Trailing inset.
    #[must_use]
    pub const fn trailing(&self) -> f32 {
        self.trailing
    }

    /// Leading plus trailing.
    #[must_use]
    pub const fn horizontal(&self) -> f32 {
        self.leading + self.trailing
    }

    /// Top plus bottom.
    #[must_use]
    pub const fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Layout that insets its single child by the configured edge values.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddingLayout {
    edges: EdgeInsets,
}

impl PaddingLayout {
    /// Pads by `edges`.
    #[must_use]
    pub const fn new(edges: EdgeInsets) -> Self {
        Self { edges }
    }

    /// The insets.
    #[must_use]
    pub const fn insets(&self) -> EdgeInsets {
        self.edges
    }

    /// The proposal forwarded to the child. Unspecified axes stay
    /// unspecified.
    fn child_proposal(&self, proposal: ProposalSize) -> ProposalSize {
        ProposalSize {
            width: proposal.width.map(|w| (w - self.edges.horizontal()).max(0.0)),
            height: proposal.height.map(|h| (h - self.edges.vertical()).max(0.0)),
        }
    }
}

impl Layout for PaddingLayout {
    fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size {
        let child_size = children
            .first()
            .map_or(Size::zero(), |c| c.size_that_fits(self.child_proposal(proposal)));

        Size::new(
            child_size.width + self.edges.horizontal(),
            child_size.height + self.edges.vertical(),
        )
    }

    fn place(
        &self,
        bounds: Rect,
        proposal: ProposalSize,
        children: &[&dyn SubView],
    ) -> Vec<ChildPlacement> {
        let Some(child) = children.first() else {
            return vec![];
        };

        let child_proposal = self.child_proposal(proposal);
        let origin = Point::new(
            bounds.x() + self.edges.leading,
            bounds.y() + self.edges.top,
        );
        let size = child.size_that_fits(child_proposal);

        vec![ChildPlacement::new(Rect::new(origin, size), child_proposal)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dimensions, StretchAxis};

    struct MockSubView {
        size: Size,
    }

    impl SubView for MockSubView {
        fn measure(&self, _proposal: ProposalSize) -> Dimensions {
            Dimensions::new(self.size)
        }
        fn stretch_axis(&self) -> StretchAxis {
            StretchAxis::None
        }
        fn priority(&self) -> i32 {
            0
        }
    }

    #[test]
    fn test_padding_size() {
        let layout = PaddingLayout::new(EdgeInsets::all(10.0));

        let child = MockSubView {
            size: Size::new(50.0, 30.0),
        };
        let children: Vec<&dyn SubView> = vec![&child];

        let size = layout.size_that_fits(ProposalSize::UNSPECIFIED, &children);

        // Size = child size + padding on all sides
        assert_eq!(size.width, 70.0); // 50 + 10 + 10
        assert_eq!(size.height, 50.0); // 30 + 10 + 10
    }

    #[test]
    fn test_padding_placement() {
        let layout = PaddingLayout::new(EdgeInsets::new(10.0, 20.0, 15.0, 25.0));

        let child = MockSubView {
            size: Size::new(60.0, 70.0),
        };
        let children: Vec<&dyn SubView> = vec![&child];

        let bounds = Rect::new(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
        let placed = layout.place(bounds, ProposalSize::exact(bounds.size()), &children);

        // Child origin is offset by leading and top
        assert_eq!(placed[0].rect.x(), 15.0);
        assert_eq!(placed[0].rect.y(), 10.0);

        // Child was offered bounds minus padding
        assert_eq!(placed[0].proposal, ProposalSize::new(60.0, 70.0));
    }

    #[test]
    fn test_padding_selected_edges() {
        let insets = EdgeInsets::edges(Edges::HORIZONTAL, 8.0);
        assert_eq!(insets.horizontal(), 16.0);
        assert_eq!(insets.vertical(), 0.0);
    }

    #[test]
    fn test_padding_proposal_never_negative() {
        let layout = PaddingLayout::new(EdgeInsets::all(30.0));
        let proposal = layout.child_proposal(ProposalSize::new(40.0, None));
        assert_eq!(proposal.width, Some(0.0));
        assert_eq!(proposal.height, None);
    }
}
