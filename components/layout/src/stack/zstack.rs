//! Overlay stack layout for multiple layers.

use alloc::vec::Vec;

use super::AlignedExtent;
use crate::{Alignment, ChildPlacement, Dimensions, Layout, Point, ProposalSize, Rect, Size, SubView};

/// Stacks an arbitrary number of children with a shared alignment.
///
/// `ZStackLayout` positions every child within the same bounds, overlaying
/// them according to the alignment. Each child is offered the stack's own
/// proposal, and the container is just large enough to hold every child
/// once their alignment guides coincide. If you instead need the base child
/// to dictate the container size while layering secondary content, see
/// [`crate::overlay::OverlayLayout`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZStackLayout {
    /// The alignment used to position children within the stack.
    pub alignment: Alignment,
}

impl ZStackLayout {
    /// Creates a z-stack layout.
    #[must_use]
    pub const fn new(alignment: Alignment) -> Self {
        Self { alignment }
    }

    fn extents(&self, dimensions: &[Dimensions]) -> (AlignedExtent, AlignedExtent) {
        (
            AlignedExtent::of(self.alignment.horizontal.guide(), dimensions.iter()),
            AlignedExtent::of(self.alignment.vertical.guide(), dimensions.iter()),
        )
    }
}

impl Layout for ZStackLayout {
    fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size {
        let dimensions: Vec<Dimensions> = children.iter().map(|c| c.measure(proposal)).collect();
        let (horizontal, vertical) = self.extents(&dimensions);
        Size::new(horizontal.extent, vertical.extent)
    }

    fn place(
        &self,
        bounds: Rect,
        proposal: ProposalSize,
        children: &[&dyn SubView],
    ) -> Vec<ChildPlacement> {
        let dimensions: Vec<Dimensions> = children.iter().map(|c| c.measure(proposal)).collect();
        let (horizontal, vertical) = self.extents(&dimensions);
        let h_guide = self.alignment.horizontal.guide();
        let v_guide = self.alignment.vertical.guide();

        dimensions
            .iter()
            .map(|d| {
                let origin = Point::new(
                    bounds.x() + horizontal.offset(h_guide, bounds.width(), d.guide(h_guide)),
                    bounds.y() + vertical.offset(v_guide, bounds.height(), d.guide(v_guide)),
                );
                ChildPlacement::new(Rect::new(origin, d.size()), proposal)
            })
            .collect()
    }
}
