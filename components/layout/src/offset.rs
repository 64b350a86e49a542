//! Visual offsets that leave the parent's layout untouched.

use alloc::{vec, vec::Vec};

use crate::{ChildPlacement, Layout, ProposalSize, Rect, Size, SubView};

/// Moves its child by a fixed distance after layout.
///
/// The container reports the child's size, so siblings are laid out as if
/// the offset did not exist.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetLayout {
    dx: f32,
    dy: f32,
}

impl OffsetLayout {
    /// Offsets by `dx`, `dy` points.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

impl Layout for OffsetLayout {
    fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size {
        children
            .first()
            .map_or(Size::zero(), |c| c.size_that_fits(proposal))
    }

    fn place(
        &self,
        bounds: Rect,
        proposal: ProposalSize,
        children: &[&dyn SubView],
    ) -> Vec<ChildPlacement> {
        if children.is_empty() {
            return vec![];
        }
        vec![ChildPlacement::new(
            bounds.translate(self.dx, self.dy),
            proposal,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dimensions, Point, StretchAxis};

    struct Square;

    impl SubView for Square {
        fn measure(&self, _proposal: ProposalSize) -> Dimensions {
            Dimensions::new(Size::new(10.0, 10.0))
        }
        fn stretch_axis(&self) -> StretchAxis {
            StretchAxis::None
        }
        fn priority(&self) -> i32 {
            0
        }
    }

    #[test]
    fn offset_moves_but_does_not_resize() {
        let layout = OffsetLayout::new(5.0, -3.0);
        let children: Vec<&dyn SubView> = vec![&Square];

        let size = layout.size_that_fits(ProposalSize::UNSPECIFIED, &children);
        assert_eq!(size, Size::new(10.0, 10.0));

        let bounds = Rect::new(Point::new(20.0, 20.0), size);
        let placed = layout.place(bounds, ProposalSize::UNSPECIFIED, &children);
        assert_eq!(placed[0].rect.origin(), Point::new(25.0, 17.0));
        assert_eq!(placed[0].rect.size(), size);
    }
}
