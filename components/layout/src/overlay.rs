//! Overlay helpers for layering content over or under a base view.
//!
//! `OverlayLayout` mirrors the intent of a two-child z-stack, but the
//! container's dimensions are locked to the base child. This makes it ideal
//! for badges, highlights, and decorators that should not influence the
//! parent layout's sizing decisions.

use alloc::vec::Vec;

use crate::{Alignment, ChildPlacement, Layout, ProposalSize, Rect, Size, SubView};

/// Which side of the base the decorations sit on.
///
/// Children are drawn in order, so the base is the first child of an
/// overlay and the last child of a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layering {
    /// Base first, decorations drawn on top.
    #[default]
    Overlay,
    /// Decorations first, base drawn on top.
    Background,
}

/// Layout that keeps the base child's size authoritative while still
/// allowing aligned decorations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayLayout {
    alignment: Alignment,
    layering: Layering,
}

impl OverlayLayout {
    /// Decorations above the base.
    #[must_use]
    pub const fn overlay(alignment: Alignment) -> Self {
        Self {
            alignment,
            layering: Layering::Overlay,
        }
    }

    /// Decorations below the base.
    #[must_use]
    pub const fn background(alignment: Alignment) -> Self {
        Self {
            alignment,
            layering: Layering::Background,
        }
    }

    /// Returns the current alignment.
    #[must_use]
    pub const fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Returns the layering.
    #[must_use]
    pub const fn layering(&self) -> Layering {
        self.layering
    }

    /// Index of the base child among `count` children.
    #[must_use]
    pub const fn base_index(&self, count: usize) -> usize {
        match self.layering {
            Layering::Overlay => 0,
            Layering::Background => count.saturating_sub(1),
        }
    }
}

impl Layout for OverlayLayout {
    fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size {
        // Overlay size is driven entirely by the base child.
        children
            .get(self.base_index(children.len()))
            .map_or(Size::zero(), |base| base.size_that_fits(proposal))
    }

    fn place(
        &self,
        bounds: Rect,
        proposal: ProposalSize,
        children: &[&dyn SubView],
    ) -> Vec<ChildPlacement> {
        let base = self.base_index(children.len());
        let decoration_proposal = ProposalSize::exact(bounds.size());

        children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                if index == base {
                    // Base child always fills the container's bounds.
                    return ChildPlacement::new(bounds, proposal);
                }
                let dimensions = child.measure(decoration_proposal);
                let origin = self.alignment.position(&bounds, &dimensions);
                ChildPlacement::new(Rect::new(origin, dimensions.size()), decoration_proposal)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::{Dimensions, Point, StretchAxis};

    struct Fixed(Size);

    impl SubView for Fixed {
        fn measure(&self, _proposal: ProposalSize) -> Dimensions {
            Dimensions::new(self.0)
        }
        fn stretch_axis(&self) -> StretchAxis {
            StretchAxis::None
        }
        fn priority(&self) -> i32 {
            0
        }
    }

    #[test]
    fn base_child_owns_the_size() {
        let base = Fixed(Size::new(100.0, 40.0));
        let badge = Fixed(Size::new(300.0, 300.0));
        let children: Vec<&dyn SubView> = vec![&base, &badge];

        let layout = OverlayLayout::overlay(Alignment::TOP_TRAILING);
        assert_eq!(
            layout.size_that_fits(ProposalSize::UNSPECIFIED, &children),
            Size::new(100.0, 40.0)
        );
    }

    #[test]
    fn decorations_are_aligned() {
        let base = Fixed(Size::new(100.0, 40.0));
        let badge = Fixed(Size::new(10.0, 10.0));
        let children: Vec<&dyn SubView> = vec![&badge, &base];

        let layout = OverlayLayout::background(Alignment::TOP_TRAILING);
        assert_eq!(layout.layering(), Layering::Background);
        assert_eq!(layout.alignment(), Alignment::TOP_TRAILING);
        let bounds = Rect::new(Point::new(5.0, 5.0), Size::new(100.0, 40.0));
        let placed = layout.place(bounds, ProposalSize::UNSPECIFIED, &children);

        assert_eq!(placed[1].rect, bounds);
        assert_eq!(placed[0].rect.origin(), Point::new(95.0, 5.0));
    }
}
