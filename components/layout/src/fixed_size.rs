//! Asking a child for its ideal size regardless of what the parent offers.

use alloc::{vec, vec::Vec};

use crate::{Alignment, ChildPlacement, Layout, ProposalSize, Rect, Size, SubView};

/// Layout that replaces the proposal with "unspecified" on chosen axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeLayout {
    horizontal: bool,
    vertical: bool,
}

impl Default for FixedSizeLayout {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl FixedSizeLayout {
    /// Fixes the selected axes at the child's ideal size.
    #[must_use]
    pub const fn new(horizontal: bool, vertical: bool) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    const fn child_proposal(&self, proposal: ProposalSize) -> ProposalSize {
        ProposalSize {
            width: if self.horizontal { None } else { proposal.width },
            height: if self.vertical { None } else { proposal.height },
        }
    }
}

impl Layout for FixedSizeLayout {
    fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size {
        children
            .first()
            .map_or(Size::zero(), |c| c.size_that_fits(self.child_proposal(proposal)))
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
        let dimensions = child.measure(child_proposal);
        // The child may be larger than the bounds it was given; keep it centered.
        let origin = Alignment::CENTER.position(&bounds, &dimensions);
        vec![ChildPlacement::new(
            Rect::new(origin, dimensions.size()),
            child_proposal,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dimensions, StretchAxis};

    struct Wrapping;

    impl SubView for Wrapping {
        fn measure(&self, proposal: ProposalSize) -> Dimensions {
            match proposal.width {
                Some(w) if w < 120.0 => Dimensions::new(Size::new(w, 40.0)),
                _ => Dimensions::new(Size::new(120.0, 20.0)),
            }
        }
        fn stretch_axis(&self) -> StretchAxis {
            StretchAxis::None
        }
        fn priority(&self) -> i32 {
            0
        }
    }

    #[test]
    fn ignores_the_proposal_on_fixed_axes() {
        let children: Vec<&dyn SubView> = vec![&Wrapping];
        let proposal = ProposalSize::new(60.0, 10.0);

        let fixed = FixedSizeLayout::default();
        assert_eq!(fixed.size_that_fits(proposal, &children), Size::new(120.0, 20.0));

        let vertical_only = FixedSizeLayout::new(false, true);
        assert_eq!(
            vertical_only.size_that_fits(proposal, &children),
            Size::new(60.0, 40.0)
        );
    }
}
