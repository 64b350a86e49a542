//! Vertical stack layout.

use alloc::vec::Vec;

use super::{DEFAULT_SPACING, Stack};
use crate::{
    Axis, ChildPlacement, HorizontalAlignment, Layout, ProposalSize, Rect, Size, SubView,
};

/// Arranges children top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct VStackLayout {
    /// The horizontal alignment of children within the stack.
    pub alignment: HorizontalAlignment,
    /// The spacing between children in the stack.
    pub spacing: f32,
}

impl Default for VStackLayout {
    fn default() -> Self {
        Self {
            alignment: HorizontalAlignment::Center,
            spacing: DEFAULT_SPACING,
        }
    }
}

impl VStackLayout {
    /// Creates a vertical stack layout.
    #[must_use]
    pub const fn new(alignment: HorizontalAlignment, spacing: f32) -> Self {
        Self { alignment, spacing }
    }

    const fn stack(&self) -> Stack {
        Stack {
            axis: Axis::Vertical,
            guide: self.alignment.guide(),
            spacing: self.spacing,
        }
    }
}

impl Layout for VStackLayout {
    fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size {
        self.stack().size_that_fits(proposal, children)
    }

    fn place(
        &self,
        bounds: Rect,
        proposal: ProposalSize,
        children: &[&dyn SubView],
    ) -> Vec<ChildPlacement> {
        self.stack().place(bounds, proposal, children)
    }
}
