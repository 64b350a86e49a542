//! Horizontal stack layout.

use alloc::vec::Vec;

use super::{DEFAULT_SPACING, Stack};
use crate::{Axis, ChildPlacement, Layout, ProposalSize, Rect, Size, SubView, VerticalAlignment};

/// Arranges children left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct HStackLayout {
    /// The vertical alignment of children within the stack.
    pub alignment: VerticalAlignment,
    /// The spacing between children in the stack.
    pub spacing: f32,
}

impl Default for HStackLayout {
    fn default() -> Self {
        Self {
            alignment: VerticalAlignment::Center,
            spacing: DEFAULT_SPACING,
        }
    }
}

impl HStackLayout {
    /// Creates a horizontal stack layout.
    #[must_use]
    pub const fn new(alignment: VerticalAlignment, spacing: f32) -> Self {
        Self { alignment, spacing }
    }

    const fn stack(&self) -> Stack {
        Stack {
            axis: Axis::Horizontal,
            guide: self.alignment.guide(),
            spacing: self.spacing,
        }
    }
}

impl Layout for HStackLayout {
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
