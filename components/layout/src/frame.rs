//! Frames that replace or clamp the proposal of a single child.
//!
//! A fixed dimension (`width`/`height`) replaces the incoming proposal
//! outright: the child is offered exactly that value and the frame reports
//! it, whatever the child answers. Flexible bounds (`min_*`, `ideal_*`,
//! `max_*`) clamp the proposal instead and then clamp the child's answer.

use alloc::{vec, vec::Vec};

use crate::{Alignment, ChildPlacement, Layout, ProposalSize, Rect, Size, StretchAxis, SubView};

/// Constraints of one frame axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameAxis {
    /// Exact extent. Overrides every other field.
    pub fixed: Option<f32>,
    /// Lower bound.
    pub min: Option<f32>,
    /// Extent used when the parent leaves the axis unspecified.
    pub ideal: Option<f32>,
    /// Upper bound.
    pub max: Option<f32>,
}

impl FrameAxis {
    fn clamp(&self, value: f32) -> f32 {
        let value = self.max.map_or(value, |max| value.min(max));
        self.min.map_or(value, |min| value.max(min))
    }

    /// What the child is offered along this axis.
    fn child_proposal(&self, proposed: Option<f32>) -> Option<f32> {
        if let Some(fixed) = self.fixed {
            return Some(fixed);
        }
        proposed.or(self.ideal).map(|value| self.clamp(value))
    }

    /// The frame's own extent given the child's answer.
    fn resolve(&self, proposed: Option<f32>, child: f32) -> f32 {
        if let Some(fixed) = self.fixed {
            return fixed;
        }
        let offered = self.child_proposal(proposed);
        let mut extent = child;
        if let Some(min) = self.min {
            extent = extent.min(offered.unwrap_or(extent)).max(min);
        }
        if let Some(max) = self.max {
            extent = extent.max(offered.unwrap_or(extent)).min(max);
        }
        extent.max(0.0)
    }

    fn stretches(&self) -> bool {
        self.fixed.is_none() && self.max.is_some_and(f32::is_infinite)
    }
}

/// Layout that replaces or clamps a single child's proposal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameLayout {
    width: FrameAxis,
    height: FrameAxis,
    alignment: Alignment,
}

impl FrameLayout {
    /// A frame with no constraints; it reports whatever its child reports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame with exact dimensions on the given axes.
    #[must_use]
    pub fn fixed(width: Option<f32>, height: Option<f32>) -> Self {
        Self {
            width: FrameAxis {
                fixed: width.map(|w| w.max(0.0)),
                ..FrameAxis::default()
            },
            height: FrameAxis {
                fixed: height.map(|h| h.max(0.0)),
                ..FrameAxis::default()
            },
            alignment: Alignment::CENTER,
        }
    }

    /// Sets the alignment of the child within the frame.
    #[must_use]
    pub const fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the exact width.
    #[must_use]
    pub const fn width(mut self, width: f32) -> Self {
        self.width.fixed = Some(width);
        self
    }

    /// Sets the exact height.
    #[must_use]
    pub const fn height(mut self, height: f32) -> Self {
        self.height.fixed = Some(height);
        self
    }

    /// Sets the minimum width of the frame.
    #[must_use]
    pub const fn min_width(mut self, width: f32) -> Self {
        self.width.min = Some(width);
        self
    }

    /// Sets the ideal width of the frame.
    #[must_use]
    pub const fn ideal_width(mut self, width: f32) -> Self {
        self.width.ideal = Some(width);
        self
    }

    /// Sets the maximum width of the frame.
    #[must_use]
    pub const fn max_width(mut self, width: f32) -> Self {
        self.width.max = Some(width);
        self
    }

    /// Sets the minimum height of the frame.
    #[must_use]
    pub const fn min_height(mut self, height: f32) -> Self {
        self.height.min = Some(height);
        self
    }

    /// Sets the ideal height of the frame.
    #[must_use]
    pub const fn ideal_height(mut self, height: f32) -> Self {
        self.height.ideal = Some(height);
        self
    }

    /// Sets the maximum height of the frame.
    #[must_use]
    pub const fn max_height(mut self, height: f32) -> Self {
        self.height.max = Some(height);
        self
    }

    fn child_proposal(&self, proposal: ProposalSize) -> ProposalSize {
        ProposalSize {
            width: self.width.child_proposal(proposal.width),
            height: self.height.child_proposal(proposal.height),
        }
    }
}

impl Layout for FrameLayout {
    fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size {
        let child = children
            .first()
            .map_or(Size::zero(), |c| c.size_that_fits(self.child_proposal(proposal)));

        Size::new(
            self.width.resolve(proposal.width, child.width),
            self.height.resolve(proposal.height, child.height),
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
        let dimensions = child.measure(child_proposal);
        let origin = self.alignment.position(&bounds, &dimensions);

        vec![ChildPlacement::new(
            Rect::new(origin, dimensions.size()),
            child_proposal,
        )]
    }

    fn stretch_axis(&self) -> StretchAxis {
        match (self.width.stretches(), self.height.stretches()) {
            (true, true) => StretchAxis::Both,
            (true, false) => StretchAxis::Horizontal,
            (false, true) => StretchAxis::Vertical,
            (false, false) => StretchAxis::None,
        }
    }
}
