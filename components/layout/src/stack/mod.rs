//! Stack layouts.
//!
//! [`HStackLayout`] and [`VStackLayout`] share one negotiation along their
//! main axis:
//!
//! 1. With an unspecified main proposal every child is asked for its ideal
//!    size and the stack is the sum of those plus spacing.
//! 2. Otherwise each child is probed with a zero and an infinite main
//!    proposal. Children whose answers agree are inflexible and are given
//!    their size first.
//! 3. The rest is distributed among flexible children by layout priority,
//!    highest first. A priority group reserves the minimum sizes of every
//!    lower group, then offers the remaining space evenly, least flexible
//!    child first, so that space a child does not use flows to its
//!    siblings. Offers are never negative.
//!
//! On the cross axis children are aligned along an alignment guide: the
//! guide line sits at the largest guide value among the children and each
//! child is shifted so its own guide lands on that line.

mod hstack;
mod vstack;
mod zstack;

pub use hstack::HStackLayout;
pub use vstack::VStackLayout;
pub use zstack::ZStackLayout;

use alloc::{vec, vec::Vec};

use crate::{
    AlignmentGuide, Axis, ChildPlacement, Dimensions, Point, ProposalSize, Rect, Size,
    StretchAxis, SubView,
};

/// Default distance between adjacent stack children.
pub const DEFAULT_SPACING: f32 = 8.0;

/// Position of an alignment line and the extent of the aligned children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AlignedExtent {
    /// Offset of the guide line from the leading/top edge of the content.
    pub line: f32,
    /// Extent of the content along the guide's axis.
    pub extent: f32,
}

impl AlignedExtent {
    /// Aligns `items` along `guide`.
    pub(crate) fn of<'a>(
        guide: AlignmentGuide,
        items: impl Iterator<Item = &'a Dimensions> + Clone,
    ) -> Self {
        let axis = guide.axis();
        let line = items
            .clone()
            .map(|d| d.guide(guide))
            .max_by(f32::total_cmp)
            .unwrap_or(0.0);
        let extent = items
            .map(|d| line - d.guide(guide) + d.size().along(axis))
            .max_by(f32::total_cmp)
            .unwrap_or(0.0)
            .max(0.0);
        Self { line, extent }
    }

    /// Offset of a child whose guide value is `guide_value`, inside bounds
    /// of `available` extent that align content by `guide`.
    pub(crate) fn offset(&self, guide: AlignmentGuide, available: f32, guide_value: f32) -> f32 {
        let slack = available - self.extent;
        let shift = match guide {
            AlignmentGuide::Leading | AlignmentGuide::Top => 0.0,
            AlignmentGuide::HorizontalCenter | AlignmentGuide::VerticalCenter => slack / 2.0,
            _ => slack,
        };
        shift + self.line - guide_value
    }
}

const fn origin_along(rect: &Rect, axis: Axis) -> f32 {
    match axis {
        Axis::Horizontal => rect.x(),
        Axis::Vertical => rect.y(),
    }
}

/// Outcome of negotiating with every child of a stack.
struct Negotiation {
    proposals: Vec<ProposalSize>,
    dimensions: Vec<Dimensions>,
}

struct Flexible {
    index: usize,
    min: f32,
    flexibility: f32,
    priority: i32,
}

/// The axis-generic stack algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Stack {
    pub axis: Axis,
    pub guide: AlignmentGuide,
    pub spacing: f32,
}

#[allow(clippy::cast_precision_loss)]
impl Stack {
    fn spacing_total(&self, count: usize) -> f32 {
        count.saturating_sub(1) as f32 * self.spacing.max(0.0)
    }

    fn is_spacer(child: &dyn SubView) -> bool {
        matches!(child.stretch_axis(), StretchAxis::MainAxis)
    }

    fn negotiate(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Negotiation {
        let main = self.axis;
        let cross = proposal.along(main.cross());
        let propose = |value: Option<f32>| ProposalSize::from_axes(main, value, cross);

        let offers: Vec<Option<f32>> = match proposal.along(main) {
            None => vec![None; children.len()],
            Some(available) => self.distribute(available, children, propose),
        };

        let proposals: Vec<ProposalSize> = offers.into_iter().map(propose).collect();
        let dimensions = children
            .iter()
            .zip(&proposals)
            .map(|(child, proposal)| child.measure(*proposal))
            .collect();

        Negotiation {
            proposals,
            dimensions,
        }
    }

    fn distribute(
        &self,
        available: f32,
        children: &[&dyn SubView],
        propose: impl Fn(Option<f32>) -> ProposalSize,
    ) -> Vec<Option<f32>> {
        let main = self.axis;
        let mut offers = vec![None; children.len()];
        let mut remaining = available - self.spacing_total(children.len());
        let mut flexible = Vec::new();

        for (index, child) in children.iter().enumerate() {
            let min = child.size_that_fits(propose(Some(0.0))).along(main).max(0.0);
            let max = child.size_that_fits(propose(Some(f32::INFINITY))).along(main);
            let flexibility = max - min;
            if flexibility > 0.0 {
                flexible.push(Flexible {
                    index,
                    min,
                    flexibility,
                    priority: child.priority(),
                });
            } else {
                offers[index] = Some(min);
                remaining -= min;
            }
        }

        // Stable: equal priority and flexibility keep document order.
        flexible.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.flexibility.total_cmp(&b.flexibility))
        });

        let mut start = 0;
        while start < flexible.len() {
            let priority = flexible[start].priority;
            let end = start
                + flexible[start..]
                    .iter()
                    .take_while(|f| f.priority == priority)
                    .count();
            let reserved: f32 = flexible[end..].iter().map(|f| f.min).sum();
            let mut space = remaining - reserved;

            let group = &flexible[start..end];
            for (taken, flex) in group.iter().enumerate() {
                let share = (space / (group.len() - taken) as f32).max(0.0);
                let size = children[flex.index]
                    .size_that_fits(propose(Some(share)))
                    .along(main);
                offers[flex.index] = Some(share);
                space -= size;
                remaining -= size;
            }
            start = end;
        }

        offers
    }

    fn cross_extent(&self, children: &[&dyn SubView], dimensions: &[Dimensions]) -> AlignedExtent {
        AlignedExtent::of(
            self.guide,
            children
                .iter()
                .zip(dimensions)
                .filter(|(child, _)| !Self::is_spacer(**child))
                .map(|(_, dimensions)| dimensions),
        )
    }

    pub(crate) fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size {
        if children.is_empty() {
            return Size::zero();
        }
        let negotiation = self.negotiate(proposal, children);
        let main: f32 = negotiation
            .dimensions
            .iter()
            .map(|d| d.size().along(self.axis))
            .sum::<f32>()
            + self.spacing_total(children.len());
        let cross = self.cross_extent(children, &negotiation.dimensions);
        Size::from_axes(self.axis, main, cross.extent)
    }

    pub(crate) fn place(
        &self,
        bounds: Rect,
        proposal: ProposalSize,
        children: &[&dyn SubView],
    ) -> Vec<ChildPlacement> {
        if children.is_empty() {
            return vec![];
        }
        let main = self.axis;
        let cross_axis = main.cross();
        let Negotiation {
            proposals,
            dimensions,
        } = self.negotiate(proposal, children);
        let aligned = self.cross_extent(children, &dimensions);

        let cross_origin = origin_along(&bounds, cross_axis);
        let available_cross = bounds.size().along(cross_axis);
        let mut cursor = origin_along(&bounds, main);

        children
            .iter()
            .zip(proposals)
            .zip(&dimensions)
            .map(|((child, proposal), dimensions)| {
                let length = dimensions.size().along(main);
                let (cross_pos, cross_len) = if Self::is_spacer(*child) {
                    (
                        cross_origin + aligned.offset(self.guide, available_cross, aligned.line),
                        aligned.extent,
                    )
                } else {
                    (
                        cross_origin
                            + aligned.offset(
                                self.guide,
                                available_cross,
                                dimensions.guide(self.guide),
                            ),
                        dimensions.size().along(cross_axis),
                    )
                };
                let rect = Rect::new(
                    Point::from_axes(main, cursor, cross_pos),
                    Size::from_axes(main, length, cross_len),
                );
                cursor += length + self.spacing.max(0.0);
                ChildPlacement::new(rect, proposal)
            })
            .collect()
    }
}
