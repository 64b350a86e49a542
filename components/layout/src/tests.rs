//! Layout system tests.
//!
//! These tests define the expected behavior of the stack containers for
//! space distribution, alignment and conservation of space.

use alloc::{vec, vec::Vec};

use crate::{
    Alignment, AlignmentGuide, Dimensions, GuideTable, HStackLayout, HorizontalAlignment, Layout,
    Point, ProposalSize, Rect, Size, StretchAxis, SubView, VStackLayout, VerticalAlignment,
    ZStackLayout,
};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A mock SubView that returns a fixed size regardless of proposal.
/// This simulates a "rigid" view like an icon or fixed-size image.
struct FixedSizeView {
    size: Size,
    guides: GuideTable,
}

impl FixedSizeView {
    fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            guides: GuideTable::new(),
        }
    }

    fn guide(mut self, guide: AlignmentGuide, value: f32) -> Self {
        self.guides.set(guide, value);
        self
    }
}

impl SubView for FixedSizeView {
    fn measure(&self, _proposal: ProposalSize) -> Dimensions {
        Dimensions::with_guides(self.size, self.guides.clone())
    }
    fn stretch_axis(&self) -> StretchAxis {
        StretchAxis::None
    }
    fn priority(&self) -> i32 {
        0
    }
}

/// A mock SubView that takes what it is offered within `min..=max`.
struct FlexibleView {
    min: Size,
    ideal: Size,
    max: Size,
    priority: i32,
}

impl FlexibleView {
    /// Flexible along the width only.
    fn wide(min: f32, ideal: f32, max: f32, priority: i32) -> Self {
        Self {
            min: Size::new(min, 20.0),
            ideal: Size::new(ideal, 20.0),
            max: Size::new(max, 20.0),
            priority,
        }
    }
}

impl SubView for FlexibleView {
    fn measure(&self, proposal: ProposalSize) -> Dimensions {
        let clamp = |p: Option<f32>, min: f32, ideal: f32, max: f32| {
            p.map_or(ideal, |v| v.min(max).max(min))
        };
        Dimensions::new(Size::new(
            clamp(proposal.width, self.min.width, self.ideal.width, self.max.width),
            clamp(
                proposal.height,
                self.min.height,
                self.ideal.height,
                self.max.height,
            ),
        ))
    }
    fn stretch_axis(&self) -> StretchAxis {
        StretchAxis::Both
    }
    fn priority(&self) -> i32 {
        self.priority
    }
}

/// A mock Spacer that stretches along the stack's main axis.
struct SpacerView;

impl SubView for SpacerView {
    fn measure(&self, proposal: ProposalSize) -> Dimensions {
        Dimensions::new(Size::new(
            proposal.width_or(0.0).max(0.0),
            proposal.height_or(0.0).max(0.0),
        ))
    }
    fn stretch_axis(&self) -> StretchAxis {
        StretchAxis::MainAxis
    }
    fn priority(&self) -> i32 {
        0
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn hstack(spacing: f32) -> HStackLayout {
    HStackLayout::new(VerticalAlignment::Center, spacing)
}

fn layout_width(layout: &dyn Layout, width: f32, children: &[&dyn SubView]) -> Vec<Rect> {
    let proposal = ProposalSize::new(width, None);
    let size = layout.size_that_fits(proposal, children);
    layout.place(Rect::from_size(size), proposal, children)
        .into_iter()
        .map(|p| p.rect)
        .collect()
}

fn assert_no_overlap(rects: &[Rect]) {
    for pair in rects.windows(2) {
        assert!(
            pair[0].max_x() <= pair[1].x() + 0.001,
            "{:?} overlaps {:?}",
            pair[0],
            pair[1]
        );
    }
}

// ============================================================================
// Conservation
// ============================================================================

#[test]
fn test_unspecified_proposal_sums_ideal_sizes() {
    let a = FixedSizeView::new(50.0, 30.0);
    let b = FlexibleView::wide(0.0, 60.0, f32::INFINITY, 0);
    let children: Vec<&dyn SubView> = vec![&a, &b];

    let size = hstack(10.0).size_that_fits(ProposalSize::UNSPECIFIED, &children);

    assert_eq!(size.width, 120.0); // 50 + 10 + 60
    assert_eq!(size.height, 30.0); // max height
}

#[test]
fn test_allocation_never_exceeds_proposal() {
    let a = FlexibleView::wide(0.0, 90.0, 90.0, 0);
    let b = FlexibleView::wide(0.0, 40.0, f32::INFINITY, 2);
    let c = FlexibleView::wide(0.0, 10.0, 300.0, 1);
    let d = FixedSizeView::new(25.0, 5.0);
    let children: Vec<&dyn SubView> = vec![&a, &b, &c, &d];

    for width in [0.0, 30.0, 75.0, 140.0, 400.0] {
        let rects = layout_width(&hstack(5.0), width, &children);
        let used: f32 = rects.iter().map(Rect::width).sum::<f32>() + 15.0;
        // The rigid child always keeps its 25 points.
        assert!(used <= width.max(40.0) + 0.001, "{used} > {width}");
        assert!(rects.iter().all(|r| r.width() >= 0.0));
        assert_no_overlap(&rects);
    }
}

// ============================================================================
// Priorities
// ============================================================================

#[test]
fn test_higher_priority_claims_space_first() {
    let low = FlexibleView::wide(0.0, 80.0, 80.0, 0);
    let high = FlexibleView::wide(0.0, 80.0, 80.0, 1);
    let children: Vec<&dyn SubView> = vec![&low, &high];

    let rects = layout_width(&hstack(0.0), 100.0, &children);

    assert_eq!(rects[1].width(), 80.0);
    assert_eq!(rects[0].width(), 20.0);
    assert_eq!(rects[1].x(), 20.0);
}

#[test]
fn test_low_priority_remainder_is_zero_not_negative() {
    let low = FlexibleView::wide(0.0, 120.0, 120.0, 0);
    let high = FlexibleView::wide(0.0, 120.0, 120.0, 1);
    let children: Vec<&dyn SubView> = vec![&low, &high];

    let rects = layout_width(&hstack(0.0), 100.0, &children);

    assert_eq!(rects[1].width(), 100.0);
    assert_eq!(rects[0].width(), 0.0);
}

#[test]
fn test_lower_groups_keep_their_minimum() {
    let low = FlexibleView::wide(30.0, 50.0, 200.0, 0);
    let high = FlexibleView::wide(0.0, 50.0, 200.0, 1);
    let children: Vec<&dyn SubView> = vec![&low, &high];

    let rects = layout_width(&hstack(0.0), 100.0, &children);

    assert_eq!(rects[1].width(), 70.0);
    assert_eq!(rects[0].width(), 30.0);
}

#[test]
fn test_equal_priority_splits_evenly() {
    let a = FlexibleView::wide(0.0, 10.0, f32::INFINITY, 0);
    let b = FlexibleView::wide(0.0, 10.0, f32::INFINITY, 0);
    let children: Vec<&dyn SubView> = vec![&a, &b];

    let rects = layout_width(&hstack(10.0), 100.0, &children);

    assert_eq!(rects[0].width(), 45.0);
    assert_eq!(rects[1].width(), 45.0);
    assert_eq!(rects[1].x(), 55.0);
}

#[test]
fn test_unused_space_flows_to_more_flexible_sibling() {
    let capped = FlexibleView::wide(0.0, 10.0, 20.0, 0);
    let open = FlexibleView::wide(0.0, 10.0, f32::INFINITY, 0);
    let children: Vec<&dyn SubView> = vec![&open, &capped];

    let rects = layout_width(&hstack(0.0), 100.0, &children);

    assert_eq!(rects[1].width(), 20.0);
    assert_eq!(rects[0].width(), 80.0);
}

// ============================================================================
// Spacers
// ============================================================================

#[test]
fn test_hstack_with_spacer() {
    let leading = FixedSizeView::new(30.0, 40.0);
    let trailing = FixedSizeView::new(30.0, 40.0);
    let children: Vec<&dyn SubView> = vec![&leading, &SpacerView, &trailing];

    let layout = hstack(0.0);
    let size = layout.size_that_fits(ProposalSize::new(200.0, None), &children);
    assert_eq!(size, Size::new(200.0, 40.0));

    let rects = layout_width(&layout, 200.0, &children);
    assert_eq!(rects[0].width(), 30.0);
    assert_eq!(rects[1].width(), 140.0); // 200 - 30 - 30
    assert_eq!(rects[2].x(), 170.0); // 30 + 140
}

#[test]
fn test_spacer_does_not_grow_cross_axis() {
    let item = FixedSizeView::new(30.0, 10.0);
    let children: Vec<&dyn SubView> = vec![&item, &SpacerView];

    let layout = VStackLayout::new(HorizontalAlignment::Center, 0.0);
    let size = layout.size_that_fits(ProposalSize::new(500.0, 100.0), &children);
    assert_eq!(size, Size::new(30.0, 100.0));
}

// ============================================================================
// Alignment
// ============================================================================

#[test]
fn test_vstack_centers_children() {
    let narrow = FixedSizeView::new(20.0, 10.0);
    let wide = FixedSizeView::new(60.0, 10.0);
    let children: Vec<&dyn SubView> = vec![&narrow, &wide];

    let layout = VStackLayout::new(HorizontalAlignment::Center, 4.0);
    let size = layout.size_that_fits(ProposalSize::UNSPECIFIED, &children);
    assert_eq!(size, Size::new(60.0, 24.0));

    let placed = layout.place(Rect::from_size(size), ProposalSize::UNSPECIFIED, &children);
    assert_eq!(placed[0].rect.origin(), Point::new(20.0, 0.0));
    assert_eq!(placed[1].rect.origin(), Point::new(0.0, 14.0));
}

#[test]
fn test_baselines_line_up() {
    let small = FixedSizeView::new(40.0, 20.0).guide(AlignmentGuide::FirstTextBaseline, 15.0);
    let large = FixedSizeView::new(40.0, 30.0).guide(AlignmentGuide::FirstTextBaseline, 25.0);
    let children: Vec<&dyn SubView> = vec![&small, &large];

    let layout = HStackLayout::new(VerticalAlignment::FirstTextBaseline, 0.0);
    let size = layout.size_that_fits(ProposalSize::UNSPECIFIED, &children);
    assert_eq!(size, Size::new(80.0, 30.0));

    let placed = layout.place(Rect::from_size(size), ProposalSize::UNSPECIFIED, &children);
    assert_eq!(placed[0].rect.y() + 15.0, placed[1].rect.y() + 25.0);
}

#[test]
fn test_explicit_guide_moves_child_onto_the_line() {
    let shifted = FixedSizeView::new(30.0, 10.0).guide(AlignmentGuide::Leading, 12.0);
    let plain = FixedSizeView::new(30.0, 10.0);
    let children: Vec<&dyn SubView> = vec![&shifted, &plain];

    let layout = VStackLayout::new(HorizontalAlignment::Leading, 0.0);
    let size = layout.size_that_fits(ProposalSize::UNSPECIFIED, &children);
    assert_eq!(size.width, 42.0);

    let placed = layout.place(Rect::from_size(size), ProposalSize::UNSPECIFIED, &children);
    assert_eq!(placed[0].rect.x() + 12.0, placed[1].rect.x());
}

#[test]
fn test_zstack_aligns_layers() {
    let base = FixedSizeView::new(100.0, 50.0);
    let badge = FixedSizeView::new(20.0, 20.0);
    let children: Vec<&dyn SubView> = vec![&base, &badge];

    let layout = ZStackLayout::new(Alignment::CENTER);
    let size = layout.size_that_fits(ProposalSize::UNSPECIFIED, &children);
    assert_eq!(size, Size::new(100.0, 50.0));

    let placed = layout.place(Rect::from_size(size), ProposalSize::UNSPECIFIED, &children);
    assert_eq!(placed[1].rect.origin(), Point::new(40.0, 15.0));

    let corner = ZStackLayout::new(Alignment::BOTTOM_TRAILING);
    let placed = corner.place(Rect::from_size(size), ProposalSize::UNSPECIFIED, &children);
    assert_eq!(placed[1].rect.origin(), Point::new(80.0, 30.0));
}

#[test]
fn test_empty_stack_is_zero() {
    let children: Vec<&dyn SubView> = vec![];
    assert_eq!(
        hstack(10.0).size_that_fits(ProposalSize::new(100.0, 100.0), &children),
        Size::zero()
    );
    assert!(hstack(10.0)
        .place(Rect::default(), ProposalSize::UNSPECIFIED, &children)
        .is_empty());
}
