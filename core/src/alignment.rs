//! Alignment guides and the per-child layout answer.
//!
//! Every measured child carries a [`Dimensions`] value: its size plus a
//! [`GuideTable`] of explicitly overridden guides. Guides that were never
//! overridden fall back to an implicit position derived from the size, so a
//! table is usually empty.

use std::collections::BTreeMap;

use crate::layout::{Axis, Point, Rect, Size};

/// A named line inside a view that parents align children along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlignmentGuide {
    /// Left edge.
    Leading,
    /// Horizontal midpoint.
    HorizontalCenter,
    /// Right edge.
    Trailing,
    /// Top edge.
    Top,
    /// Vertical midpoint.
    VerticalCenter,
    /// Bottom edge.
    Bottom,
    /// Baseline of the first line of text. Defaults to the bottom edge.
    FirstTextBaseline,
    /// Baseline of the last line of text. Defaults to the bottom edge.
    LastTextBaseline,
}

impl AlignmentGuide {
    /// The axis the guide's offset is measured along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Leading | Self::HorizontalCenter | Self::Trailing => Axis::Horizontal,
            _ => Axis::Vertical,
        }
    }

    /// The implicit offset of this guide inside a view of `size`.
    #[must_use]
    pub const fn implicit(self, size: Size) -> f32 {
        match self {
            Self::Leading | Self::Top => 0.0,
            Self::HorizontalCenter => size.width / 2.0,
            Self::VerticalCenter => size.height / 2.0,
            Self::Trailing => size.width,
            Self::Bottom | Self::FirstTextBaseline | Self::LastTextBaseline => size.height,
        }
    }
}

/// Explicit alignment-guide overrides for one view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GuideTable {
    entries: BTreeMap<AlignmentGuide, f32>,
}

impl GuideTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns the explicit value for `guide`, if any.
    #[must_use]
    pub fn get(&self, guide: AlignmentGuide) -> Option<f32> {
        self.entries.get(&guide).copied()
    }

    /// Overrides `guide`.
    pub fn set(&mut self, guide: AlignmentGuide, value: f32) {
        self.entries.insert(guide, value);
    }

    /// Returns true if no guide is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over overridden guides in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (AlignmentGuide, f32)> + '_ {
        self.entries.iter().map(|(guide, value)| (*guide, *value))
    }

    /// Returns a copy with every guide shifted by the child's origin inside
    /// its parent, so the parent can re-export the child's guides.
    #[must_use]
    pub fn translated(&self, offset: Point) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(guide, value)| {
                let delta = match guide.axis() {
                    Axis::Horizontal => offset.x,
                    Axis::Vertical => offset.y,
                };
                (*guide, value + delta)
            })
            .collect();
        Self { entries }
    }
}

/// The answer a child gives to a proposal: a concrete size and its guides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dimensions {
    size: Size,
    guides: GuideTable,
}

impl Dimensions {
    /// Dimensions with implicit guides only.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            guides: GuideTable::new(),
        }
    }

    /// Dimensions with the given explicit guides.
    #[must_use]
    pub const fn with_guides(size: Size, guides: GuideTable) -> Self {
        Self { size, guides }
    }

    /// Zero-size placeholder.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(Size::zero())
    }

    /// The reported size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// The reported width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.size.width
    }

    /// The reported height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.size.height
    }

    /// The explicit guide overrides.
    #[must_use]
    pub const fn guides(&self) -> &GuideTable {
        &self.guides
    }

    /// Reads `guide`: the explicit override when present, else its implicit value.
    #[must_use]
    pub fn guide(&self, guide: AlignmentGuide) -> f32 {
        self.guides
            .get(guide)
            .unwrap_or_else(|| guide.implicit(self.size))
    }

    /// Overrides `guide`.
    pub fn set_guide(&mut self, guide: AlignmentGuide, value: f32) {
        self.guides.set(guide, value);
    }

    /// Replaces the size, keeping explicit guides.
    #[must_use]
    pub fn resized(mut self, size: Size) -> Self {
        self.size = size;
        self
    }
}

// ============================================================================
// Container alignment
// ============================================================================

/// Horizontal alignment of children inside a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalAlignment {
    /// Align along the leading edge.
    Leading,
    /// Align along the horizontal center.
    #[default]
    Center,
    /// Align along the trailing edge.
    Trailing,
}

impl HorizontalAlignment {
    /// The guide children are aligned along.
    #[must_use]
    pub const fn guide(self) -> AlignmentGuide {
        match self {
            Self::Leading => AlignmentGuide::Leading,
            Self::Center => AlignmentGuide::HorizontalCenter,
            Self::Trailing => AlignmentGuide::Trailing,
        }
    }
}

/// Vertical alignment of children inside a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlignment {
    /// Align along the top edge.
    Top,
    /// Align along the vertical center.
    #[default]
    Center,
    /// Align along the bottom edge.
    Bottom,
    /// Align along the first text baseline.
    FirstTextBaseline,
    /// Align along the last text baseline.
    LastTextBaseline,
}

impl VerticalAlignment {
    /// The guide children are aligned along.
    #[must_use]
    pub const fn guide(self) -> AlignmentGuide {
        match self {
            Self::Top => AlignmentGuide::Top,
            Self::Center => AlignmentGuide::VerticalCenter,
            Self::Bottom => AlignmentGuide::Bottom,
            Self::FirstTextBaseline => AlignmentGuide::FirstTextBaseline,
            Self::LastTextBaseline => AlignmentGuide::LastTextBaseline,
        }
    }
}

/// Two-dimensional alignment used by frames, overlays and z-stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    /// Horizontal component.
    pub horizontal: HorizontalAlignment,
    /// Vertical component.
    pub vertical: VerticalAlignment,
}

impl Alignment {
    /// Creates an alignment from its components.
    #[must_use]
    pub const fn new(horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Top-leading corner.
    pub const TOP_LEADING: Self = Self::new(HorizontalAlignment::Leading, VerticalAlignment::Top);
    /// Top edge, centered horizontally.
    pub const TOP: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Top);
    /// Top-trailing corner.
    pub const TOP_TRAILING: Self = Self::new(HorizontalAlignment::Trailing, VerticalAlignment::Top);
    /// Leading edge, centered vertically.
    pub const LEADING: Self = Self::new(HorizontalAlignment::Leading, VerticalAlignment::Center);
    /// Center.
    pub const CENTER: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Center);
    /// Trailing edge, centered vertically.
    pub const TRAILING: Self = Self::new(HorizontalAlignment::Trailing, VerticalAlignment::Center);
    /// Bottom-leading corner.
    pub const BOTTOM_LEADING: Self =
        Self::new(HorizontalAlignment::Leading, VerticalAlignment::Bottom);
    /// Bottom edge, centered horizontally.
    pub const BOTTOM: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Bottom);
    /// Bottom-trailing corner.
    pub const BOTTOM_TRAILING: Self =
        Self::new(HorizontalAlignment::Trailing, VerticalAlignment::Bottom);

    /// Positions a child inside `bounds` so that the child's guides line up
    /// with the container's guides of the same kind.
    ///
    /// The container's guide is its implicit one (a container exposes the
    /// plain edge/center lines), the child's guide honours overrides.
    #[must_use]
    pub fn position(&self, bounds: &Rect, child: &Dimensions) -> Point {
        let h = self.horizontal.guide();
        let v = self.vertical.guide();
        let x = bounds.x() + h.implicit(bounds.size()) - child.guide(h);
        let y = bounds.y() + v.implicit(bounds.size()) - child.guide(v);
        Point::new(x, y)
    }
}
