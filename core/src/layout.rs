//! Layout primitives and the size-negotiation contract.
//!
//! Layout in brook is a conversation between a parent and its children:
//!
//! 1. The parent sends each child a [`ProposalSize`]. Either axis may be
//!    unspecified (`None`), which asks the child for its ideal size.
//! 2. The child answers with [`Dimensions`]: the concrete size it will occupy
//!    plus any alignment guides it overrides.
//! 3. The parent picks its own size and places each child with
//!    [`Layout::place`].
//!
//! All values are logical points. Nothing in this module rounds; snapping to
//! the device pixel grid happens once, when a render plan is emitted.

use std::fmt::Debug;

use crate::alignment::Dimensions;

// ============================================================================
// Axis / StretchAxis
// ============================================================================

/// One of the two layout axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// The x axis.
    Horizontal,
    /// The y axis.
    Vertical,
}

impl Axis {
    /// Returns the perpendicular axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Specifies which axis (or axes) a view wants to stretch to fill available space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StretchAxis {
    /// No stretching - view uses its intrinsic size
    #[default]
    None,
    /// Stretch horizontally only
    Horizontal,
    /// Stretch vertically only
    Vertical,
    /// Stretch in both directions
    Both,
    /// Stretch along the parent container's main axis.
    /// In a vertical stack: expands vertically. In a horizontal stack: expands horizontally.
    /// Used by spacers.
    MainAxis,
}

impl StretchAxis {
    /// Returns true if this stretches along `axis` when placed in a container
    /// whose main axis is `main`.
    #[must_use]
    pub const fn stretches(&self, axis: Axis, main: Axis) -> bool {
        match self {
            Self::None => false,
            Self::Both => true,
            Self::Horizontal => matches!(axis, Axis::Horizontal),
            Self::Vertical => matches!(axis, Axis::Vertical),
            Self::MainAxis => (axis as u8) == (main as u8),
        }
    }
}

// ============================================================================
// SubView Trait - Child View Proxy
// ============================================================================

/// A proxy for querying child view sizes during layout.
///
/// Layout containers negotiate with children by asking "if I propose this
/// size, how big would you be?", possibly several times with different
/// proposals:
///
/// - `ProposalSize::UNSPECIFIED` - ideal/intrinsic size
/// - `ProposalSize::new(Some(0.0), None)` - minimum width
/// - `ProposalSize::new(Some(f32::INFINITY), None)` - maximum width
/// - `ProposalSize::new(Some(200.0), None)` - constrained width
///
/// All methods take `&self`; implementations are expected to memoise answers
/// for repeated proposals.
pub trait SubView {
    /// Measure the child for a given proposal, including its alignment guides.
    fn measure(&self, proposal: ProposalSize) -> Dimensions;

    /// Query only the child's size for a given proposal.
    fn size_that_fits(&self, proposal: ProposalSize) -> Size {
        self.measure(proposal).size()
    }

    /// Which axis (or axes) this view stretches to fill available space.
    fn stretch_axis(&self) -> StretchAxis;

    /// Layout priority for space distribution.
    ///
    /// Higher priority views get first claim on space left over after
    /// inflexible siblings are measured.
    fn priority(&self) -> i32;
}

// ============================================================================
// Layout Trait - Container Layout
// ============================================================================

/// A layout algorithm for arranging child views.
///
/// # Two-Phase Layout
///
/// 1. **Sizing** ([`size_that_fits`](Self::size_that_fits)): Determine how big
///    this container should be given a proposal
/// 2. **Placement** ([`place`](Self::place)): Position children within the
///    final bounds. `proposal` is the same proposal that produced the size of
///    `bounds`, so a layout can replay its negotiation exactly.
pub trait Layout: Debug + Send + Sync {
    /// Calculate the size this layout wants given a proposal.
    fn size_that_fits(&self, proposal: ProposalSize, children: &[&dyn SubView]) -> Size;

    /// Place children within the given bounds.
    ///
    /// Returns one [`ChildPlacement`] per child, in child order.
    fn place(
        &self,
        bounds: Rect,
        proposal: ProposalSize,
        children: &[&dyn SubView],
    ) -> Vec<ChildPlacement>;

    /// Which axis this container stretches to fill available space.
    fn stretch_axis(&self) -> StretchAxis {
        StretchAxis::None
    }
}

/// Where a child ends up and the proposal that produced its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildPlacement {
    /// The rectangle the child occupies, in the parent's coordinate space.
    pub rect: Rect,
    /// The proposal the child was measured with.
    pub proposal: ProposalSize,
}

impl ChildPlacement {
    /// Creates a new child placement.
    #[must_use]
    pub const fn new(rect: Rect, proposal: ProposalSize) -> Self {
        Self { rect, proposal }
    }
}

// ============================================================================
// Geometry Types
// ============================================================================

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    origin: Point,
    size: Size,
}

impl Rect {
    /// Creates a new [`Rect`] with the provided `origin` and `size`.
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Creates a rectangle from origin (0, 0) with the given size.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::zero(),
            size,
        }
    }

    /// Returns the rectangle's origin (top-left corner).
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Returns the rectangle's size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Returns the rectangle's x-coordinate (left edge).
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.origin.x
    }

    /// Returns the rectangle's y-coordinate (top edge).
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.origin.y
    }

    /// Returns the rectangle's width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.size.width
    }

    /// Returns the rectangle's height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.size.height
    }

    /// Returns the maximum x-coordinate (right edge).
    #[must_use]
    pub const fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// Returns the maximum y-coordinate (bottom edge).
    #[must_use]
    pub const fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Returns the midpoint x-coordinate.
    #[must_use]
    pub const fn mid_x(&self) -> f32 {
        self.origin.x + self.size.width / 2.0
    }

    /// Returns the midpoint y-coordinate.
    #[must_use]
    pub const fn mid_y(&self) -> f32 {
        self.origin.y + self.size.height / 2.0
    }

    /// Returns a copy moved by `dx`, `dy`.
    #[must_use]
    pub const fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            Point::new(self.origin.x + dx, self.origin.y + dy),
            self.size,
        )
    }

    /// Inset the rectangle by the given amounts on each edge.
    #[must_use]
    pub fn inset(&self, top: f32, bottom: f32, leading: f32, trailing: f32) -> Self {
        Self::new(
            Point::new(self.origin.x + leading, self.origin.y + top),
            Size::new(
                (self.size.width - leading - trailing).max(0.0),
                (self.size.height - top - bottom).max(0.0),
            ),
        )
    }
}

// ============================================================================
// Size
// ============================================================================

/// Two-dimensional size expressed in points.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// The width in points.
    pub width: f32,
    /// The height in points.
    pub height: f32,
}

impl Size {
    /// Constructs a [`Size`] with the given `width` and `height`.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Creates a [`Size`] with zero width and height.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// Returns the extent along `axis`.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Builds a size from main/cross extents for a container laid out along `main`.
    #[must_use]
    pub const fn from_axes(main: Axis, main_extent: f32, cross_extent: f32) -> Self {
        match main {
            Axis::Horizontal => Self::new(main_extent, cross_extent),
            Axis::Vertical => Self::new(cross_extent, main_extent),
        }
    }
}

// ============================================================================
// Point
// ============================================================================

/// Coordinate in points.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// The x-coordinate in points.
    pub x: f32,
    /// The y-coordinate in points.
    pub y: f32,
}

impl Point {
    /// Constructs a [`Point`] at the given `x` and `y`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a [`Point`] at the origin (0, 0).
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Builds a point from main/cross coordinates for a container laid out along `main`.
    #[must_use]
    pub const fn from_axes(main: Axis, main_pos: f32, cross_pos: f32) -> Self {
        match main {
            Axis::Horizontal => Self::new(main_pos, cross_pos),
            Axis::Vertical => Self::new(cross_pos, main_pos),
        }
    }
}

// ============================================================================
// ProposalSize
// ============================================================================

/// A size proposal from parent to child during layout negotiation.
///
/// Each dimension can be:
/// - `None` - "Tell me your ideal size" (unspecified)
/// - `Some(0.0)` - "Tell me your minimum size"
/// - `Some(f32::INFINITY)` - "Tell me your maximum size"
/// - `Some(value)` - "I suggest you use this size"
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProposalSize {
    /// Width proposal: `None` = unspecified, `Some(f32)` = suggested width
    pub width: Option<f32>,
    /// Height proposal: `None` = unspecified, `Some(f32)` = suggested height
    pub height: Option<f32>,
}

impl ProposalSize {
    /// Creates a [`ProposalSize`] from optional width and height.
    #[must_use]
    pub fn new(width: impl Into<Option<f32>>, height: impl Into<Option<f32>>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }

    /// Unspecified proposal - asks for ideal/intrinsic size.
    pub const UNSPECIFIED: Self = Self {
        width: None,
        height: None,
    };

    /// Zero proposal - asks for minimum size.
    pub const ZERO: Self = Self {
        width: Some(0.0),
        height: Some(0.0),
    };

    /// Infinite proposal - asks for maximum size.
    pub const INFINITY: Self = Self {
        width: Some(f32::INFINITY),
        height: Some(f32::INFINITY),
    };

    /// A fully specified proposal matching `size`.
    #[must_use]
    pub const fn exact(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
        }
    }

    /// Returns the width or a default value if unspecified.
    #[must_use]
    pub fn width_or(&self, default: f32) -> f32 {
        self.width.unwrap_or(default)
    }

    /// Returns the height or a default value if unspecified.
    #[must_use]
    pub fn height_or(&self, default: f32) -> f32 {
        self.height.unwrap_or(default)
    }

    /// Returns the proposal for `axis`.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Builds a proposal from main/cross values for a container laid out along `main`.
    #[must_use]
    pub const fn from_axes(main: Axis, main_value: Option<f32>, cross_value: Option<f32>) -> Self {
        match main {
            Axis::Horizontal => Self {
                width: main_value,
                height: cross_value,
            },
            Axis::Vertical => Self {
                width: cross_value,
                height: main_value,
            },
        }
    }

    /// Resolves unspecified axes to `fallback` and returns a concrete size.
    #[must_use]
    pub fn replace_unspecified(&self, fallback: Size) -> Size {
        Size::new(
            self.width.unwrap_or(fallback.width),
            self.height.unwrap_or(fallback.height),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::new(Point::new(10.0, 20.0), Size::new(100.0, 50.0));

        assert_eq!(rect.x(), 10.0);
        assert_eq!(rect.y(), 20.0);
        assert_eq!(rect.max_x(), 110.0);
        assert_eq!(rect.max_y(), 70.0);
        assert_eq!(rect.mid_x(), 60.0);
        assert_eq!(rect.mid_y(), 45.0);
    }

    #[test]
    fn test_rect_inset_never_negative() {
        let rect = Rect::from_size(Size::new(30.0, 30.0));
        let inset = rect.inset(20.0, 20.0, 5.0, 5.0);

        assert_eq!(inset.x(), 5.0);
        assert_eq!(inset.y(), 20.0);
        assert_eq!(inset.width(), 20.0);
        assert_eq!(inset.height(), 0.0);
    }

    #[test]
    fn test_proposal_axes() {
        let proposal = ProposalSize::from_axes(Axis::Vertical, Some(80.0), None);
        assert_eq!(proposal.width, None);
        assert_eq!(proposal.height, Some(80.0));
        assert_eq!(proposal.along(Axis::Vertical), Some(80.0));

        let size = proposal.replace_unspecified(Size::new(5.0, 5.0));
        assert_eq!(size, Size::new(5.0, 80.0));
    }

    #[test]
    fn test_unspecified_is_not_zero() {
        assert_ne!(ProposalSize::UNSPECIFIED, ProposalSize::ZERO);
        assert_eq!(ProposalSize::UNSPECIFIED.width_or(3.0), 3.0);
        assert_eq!(ProposalSize::ZERO.width_or(3.0), 0.0);
    }

    #[test]
    fn test_stretch_main_axis() {
        let spacer = StretchAxis::MainAxis;
        assert!(spacer.stretches(Axis::Horizontal, Axis::Horizontal));
        assert!(!spacer.stretches(Axis::Vertical, Axis::Horizontal));
        assert!(StretchAxis::Both.stretches(Axis::Vertical, Axis::Horizontal));
    }
}
