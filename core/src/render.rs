//! The output of one resolution pass and the renderer that consumes it.

use std::sync::Arc;

use crate::{color::Color, id::ViewId, layout::Rect, text::Font};

/// What to draw inside an entry's bounds.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintInstruction {
    /// Fill the bounds.
    Fill(Color),
    /// Stroke the outline of the bounds.
    Stroke {
        /// Stroke color.
        color: Color,
        /// Line width in points.
        width: f32,
    },
    /// Draw laid-out text.
    Text {
        /// The string.
        content: Arc<str>,
        /// Font resolved from the environment.
        font: Font,
        /// Color resolved from the environment.
        color: Color,
        /// Byte offsets where lines break.
        line_breaks: Vec<usize>,
    },
    /// Draw a named image resource.
    Image(Arc<str>),
}

/// One positioned draw instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderEntry {
    /// Identity of the node that produced the entry.
    pub id: ViewId,
    /// Bounds in root coordinates, snapped to the pixel grid.
    pub bounds: Rect,
    /// What to draw.
    pub paint: PaintInstruction,
    /// Effective z-index of the entry's nearest z-index modifier.
    pub z_index: f64,
}

/// Ordered draw instructions: later entries draw on top of earlier ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPlan {
    entries: Vec<RenderEntry>,
}

impl RenderPlan {
    /// Creates a plan from entries already in draw order.
    #[must_use]
    pub const fn new(entries: Vec<RenderEntry>) -> Self {
        Self { entries }
    }

    /// Entries in draw order.
    #[must_use]
    pub fn entries(&self) -> &[RenderEntry] {
        &self.entries
    }

    /// Looks up the entry produced by `id`.
    #[must_use]
    pub fn entry(&self, id: ViewId) -> Option<&RenderEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Consumer of render plans (a platform backend).
///
/// The plan is handed off once per successful update and never mutated
/// afterwards.
pub trait Renderer {
    /// Draws `plan`.
    fn present(&mut self, plan: Arc<RenderPlan>);
}
