//! # brook-core
//!
//! The value layer of brook: the immutable view-description graph, the two
//! data-flow channels that run through it (the environment top-down and
//! preferences bottom-up), and the contracts the layout negotiation is
//! written against.
//!
//! Nothing here walks a graph on its own; the `brook` crate's resolver does
//! that. This crate only defines what a graph is and what the pieces of one
//! traversal look like.

pub mod alignment;
pub mod color;
pub mod env;
mod error;
pub mod graph;
pub mod id;
pub mod layout;
pub mod node;
pub mod preference;
pub mod render;
pub mod text;

pub use alignment::{
    Alignment, AlignmentGuide, Dimensions, GuideTable, HorizontalAlignment, VerticalAlignment,
};
pub use color::{Color, ForegroundKey};
pub use env::{EnvKey, Environment, EnvironmentWrite};
pub use error::EnvError;
pub use graph::{Traversable, Visit, Visitor, traverse};
pub use id::ViewId;
pub use layout::{
    Axis, ChildPlacement, Layout, Point, ProposalSize, Rect, Size, StretchAxis, SubView,
};
pub use node::{Node, NodeKind, Paint, Sizing};
pub use preference::{PreferenceKey, PreferenceLedger, PreferenceSlot};
pub use render::{PaintInstruction, RenderEntry, RenderPlan, Renderer};
pub use text::{Font, FontKey, MonospaceMeasurer, PlatformTextMeasurer, TextMetrics};
