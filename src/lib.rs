#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
mod error;
mod lifecycle;
pub mod logging;
pub mod resolver;
pub mod task;
pub mod view;

pub use config::ResolverConfig;
pub use error::{ResolveError, TaskError};
pub use logging::{install_panic_hook, install_tracing};
pub use resolver::{Geometry, Resolver};
pub use task::UpdateRequest;
#[doc(inline)]
pub use view::{Modifier, ViewExt};

#[doc(inline)]
pub use brook_core::{
    Alignment, AlignmentGuide, Color, Dimensions, EnvKey, EnvError, Environment, Font, FontKey,
    ForegroundKey, HorizontalAlignment, Layout, MonospaceMeasurer, Node, NodeKind, Paint,
    PaintInstruction, PlatformTextMeasurer, Point, PreferenceKey, ProposalSize, Rect, RenderEntry,
    RenderPlan, Renderer, Size, Sizing, StretchAxis, SubView, TextMetrics, VerticalAlignment,
    ViewId, env, node, preference, text,
};
pub use brook_layout as layout;

pub mod prelude {
    //! Everything needed to build and resolve a view graph.
    //!
    //! ```ignore
    //! use brook::prelude::*;
    //!
    //! let mut resolver = Resolver::default();
    //! let plan = resolver.resolve(&text("hello").padding(8.0), Size::new(320.0, 240.0))?;
    //! ```
    pub use super::view::*;
    pub use super::{
        Alignment, AlignmentGuide, Color, Dimensions, EnvKey, Font, HorizontalAlignment, Node,
        PreferenceKey, ProposalSize, Rect, RenderPlan, Resolver, ResolverConfig, Size,
        VerticalAlignment, ViewId,
    };
    pub use brook_layout::{EdgeInsets, Edges};
}
