#![no_std]
//! Layout algorithms for brook.
//!
//! Every type here implements [`Layout`] from `brook-core` and is wrapped
//! into a graph node by the modifier surface of the `brook` crate. The
//! algorithms never see nodes, only [`SubView`] proxies, so they can be
//! tested against mock children.
//!
//! # Logical Pixels (Points)
//!
//! All layout values use **logical pixels** (points). Nothing in this crate
//! rounds; the resolver snaps rectangles to the device pixel grid once, when
//! it emits a render plan.
//!
//! # Containers
//!
//! - [`PaddingLayout`] insets a single child.
//! - [`FrameLayout`] replaces or clamps the proposal of a single child.
//! - [`FixedSizeLayout`] asks a child for its ideal size on chosen axes.
//! - [`OffsetLayout`] moves a child without affecting its parent.
//! - [`OverlayLayout`] layers decorations over or under a base child.
//! - [`HStackLayout`], [`VStackLayout`] and [`ZStackLayout`] arrange any
//!   number of children.

extern crate alloc;

pub use brook_core::alignment::*;
pub use brook_core::layout::*;

pub mod fixed_size;
pub mod frame;
pub mod offset;
pub mod overlay;
pub mod padding;
pub mod stack;

pub use fixed_size::FixedSizeLayout;
pub use frame::FrameLayout;
pub use offset::OffsetLayout;
pub use overlay::{Layering, OverlayLayout};
pub use padding::{EdgeInsets, Edges, PaddingLayout};
pub use stack::{HStackLayout, VStackLayout, ZStackLayout};

#[cfg(test)]
mod tests;
