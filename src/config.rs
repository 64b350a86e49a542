//! Resolver configuration.

use brook_core::Alignment;

/// Limits and output settings of a [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolverConfig {
    /// Deepest nesting a traversal may reach before it is abandoned.
    pub max_depth: usize,
    /// Most uncached measurements one traversal may perform.
    pub measure_budget: usize,
    /// Device pixels per point. Render-plan bounds are snapped to this grid.
    pub scale_factor: f32,
    /// Where the root is placed inside the viewport.
    pub root_alignment: Alignment,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverConfig {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 256;
    /// Default measurement budget.
    pub const DEFAULT_MEASURE_BUDGET: usize = 200_000;

    /// The default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            measure_budget: Self::DEFAULT_MEASURE_BUDGET,
            scale_factor: 1.0,
            root_alignment: Alignment::CENTER,
        }
    }

    /// Sets the nesting limit.
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the measurement budget.
    #[must_use]
    pub const fn measure_budget(mut self, budget: usize) -> Self {
        self.measure_budget = budget;
        self
    }

    /// Sets the pixel density.
    #[must_use]
    pub const fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Sets where the root is placed inside the viewport.
    #[must_use]
    pub const fn root_alignment(mut self, alignment: Alignment) -> Self {
        self.root_alignment = alignment;
        self
    }

    /// Snaps `value` to the pixel grid.
    #[must_use]
    pub fn snap(&self, value: f32) -> f32 {
        if self.scale_factor > 0.0 && self.scale_factor.is_finite() {
            (value * self.scale_factor).round() / self.scale_factor
        } else {
            value.round()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_follows_scale_factor() {
        let config = ResolverConfig::new().scale_factor(2.0);
        assert_eq!(config.snap(10.3), 10.5);
        assert_eq!(config.snap(10.2), 10.0);
        assert_eq!(ResolverConfig::new().snap(10.5), 11.0);
    }
}
