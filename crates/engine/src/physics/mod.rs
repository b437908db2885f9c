//! Support rules and gravity-style collapse.
//!
//! There is no simulated motion: a block either has support (ground, a block
//! beneath it, or a same-level chain leading to either) or it is removed.

pub mod cascade;
pub mod support;

use crate::world::layout::ColumnLayout;

/// Default bound on the number of cells one support search may visit.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// When false, placements skip validation and removals do not cascade.
    pub enabled: bool,
    /// Visited-set bound for horizontal support searches.
    pub support_search_limit: usize,
    /// Evaluate each cascade pass across the rayon pool.
    pub parallel_cascade: bool,
    pub layout: ColumnLayout,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            support_search_limit: DEFAULT_SEARCH_LIMIT,
            parallel_cascade: false,
            layout: ColumnLayout::default(),
        }
    }
}
