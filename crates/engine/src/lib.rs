//! Block placement and support engine for a grid-clipped build site.
//!
//! The [`world`] module holds the sparse occupancy store and the ground grid,
//! [`physics`] decides support and runs collapse cascades, and [`placement`]
//! turns user intents into store changes.

pub mod change;
pub mod physics;
pub mod placement;
pub mod world;
