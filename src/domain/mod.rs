//! Pure simulation rules. No I/O and no global state.

pub mod ai;
pub mod entity;
pub mod geometry;
pub mod physics;
pub mod platform;
