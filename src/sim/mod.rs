//! World state and per-tick orchestration on top of `domain`.

pub mod event;
pub mod level;
pub mod session;
pub mod step;
pub mod world;
