//! Cavern Run: tick-based physics, collision and enemy core for a 2D
//! side-scrolling platformer.
//!
//! Layers:
//!   - `domain` - pure rules (geometry, bodies, platforms, physics, enemy AI)
//!   - `sim`    - owned world state, the `step()` orchestrator, levels, session
//!   - `config` - `config.toml` tuning with serde defaults

pub mod config;
pub mod domain;
pub mod sim;
