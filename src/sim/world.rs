/// WorldState: the complete snapshot of a running level.
///
/// ## Ownership
///
/// Everything the tick mutates lives here and is passed by `&mut` into
/// `step()`. There is no module-level state.
///   - `solids`, `voids`, `ground`, `goal` - geometry snapshot. Read-only
///     between level loads.
///   - `platforms` - advanced every tick, reset on restart.
///   - `enemies` - tombstoned on stomp, never removed. `enemy_spawns`
///     keeps the as-placed copy used by restarts and respawns.
///
/// ## Camera
///
/// Horizontal only. `camera.x` is the world x of the left viewport edge;
/// it also anchors the enemy activation window.

use crate::config::{GameConfig, ViewConfig};
use crate::domain::ai::ActivationWindow;
use crate::domain::entity::{Enemy, Ground, Player, Solid, VoidSpan};
use crate::domain::geometry::Rect;
use crate::domain::platform::MovingPlatform;

/// Camera: a horizontal viewport into the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Camera {
    /// World X of the left viewport edge.
    pub x: f32,
}

impl Camera {
    /// Keep the target `camera_lead` px from the left edge, clamped to
    /// the world. Worlds narrower than the view pin the camera at 0.
    pub fn follow(&mut self, target_x: f32, world_w: f32, view: &ViewConfig) {
        let max_x = (world_w - view.width).max(0.0);
        self.x = (target_x - view.camera_lead).clamp(0.0, max_x);
    }

    pub fn activation_window(&self, view: &ViewConfig, margin: f32) -> ActivationWindow {
        ActivationWindow::around(self.x, view.width, margin)
    }
}

pub struct WorldState {
    // ── Geometry snapshot ──
    pub level_name: String,
    pub solids: Vec<Solid>,
    pub platforms: Vec<MovingPlatform>,
    pub voids: Vec<VoidSpan>,
    pub ground: Ground,
    pub goal: Rect,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Enemies as placed at level load.
    pub enemy_spawns: Vec<Enemy>,
    pub spawn: (f32, f32),

    // ── Meta ──
    pub tick: u64,
    pub paused: bool,
    pub camera: Camera,
    pub config: GameConfig,
}

// ── Construction ──

impl WorldState {
    /// Empty world; `sim::level::load_level` fills it in.
    pub fn new(config: GameConfig) -> Self {
        WorldState {
            level_name: String::new(),
            solids: vec![],
            platforms: vec![],
            voids: vec![],
            ground: Ground { y: 360.0, width: config.view.width },
            goal: Rect::default(),
            player: Player::new(0.0, 0.0, config.lives),
            enemies: vec![],
            enemy_spawns: vec![],
            spawn: (0.0, 0.0),
            tick: 0,
            paused: false,
            camera: Camera::default(),
            config,
        }
    }

    pub fn activation_window(&self) -> ActivationWindow {
        self.camera.activation_window(&self.config.view, self.config.enemy.activation_margin)
    }

    /// Snap the camera to the player.
    pub fn recenter_camera(&mut self) {
        self.camera.follow(self.player.body.x, self.ground.width, &self.config.view);
    }

    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }
}

// ── Reset helpers ──

impl WorldState {
    /// Player back to the spawn point at rest. Lives are untouched.
    pub fn respawn_player(&mut self) {
        let (x, y) = self.spawn;
        self.player.body.reset_at(x, y);
        self.recenter_camera();
    }

    /// Every enemy revived at its as-placed position.
    pub fn reset_enemies(&mut self) {
        self.enemies = self.enemy_spawns.clone();
    }

    pub fn reset_platforms(&mut self) {
        for p in self.platforms.iter_mut() {
            p.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewConfig {
        GameConfig::default().view
    }

    #[test]
    fn camera_leads_the_player() {
        let mut cam = Camera::default();
        cam.follow(1000.0, 6000.0, &view());
        assert_eq!(cam.x, 800.0);
    }

    #[test]
    fn camera_clamps_to_world_edges() {
        let mut cam = Camera::default();
        cam.follow(50.0, 6000.0, &view());
        assert_eq!(cam.x, 0.0);
        cam.follow(5990.0, 6000.0, &view());
        assert_eq!(cam.x, 5200.0);
    }

    #[test]
    fn narrow_world_pins_camera() {
        let mut cam = Camera { x: 30.0 };
        cam.follow(500.0, 600.0, &view());
        assert_eq!(cam.x, 0.0);
    }

    #[test]
    fn activation_window_widens_viewport() {
        let cam = Camera { x: 1000.0 };
        let w = cam.activation_window(&view(), 200.0);
        assert_eq!((w.left, w.right), (800.0, 2000.0));
    }
}
