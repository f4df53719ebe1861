/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (`*.toml`, sorted by file name)
///   2. Built-in embedded levels ("Field", "Cave")
///
/// ## Level format (TOML):
///   ```toml
///   name = "Cave"
///   ground = { y = 360, width = 4800 }
///   spawn = { x = 100, y = 200 }            # optional
///   goal = { x = 4200, y = 280, w = 40, h = 80 }
///   solids = [ { x = 200, y = 300, w = 40, h = 40, kind = "block" } ]
///   platforms = [ { x = 800, y = 320, w = 80, h = 16,
///                   ax = 800, ay = 320, bx = 1110, by = 320, speed = 0.6 } ]
///   voids = [ { x = 900, w = 200 } ]
///   enemies = [ { x = 1500, y = 256, patrol = { axis = "x", min = 1460, max = 1660 } } ]
///   ```
///
/// Solid kinds: `block`, `pipe`, `ceiling`, `decor` (decor is never
/// collidable unless `collidable = true` says otherwise).
/// Enemies default to 24x24 facing left. Enemies without a patrol range
/// are snapped to the ground and nudged out of solids at load time.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config::{EnemyConfig, GameConfig};
use crate::domain::entity::{Axis, Enemy, Ground, Patrol, Player, Sign, Solid, SolidKind, VoidSpan};
use crate::domain::geometry::Rect;
use crate::domain::physics;
use crate::domain::platform::MovingPlatform;
use crate::sim::world::WorldState;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read level {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid level \"{level}\": {reason}")]
    Invalid { level: String, reason: String },
}

// ── Level schema ──

#[derive(Clone, Debug, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub ground: GroundDef,
    #[serde(default)]
    pub spawn: SpawnDef,
    pub goal: Rect,
    #[serde(default)]
    pub solids: Vec<SolidDef>,
    #[serde(default)]
    pub platforms: Vec<PlatformDef>,
    #[serde(default)]
    pub voids: Vec<VoidDef>,
    #[serde(default)]
    pub enemies: Vec<EnemyDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GroundDef {
    pub y: f32,
    pub width: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpawnDef {
    pub x: f32,
    pub y: f32,
}

impl Default for SpawnDef {
    fn default() -> Self {
        SpawnDef { x: 100.0, y: 200.0 }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SolidDef {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default)]
    pub kind: SolidKind,
    /// Overrides the kind's default.
    #[serde(default)]
    pub collidable: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlatformDef {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub ax: f32,
    pub ay: f32,
    pub bx: f32,
    pub by: f32,
    pub speed: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VoidDef {
    pub x: f32,
    pub w: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EnemyDef {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_enemy_size")]
    pub w: f32,
    #[serde(default = "default_enemy_size")]
    pub h: f32,
    #[serde(default = "default_enemy_dir")]
    pub dir: i32,
    #[serde(default)]
    pub patrol: Option<Patrol>,
}

fn default_enemy_size() -> f32 { 24.0 }
fn default_enemy_dir() -> i32 { -1 }

impl SolidDef {
    fn build(&self) -> Solid {
        let mut s = Solid::new(Rect::new(self.x, self.y, self.w, self.h), self.kind);
        if let Some(c) = self.collidable {
            s.collidable = c;
        }
        s
    }
}

impl PlatformDef {
    fn build(&self) -> MovingPlatform {
        MovingPlatform::new(
            Rect::new(self.x, self.y, self.w, self.h),
            (self.ax, self.ay),
            (self.bx, self.by),
            self.speed,
        )
    }
}

impl EnemyDef {
    fn build(&self, id: usize) -> Enemy {
        let e = Enemy::new(id, self.x, self.y, self.w, self.h, Sign::from_i32(self.dir));
        match self.patrol {
            Some(p) => e.with_patrol(p),
            None => e,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse and validate a level document.
pub fn parse_level(text: &str) -> Result<LevelDef, LevelError> {
    let def: LevelDef = toml::from_str(text)?;
    validate(&def)?;
    Ok(def)
}

pub fn load_level_file(path: &Path) -> Result<LevelDef, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&text)
}

/// Levels from `config.levels_dir`, or the built-ins if it has none.
pub fn level_list(config: &GameConfig) -> Vec<LevelDef> {
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let levels = load_from_directory(dir);
        if !levels.is_empty() {
            return levels;
        }
    }
    builtin_levels()
}

pub fn builtin_levels() -> Vec<LevelDef> {
    BUILTIN.iter()
        .filter_map(|(file, text)| match parse_level(text) {
            Ok(def) => Some(def),
            Err(e) => {
                log::warn!("built-in level {file} rejected: {e}");
                None
            }
        })
        .collect()
}

/// Install a level into the world. Lives reset to the configured count.
pub fn load_level(world: &mut WorldState, def: &LevelDef) {
    world.level_name = def.name.clone();
    world.ground = Ground { y: def.ground.y, width: def.ground.width };
    world.solids = def.solids.iter().map(SolidDef::build).collect();
    world.platforms = def.platforms.iter().map(PlatformDef::build).collect();
    world.voids = def.voids.iter().map(|v| VoidSpan { x: v.x, w: v.w }).collect();
    world.goal = def.goal;
    world.spawn = (def.spawn.x, def.spawn.y);

    let enemy_cfg = world.config.enemy.clone();
    world.enemy_spawns = def.enemies.iter().enumerate()
        .map(|(id, d)| {
            let mut e = d.build(id);
            if e.patrol.is_none() {
                place_enemy_safely(&mut e, &world.solids, &world.ground, &enemy_cfg);
            }
            e
        })
        .collect();
    world.enemies = world.enemy_spawns.clone();

    // Fresh player: no platform reference survives a level change.
    world.player = Player::new(def.spawn.x, def.spawn.y, world.config.lives);
    world.tick = 0;
    world.paused = false;
    world.recenter_camera();

    log::info!(
        "loaded level \"{}\": {} solids, {} platforms, {} voids, {} enemies",
        def.name, world.solids.len(), world.platforms.len(),
        world.voids.len(), world.enemies.len(),
    );
}

/// Snap an enemy onto the ground, then walk it right until it is clear
/// of every collidable solid. Past the world edge or out of attempts it
/// backs off and gives up.
pub fn place_enemy_safely(enemy: &mut Enemy, solids: &[Solid], ground: &Ground, cfg: &EnemyConfig) {
    let b = &mut enemy.body;
    b.y = ground.y - b.h;

    let mut attempts = 0u32;
    while !physics::is_free(solids, &b.rect()) {
        b.x += cfg.spawn_step;
        attempts += 1;
        if b.x > ground.width - b.w || attempts > cfg.spawn_attempts {
            b.x = (b.x - cfg.spawn_backoff).max(0.0);
            log::warn!("enemy {} could not be placed clear of solids; left at x={:.0}", enemy.id, b.x);
            break;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Validation
// ══════════════════════════════════════════════════════════════

fn validate(def: &LevelDef) -> Result<(), LevelError> {
    let invalid = |reason: String| LevelError::Invalid { level: def.name.clone(), reason };
    let sized = |w: f32, h: f32| w > 0.0 && h > 0.0;

    if !(def.ground.width > 0.0) {
        return Err(invalid(format!("ground width {} must be positive", def.ground.width)));
    }
    if def.ground.width < Player::WIDTH {
        return Err(invalid("ground is narrower than the player".into()));
    }
    if !sized(def.goal.w, def.goal.h) {
        return Err(invalid("goal has no area".into()));
    }
    for (i, s) in def.solids.iter().enumerate() {
        if !sized(s.w, s.h) {
            return Err(invalid(format!("solid {i} has no area")));
        }
    }
    for (i, p) in def.platforms.iter().enumerate() {
        if !sized(p.w, p.h) {
            return Err(invalid(format!("platform {i} has no area")));
        }
        if !(p.speed >= 0.0) {
            return Err(invalid(format!("platform {i} speed {} must be non-negative", p.speed)));
        }
    }
    for (i, v) in def.voids.iter().enumerate() {
        if !(v.w > 0.0) {
            return Err(invalid(format!("void {i} has no width")));
        }
    }
    for (i, e) in def.enemies.iter().enumerate() {
        if !sized(e.w, e.h) {
            return Err(invalid(format!("enemy {i} has no area")));
        }
        if e.w > def.ground.width {
            return Err(invalid(format!("enemy {i} is wider than the ground")));
        }
        if let Some(p) = e.patrol {
            if p.min > p.max {
                return Err(invalid(format!("enemy {i} patrol min {} > max {}", p.min, p.max)));
            }
            let x_max = def.ground.width - e.w;
            let in_world = match p.axis {
                Axis::X => p.min >= 0.0 && p.max <= x_max,
                Axis::Y => e.x >= 0.0 && e.x <= x_max,
            };
            if !in_world {
                return Err(invalid(format!("enemy {i} patrols outside [0, {x_max}]")));
            }
        }
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("cannot list {}: {e}", dir.display());
            return vec![];
        }
    };

    let mut paths: Vec<PathBuf> = entries.flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |x| x == "toml"))
        .collect();
    paths.sort();

    paths.iter()
        .filter_map(|p| match load_level_file(p) {
            Ok(def) => Some(def),
            Err(e) => {
                log::warn!("skipping level: {e}");
                None
            }
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

const BUILTIN: [(&str, &str); 2] = [
    ("01_field.toml", include_str!("../../levels/01_field.toml")),
    ("02_cave.toml", include_str!("../../levels/02_cave.toml")),
];
