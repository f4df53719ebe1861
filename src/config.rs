/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// All values are per-tick quantities; the simulation never sees wall time.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub enemy: EnemyConfig,
    pub view: ViewConfig,
    pub levels_dir: PathBuf,
    pub log_level: String,
    pub lives: u32,
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub player_speed: f32,
    pub jump_impulse: f32,         // negative = upward
    pub damping: f32,              // vx multiplier with no horizontal input
    pub landing_tolerance: f32,    // one-way platform forgiveness, px
    pub platform_speed_scale: f32, // fixed dt_scale for platform advance
}

#[derive(Clone, Debug)]
pub struct EnemyConfig {
    pub speed: f32,
    pub stomp_threshold: f32, // max penetration (px) still counted as a stomp
    pub stomp_bounce: f32,
    pub activation_margin: f32,
    pub spawn_step: f32,
    pub spawn_attempts: u32,
    pub spawn_backoff: f32,
}

#[derive(Clone, Debug)]
pub struct ViewConfig {
    pub width: f32,
    pub height: f32,
    pub camera_lead: f32,
    pub fall_margin: f32, // below view.height + this = fell out
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    enemy: TomlEnemy,
    #[serde(default)]
    view: TomlView,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_jump_impulse")]
    jump_impulse: f32,
    #[serde(default = "default_damping")]
    damping: f32,
    #[serde(default = "default_landing_tolerance")]
    landing_tolerance: f32,
    #[serde(default = "default_platform_speed_scale")]
    platform_speed_scale: f32,
}

#[derive(Deserialize, Debug)]
struct TomlEnemy {
    #[serde(default = "default_enemy_speed")]
    speed: f32,
    #[serde(default = "default_stomp_threshold")]
    stomp_threshold: f32,
    #[serde(default = "default_stomp_bounce")]
    stomp_bounce: f32,
    #[serde(default = "default_activation_margin")]
    activation_margin: f32,
    #[serde(default = "default_spawn_step")]
    spawn_step: f32,
    #[serde(default = "default_spawn_attempts")]
    spawn_attempts: u32,
    #[serde(default = "default_spawn_backoff")]
    spawn_backoff: f32,
}

#[derive(Deserialize, Debug)]
struct TomlView {
    #[serde(default = "default_view_width")]
    width: f32,
    #[serde(default = "default_view_height")]
    height: f32,
    #[serde(default = "default_camera_lead")]
    camera_lead: f32,
    #[serde(default = "default_fall_margin")]
    fall_margin: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_lives")]
    lives: u32,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

// ── Defaults ──

fn default_gravity() -> f32 { 0.2 }
fn default_player_speed() -> f32 { 1.8 }
fn default_jump_impulse() -> f32 { -6.0 }
fn default_damping() -> f32 { 0.8 }
fn default_landing_tolerance() -> f32 { 8.0 }
fn default_platform_speed_scale() -> f32 { 1.25 }

fn default_enemy_speed() -> f32 { 0.8 }
fn default_stomp_threshold() -> f32 { 12.0 }
fn default_stomp_bounce() -> f32 { -6.0 }
fn default_activation_margin() -> f32 { 200.0 }
fn default_spawn_step() -> f32 { 16.0 }
fn default_spawn_attempts() -> u32 { 200 }
fn default_spawn_backoff() -> f32 { 200.0 }

fn default_view_width() -> f32 { 800.0 }
fn default_view_height() -> f32 { 400.0 }
fn default_camera_lead() -> f32 { 200.0 }
fn default_fall_margin() -> f32 { 50.0 }

fn default_levels_dir() -> String { "levels".into() }
fn default_log_level() -> String { "info".into() }
fn default_lives() -> u32 { 3 }
fn default_tick_rate() -> u64 { 16 } // ~60 ticks per second

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            player_speed: default_player_speed(),
            jump_impulse: default_jump_impulse(),
            damping: default_damping(),
            landing_tolerance: default_landing_tolerance(),
            platform_speed_scale: default_platform_speed_scale(),
        }
    }
}

impl Default for TomlEnemy {
    fn default() -> Self {
        TomlEnemy {
            speed: default_enemy_speed(),
            stomp_threshold: default_stomp_threshold(),
            stomp_bounce: default_stomp_bounce(),
            activation_margin: default_activation_margin(),
            spawn_step: default_spawn_step(),
            spawn_attempts: default_spawn_attempts(),
            spawn_backoff: default_spawn_backoff(),
        }
    }
}

impl Default for TomlView {
    fn default() -> Self {
        TomlView {
            width: default_view_width(),
            height: default_view_height(),
            camera_lead: default_camera_lead(),
            fall_margin: default_fall_margin(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            log_level: default_log_level(),
            lives: default_lives(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

// ── Conversion ──

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            physics: PhysicsConfig {
                gravity: t.physics.gravity,
                player_speed: t.physics.player_speed,
                jump_impulse: t.physics.jump_impulse,
                damping: t.physics.damping,
                landing_tolerance: t.physics.landing_tolerance,
                platform_speed_scale: t.physics.platform_speed_scale,
            },
            enemy: EnemyConfig {
                speed: t.enemy.speed,
                stomp_threshold: t.enemy.stomp_threshold,
                stomp_bounce: t.enemy.stomp_bounce,
                activation_margin: t.enemy.activation_margin,
                spawn_step: t.enemy.spawn_step,
                spawn_attempts: t.enemy.spawn_attempts,
                spawn_backoff: t.enemy.spawn_backoff,
            },
            view: ViewConfig {
                width: t.view.width,
                height: t.view.height,
                camera_lead: t.view.camera_lead,
                fall_margin: t.view.fall_margin,
            },
            levels_dir: PathBuf::from(t.general.levels_dir),
            log_level: t.general.log_level,
            lives: t.general.lives,
            tick_rate_ms: t.general.tick_rate_ms,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut cfg: GameConfig = load_toml(&search_dirs).into();

        // Relative levels dir: first candidate that actually has it
        if !cfg.levels_dir.is_absolute() {
            if let Some(found) = search_dirs.iter()
                .map(|d| d.join(&cfg.levels_dir))
                .find(|p| p.is_dir())
            {
                cfg.levels_dir = found;
            }
        }
        cfg
    }

    /// Parse a config document directly (missing keys use defaults).
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from)
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
