/// Entities: bodies (player + enemies), static solids, voids, ground.
/// Moving platforms live in `platform.rs`.

use serde::Deserialize;

use super::geometry::Rect;

/// Direction sign (±1) shared by bodies, patrols and platform paths.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sign {
    Pos,
    Neg,
}

impl Sign {
    #[inline]
    pub fn value(self) -> f32 {
        match self {
            Sign::Pos => 1.0,
            Sign::Neg => -1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Sign {
        match self {
            Sign::Pos => Sign::Neg,
            Sign::Neg => Sign::Pos,
        }
    }

    /// Sign of a level-data integer; zero counts as positive.
    pub fn from_i32(v: i32) -> Sign {
        if v < 0 { Sign::Neg } else { Sign::Pos }
    }
}

/// Resolved per-tick command set. Input polling is the host's business.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Command {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl Command {
    pub const NONE: Command = Command { left: false, right: false, jump: false };
}

/// Index into the current level's platform list.
/// Cleared on every level load / reset, so it never dangles across levels.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlatformId(pub usize);

/// A dynamic axis-aligned body.
#[derive(Clone, Debug)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    /// Airborne after a jump. Only landing re-arms the jump.
    pub jumping: bool,
    /// Supported by a solid, platform or the ground at the end of the last tick.
    pub grounded: bool,
    pub on_platform: Option<PlatformId>,
    pub dir: Sign,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Body {
            x, y, w, h,
            vx: 0.0,
            vy: 0.0,
            jumping: false,
            grounded: false,
            on_platform: None,
            dir: Sign::Pos,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    #[inline]
    pub fn bottom(&self) -> f32 { self.y + self.h }

    /// Put the body back at rest at `(x, y)`.
    pub fn reset_at(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.jumping = false;
        self.grounded = false;
        self.on_platform = None;
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub lives: u32,
}

impl Player {
    pub const WIDTH: f32 = 32.0;
    pub const HEIGHT: f32 = 32.0;

    pub fn new(x: f32, y: f32, lives: u32) -> Self {
        Player {
            body: Body::new(x, y, Self::WIDTH, Self::HEIGHT),
            lives,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Range-bounded patrol: the enemy's position on `axis` stays in `[min, max]`.
#[derive(Clone, Copy, PartialEq, Debug, Deserialize)]
pub struct Patrol {
    pub axis: Axis,
    pub min: f32,
    pub max: f32,
}

/// Enemies are tombstoned (`alive = false`), never removed, so indices
/// stay stable for anything iterating the list.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: usize,
    pub body: Body,
    pub alive: bool,
    /// Inside the camera activation window on the last update.
    pub active: bool,
    pub patrol: Option<Patrol>,
}

impl Enemy {
    pub fn new(id: usize, x: f32, y: f32, w: f32, h: f32, dir: Sign) -> Self {
        let mut body = Body::new(x, y, w, h);
        body.dir = dir;
        Enemy { id, body, alive: true, active: false, patrol: None }
    }

    pub fn with_patrol(mut self, patrol: Patrol) -> Self {
        self.patrol = Some(patrol);
        self
    }
}

/// Rendering category. Physics ignores it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolidKind {
    #[default]
    Block,
    Pipe,
    Ceiling,
    Decor,
}

/// Static level geometry. Read-only during a tick.
#[derive(Clone, Debug)]
pub struct Solid {
    pub rect: Rect,
    pub kind: SolidKind,
    /// Non-collidable solids are excluded from every resolution pass.
    pub collidable: bool,
}

impl Solid {
    pub fn new(rect: Rect, kind: SolidKind) -> Self {
        Solid { rect, kind, collidable: kind != SolidKind::Decor }
    }
}

/// Ground is absent for world-x in `[x, x + w)`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct VoidSpan {
    pub x: f32,
    pub w: f32,
}

impl VoidSpan {
    #[inline]
    pub fn contains(&self, px: f32) -> bool {
        px >= self.x && px < self.x + self.w
    }
}

/// Implicit floor spanning `[0, width)` with its top at `y`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Ground {
    pub y: f32,
    pub width: f32,
}
