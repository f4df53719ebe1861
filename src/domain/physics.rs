/// Body integration and collision resolution - single source of truth.
///
/// ## Per-tick pipeline for a body
///
///   1. `integrate_body`          - input, jump, gravity, then X pass, then Y pass
///   2. `resolve_rider_transport` - carry the body with the platform it stands on
///   3. `resolve_ground_and_void` - implicit ground floor, suppressed over voids
///
/// ## Collidable categories
///
///   - STATIC   - `Solid` with `collidable = true`. Blocks both axes.
///   - ONE-WAY  - `MovingPlatform`. Only catches a descending body from above.
///                Never takes part in the X pass, so a platform can't shove a
///                body sideways except through rider transport.
///   - VOID     - `VoidSpan`. Removes the ground floor under the body's center.
///
/// ## Tie-break
///
/// Every static query is FIRST MATCH in level order, not nearest hit.
/// Reordering `solids` can change the outcome when a probe overlaps two
/// solids at once.

use super::entity::{Body, Command, Ground, PlatformId, Sign, Solid, VoidSpan};
use super::geometry::{overlaps, Rect};
use super::platform::MovingPlatform;
use crate::config::PhysicsConfig;

// ══════════════════════════════════════════════════════════════
// Outcomes
// ══════════════════════════════════════════════════════════════

/// What a body came to rest on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Surface {
    Solid(usize),
    Platform(PlatformId),
}

/// Result of the vertical pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    None,
    Landed(Surface),
    HitCeiling,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Integration {
    pub jumped: bool,
    pub blocked_x: bool,
    pub contact: Contact,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Transport {
    /// Not riding, or the platform did not move.
    Idle,
    Carried(PlatformId),
    /// Blocked by a static solid; the body no longer follows the platform.
    Detached(PlatformId),
    /// Scooped up by a rising platform.
    Lifted(PlatformId),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GroundContact {
    Airborne,
    Grounded,
    OverVoid,
}

// ══════════════════════════════════════════════════════════════
// Static queries
// ══════════════════════════════════════════════════════════════

/// First collidable solid overlapping `probe`, in level order.
pub fn first_hit<'a>(solids: &'a [Solid], probe: &Rect) -> Option<(usize, &'a Solid)> {
    solids.iter().enumerate()
        .find(|(_, s)| s.collidable && overlaps(probe, &s.rect))
}

#[inline]
pub fn is_free(solids: &[Solid], probe: &Rect) -> bool {
    first_hit(solids, probe).is_none()
}

/// Keep a body inside `[0, ground_width - w]`.
#[inline]
pub fn clamp_x(x: f32, w: f32, ground_width: f32) -> f32 {
    x.min(ground_width - w).max(0.0)
}

// ══════════════════════════════════════════════════════════════
// Integration
// ══════════════════════════════════════════════════════════════

/// Advance a body one tick under `cmd`, resolving X then Y.
pub fn integrate_body(
    body: &mut Body,
    cmd: Command,
    solids: &[Solid],
    platforms: &[MovingPlatform],
    ground_width: f32,
    cfg: &PhysicsConfig,
) -> Integration {
    // Right wins when both are held.
    if cmd.right {
        body.vx = cfg.player_speed;
        body.dir = Sign::Pos;
    } else if cmd.left {
        body.vx = -cfg.player_speed;
        body.dir = Sign::Neg;
    } else {
        body.vx *= cfg.damping;
    }

    body.grounded = false;

    let mut jumped = false;
    if cmd.jump && !body.jumping {
        body.vy = cfg.jump_impulse;
        body.jumping = true;
        jumped = true;
    }

    body.vy += cfg.gravity;

    let blocked_x = resolve_horizontal(body, solids);
    body.x = clamp_x(body.x, body.w, ground_width);
    let contact = resolve_vertical(body, solids, platforms, cfg.landing_tolerance);

    Integration { jumped, blocked_x, contact }
}

/// X pass against static solids only. Returns true if blocked.
fn resolve_horizontal(body: &mut Body, solids: &[Solid]) -> bool {
    let next_x = body.x + body.vx;
    let probe = body.rect().at(next_x, body.y);

    match first_hit(solids, &probe) {
        Some((_, s)) => {
            if body.vx > 0.0 {
                body.x = s.rect.x - body.w;
            } else if body.vx < 0.0 {
                body.x = s.rect.right();
            }
            body.vx = 0.0;
            true
        }
        None => {
            body.x = next_x;
            false
        }
    }
}

/// Y pass: static solids first, then one-way platforms.
///
/// Riding is re-established every tick by the platform landing below.
/// A body that jumped or walked off its platform comes out of this pass
/// with `on_platform = None`.
fn resolve_vertical(
    body: &mut Body,
    solids: &[Solid],
    platforms: &[MovingPlatform],
    landing_tolerance: f32,
) -> Contact {
    body.on_platform = None;

    let prev_bottom = body.bottom();
    let next_y = body.y + body.vy;
    let probe = body.rect().at(body.x, next_y);

    if let Some((i, s)) = first_hit(solids, &probe) {
        if body.vy > 0.0 {
            body.y = s.rect.y - body.h;
            body.vy = 0.0;
            body.jumping = false;
            body.grounded = true;
            return Contact::Landed(Surface::Solid(i));
        }
        if body.vy < 0.0 {
            body.y = s.rect.bottom();
            body.vy = 0.0;
            return Contact::HitCeiling;
        }
        return Contact::None;
    }

    // Platforms are tested where they stood at the start of the tick;
    // rider transport then applies this tick's delta.
    if body.vy > 0.0 {
        for (i, p) in platforms.iter().enumerate() {
            if !p.collidable || !overlaps(&probe, &p.prev_rect()) { continue; }
            // Came from below or the side: pass through.
            if prev_bottom > p.prev_y + landing_tolerance { continue; }
            let rest = body.rect().at(body.x, p.prev_y - body.h);
            if !is_free(solids, &rest) { continue; }

            body.y = rest.y;
            body.vy = 0.0;
            body.jumping = false;
            body.grounded = true;
            body.on_platform = Some(PlatformId(i));
            return Contact::Landed(Surface::Platform(PlatformId(i)));
        }
    }

    body.y = next_y;
    Contact::None
}

// ══════════════════════════════════════════════════════════════
// Rider transport
// ══════════════════════════════════════════════════════════════

/// Apply the ridden platform's delta, then let rising platforms scoop
/// up any non-ascending body they overlap.
pub fn resolve_rider_transport(
    body: &mut Body,
    solids: &[Solid],
    platforms: &[MovingPlatform],
) -> Transport {
    let mut outcome = Transport::Idle;

    if let Some(id) = body.on_platform {
        match platforms.get(id.0) {
            None => {
                log::warn!("body referenced missing platform {}; detaching", id.0);
                body.on_platform = None;
            }
            Some(p) => outcome = carry(body, solids, p, id),
        }
    }

    // Ascending bodies keep one-way semantics even against rising platforms.
    if body.vy < 0.0 {
        return outcome;
    }

    let here = body.rect();
    let rising = platforms.iter().enumerate()
        .find(|(_, p)| p.collidable && p.moved_up() && overlaps(&here, &p.rect()));

    if let Some((i, p)) = rising {
        let id = PlatformId(i);
        let on_top = here.at(body.x, p.y - body.h);
        if is_free(solids, &on_top) {
            body.y = on_top.y;
            body.vy = 0.0;
            body.jumping = false;
            body.grounded = true;
            body.on_platform = Some(id);
            if outcome != Transport::Carried(id) {
                outcome = Transport::Lifted(id);
            }
        } else {
            body.on_platform = None;
        }
    }

    outcome
}

fn carry(body: &mut Body, solids: &[Solid], p: &MovingPlatform, id: PlatformId) -> Transport {
    let (dx, dy) = p.delta();
    if dx == 0.0 && dy == 0.0 {
        return Transport::Idle;
    }

    let proposed = body.rect().shifted(dx, dy);
    let hit = match first_hit(solids, &proposed) {
        None => {
            body.x = proposed.x;
            body.y = proposed.y;
            return Transport::Carried(id);
        }
        Some((_, s)) => s.rect,
    };

    // Push to the obstacle's near edge along the platform's dominant axis,
    // never further back than where the body already is.
    let (old_x, old_y) = (body.x, body.y);
    if dx.abs() >= dy.abs() {
        body.x = if dx > 0.0 {
            (hit.x - body.w).clamp(old_x, old_x + dx)
        } else {
            hit.right().clamp(old_x + dx, old_x)
        };
        body.vx = 0.0;
    } else {
        body.y = if dy > 0.0 {
            (hit.y - body.h).clamp(old_y, old_y + dy)
        } else {
            hit.bottom().clamp(old_y + dy, old_y)
        };
        body.vy = 0.0;
    }
    if !is_free(solids, &body.rect()) {
        body.x = old_x;
        body.y = old_y;
    }
    body.on_platform = None;
    log::debug!("rider detached from platform {} at ({:.1}, {:.1})", id.0, body.x, body.y);
    Transport::Detached(id)
}

// ══════════════════════════════════════════════════════════════
// Ground / void
// ══════════════════════════════════════════════════════════════

/// Implicit ground floor, skipped when the body's center is over a void.
///
/// A body whose top has already sunk past the ground line stays in the
/// pit; sliding sideways out of a void never teleports it back up.
pub fn resolve_ground_and_void(body: &mut Body, ground: &Ground, voids: &[VoidSpan]) -> GroundContact {
    let cx = body.rect().center_x();
    if voids.iter().any(|v| v.contains(cx)) {
        return GroundContact::OverVoid;
    }

    if body.bottom() > ground.y && body.y < ground.y {
        body.y = ground.y - body.h;
        body.vy = 0.0;
        body.jumping = false;
        body.grounded = true;
        body.on_platform = None;
        return GroundContact::Grounded;
    }
    GroundContact::Airborne
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
