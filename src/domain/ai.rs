/// Enemy AI - patrol movement and contact classification.
///
/// Two patrol modes:
///   1. **Ranged** - the enemy declares an axis and `[min, max]`; it shuttles
///      along that axis and reverses exactly on the bounds.
///   2. **Default** - walk horizontally, bounce off static solids (nudged
///      1px clear) and off the world edges.
///
/// Only alive enemies inside the camera activation window move. Contacts
/// with the player are classified (stomp vs. hit); what a hit costs is
/// decided by the game-state layer, not here.

use super::entity::{Axis, Body, Enemy, Ground, Patrol, Sign, Solid};
use super::geometry::overlaps;
use super::physics::clamp_x;
use crate::config::EnemyConfig;

/// Horizontal span in which enemies are simulated.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ActivationWindow {
    pub left: f32,
    pub right: f32,
}

impl ActivationWindow {
    /// Camera viewport widened by `margin` on both sides.
    pub fn around(camera_x: f32, view_width: f32, margin: f32) -> Self {
        ActivationWindow { left: camera_x - margin, right: camera_x + view_width + margin }
    }

    #[inline]
    pub fn contains(&self, b: &Body) -> bool {
        b.x + b.w > self.left && b.x < self.right
    }
}

/// Classification of this tick's enemy/player contacts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnemyReport {
    /// Indices tombstoned this tick.
    pub stomped: Vec<usize>,
    /// Indices that touched the player without a stomp.
    pub hits: Vec<usize>,
}

impl EnemyReport {
    pub fn player_hit(&self) -> bool {
        !self.hits.is_empty()
    }
}

pub fn update_enemies(
    enemies: &mut [Enemy],
    player: &mut Body,
    solids: &[Solid],
    ground: &Ground,
    window: ActivationWindow,
    cfg: &EnemyConfig,
) -> EnemyReport {
    let mut report = EnemyReport::default();

    for (i, e) in enemies.iter_mut().enumerate() {
        if !e.alive { continue; }

        e.active = window.contains(&e.body);
        if !e.active { continue; }

        match e.patrol {
            Some(patrol) => ranged_patrol(&mut e.body, patrol, ground.width, cfg.speed),
            None => default_patrol(&mut e.body, solids, ground.width, cfg.speed),
        }

        if !overlaps(&e.body.rect(), &player.rect()) { continue; }

        let penetration = player.bottom() - e.body.y;
        if player.vy > 0.0 && penetration < cfg.stomp_threshold {
            e.alive = false;
            e.active = false;
            player.vy = cfg.stomp_bounce;
            report.stomped.push(i);
            log::debug!("enemy {} stomped (penetration {:.1})", e.id, penetration);
        } else {
            report.hits.push(i);
        }
    }

    report
}

/// Shuttle between the declared bounds. An X range reaching past the
/// world is cut at the world edges; a Y patroller's column is clamped.
fn ranged_patrol(b: &mut Body, patrol: Patrol, ground_width: f32, speed: f32) {
    let x_max = ground_width - b.w;
    let (min, max, pos) = match patrol.axis {
        Axis::X => (patrol.min.max(0.0), patrol.max.min(x_max), &mut b.x),
        Axis::Y => (patrol.min, patrol.max, &mut b.y),
    };
    *pos += b.dir.value() * speed;
    if *pos <= min {
        *pos = min;
        b.dir = Sign::Pos;
    } else if *pos >= max {
        *pos = max;
        b.dir = Sign::Neg;
    }
    b.x = clamp_x(b.x, b.w, ground_width);
}

fn default_patrol(b: &mut Body, solids: &[Solid], ground_width: f32, speed: f32) {
    b.x += b.dir.value() * speed;

    // First match, same tie-break as the body resolver.
    if let Some(s) = solids.iter().find(|s| s.collidable && overlaps(&b.rect(), &s.rect)) {
        b.dir = b.dir.flipped();
        b.x = match b.dir {
            Sign::Pos => s.rect.right() + 1.0,
            Sign::Neg => s.rect.x - b.w - 1.0,
        };
    }

    if b.x < 0.0 {
        b.x = 0.0;
        b.dir = Sign::Pos;
    }
    if b.x + b.w > ground_width {
        b.x = ground_width - b.w;
        b.dir = Sign::Neg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::SolidKind;
    use crate::domain::geometry::Rect;

    const GROUND: Ground = Ground { y: 360.0, width: 1000.0 };

    fn cfg() -> EnemyConfig {
        GameConfig::default().enemy
    }

    fn everywhere() -> ActivationWindow {
        ActivationWindow { left: f32::MIN, right: f32::MAX }
    }

    fn walker(x: f32, dir: Sign) -> Enemy {
        Enemy::new(0, x, 336.0, 24.0, 24.0, dir)
    }

    fn far_player() -> Body {
        Body::new(5000.0, 0.0, 32.0, 32.0)
    }

    #[test]
    fn walker_reverses_on_solid_and_nudges_clear() {
        let solids = [Solid::new(Rect::new(100.0, 300.0, 40.0, 60.0), SolidKind::Pipe)];
        let mut es = [walker(140.5, Sign::Neg)];
        update_enemies(&mut es, &mut far_player(), &solids, &GROUND, everywhere(), &cfg());
        assert_eq!(es[0].body.dir, Sign::Pos);
        assert_eq!(es[0].body.x, 141.0);

        let mut es = [walker(75.5, Sign::Pos)];
        update_enemies(&mut es, &mut far_player(), &solids, &GROUND, everywhere(), &cfg());
        assert_eq!(es[0].body.dir, Sign::Neg);
        assert_eq!(es[0].body.x, 75.0);
    }

    #[test]
    fn walker_stays_in_world_bounds() {
        let mut es = [walker(0.3, Sign::Neg), walker(975.5, Sign::Pos)];
        let mut p = far_player();
        for _ in 0..5000 {
            update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
            for e in &es {
                assert!(e.body.x >= 0.0);
                assert!(e.body.x + e.body.w <= GROUND.width);
            }
        }
    }

    #[test]
    fn ranged_patrol_clamps_to_bounds() {
        let patrol = Patrol { axis: Axis::X, min: 100.0, max: 110.0 };
        let mut es = [walker(109.5, Sign::Pos).with_patrol(patrol)];
        let mut p = far_player();
        update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
        assert_eq!(es[0].body.x, 110.0);
        assert_eq!(es[0].body.dir, Sign::Neg);
        for _ in 0..200 {
            update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
            assert!(es[0].body.x >= 100.0 && es[0].body.x <= 110.0);
        }
    }

    #[test]
    fn ranged_patrol_past_world_edge_stays_inside() {
        let patrol = Patrol { axis: Axis::X, min: 900.0, max: 1500.0 };
        let mut es = [walker(950.0, Sign::Pos).with_patrol(patrol)];
        let mut p = far_player();
        let mut turned = false;
        for _ in 0..2000 {
            update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
            let b = &es[0].body;
            assert!(b.x >= 900.0);
            assert!(b.x + b.w <= GROUND.width);
            turned |= b.dir == Sign::Neg;
        }
        assert!(turned);

        let column = Patrol { axis: Axis::Y, min: 200.0, max: 300.0 };
        let mut es = [walker(990.0, Sign::Neg).with_patrol(column)];
        update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
        assert_eq!(es[0].body.x, 976.0);
    }

    #[test]
    fn vertical_patrol_moves_on_y_only() {
        let patrol = Patrol { axis: Axis::Y, min: 200.0, max: 300.0 };
        let mut e = walker(400.0, Sign::Neg).with_patrol(patrol);
        e.body.y = 250.0;
        let mut es = [e];
        for _ in 0..400 {
            update_enemies(&mut es, &mut far_player(), &[], &GROUND, everywhere(), &cfg());
            assert_eq!(es[0].body.x, 400.0);
            assert!(es[0].body.y >= 200.0 && es[0].body.y <= 300.0);
        }
    }

    #[test]
    fn enemies_outside_window_do_not_move() {
        let mut es = [walker(900.0, Sign::Neg)];
        let window = ActivationWindow::around(0.0, 400.0, 200.0);
        update_enemies(&mut es, &mut far_player(), &[], &GROUND, window, &cfg());
        assert_eq!(es[0].body.x, 900.0);
        assert!(!es[0].active);

        let window = ActivationWindow::around(400.0, 400.0, 200.0);
        update_enemies(&mut es, &mut far_player(), &[], &GROUND, window, &cfg());
        assert!(es[0].active);
        assert!((es[0].body.x - 899.2).abs() < 1e-4);
    }

    #[test]
    fn descending_shallow_contact_is_a_stomp() {
        let mut es = [walker(100.0, Sign::Neg)];
        let mut p = Body::new(95.0, 336.0 - 32.0 + 5.0, 32.0, 32.0);
        p.vy = 2.0;
        let r = update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
        assert_eq!(r.stomped, vec![0]);
        assert!(!r.player_hit());
        assert!(!es[0].alive);
        assert_eq!(p.vy, -6.0);
    }

    #[test]
    fn side_contact_is_a_hit() {
        let mut es = [walker(100.0, Sign::Neg)];
        let mut p = Body::new(80.0, 328.0, 32.0, 32.0);
        let r = update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
        assert!(r.stomped.is_empty());
        assert_eq!(r.hits, vec![0]);
        assert!(es[0].alive);
    }

    #[test]
    fn deep_descending_contact_is_a_hit() {
        let mut es = [walker(100.0, Sign::Neg)];
        let mut p = Body::new(95.0, 336.0 - 32.0 + 20.0, 32.0, 32.0);
        p.vy = 2.0;
        let r = update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
        assert!(r.player_hit());
        assert!(es[0].alive);
    }

    #[test]
    fn tombstoned_enemy_never_reclassifies() {
        let mut es = [walker(100.0, Sign::Neg), walker(600.0, Sign::Neg)];
        let mut p = Body::new(95.0, 309.0, 32.0, 32.0);
        p.vy = 2.0;
        let r = update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
        assert_eq!(r.stomped, vec![0]);

        let x = es[0].body.x;
        for _ in 0..50 {
            p.vy = 2.0;
            let r = update_enemies(&mut es, &mut p, &[], &GROUND, everywhere(), &cfg());
            assert!(r.stomped.is_empty());
            assert!(!r.player_hit());
        }
        assert_eq!(es.len(), 2);
        assert!(!es[0].alive);
        assert_eq!(es[0].body.x, x);
    }
}
