/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Platform advance (records prev position for rider deltas)
///   2. Player integration (input, jump, gravity, X pass, Y pass)
///   3. Rider transport
///   4. Ground / void
///   5. Enemy patrol + contact classification
///   6. Fall-out check
///   7. Goal check
///   8. Camera follow
///
/// Platforms must move before any body reads their delta, and enemies
/// run after the player so stomps see the fully resolved player box.
/// A paused world is left untouched: no tick count, no platform phase.

use crate::domain::ai;
use crate::domain::entity::Command;
use crate::domain::physics::{self, Contact, Transport};
use crate::domain::platform;
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, command: Command) -> Vec<GameEvent> {
    if world.paused { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    platform::advance_platforms(&mut world.platforms, world.config.physics.platform_speed_scale);
    resolve_player(world, command, &mut events);
    resolve_enemies(world, &mut events);
    resolve_fall(world, &mut events);
    resolve_goal(world, &mut events);
    world.recenter_camera();

    events
}

/// Restart the current level from its load-time state, lives included.
pub fn restart_level(world: &mut WorldState) {
    world.reset_platforms();
    world.reset_enemies();
    world.respawn_player();
    world.player.lives = world.config.lives;
    world.tick = 0;
    world.paused = false;
    log::info!("restarted level \"{}\"", world.level_name);
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, command: Command, events: &mut Vec<GameEvent>) {
    let body = &mut world.player.body;
    let was_grounded = body.grounded;

    let outcome = physics::integrate_body(
        body, command,
        &world.solids, &world.platforms,
        world.ground.width, &world.config.physics,
    );
    if outcome.jumped { events.push(GameEvent::Jumped); }
    if outcome.contact == Contact::HitCeiling { events.push(GameEvent::HitCeiling); }

    if let Transport::Detached(id) = physics::resolve_rider_transport(body, &world.solids, &world.platforms) {
        events.push(GameEvent::Detached { platform: id });
    }

    physics::resolve_ground_and_void(body, &world.ground, &world.voids);

    // Riding counts as standing even on ticks the platform carried the body.
    body.grounded |= body.on_platform.is_some();
    if body.grounded && !was_grounded {
        events.push(GameEvent::Landed);
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let window = world.activation_window();
    let report = ai::update_enemies(
        &mut world.enemies, &mut world.player.body,
        &world.solids, &world.ground,
        window, &world.config.enemy,
    );

    for &i in &report.stomped {
        events.push(GameEvent::EnemyStomped { id: world.enemies[i].id });
    }
    for &i in &report.hits {
        events.push(GameEvent::PlayerHit { id: world.enemies[i].id });
    }
}

// ══════════════════════════════════════════════════════════════
// Fall / goal classification
// ══════════════════════════════════════════════════════════════

fn resolve_fall(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let view = &world.config.view;
    if world.player.body.y > view.height + view.fall_margin {
        log::debug!("player fell out at x={:.0}", world.player.body.x);
        events.push(GameEvent::PlayerFell);
    }
}

fn resolve_goal(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let p = &world.player.body;
    let g = &world.goal;
    if p.x + p.w > g.x && p.x < g.right() {
        log::debug!("goal reached on tick {}", world.tick);
        events.push(GameEvent::GoalReached);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::{Enemy, Ground, Player, Sign, Solid, SolidKind, VoidSpan};
    use crate::domain::geometry::{overlaps, Rect};
    use crate::domain::platform::MovingPlatform;

    const RIGHT: Command = Command { left: false, right: true, jump: false };
    const JUMP: Command = Command { left: false, right: false, jump: true };

    /// Flat 6000px world, goal far away, player at (100, 200).
    fn world() -> WorldState {
        let mut w = WorldState::new(GameConfig::default());
        w.level_name = "test".into();
        w.ground = Ground { y: 360.0, width: 6000.0 };
        w.goal = Rect::new(5800.0, 280.0, 40.0, 80.0);
        w.spawn = (100.0, 200.0);
        w.player = Player::new(100.0, 200.0, 3);
        w
    }

    fn with_enemy(w: &mut WorldState, e: Enemy) {
        w.enemy_spawns.push(e.clone());
        w.enemies.push(e);
    }

    fn count(events: &[GameEvent], e: &GameEvent) -> usize {
        events.iter().filter(|x| *x == e).count()
    }

    #[test]
    fn resting_on_block_stays_put() {
        let mut w = world();
        w.solids.push(Solid::new(Rect::new(100.0, 232.0, 40.0, 40.0), SolidKind::Block));
        let mut all = vec![];
        for _ in 0..100 {
            all.extend(step(&mut w, Command::NONE));
            assert_eq!(w.player.body.y, 200.0);
            assert!(!overlaps(&w.player.body.rect(), &w.solids[0].rect));
        }
        assert_eq!(count(&all, &GameEvent::Landed), 1);
        assert!(w.player.body.grounded);
    }

    #[test]
    fn paused_world_does_not_advance() {
        let mut w = world();
        w.platforms.push(MovingPlatform::new(
            Rect::new(300.0, 300.0, 80.0, 16.0), (300.0, 300.0), (500.0, 300.0), 2.0,
        ));
        w.paused = true;
        for _ in 0..10 {
            assert!(step(&mut w, RIGHT).is_empty());
        }
        assert_eq!(w.tick, 0);
        assert_eq!(w.platforms[0].x, 300.0);
        assert_eq!(w.player.body.x, 100.0);
    }

    #[test]
    fn jump_then_land_emits_both_events() {
        let mut w = world();
        w.player.body.y = 328.0;
        step(&mut w, Command::NONE);
        assert!(w.player.body.grounded);

        let first = step(&mut w, JUMP);
        assert_eq!(count(&first, &GameEvent::Jumped), 1);
        assert!(!w.player.body.grounded);

        let mut later = vec![];
        for _ in 0..120 {
            later.extend(step(&mut w, Command::NONE));
        }
        assert_eq!(count(&later, &GameEvent::Landed), 1);
        assert_eq!(w.player.body.y, 328.0);
    }

    #[test]
    fn descending_onto_enemy_stomps_it() {
        let mut w = world();
        with_enemy(&mut w, Enemy::new(4, 100.0, 336.0, 24.0, 24.0, Sign::Neg));
        w.player.body.y = 305.0;
        w.player.body.vy = 2.0;
        let events = step(&mut w, Command::NONE);
        assert!(events.contains(&GameEvent::EnemyStomped { id: 4 }));
        assert!(!events.iter().any(GameEvent::is_fatal));
        assert!(!w.enemies[0].alive);
        assert_eq!(w.player.body.vy, -6.0);
    }

    #[test]
    fn walking_into_enemy_is_a_hit() {
        let mut w = world();
        w.player.body.y = 328.0;
        with_enemy(&mut w, Enemy::new(0, 160.0, 336.0, 24.0, 24.0, Sign::Neg));
        let mut hit = false;
        for _ in 0..40 {
            if step(&mut w, RIGHT).contains(&GameEvent::PlayerHit { id: 0 }) {
                hit = true;
                break;
            }
        }
        assert!(hit);
        assert!(w.enemies[0].alive);
    }

    #[test]
    fn falling_through_void_is_reported() {
        let mut w = world();
        w.voids.push(VoidSpan { x: 450.0, w: 150.0 });
        w.player.body.x = 500.0;
        w.player.body.y = 340.0;
        let mut fell_at = None;
        for t in 0..80 {
            if step(&mut w, Command::NONE).contains(&GameEvent::PlayerFell) {
                fell_at = Some(t);
                break;
            }
        }
        assert!(fell_at.is_some());
        assert!(w.player.body.y > 450.0);
    }

    #[test]
    fn reaching_goal_column_is_reported() {
        let mut w = world();
        w.goal = Rect::new(900.0, 280.0, 40.0, 80.0);
        w.player.body.x = 860.0;
        w.player.body.y = 328.0;
        let mut reached = false;
        for _ in 0..10 {
            if step(&mut w, RIGHT).contains(&GameEvent::GoalReached) {
                reached = true;
                break;
            }
        }
        assert!(reached);
    }

    #[test]
    fn rider_is_carried_by_step() {
        let mut w = world();
        w.platforms.push(MovingPlatform::new(
            Rect::new(100.0, 232.0, 80.0, 16.0), (100.0, 232.0), (400.0, 232.0), 1.6,
        ));
        let first = step(&mut w, Command::NONE);
        assert!(first.contains(&GameEvent::Landed));
        assert!(w.player.body.on_platform.is_some());

        for _ in 0..50 {
            step(&mut w, Command::NONE);
        }
        assert!((w.player.body.x - (w.platforms[0].x)).abs() < 1e-3);
        assert_eq!(w.player.body.y, 200.0);
    }

    #[test]
    fn walking_off_platform_lands_on_ground() {
        let mut w = world();
        w.platforms.push(MovingPlatform::new(
            Rect::new(300.0, 300.0, 80.0, 16.0), (300.0, 300.0), (300.0, 300.0), 0.0,
        ));
        w.player.body.x = 320.0;
        w.player.body.y = 268.0;
        w.player.body.grounded = true;
        w.player.body.on_platform = Some(crate::domain::entity::PlatformId(0));

        let mut all = vec![];
        let mut airborne = false;
        for _ in 0..80 {
            all.extend(step(&mut w, RIGHT));
            if !w.player.body.grounded {
                airborne = true;
                assert!(w.player.body.on_platform.is_none());
            }
        }
        assert!(airborne);
        assert_eq!(count(&all, &GameEvent::Landed), 1);
        assert_eq!(w.player.body.y, 328.0);
    }

    #[test]
    fn rider_pushed_into_wall_detaches() {
        let mut w = world();
        w.platforms.push(MovingPlatform::new(
            Rect::new(100.0, 232.0, 80.0, 16.0), (100.0, 232.0), (400.0, 232.0), 1.6,
        ));
        w.solids.push(Solid::new(Rect::new(200.0, 150.0, 40.0, 60.0), SolidKind::Block));
        let mut detached = 0;
        for _ in 0..60 {
            let events = step(&mut w, Command::NONE);
            detached += events.iter()
                .filter(|e| matches!(e, GameEvent::Detached { .. }))
                .count();
            assert!(!overlaps(&w.player.body.rect(), &w.solids[0].rect));
        }
        assert!(detached >= 1);
        assert!(w.player.body.x <= 168.0);
    }

    #[test]
    fn camera_follows_player() {
        let mut w = world();
        w.player.body.x = 1500.0;
        w.player.body.y = 328.0;
        step(&mut w, Command::NONE);
        assert_eq!(w.camera.x, 1300.0);
    }

    #[test]
    fn restart_restores_load_state() {
        let mut w = world();
        w.platforms.push(MovingPlatform::new(
            Rect::new(300.0, 300.0, 80.0, 16.0), (300.0, 300.0), (500.0, 300.0), 2.0,
        ));
        with_enemy(&mut w, Enemy::new(0, 100.0, 336.0, 24.0, 24.0, Sign::Neg));
        w.player.body.y = 305.0;
        w.player.body.vy = 2.0;
        step(&mut w, Command::NONE);
        for _ in 0..30 {
            step(&mut w, RIGHT);
        }
        assert!(!w.enemies[0].alive);

        w.player.body.on_platform = Some(crate::domain::entity::PlatformId(0));
        w.player.lives = 1;
        restart_level(&mut w);
        assert_eq!(w.tick, 0);
        assert_eq!(w.platforms[0].x, 300.0);
        assert_eq!(w.platforms[0].dir, Sign::Pos);
        assert!(w.enemies[0].alive);
        assert_eq!(w.enemies[0].body.x, 100.0);
        assert_eq!((w.player.body.x, w.player.body.y), (100.0, 200.0));
        assert!(w.player.body.on_platform.is_none());
        assert_eq!(w.player.lives, 3);
    }
}
