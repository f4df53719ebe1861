/// Game-state layer on top of the physics step.
///
/// The core only classifies contacts; this is where a hit or a fall
/// costs a life, where the run ends, and where clear times are kept.
/// At most one life is lost per tick, however many fatal events fired.

use crate::domain::entity::Command;
use super::event::GameEvent;
use super::step;
use super::world::WorldState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
    Cleared,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub phase: Phase,
    /// Ticks actually stepped in the current attempt (pauses excluded).
    pub ticks_elapsed: u64,
    /// Fastest clear so far, in ticks.
    pub best_ticks: Option<u64>,
}

impl Session {
    pub fn new() -> Self {
        Session { phase: Phase::Playing, ticks_elapsed: 0, best_ticks: None }
    }

    /// Fresh attempt on a freshly loaded or restarted level.
    pub fn begin(&mut self) {
        self.phase = Phase::Playing;
        self.ticks_elapsed = 0;
    }

    /// Start the level over after a game over or on demand. The best
    /// time survives.
    pub fn restart(&mut self, world: &mut WorldState) {
        step::restart_level(world);
        self.begin();
    }

    /// Step the world once and settle the consequences.
    pub fn tick(&mut self, world: &mut WorldState, command: Command) -> Vec<GameEvent> {
        if self.phase != Phase::Playing || world.paused {
            return vec![];
        }
        let events = step::step(world, command);
        self.ticks_elapsed += 1;
        self.apply(&events, world);
        events
    }

    pub fn apply(&mut self, events: &[GameEvent], world: &mut WorldState) {
        if self.phase != Phase::Playing { return; }

        if events.iter().any(GameEvent::is_fatal) {
            self.lose_life(world);
        } else if events.contains(&GameEvent::GoalReached) {
            self.phase = Phase::Cleared;
            let best = self.best_ticks.map_or(self.ticks_elapsed, |b| b.min(self.ticks_elapsed));
            self.best_ticks = Some(best);
            log::info!("level \"{}\" cleared in {} ticks (best {})", world.level_name, self.ticks_elapsed, best);
        }
    }

    fn lose_life(&mut self, world: &mut WorldState) {
        let player = &mut world.player;
        player.lives = player.lives.saturating_sub(1);
        if player.lives > 0 {
            log::info!("life lost, {} left; respawning", player.lives);
            world.respawn_player();
            world.reset_enemies();
        } else {
            log::info!("game over on \"{}\"", world.level_name);
            self.phase = Phase::GameOver;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
