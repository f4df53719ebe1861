/// Events emitted during a simulation step.
/// The session layer and any presentation host consume these
/// (life bookkeeping, sound cues, animation).

use crate::domain::entity::PlatformId;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    /// Not-grounded → grounded transition.
    Landed,
    HitCeiling,
    /// Rider was knocked off a platform by static geometry.
    Detached { platform: PlatformId },
    EnemyStomped { id: usize },
    PlayerHit { id: usize },
    PlayerFell,
    GoalReached,
}

impl GameEvent {
    /// Does this event cost the player a life?
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameEvent::PlayerHit { .. } | GameEvent::PlayerFell)
    }
}
