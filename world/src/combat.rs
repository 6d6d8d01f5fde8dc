//! Melee combat: weapon hitboxes, hit resolution and scheduled expiry.

use std::time::Duration;

use room_crawl_core::{ActorKind, CellCoord, CommandError, EntityId, Event, SwingError};
use tracing::debug;

use crate::registry::EntityRegistry;

/// Lifetime of a weapon hitbox unless configured otherwise.
pub const DEFAULT_WEAPON_DWELL: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug)]
struct WeaponTimer {
    weapon: EntityId,
    owner: EntityId,
    expires_at: Duration,
}

/// Schedule of live weapons and their absolute expiry times.
#[derive(Clone, Debug, Default)]
pub(crate) struct Armory {
    timers: Vec<WeaponTimer>,
}

impl Armory {
    pub(crate) fn live_weapons(&self) -> usize {
        self.timers.len()
    }

    fn is_armed(&self, owner: EntityId) -> bool {
        self.timers.iter().any(|timer| timer.owner == owner)
    }

    /// Spawns a weapon in front of the owner and resolves the hit at once.
    pub(crate) fn swing(
        &mut self,
        registry: &mut EntityRegistry,
        owner: EntityId,
        now: Duration,
        dwell: Duration,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let actor = registry
            .get(owner)
            .ok_or(CommandError::UnknownActor(owner))?;
        if actor.kind() != ActorKind::Player {
            return Err(CommandError::UnsupportedActor(owner));
        }

        if self.is_armed(owner) {
            out_events.push(Event::SwingRejected {
                actor: owner,
                reason: SwingError::WeaponActive,
            });
            return Ok(());
        }

        let facing = actor.facing();
        let target = actor.cell().neighbor(facing);
        let inserted = target.and_then(|cell| {
            registry
                .insert(ActorKind::Weapon, cell, facing)
                .ok()
                .map(|id| (id, cell))
        });
        let Some((weapon, cell)) = inserted else {
            out_events.push(Event::SwingRejected {
                actor: owner,
                reason: SwingError::OutOfBounds,
            });
            return Ok(());
        };

        out_events.push(Event::WeaponSpawned {
            weapon,
            owner,
            cell,
        });
        self.timers.push(WeaponTimer {
            weapon,
            owner,
            expires_at: now.saturating_add(dwell),
        });

        strike(registry, weapon, cell, out_events);
        Ok(())
    }

    /// Removes every weapon whose expiry time has been reached.
    pub(crate) fn expire(
        &mut self,
        registry: &mut EntityRegistry,
        now: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let timers = std::mem::take(&mut self.timers);
        for timer in timers {
            if timer.expires_at > now {
                self.timers.push(timer);
                continue;
            }

            if let Some(actor) = registry.remove(timer.weapon) {
                out_events.push(Event::WeaponExpired {
                    weapon: timer.weapon,
                    cell: actor.cell(),
                });
            }
        }
    }
}

fn strike(
    registry: &mut EntityRegistry,
    weapon: EntityId,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) {
    let target = registry
        .occupants_at(cell)
        .find(|actor| actor.id() != weapon && actor.flags().removable)
        .map(|actor| (actor.id(), actor.kind()));

    let Some((enemy, ActorKind::Enemy { health, patrol })) = target else {
        out_events.push(Event::SwingMissed { weapon, cell });
        return;
    };

    let remaining = health.saturating_sub(1);
    if remaining == 0 {
        if registry.remove(enemy).is_some() {
            debug!(enemy = enemy.get(), %cell, "enemy defeated");
            out_events.push(Event::EnemyDefeated { enemy, cell });
        }
        return;
    }

    match registry.replace_kind(
        enemy,
        ActorKind::Enemy {
            health: remaining,
            patrol,
        },
    ) {
        Ok(()) => out_events.push(Event::EnemyDamaged {
            enemy,
            health: remaining,
        }),
        Err(error) => debug!(%error, "struck enemy vanished before damage applied"),
    }
}

#[cfg(test)]
mod tests {
    use room_crawl_core::{Direction, Grid};

    use super::*;

    struct Arena {
        registry: EntityRegistry,
        armory: Armory,
        player: EntityId,
    }

    fn arena(facing: Direction) -> Arena {
        let mut registry = EntityRegistry::new(Grid::new(7, 7, 45));
        let player = registry
            .insert(ActorKind::Player, CellCoord::new(3, 3), facing)
            .expect("player");
        Arena {
            registry,
            armory: Armory::default(),
            player,
        }
    }

    fn enemy(registry: &mut EntityRegistry, cell: CellCoord, health: u32) -> EntityId {
        registry
            .insert(
                ActorKind::Enemy {
                    health,
                    patrol: Direction::Left,
                },
                cell,
                Direction::Left,
            )
            .expect("enemy")
    }

    #[test]
    fn swing_costs_the_enemy_one_health() {
        let mut arena = arena(Direction::Up);
        let target = enemy(&mut arena.registry, CellCoord::new(3, 2), 2);
        let mut events = Vec::new();

        arena
            .armory
            .swing(
                &mut arena.registry,
                arena.player,
                Duration::ZERO,
                DEFAULT_WEAPON_DWELL,
                &mut events,
            )
            .expect("player swings");

        assert!(events.contains(&Event::EnemyDamaged {
            enemy: target,
            health: 1
        }));
        assert_eq!(
            arena.registry.get(target).map(|actor| actor.kind()),
            Some(ActorKind::Enemy {
                health: 1,
                patrol: Direction::Left
            })
        );
    }

    #[test]
    fn last_health_point_removes_the_enemy() {
        let mut arena = arena(Direction::Right);
        let target = enemy(&mut arena.registry, CellCoord::new(4, 3), 1);
        let mut events = Vec::new();

        arena
            .armory
            .swing(
                &mut arena.registry,
                arena.player,
                Duration::ZERO,
                DEFAULT_WEAPON_DWELL,
                &mut events,
            )
            .expect("player swings");

        assert!(events.contains(&Event::EnemyDefeated {
            enemy: target,
            cell: CellCoord::new(4, 3)
        }));
        assert!(!arena.registry.contains(target));
        assert_eq!(arena.registry.enemy_count(), 0);
    }

    #[test]
    fn enemy_standing_in_the_opening_is_struck() {
        let mut arena = arena(Direction::Up);
        let _ = arena
            .registry
            .insert(ActorKind::Opening, CellCoord::new(3, 2), Direction::Up)
            .expect("opening");
        let target = enemy(&mut arena.registry, CellCoord::new(3, 2), 2);
        let mut events = Vec::new();

        arena
            .armory
            .swing(
                &mut arena.registry,
                arena.player,
                Duration::ZERO,
                DEFAULT_WEAPON_DWELL,
                &mut events,
            )
            .expect("player swings");

        assert!(events.contains(&Event::EnemyDamaged {
            enemy: target,
            health: 1
        }));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::SwingMissed { .. })));
    }

    #[test]
    fn empty_cell_is_a_miss_not_an_error() {
        let mut arena = arena(Direction::Down);
        let mut events = Vec::new();

        arena
            .armory
            .swing(
                &mut arena.registry,
                arena.player,
                Duration::ZERO,
                DEFAULT_WEAPON_DWELL,
                &mut events,
            )
            .expect("player swings");

        assert!(matches!(
            events.as_slice(),
            [Event::WeaponSpawned { .. }, Event::SwingMissed { .. }]
        ));
    }

    #[test]
    fn weapon_expires_exactly_at_its_deadline() {
        let mut arena = arena(Direction::Left);
        let mut events = Vec::new();
        arena
            .armory
            .swing(
                &mut arena.registry,
                arena.player,
                Duration::from_millis(200),
                DEFAULT_WEAPON_DWELL,
                &mut events,
            )
            .expect("player swings");
        assert_eq!(arena.armory.live_weapons(), 1);

        events.clear();
        arena
            .armory
            .expire(&mut arena.registry, Duration::from_millis(699), &mut events);
        assert!(events.is_empty());

        arena
            .armory
            .expire(&mut arena.registry, Duration::from_millis(700), &mut events);
        assert!(matches!(events.as_slice(), [Event::WeaponExpired { .. }]));
        assert_eq!(arena.armory.live_weapons(), 0);
        assert_eq!(arena.registry.len(), 1);
    }

    #[test]
    fn live_weapon_rejects_another_swing() {
        let mut arena = arena(Direction::Up);
        let mut events = Vec::new();
        for _ in 0..2 {
            arena
                .armory
                .swing(
                    &mut arena.registry,
                    arena.player,
                    Duration::ZERO,
                    DEFAULT_WEAPON_DWELL,
                    &mut events,
                )
                .expect("player swings");
        }

        assert_eq!(
            events.last(),
            Some(&Event::SwingRejected {
                actor: arena.player,
                reason: SwingError::WeaponActive
            })
        );
        assert_eq!(arena.armory.live_weapons(), 1);
    }

    #[test]
    fn enemies_cannot_swing() {
        let mut arena = arena(Direction::Up);
        let grunt = enemy(&mut arena.registry, CellCoord::new(1, 1), 2);
        let mut events = Vec::new();

        let result = arena.armory.swing(
            &mut arena.registry,
            grunt,
            Duration::ZERO,
            DEFAULT_WEAPON_DWELL,
            &mut events,
        );

        assert_eq!(result, Err(CommandError::UnsupportedActor(grunt)));
        assert!(events.is_empty());
    }
}
