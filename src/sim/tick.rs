//! Per-frame simulation step
//!
//! `tick` advances one frame in a fixed order: input, player smoothing,
//! entity motion, spawning, particle decay, collision resolution, then
//! off-field cleanup. Frame N is fully applied before frame N+1 starts.

use glam::Vec2;
use rand::Rng;

use super::collision::{bullet_hits_drop, player_hits_drop};
use super::input::Profile;
use super::state::{Bullet, Drop, DropKind, GamePhase, GameState, PowerUpKind};
use crate::clamp_to_field;
use crate::consts::*;

/// Held keyboard directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirSet {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl DirSet {
    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// Arbitrated movement command for one frame. Keyboard and pointer/touch
/// are never summed; the arbiter picks exactly one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Steering {
    #[default]
    Idle,
    /// Nudge the target by held directions
    Keys(DirSet),
    /// Snap the target toward a pointer/touch position (field coords,
    /// already offset to the sprite's top-left corner)
    Target(Vec2),
}

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub steering: Steering,
    /// Fire a bullet this frame (cooldown already applied by the arbiter)
    pub shoot: bool,
    pub profile: Profile,
}

/// Advance the game state by one frame. `dt` is the frame interval
/// normalized against the nominal 30 ms frame (1.0 at nominal rate).
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != GamePhase::Running {
        return;
    }

    state.shake = (state.shake - 0.15 * dt).max(0.0);

    // 1. Input moves the target
    match input.steering {
        Steering::Idle => {}
        Steering::Keys(dirs) => {
            let step = input.profile.move_speed() * dt;
            let mut target = state.player.target;
            if dirs.left {
                target.x -= step;
            }
            if dirs.right {
                target.x += step;
            }
            if dirs.up {
                target.y -= step;
            }
            if dirs.down {
                target.y += step;
            }
            state.player.target = clamp_to_field(target);
        }
        Steering::Target(pos) => {
            state.player.target = clamp_to_field(pos);
        }
    }

    if input.shoot {
        let center = state.player.center();
        let id = state.next_entity_id();
        state.bullets.push(Bullet {
            id,
            pos: Vec2::new(center.x - 0.5, state.player.pos.y - 2.0),
        });
        state.spawn_particles(center, "#60a5fa", 5);
    }

    // 2. Smooth the actual position toward the target
    state
        .player
        .smooth_toward_target(input.profile.smoothing(), dt);

    // 3. Advance falling entities and bullets
    let fall_factor = if state.effects.slowmo_active() {
        SLOWMO_FACTOR
    } else {
        1.0
    };
    for drop in &mut state.drops {
        drop.pos.y += drop.speed * fall_factor * dt;
    }
    for bullet in &mut state.bullets {
        bullet.pos.y -= BULLET_SPEED * dt;
    }

    // 4. Spawn new entities at the top edge
    spawn_drops(state, dt);

    // 5. Particle decay
    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        particle.life -= PARTICLE_DECAY * dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    // 6. Collision resolution
    resolve_player_contacts(state);
    resolve_bullet_hits(state);

    // 7. Remove anything that left the visible field
    state.drops.retain(|d| d.pos.y < DESPAWN_Y);
    state.bullets.retain(|b| b.pos.y > BULLET_DESPAWN_Y);

    // Survival score trickles in while the run is still alive
    if state.phase == GamePhase::Running {
        state.award(SURVIVAL_SCORE);
        state.effects.decay(dt);
    }
}

fn spawn_drops(state: &mut GameState, dt: f32) {
    let hazard_chance = HAZARD_SPAWN_BASE + HAZARD_SPAWN_PER_LEVEL * state.level as f32;
    spawn_one(state, DropKind::Star, STAR_SPAWN_CHANCE * dt);
    spawn_one(state, DropKind::Hazard, hazard_chance * dt);
    spawn_one(state, DropKind::Gem, GEM_SPAWN_CHANCE * dt);
    let powerup = match state.rng.random_range(0..3u8) {
        0 => PowerUpKind::Shield,
        1 => PowerUpKind::SlowMo,
        _ => PowerUpKind::Magnet,
    };
    spawn_one(state, DropKind::PowerUp(powerup), POWERUP_SPAWN_CHANCE * dt);
}

fn spawn_one(state: &mut GameState, kind: DropKind, chance: f32) {
    if state.rng.random::<f32>() >= chance {
        return;
    }
    let x = state.rng.random::<f32>() * (FIELD_SIZE - kind.spawn_width());
    let speed = kind.spawn_speed(state.level, &mut state.rng);
    let id = state.next_entity_id();
    state.drops.push(Drop {
        id,
        kind,
        pos: Vec2::new(x, SPAWN_Y),
        speed,
    });
}

fn resolve_player_contacts(state: &mut GameState) {
    let player = state.player;
    let magnet = state.effects.magnet_active();

    let mut removed: Vec<u32> = Vec::new();
    let mut gems: Vec<Vec2> = Vec::new();
    let mut powerups: Vec<(PowerUpKind, Vec2)> = Vec::new();
    let mut hazard_hit: Option<Vec2> = None;

    for drop in &state.drops {
        if !player_hits_drop(&player, drop, magnet) {
            continue;
        }
        match drop.kind {
            DropKind::Gem => {
                removed.push(drop.id);
                gems.push(drop.pos);
            }
            DropKind::PowerUp(kind) => {
                removed.push(drop.id);
                powerups.push((kind, drop.pos));
            }
            DropKind::Hazard => {
                // At most one hazard contact is applied per frame
                if hazard_hit.is_none() {
                    removed.push(drop.id);
                    hazard_hit = Some(drop.pos);
                }
            }
            DropKind::Star => {}
        }
    }

    state.drops.retain(|d| !removed.contains(&d.id));

    for pos in gems {
        let points = DropKind::Gem.score_value() * (state.combo as u64 + 1);
        state.award(points);
        state.combo += 1;
        state.spawn_particles(pos, DropKind::Gem.particle_color(), 8);
    }

    for (kind, pos) in powerups {
        state.effects.activate(kind);
        state.spawn_particles(pos, DropKind::PowerUp(kind).particle_color(), 12);
    }

    if let Some(pos) = hazard_hit {
        state.combo = 0;
        state.spawn_particles(pos, DropKind::Hazard.particle_color(), 15);
        if state.effects.shield_active() {
            // Shield absorbs the hit and is spent
            state.effects.shield_frames = 0.0;
        } else {
            state.lives = state.lives.saturating_sub(1);
            state.shake = 1.0;
            if state.lives == 0 && state.phase == GamePhase::Running {
                state.phase = GamePhase::GameOver;
                log::info!("game over: score {} level {}", state.score, state.level);
            }
        }
    }
}

fn resolve_bullet_hits(state: &mut GameState) {
    let mut dead_bullets: Vec<u32> = Vec::new();
    let mut dead_drops: Vec<u32> = Vec::new();
    let mut impacts: Vec<Vec2> = Vec::new();

    for bullet in &state.bullets {
        for drop in &state.drops {
            if dead_drops.contains(&drop.id) || !bullet_hits_drop(bullet, drop) {
                continue;
            }
            dead_bullets.push(bullet.id);
            dead_drops.push(drop.id);
            impacts.push(drop.pos);
            break;
        }
    }

    state.bullets.retain(|b| !dead_bullets.contains(&b.id));
    state.drops.retain(|d| !dead_drops.contains(&d.id));

    for pos in impacts {
        state.award(HAZARD_KILL_SCORE);
        state.spawn_particles(pos, "#fbbf24", 20);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Particle;
    use proptest::prelude::*;

    fn running() -> GameState {
        let mut state = GameState::new(1);
        state.start();
        state
    }

    fn place_hazard_on_player(state: &mut GameState) -> u32 {
        let center = state.player.center();
        let id = state.next_entity_id();
        state.drops.push(Drop {
            id,
            kind: DropKind::Hazard,
            // Hazards fall by `speed` before collisions run, so park it a
            // frame upstream of the player center
            pos: center - Vec2::new(0.0, 1.5),
            speed: 1.5,
        });
        id
    }

    #[test]
    fn gem_pickup_awards_score_and_removes_gem() {
        let mut state = running();
        let center = state.player.center();
        let id = state.next_entity_id();
        state.drops.push(Drop {
            id,
            kind: DropKind::Gem,
            pos: center + Vec2::new(3.0, -1.2),
            speed: 1.2,
        });
        let before = state.score;

        tick(&mut state, &TickInput::default(), 1.0);

        assert!(!state.drops.iter().any(|d| d.id == id));
        assert_eq!(state.score, before + GEM_SCORE + SURVIVAL_SCORE);
        assert_eq!(state.combo, 1);
    }

    #[test]
    fn combo_multiplies_gem_score() {
        let mut state = running();
        state.combo = 2;
        let center = state.player.center();
        let id = state.next_entity_id();
        state.drops.push(Drop {
            id,
            kind: DropKind::Gem,
            pos: center + Vec2::new(0.0, -1.2),
            speed: 1.2,
        });
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.score, GEM_SCORE * 3 + SURVIVAL_SCORE);
        assert_eq!(state.combo, 3);
    }

    #[test]
    fn bullet_kill_removes_both_and_scores() {
        let mut state = running();
        let bullet_id = state.next_entity_id();
        state.bullets.push(Bullet {
            id: bullet_id,
            pos: Vec2::new(40.0, 43.0),
        });
        let drop_id = state.next_entity_id();
        state.drops.push(Drop {
            id: drop_id,
            kind: DropKind::Hazard,
            // Bullet climbs 3, hazard falls 1.5: they meet near (40, 40)
            pos: Vec2::new(41.0, 38.5),
            speed: 1.5,
        });
        let before = state.score;

        tick(&mut state, &TickInput::default(), 1.0);

        assert!(!state.bullets.iter().any(|b| b.id == bullet_id));
        assert!(!state.drops.iter().any(|d| d.id == drop_id));
        assert_eq!(state.score, before + HAZARD_KILL_SCORE + SURVIVAL_SCORE);
    }

    #[test]
    fn unshielded_hazard_costs_a_life_and_resets_combo() {
        let mut state = running();
        state.combo = 5;
        place_hazard_on_player(&mut state);

        tick(&mut state, &TickInput::default(), 1.0);

        assert_eq!(state.lives, INITIAL_LIVES - 1);
        assert_eq!(state.combo, 0);
        assert!(state.shake > 0.0);
    }

    #[test]
    fn shield_absorbs_one_hit() {
        let mut state = running();
        state.effects.activate(PowerUpKind::Shield);
        place_hazard_on_player(&mut state);

        tick(&mut state, &TickInput::default(), 1.0);

        assert_eq!(state.lives, INITIAL_LIVES);
        assert!(!state.effects.shield_active());
    }

    #[test]
    fn lives_exhaustion_ends_the_game_exactly_once() {
        let mut state = running();
        for _ in 0..INITIAL_LIVES {
            assert_eq!(state.phase, GamePhase::Running);
            place_hazard_on_player(&mut state);
            tick(&mut state, &TickInput::default(), 1.0);
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);

        // Frozen after game over: no movement, no spawns, no score
        let drops_before: Vec<(u32, f32)> =
            state.drops.iter().map(|d| (d.id, d.pos.y)).collect();
        let score_before = state.score;
        tick(&mut state, &TickInput::default(), 1.0);
        let drops_after: Vec<(u32, f32)> =
            state.drops.iter().map(|d| (d.id, d.pos.y)).collect();
        assert_eq!(drops_before, drops_after);
        assert_eq!(state.score, score_before);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn off_field_entities_are_gone_next_frame() {
        let mut state = running();
        let drop_id = state.next_entity_id();
        state.drops.push(Drop {
            id: drop_id,
            kind: DropKind::Star,
            pos: Vec2::new(50.0, DESPAWN_Y - 0.1),
            speed: 1.0,
        });
        let bullet_id = state.next_entity_id();
        state.bullets.push(Bullet {
            id: bullet_id,
            pos: Vec2::new(50.0, BULLET_DESPAWN_Y + 0.1),
        });
        state.particles.push(Particle {
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::ZERO,
            life: 0.01,
            color: "#fff",
        });

        tick(&mut state, &TickInput::default(), 1.0);

        assert!(!state.drops.iter().any(|d| d.id == drop_id));
        assert!(!state.bullets.iter().any(|b| b.id == bullet_id));
        assert!(state.particles.iter().all(|p| p.life > 0.0));
    }

    #[test]
    fn slowmo_halves_fall_speed() {
        let mut state = running();
        let id = state.next_entity_id();
        state.drops.push(Drop {
            id,
            kind: DropKind::Star,
            pos: Vec2::new(50.0, 10.0),
            speed: 2.0,
        });
        state.effects.activate(PowerUpKind::SlowMo);
        tick(&mut state, &TickInput::default(), 1.0);
        let drop = state.drops.iter().find(|d| d.id == id).unwrap();
        assert!((drop.pos.y - 11.0).abs() < 1e-4);
    }

    #[test]
    fn shoot_spawns_a_climbing_bullet() {
        let mut state = running();
        let input = TickInput {
            shoot: true,
            ..TickInput::default()
        };
        tick(&mut state, &input, 1.0);
        assert_eq!(state.bullets.len(), 1);
        let y0 = state.bullets[0].pos.y;
        tick(&mut state, &TickInput::default(), 1.0);
        assert!(state.bullets[0].pos.y < y0);
    }

    #[test]
    fn not_started_state_is_inert() {
        let mut state = GameState::new(3);
        let input = TickInput {
            shoot: true,
            steering: Steering::Keys(DirSet {
                left: true,
                ..DirSet::default()
            }),
            ..TickInput::default()
        };
        tick(&mut state, &input, 1.0);
        assert_eq!(state.score, 0);
        assert!(state.bullets.is_empty());
        assert!(state.drops.is_empty());
    }

    proptest! {
        #[test]
        fn player_stays_inside_field_bounds(
            seed in 0u64..1000,
            moves in prop::collection::vec((0u8..5, 0.2f32..3.0), 1..120),
        ) {
            let mut state = GameState::new(seed);
            state.start();
            let max = FIELD_SIZE - PLAYER_SIZE - FIELD_MARGIN;
            for (dir, dt) in moves {
                let steering = match dir {
                    0 => Steering::Keys(DirSet { left: true, ..DirSet::default() }),
                    1 => Steering::Keys(DirSet { right: true, ..DirSet::default() }),
                    2 => Steering::Keys(DirSet { up: true, ..DirSet::default() }),
                    3 => Steering::Keys(DirSet { down: true, ..DirSet::default() }),
                    _ => Steering::Target(Vec2::new(-40.0, 240.0)),
                };
                let input = TickInput { steering, ..TickInput::default() };
                tick(&mut state, &input, dt);
                prop_assert!(state.player.pos.x >= FIELD_MARGIN && state.player.pos.x <= max);
                prop_assert!(state.player.pos.y >= FIELD_MARGIN && state.player.pos.y <= max);
            }
        }

        #[test]
        fn score_is_monotonic(seed in 0u64..1000, frames in 1usize..300) {
            let mut state = GameState::new(seed);
            state.start();
            let mut last = state.score;
            for i in 0..frames {
                let input = TickInput {
                    shoot: i % 7 == 0,
                    ..TickInput::default()
                };
                tick(&mut state, &input, 1.0);
                prop_assert!(state.score >= last);
                last = state.score;
            }
        }
    }
}
