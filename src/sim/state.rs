//! Game state and core simulation types
//!
//! Everything the overlay owns for one game session lives here; nothing is
//! persisted and nothing outside the running instance reads it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clamp_to_field;
use crate::consts::*;

/// Current phase of the overlay session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Overlay mounted, waiting for the start control
    NotStarted,
    /// Active gameplay
    Running,
    /// Lives hit zero; summary screen until restart
    GameOver,
}

/// The player's ship
#[derive(Debug, Clone, Copy)]
pub struct Player {
    /// Actual position (smoothed toward `target` every frame)
    pub pos: Vec2,
    /// Where input wants the ship to be
    pub target: Vec2,
    /// Banking angle in degrees, for render feedback
    pub rotation: f32,
}

impl Player {
    pub fn at_start() -> Self {
        let start = Vec2::new(PLAYER_START_X, PLAYER_START_Y);
        Self {
            pos: start,
            target: start,
            rotation: 0.0,
        }
    }

    /// Pull the actual position toward the target via exponential
    /// interpolation, banking proportional to horizontal velocity.
    pub fn smooth_toward_target(&mut self, smoothing: f32, dt: f32) {
        let before = self.pos;
        let blend = (smoothing * dt).min(1.0);
        self.pos += (self.target - self.pos) * blend;
        self.pos = clamp_to_field(self.pos);
        let dx = self.pos.x - before.x;
        self.rotation = (dx * BANK_PER_UNIT).clamp(-MAX_BANK_DEGREES, MAX_BANK_DEGREES);
    }

    /// Center point used for collision checks
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(PLAYER_SIZE / 2.0)
    }
}

/// Power-up flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Shield,
    SlowMo,
    Magnet,
}

impl PowerUpKind {
    pub fn duration_frames(self) -> f32 {
        match self {
            PowerUpKind::Shield => SHIELD_FRAMES,
            PowerUpKind::SlowMo => SLOWMO_FRAMES,
            PowerUpKind::Magnet => MAGNET_FRAMES,
        }
    }
}

/// Falling entity kinds. Shared motion fields live on [`Drop`]; everything
/// kind-specific (collision radius, score, colors) is resolved here rather
/// than through scattered conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    /// Decorative backdrop star; drifts through without colliding
    Star,
    /// Costs a life on unshielded contact; bullets destroy it for points
    Hazard,
    /// Scoring collectible
    Gem,
    PowerUp(PowerUpKind),
}

impl DropKind {
    /// Player-contact threshold (Euclidean distance); None means the kind
    /// never collides with the player.
    pub fn contact_radius(self) -> Option<f32> {
        match self {
            DropKind::Star => None,
            DropKind::Hazard => Some(HAZARD_HIT_RADIUS),
            DropKind::Gem => Some(GEM_PICKUP_RADIUS),
            DropKind::PowerUp(_) => Some(POWERUP_PICKUP_RADIUS),
        }
    }

    /// Base score for collecting (gems) or destroying (hazards) this kind
    pub fn score_value(self) -> u64 {
        match self {
            DropKind::Gem => GEM_SCORE,
            DropKind::Hazard => HAZARD_KILL_SCORE,
            _ => 0,
        }
    }

    /// Impact burst color (CSS hex, written straight into particle styles)
    pub fn particle_color(self) -> &'static str {
        match self {
            DropKind::Star => "#9ca3af",
            DropKind::Hazard => "#ef4444",
            DropKind::Gem => "#3b82f6",
            DropKind::PowerUp(_) => "#8b5cf6",
        }
    }

    /// Fall speed for a fresh spawn, field units per nominal frame
    pub fn spawn_speed(self, level: u32, rng: &mut Pcg32) -> f32 {
        match self {
            DropKind::Star => 1.0 + rng.random::<f32>() * 0.5,
            DropKind::Hazard => 1.5 + level as f32 * 0.2,
            DropKind::Gem => 1.2 + level as f32 * 0.1,
            DropKind::PowerUp(_) => 1.0,
        }
    }

    /// Horizontal spawn slack so wide sprites stay inside the field
    pub fn spawn_width(self) -> f32 {
        match self {
            DropKind::Hazard => 8.0,
            DropKind::PowerUp(_) => 6.0,
            _ => 5.0,
        }
    }
}

/// A falling entity (star, hazard, gem or power-up)
#[derive(Debug, Clone, Copy)]
pub struct Drop {
    pub id: u32,
    pub kind: DropKind,
    pub pos: Vec2,
    /// Field units per nominal frame, downward
    pub speed: f32,
}

/// A player bullet, climbing the field
#[derive(Debug, Clone, Copy)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
}

/// A short-lived visual particle
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
    pub color: &'static str,
}

/// Active power-up effects, counted down in nominal frames
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveEffects {
    /// Shield is both timed and consumed by the first hit it absorbs
    pub shield_frames: f32,
    pub slowmo_frames: f32,
    pub magnet_frames: f32,
}

impl ActiveEffects {
    pub fn shield_active(&self) -> bool {
        self.shield_frames > 0.0
    }

    pub fn slowmo_active(&self) -> bool {
        self.slowmo_frames > 0.0
    }

    pub fn magnet_active(&self) -> bool {
        self.magnet_frames > 0.0
    }

    pub fn decay(&mut self, dt: f32) {
        self.shield_frames = (self.shield_frames - dt).max(0.0);
        self.slowmo_frames = (self.slowmo_frames - dt).max(0.0);
        self.magnet_frames = (self.magnet_frames - dt).max(0.0);
    }

    pub fn activate(&mut self, kind: PowerUpKind) {
        let frames = kind.duration_frames();
        match kind {
            PowerUpKind::Shield => self.shield_frames = frames,
            PowerUpKind::SlowMo => self.slowmo_frames = frames,
            PowerUpKind::Magnet => self.magnet_frames = frames,
        }
    }
}

/// Complete state for one overlay session. Owned exclusively by the running
/// game instance; discarded on unmount.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed, reused on restart so resets are identical
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub player: Player,
    pub drops: Vec<Drop>,
    pub bullets: Vec<Bullet>,
    pub particles: Vec<Particle>,
    pub score: u64,
    /// Best score this session (in memory only, gone on unmount)
    pub best_score: u64,
    pub lives: u8,
    pub level: u32,
    pub combo: u32,
    pub effects: ActiveEffects,
    /// Render hint raised on unshielded hits, decays each frame
    pub shake: f32,
    next_id: u32,
}

impl GameState {
    /// Fresh overlay session, waiting on the start control
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotStarted,
            player: Player::at_start(),
            drops: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            score: 0,
            best_score: 0,
            lives: INITIAL_LIVES,
            level: 1,
            combo: 0,
            effects: ActiveEffects::default(),
            shake: 0.0,
            next_id: 1,
        }
    }

    /// Start or restart: one logical step that resets every counter and
    /// clears every entity collection before the loop resumes. The
    /// session-best score survives.
    pub fn start(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.phase = GamePhase::Running;
        self.player = Player::at_start();
        self.drops.clear();
        self.bullets.clear();
        self.particles.clear();
        self.score = 0;
        self.lives = INITIAL_LIVES;
        self.level = 1;
        self.combo = 0;
        self.effects = ActiveEffects::default();
        self.shake = 0.0;
        self.next_id = 1;
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add points and recompute the level from the score curve
    pub fn award(&mut self, points: u64) {
        self.score += points;
        self.level = (self.score / LEVEL_SCORE_STEP) as u32 + 1;
        if self.score > self.best_score {
            self.best_score = self.score;
        }
    }

    /// Burst of impact particles at a point, oldest pruned past the cap
    pub fn spawn_particles(&mut self, pos: Vec2, color: &'static str, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                self.particles.remove(0);
            }
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 4.0,
                (self.rng.random::<f32>() - 0.5) * 4.0,
            );
            self.particles.push(Particle {
                pos,
                vel,
                life: 1.0,
                color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_resets_to_initial_state() {
        let mut state = GameState::new(7);
        state.start();
        state.award(1234);
        state.lives = 1;
        state.combo = 9;
        let hazard_id = state.next_entity_id();
        state.drops.push(Drop {
            id: hazard_id,
            kind: DropKind::Hazard,
            pos: Vec2::new(10.0, 10.0),
            speed: 1.5,
        });
        state.bullets.push(Bullet {
            id: 99,
            pos: Vec2::new(5.0, 5.0),
        });
        state.spawn_particles(Vec2::new(1.0, 1.0), "#fff", 8);

        state.start();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, INITIAL_LIVES);
        assert_eq!(state.level, 1);
        assert_eq!(state.combo, 0);
        assert!(state.drops.is_empty());
        assert!(state.bullets.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.player.pos, Player::at_start().pos);
        // Session best survives the reset
        assert_eq!(state.best_score, 1234);
    }

    #[test]
    fn restart_is_deterministic() {
        let mut a = GameState::new(42);
        a.start();
        let first: Vec<f32> = (0..8).map(|_| a.rng.random::<f32>()).collect();
        a.start();
        let second: Vec<f32> = (0..8).map(|_| a.rng.random::<f32>()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn particle_cap_holds() {
        let mut state = GameState::new(1);
        state.spawn_particles(Vec2::ZERO, "#fff", MAX_PARTICLES + 50);
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn level_follows_score_curve() {
        let mut state = GameState::new(1);
        state.award(999);
        assert_eq!(state.level, 1);
        state.award(1);
        assert_eq!(state.level, 2);
        state.award(2000);
        assert_eq!(state.level, 4);
    }

    #[test]
    fn smoothing_clamps_to_field() {
        let mut player = Player::at_start();
        player.target = Vec2::new(-50.0, 500.0);
        for _ in 0..200 {
            player.smooth_toward_target(INPUT_SMOOTHING, 1.0);
        }
        let max = FIELD_SIZE - PLAYER_SIZE - FIELD_MARGIN;
        assert!(player.pos.x >= FIELD_MARGIN && player.pos.x <= max);
        assert!(player.pos.y >= FIELD_MARGIN && player.pos.y <= max);
    }
}
