//! Steadfast Haven site core
//!
//! Interactive logic for the nonprofit's marketing site, compiled to wasm:
//! - `sim`: Deterministic Space Adventure simulation (entities, collisions, scoring)
//! - `overlay`: Game overlay lifecycle and frame loop
//! - `content`: Read-only client for the headless CMS collections
//! - `contact`: Contact/RSVP form submission flow
//! - `reveal`: Scroll-triggered reveal timing
//! - `config`: Process-wide site configuration

pub mod config;
pub mod contact;
pub mod content;
pub mod overlay;
pub mod reveal;
pub mod sim;

pub use config::SiteConfig;

use glam::Vec2;

/// Game tuning constants
pub mod consts {
    /// Play field spans 0..100 on both axes (normalized units)
    pub const FIELD_SIZE: f32 = 100.0;
    /// Player sprite size in field units
    pub const PLAYER_SIZE: f32 = 6.0;
    /// Inset margin the player cannot leave
    pub const FIELD_MARGIN: f32 = 2.0;
    /// Default spawn position for the player ship
    pub const PLAYER_START_X: f32 = 50.0;
    pub const PLAYER_START_Y: f32 = 80.0;

    /// Nominal frame interval the original loop ran at (ms); dt is
    /// normalized against this so motion stays frame-rate independent
    pub const NOMINAL_FRAME_MS: f64 = 30.0;
    /// Cap on the dt factor after a long stall (tab switch etc.)
    pub const MAX_DT_FACTOR: f32 = 3.0;

    /// Keyboard steering speed, field units per nominal frame
    pub const KEY_MOVE_SPEED: f32 = 1.7;
    pub const KEY_MOVE_SPEED_MOBILE: f32 = 2.5;
    /// Exponential smoothing factor pulling the ship toward its target
    pub const INPUT_SMOOTHING: f32 = 0.2;
    pub const INPUT_SMOOTHING_MOBILE: f32 = 0.15;

    /// Minimum interval between shots (ms)
    pub const SHOOT_COOLDOWN_MS: f64 = 200.0;
    pub const SHOOT_COOLDOWN_MOBILE_MS: f64 = 150.0;
    /// Bullet climb speed, field units per nominal frame
    pub const BULLET_SPEED: f32 = 3.0;

    /// Entities spawn just above the visible field and despawn just below
    pub const SPAWN_Y: f32 = -5.0;
    pub const DESPAWN_Y: f32 = 105.0;
    pub const BULLET_DESPAWN_Y: f32 = -5.0;

    /// Per-frame spawn probabilities
    pub const STAR_SPAWN_CHANCE: f32 = 0.30;
    pub const GEM_SPAWN_CHANCE: f32 = 0.03;
    pub const POWERUP_SPAWN_CHANCE: f32 = 0.005;
    pub const HAZARD_SPAWN_BASE: f32 = 0.015;
    pub const HAZARD_SPAWN_PER_LEVEL: f32 = 0.008;

    /// Scoring
    pub const GEM_SCORE: u64 = 100;
    pub const HAZARD_KILL_SCORE: u64 = 50;
    pub const SURVIVAL_SCORE: u64 = 1;
    /// Level increases every this many points
    pub const LEVEL_SCORE_STEP: u64 = 1000;
    pub const INITIAL_LIVES: u8 = 3;

    /// Collision thresholds (Euclidean distance, field units)
    pub const GEM_PICKUP_RADIUS: f32 = 6.0;
    pub const HAZARD_HIT_RADIUS: f32 = 8.0;
    pub const POWERUP_PICKUP_RADIUS: f32 = 9.0;
    pub const BULLET_HIT_RADIUS: f32 = 4.0;
    /// Extra gem pickup range while the magnet power-up is active
    pub const MAGNET_BONUS_RADIUS: f32 = 12.0;

    /// Power-up durations in nominal frames (5 s / 3 s / 4 s at 30 ms)
    pub const SHIELD_FRAMES: f32 = 165.0;
    pub const SLOWMO_FRAMES: f32 = 100.0;
    pub const MAGNET_FRAMES: f32 = 133.0;
    /// Fall-speed multiplier while slow-motion is active
    pub const SLOWMO_FACTOR: f32 = 0.5;

    /// Particle life drains this much per nominal frame
    pub const PARTICLE_DECAY: f32 = 0.02;
    /// Hard cap on live particles
    pub const MAX_PARTICLES: usize = 256;

    /// Banking angle per unit of horizontal velocity (degrees)
    pub const BANK_PER_UNIT: f32 = 6.0;
    pub const MAX_BANK_DEGREES: f32 = 25.0;
}

/// Clamp a position to the margin-inset play field
#[inline]
pub fn clamp_to_field(p: Vec2) -> Vec2 {
    use consts::*;
    let max = FIELD_SIZE - PLAYER_SIZE - FIELD_MARGIN;
    Vec2::new(p.x.clamp(FIELD_MARGIN, max), p.y.clamp(FIELD_MARGIN, max))
}

/// Convert a pixel offset inside the play area to field coordinates
#[inline]
pub fn pixel_to_field(px: f32, py: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        px / width.max(1.0) * consts::FIELD_SIZE,
        py / height.max(1.0) * consts::FIELD_SIZE,
    )
}
