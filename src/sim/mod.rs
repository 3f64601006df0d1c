//! Deterministic Space Adventure simulation
//!
//! All gameplay logic lives here and stays platform-free:
//! - Seeded RNG only
//! - Frame-normalized dt, fixed step order within a frame
//! - No rendering or DOM dependencies

pub mod collision;
pub mod input;
pub mod state;
pub mod tick;

pub use collision::{bullet_hits_drop, player_hits_drop};
pub use input::{InputArbiter, Key, Profile};
pub use state::{
    ActiveEffects, Bullet, Drop, DropKind, GamePhase, GameState, Particle, Player, PowerUpKind,
};
pub use tick::{DirSet, Steering, TickInput, tick};
