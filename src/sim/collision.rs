//! Collision detection for the play field
//!
//! Everything here is a Euclidean-distance check between circle centers;
//! thresholds come from the per-kind dispatch on [`DropKind`].

use glam::Vec2;

use super::state::{Bullet, Drop, DropKind, Player};
use crate::consts::*;

/// True if two points are closer than `threshold`
#[inline]
pub fn within(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance_squared(b) < threshold * threshold
}

/// Player contact test for a falling entity. Decorative kinds never hit;
/// an active magnet widens the gem pickup range.
pub fn player_hits_drop(player: &Player, drop: &Drop, magnet: bool) -> bool {
    let Some(mut radius) = drop.kind.contact_radius() else {
        return false;
    };
    if magnet && drop.kind == DropKind::Gem {
        radius += MAGNET_BONUS_RADIUS;
    }
    within(player.center(), drop.pos, radius)
}

/// Bullet impact test; only hazards are shootable
pub fn bullet_hits_drop(bullet: &Bullet, drop: &Drop) -> bool {
    drop.kind == DropKind::Hazard && within(bullet.pos, drop.pos, BULLET_HIT_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_at(kind: DropKind, x: f32, y: f32) -> Drop {
        Drop {
            id: 1,
            kind,
            pos: Vec2::new(x, y),
            speed: 1.0,
        }
    }

    fn player_centered_at(x: f32, y: f32) -> Player {
        let mut p = Player::at_start();
        p.pos = Vec2::new(x - PLAYER_SIZE / 2.0, y - PLAYER_SIZE / 2.0);
        p
    }

    #[test]
    fn gem_within_threshold_hits() {
        let player = player_centered_at(50.0, 50.0);
        // Distance 3, threshold 6
        let gem = drop_at(DropKind::Gem, 53.0, 50.0);
        assert!(player_hits_drop(&player, &gem, false));
    }

    #[test]
    fn gem_outside_threshold_misses() {
        let player = player_centered_at(50.0, 50.0);
        let gem = drop_at(DropKind::Gem, 57.0, 50.0);
        assert!(!player_hits_drop(&player, &gem, false));
    }

    #[test]
    fn magnet_widens_gem_pickup_only() {
        let player = player_centered_at(50.0, 50.0);
        let gem = drop_at(DropKind::Gem, 62.0, 50.0);
        assert!(!player_hits_drop(&player, &gem, false));
        assert!(player_hits_drop(&player, &gem, true));

        // Hazard range is unaffected by the magnet
        let hazard = drop_at(DropKind::Hazard, 62.0, 50.0);
        assert!(!player_hits_drop(&player, &hazard, true));
    }

    #[test]
    fn stars_never_collide() {
        let player = player_centered_at(50.0, 50.0);
        let star = drop_at(DropKind::Star, 50.0, 50.0);
        assert!(!player_hits_drop(&player, &star, true));
    }

    #[test]
    fn bullet_hits_hazard_within_threshold() {
        let bullet = Bullet {
            id: 1,
            pos: Vec2::new(40.0, 40.0),
        };
        assert!(bullet_hits_drop(&bullet, &drop_at(DropKind::Hazard, 42.0, 42.0)));
        assert!(!bullet_hits_drop(&bullet, &drop_at(DropKind::Hazard, 46.0, 40.0)));
        // Gems are not shootable
        assert!(!bullet_hits_drop(&bullet, &drop_at(DropKind::Gem, 40.0, 40.0)));
    }
}
