//! Input arbitration
//!
//! Keyboard, pointer and touch all feed the same player target, but they
//! are never summed: the channel that last reported movement owns steering
//! for the frame. Precedence is explicit state here instead of boolean
//! flags scattered across event handlers.

use glam::Vec2;

use super::tick::{DirSet, Steering, TickInput};
use crate::consts::*;

/// Device profile chosen at overlay mount (viewport width)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Desktop,
    Mobile,
}

impl Profile {
    pub fn move_speed(self) -> f32 {
        match self {
            Profile::Desktop => KEY_MOVE_SPEED,
            Profile::Mobile => KEY_MOVE_SPEED_MOBILE,
        }
    }

    pub fn smoothing(self) -> f32 {
        match self {
            Profile::Desktop => INPUT_SMOOTHING,
            Profile::Mobile => INPUT_SMOOTHING_MOBILE,
        }
    }

    pub fn shoot_cooldown_ms(self) -> f64 {
        match self {
            Profile::Desktop => SHOOT_COOLDOWN_MS,
            Profile::Mobile => SHOOT_COOLDOWN_MOBILE_MS,
        }
    }
}

/// Steering keys recognized by the game (arrows and WASD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Keyboard,
    Pointer,
    Touch,
}

/// Collects raw input events between frames and emits one arbitrated
/// [`TickInput`] per frame.
#[derive(Debug)]
pub struct InputArbiter {
    profile: Profile,
    held: DirSet,
    pointer: Option<Vec2>,
    touch: Option<Vec2>,
    /// Channel that last reported movement; wins steering this frame
    active: Option<Channel>,
    last_shot_ms: f64,
    shoot_queued: bool,
    /// While a touch is down the ship auto-fires at the cooldown rate
    touch_firing: bool,
}

impl InputArbiter {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            held: DirSet::default(),
            pointer: None,
            touch: None,
            active: None,
            last_shot_ms: f64::MIN,
            shoot_queued: false,
            touch_firing: false,
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Clear everything (game start/restart)
    pub fn reset(&mut self) {
        self.held = DirSet::default();
        self.pointer = None;
        self.touch = None;
        self.active = None;
        self.shoot_queued = false;
        self.touch_firing = false;
        self.last_shot_ms = f64::MIN;
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Left => self.held.left = true,
            Key::Right => self.held.right = true,
            Key::Up => self.held.up = true,
            Key::Down => self.held.down = true,
        }
        self.active = Some(Channel::Keyboard);
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.held.left = false,
            Key::Right => self.held.right = false,
            Key::Up => self.held.up = false,
            Key::Down => self.held.down = false,
        }
    }

    /// Pointer moved over the play field; `pos` is the pointer in field
    /// coordinates. The stored target is offset to the sprite corner.
    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.pointer = Some(crate::clamp_to_field(pos - Vec2::splat(PLAYER_SIZE / 2.0)));
        self.active = Some(Channel::Pointer);
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
        if self.active == Some(Channel::Pointer) {
            self.active = None;
        }
    }

    pub fn touch_start(&mut self) {
        self.touch_firing = true;
        self.active = Some(Channel::Touch);
    }

    pub fn touch_moved(&mut self, pos: Vec2) {
        self.touch = Some(crate::clamp_to_field(pos - Vec2::splat(PLAYER_SIZE / 2.0)));
        self.active = Some(Channel::Touch);
    }

    pub fn touch_end(&mut self) {
        self.touch = None;
        self.touch_firing = false;
        if self.active == Some(Channel::Touch) {
            self.active = None;
        }
    }

    /// Explicit shoot request (click or spacebar), rate-limited
    pub fn request_shoot(&mut self, now_ms: f64) {
        if now_ms - self.last_shot_ms >= self.profile.shoot_cooldown_ms() {
            self.last_shot_ms = now_ms;
            self.shoot_queued = true;
        }
    }

    /// Produce the arbitrated input for this frame
    pub fn sample(&mut self, now_ms: f64) -> TickInput {
        let steering = match self.active {
            Some(Channel::Pointer) => match self.pointer {
                Some(target) => Steering::Target(target),
                None => Steering::Idle,
            },
            Some(Channel::Touch) => match self.touch {
                Some(target) => Steering::Target(target),
                None => Steering::Idle,
            },
            Some(Channel::Keyboard) | None => {
                if self.held.any() {
                    Steering::Keys(self.held)
                } else {
                    Steering::Idle
                }
            }
        };

        let mut shoot = std::mem::take(&mut self.shoot_queued);
        if !shoot
            && self.touch_firing
            && now_ms - self.last_shot_ms >= self.profile.shoot_cooldown_ms()
        {
            self.last_shot_ms = now_ms;
            shoot = true;
        }

        TickInput {
            steering,
            shoot,
            profile: self.profile,
        }
    }
}
