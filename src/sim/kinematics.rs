//! Constant-acceleration integration for the ball
//!
//! Time is in milliseconds throughout; velocities are px/ms and the
//! acceleration constant is px/ms². Retune the constants if the time
//! unit ever changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One integration step: where the ball ends up and how fast it is going.
///
/// `delta` is the raw displacement (`pos - start`) and is what the sweep
/// test consumes; it is computed by subtraction so the two never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub pos: Vec2,
    pub vel: Vec2,
    pub delta: Vec2,
}

/// Direction of travel on one axis; zero velocity has no direction.
#[inline]
fn travel_sign(v: f32) -> f32 {
    if v == 0.0 { 0.0 } else { v.signum() }
}

/// Advance position and velocity by `dt` under constant acceleration.
///
/// Position integrates `x' = x + dt·dx + 0.5·accel·dt²` per axis; the
/// velocity increment `accel·dt` is applied in the current direction of
/// travel, so speed only ever grows. Pure function, no failure modes.
pub fn accelerate(pos: Vec2, vel: Vec2, accel: f32, dt: f32) -> Motion {
    let drift = 0.5 * accel * dt * dt;
    let next = Vec2::new(pos.x + dt * vel.x + drift, pos.y + dt * vel.y + drift);
    let gain = accel * dt;
    let vel = Vec2::new(
        vel.x + gain * travel_sign(vel.x),
        vel.y + gain * travel_sign(vel.y),
    );
    Motion {
        pos: next,
        vel,
        delta: next - pos,
    }
}
