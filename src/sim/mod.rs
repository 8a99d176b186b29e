//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only by the `dt` passed in (milliseconds)
//! - Stable iteration order (bricks in layout order)
//! - No rendering or platform dependencies

pub mod collide;
pub mod geom;
pub mod kinematics;
pub mod paddle;
pub mod state;
pub mod tick;

pub use collide::{Cue, Outcome, Resolution, SideEffect, resolve};
pub use geom::{Intercept, Rect, Side, ball_intercept, segment_intersect};
pub use kinematics::{Motion, accelerate};
pub use paddle::{Paddle, Tween};
pub use state::{Ball, Brick, GameModel, GamePhase, GameState, PlayerGame};
pub use tick::{TickInput, apply_resolution, tick, tick_pre};
