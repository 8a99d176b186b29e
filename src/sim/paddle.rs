//! Paddle motion: targets come in as lane ratios, position follows a tween
//!
//! Input sources never move the paddle directly. They install a target and
//! the paddle eases toward it, which is what makes jittery face-tracking
//! input feel deliberate.

use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::config::GameConfig;
use crate::consts;
use crate::sim::geom::Rect;

/// Ease-in-out-quadratic position ratio for normalized time `t`
#[inline]
fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - 2.0 * (1.0 - t) * (1.0 - t)
    }
}

/// A timed interpolation between two x positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub elapsed_ms: f32,
    pub total_ms: f32,
}

impl Tween {
    /// A tween that is already at its target
    pub fn settled(at: f32) -> Self {
        Self {
            from: at,
            to: at,
            elapsed_ms: 0.0,
            total_ms: 0.0,
        }
    }

    pub fn done(&self) -> bool {
        self.elapsed_ms >= self.total_ms
    }

    /// Current eased position; holds at `to` once the time is spent
    pub fn value(&self) -> f32 {
        if self.total_ms <= 0.0 {
            return self.to;
        }
        let t = self.elapsed_ms / self.total_ms;
        self.from + (self.to - self.from) * ease_in_out_quad(t)
    }

    /// Consume `dt` and return the new position. Elapsed time clamps at
    /// the total, so advancing past the end is a no-op.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if !self.done() {
            self.elapsed_ms = (self.elapsed_ms + dt).min(self.total_ms);
        }
        self.value()
    }
}

/// The player's paddle; `y` is fixed, `x` chases the tween target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub tween: Tween,
}

impl Paddle {
    /// A paddle centered at the bottom of the playfield
    pub fn new(config: &GameConfig) -> Self {
        let p = &config.paddle;
        let x = (consts::PLAYFIELD_W - p.width) * 0.5;
        Self {
            x,
            y: consts::PLAYFIELD_H - p.bottom_margin - p.height,
            w: p.width,
            h: p.height,
            tween: Tween::settled(x),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Width of the lane the paddle's left edge can travel
    fn lane(&self, config: &GameConfig) -> f32 {
        (consts::PLAYFIELD_W - 2.0 * config.paddle.side_space - self.w).max(0.0)
    }

    /// Install a new tween toward `ratio` across the travel lane.
    ///
    /// The duration is the configured maximum scaled by the fraction of the
    /// playfield width actually being crossed, so short corrections are quick
    /// and full crossings take `max_tween_ms`.
    pub fn set_target(&mut self, ratio: f32, config: &GameConfig) {
        let to = config.paddle.side_space + clamp01(ratio) * self.lane(config);
        let total_ms = config.paddle.max_tween_ms * (to - self.x).abs() / consts::PLAYFIELD_W;
        self.tween = Tween {
            from: self.x,
            to,
            elapsed_ms: 0.0,
            total_ms,
        };
    }

    /// Move along the current tween
    pub fn advance(&mut self, dt: f32) {
        self.x = self.tween.advance(dt);
    }

    /// The lane ratio the paddle is currently heading for.
    /// Keyboard steps are relative to this, not to the eased position.
    pub fn target_ratio(&self, config: &GameConfig) -> f32 {
        let lane = self.lane(config);
        if lane <= 0.0 {
            return 0.5;
        }
        clamp01((self.tween.to - config.paddle.side_space) / lane)
    }
}
