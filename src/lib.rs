//! Facenoid - an Arkanoid-style brick breaker steered by face tracking
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, swept collisions, game state)
//! - `config`: Immutable tuning payload loaded once at startup
//! - `input`: Paddle target sources (face events, pointer, keyboard)
//! - `worker`: Off-main-thread collision resolution protocol
//! - `renderer`: Canvas 2D drawing
//! - `scores`: Local best-score table

pub mod config;
pub mod input;
pub mod scores;
pub mod sim;
pub mod worker;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod renderer;

pub use config::GameConfig;
pub use sim::state::GameState;

/// Game framing constants
pub mod consts {
    /// Playfield dimensions in CSS pixels (canvas is sized to match)
    pub const PLAYFIELD_W: f32 = 640.0;
    pub const PLAYFIELD_H: f32 = 480.0;

    /// Thickness of the synthetic wall rects placed just outside the playfield
    pub const WALL_THICKNESS: f32 = 40.0;

    /// Paddle target shift per arrow-key press, as a fraction of the travel lane
    pub const KEY_STEP: f32 = 0.05;

    /// Frame delta clamp; tab switches can produce multi-second gaps
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Freeze after losing a ball before the next serve
    pub const BALL_HOLD_MS: f32 = 1000.0;
    /// Freeze after clearing a level before the next one starts
    pub const LEVEL_HOLD_MS: f32 = 800.0;

    /// Where the tuning payload is fetched from
    pub const CONFIG_URL: &str = "assets/config.json";
}

/// Clamp to the unit interval, the domain of all paddle target ratios
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}
