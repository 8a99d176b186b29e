//! Immutable game tuning loaded once at startup
//!
//! The whole payload comes from `assets/config.json` (or `Default` in the
//! native demo), gets validated, and is then handed to `GameState::new` by
//! value. Nothing mutates it afterwards; if the payload is bad the game
//! simply never leaves the idle screen.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts;

/// What can go wrong between requesting the payload and owning a valid one
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config fetch failed: {0}")]
    Fetch(String),
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Brick wall layout and palette
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrickSettings {
    /// Grid dimensions a level blueprint may use at most
    pub rows: usize,
    pub cols: usize,
    /// Brick height in px; width is derived from `cols` and the margins
    pub height: f32,
    /// Gap between neighbouring bricks
    pub spacing: f32,
    /// Margin between the brick wall and the playfield edges
    pub gutter: f32,
    /// Fill colors indexed by remaining hits (last entry covers anything tougher)
    pub colors: Vec<String>,
}

impl Default for BrickSettings {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 10,
            height: 16.0,
            spacing: 4.0,
            gutter: 20.0,
            colors: vec!["#3aa7e0".into(), "#e0a63a".into(), "#e05c3a".into()],
        }
    }
}

/// Paddle shape and motion tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaddleSettings {
    pub width: f32,
    pub height: f32,
    pub color: String,
    /// Gap between the paddle and the bottom of the playfield
    pub bottom_margin: f32,
    /// Horizontal margin the paddle never enters on either side
    pub side_space: f32,
    /// Tween duration for a full playfield-width move
    pub max_tween_ms: f32,
    /// Scale of the spin impulse added on off-center paddle hits
    pub spin_impact: f32,
}

impl Default for PaddleSettings {
    fn default() -> Self {
        Self {
            width: 96.0,
            height: 14.0,
            color: "#e8ecf1".into(),
            bottom_margin: 24.0,
            side_space: 20.0,
            max_tween_ms: 400.0,
            spin_impact: 0.25,
        }
    }
}

/// Ball shape and kinematics tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BallSettings {
    /// Serve speed per axis, px/ms
    pub speed: f32,
    /// Acceleration magnitude, px/ms²
    pub accel: f32,
    pub radius: f32,
    pub color: String,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            speed: 0.22,
            accel: 0.000002,
            radius: 7.0,
            color: "#f5f7fa".into(),
        }
    }
}

/// Round structure and scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameRules {
    /// Starting level (index into `levels`)
    pub level: u32,
    /// Starting score; nonzero mostly for testing
    pub score: u32,
    pub lives: u32,
    /// Points awarded per brick hit (not per brick destroyed)
    pub brick_points: u32,
    /// Collision passes allowed within one frame before the ball counts as stuck
    pub pass_cap: u32,
    /// Resolve collisions on a web worker instead of the main thread
    pub use_worker: bool,
    /// Level blueprints: grids of hit counts, 0 = no brick
    pub levels: Vec<Vec<Vec<u8>>>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            level: 0,
            score: 0,
            lives: 3,
            brick_points: 20,
            pass_cap: 10,
            use_worker: false,
            levels: default_levels(),
        }
    }
}

fn default_levels() -> Vec<Vec<Vec<u8>>> {
    vec![
        vec![
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ],
        vec![
            vec![2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
            vec![1, 1, 2, 2, 2, 2, 2, 2, 1, 1],
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            vec![0, 0, 1, 1, 1, 1, 1, 1, 0, 0],
        ],
        vec![
            vec![3, 3, 3, 2, 2, 2, 2, 3, 3, 3],
            vec![2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
            vec![1, 1, 2, 1, 1, 1, 1, 2, 1, 1],
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            vec![0, 1, 1, 0, 0, 0, 0, 1, 1, 0],
        ],
    ]
}

/// Audio cue sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundPaths {
    pub brick: String,
    pub paddle: String,
    pub game_over: String,
}

impl Default for SoundPaths {
    fn default() -> Self {
        Self {
            brick: "assets/sounds/brick.mp3".into(),
            paddle: "assets/sounds/paddle.mp3".into(),
            game_over: "assets/sounds/gameover.mp3".into(),
        }
    }
}

/// Face-tracking input shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaceSettings {
    /// Fraction of the camera frame on each side mapped off the playfield,
    /// so a small head movement covers the whole paddle lane
    pub side_margin: f32,
    /// Minimum ratio change accepted from the detector; smaller moves are noise
    pub jitter: f32,
}

impl Default for FaceSettings {
    fn default() -> Self {
        Self {
            side_margin: 0.15,
            jitter: 0.02,
        }
    }
}

/// The full tuning payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub bricks: BrickSettings,
    pub paddle: PaddleSettings,
    pub ball: BallSettings,
    pub game: GameRules,
    pub sounds: SoundPaths,
    pub face_detect: FaceSettings,
}

impl GameConfig {
    /// Deserialize and validate a JSON payload
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject payloads the sim cannot run on
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn fail(msg: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(msg.into()))
        }

        if self.bricks.rows == 0 || self.bricks.cols == 0 {
            return fail("brick grid must have at least one row and column");
        }
        if self.bricks.colors.is_empty() {
            return fail("brick palette is empty");
        }
        if self.bricks.spacing < 0.0 || self.bricks.gutter < 0.0 {
            return fail("brick spacing and gutter must be non-negative");
        }
        if self.brick_width() <= 0.0 {
            return fail("brick grid does not fit the playfield width");
        }
        if self.paddle.width <= 0.0 || self.paddle.height <= 0.0 {
            return fail("paddle dimensions must be positive");
        }
        if self.paddle.max_tween_ms < 0.0 {
            return fail("paddle tween duration must be non-negative");
        }
        if self.ball.radius <= 0.0 || self.ball.speed <= 0.0 {
            return fail("ball radius and speed must be positive");
        }
        if self.ball.accel < 0.0 {
            return fail("ball acceleration must be non-negative");
        }
        if self.game.lives == 0 {
            return fail("at least one life is required");
        }
        if self.game.pass_cap == 0 {
            return fail("collision pass cap must be at least 1");
        }
        if self.game.levels.is_empty() {
            return fail("at least one level blueprint is required");
        }
        for (i, level) in self.game.levels.iter().enumerate() {
            if level.len() > self.bricks.rows {
                return fail(format!("level {i} has more rows than the brick grid"));
            }
            if level.iter().any(|row| row.len() > self.bricks.cols) {
                return fail(format!("level {i} has a row wider than the brick grid"));
            }
            if level.iter().all(|row| row.iter().all(|&h| h == 0)) {
                return fail(format!("level {i} has no bricks"));
            }
        }
        if !(0.0..0.5).contains(&self.face_detect.side_margin) {
            return fail("face side margin must be in [0, 0.5)");
        }
        if self.face_detect.jitter < 0.0 {
            return fail("face jitter threshold must be non-negative");
        }
        Ok(())
    }

    /// Width of one brick for the configured column count
    pub fn brick_width(&self) -> f32 {
        let b = &self.bricks;
        (consts::PLAYFIELD_W - 2.0 * b.gutter - (b.cols as f32 - 1.0) * b.spacing) / b.cols as f32
    }

    /// Blueprint for `level`, holding on the last one once past the end
    pub fn blueprint(&self, level: u32) -> &[Vec<u8>] {
        if self.game.levels.is_empty() {
            return &[];
        }
        let idx = (level as usize).min(self.game.levels.len() - 1);
        &self.game.levels[idx]
    }

    /// Fetch and parse the payload from the server (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub async fn fetch(url: &str) -> Result<Self, ConfigError> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let window =
            web_sys::window().ok_or_else(|| ConfigError::Fetch("no window object".into()))?;
        let resp = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| ConfigError::Fetch(format!("{e:?}")))?;
        let resp: web_sys::Response = resp
            .dyn_into()
            .map_err(|_| ConfigError::Fetch("fetch did not return a Response".into()))?;
        if !resp.ok() {
            return Err(ConfigError::Fetch(format!(
                "HTTP {} for {url}",
                resp.status()
            )));
        }
        let text = resp
            .text()
            .map_err(|e| ConfigError::Fetch(format!("{e:?}")))?;
        let text = JsFuture::from(text)
            .await
            .map_err(|e| ConfigError::Fetch(format!("{e:?}")))?;
        Self::parse(&text.as_string().unwrap_or_default())
    }
}
