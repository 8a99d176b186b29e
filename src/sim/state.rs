//! Game state and core simulation types
//!
//! Everything here is plain serializable data; the worker protocol ships
//! these types across the message boundary as-is.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::paddle::Paddle;
use crate::config::GameConfig;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Config loaded, nothing moving yet
    Idle,
    /// Active gameplay
    Running,
    Paused,
    /// Short freeze after clearing a level, before the next wall appears
    LevelComplete,
    /// Short freeze after losing a ball while lives remain
    BallLost,
    /// Run ended; only restart leaves this phase
    GameOver,
}

/// The ball. Velocity is px/ms, acceleration px/ms².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: f32,
    pub radius: f32,
}

impl Ball {
    /// Serve a fresh ball just above the paddle center, heading up and to
    /// the right at the configured per-axis speed
    pub fn serve(config: &GameConfig, paddle: &Paddle) -> Self {
        let s = config.ball.speed;
        Self {
            pos: Vec2::new(
                paddle.rect().center().x,
                paddle.y - config.ball.radius - 1.0,
            ),
            vel: Vec2::new(s, -s),
            accel: config.ball.accel,
            radius: config.ball.radius,
        }
    }
}

/// One brick. `hits` is how many more impacts it takes; bricks at zero are
/// filtered out of the obstacle set and swept from the wall after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    pub hits: u8,
}

/// Start-of-run values kept for restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartValues {
    pub level: u32,
    pub score: u32,
    pub lives: u32,
}

/// Per-run progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGame {
    pub level: u32,
    pub score: u32,
    pub lives: u32,
    start: StartValues,
}

impl PlayerGame {
    pub fn new(config: &GameConfig) -> Self {
        let start = StartValues {
            level: config.game.level,
            score: config.game.score,
            lives: config.game.lives,
        };
        Self {
            level: start.level,
            score: start.score,
            lives: start.lives,
            start,
        }
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Take a life; returns how many remain
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub fn next_level(&mut self) {
        self.level += 1;
    }

    /// Back to the start-of-run values
    pub fn reset(&mut self) {
        self.level = self.start.level;
        self.score = self.start.score;
        self.lives = self.start.lives;
    }
}

/// Everything the collision engine works on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameModel {
    pub ball: Ball,
    pub paddle: Paddle,
    pub bricks: Vec<Brick>,
}

impl GameModel {
    /// Fresh model for `level`: new brick wall, centered paddle, served ball
    pub fn new(config: &GameConfig, level: u32) -> Self {
        let paddle = Paddle::new(config);
        let ball = Ball::serve(config, &paddle);
        Self {
            ball,
            paddle,
            bricks: build_bricks(config, level),
        }
    }

    /// Bricks still standing
    pub fn bricks_remaining(&self) -> usize {
        self.bricks.iter().filter(|b| b.hits > 0).count()
    }
}

/// Lay out the brick wall for `level` from its blueprint.
/// Blueprint cells beyond the configured grid are ignored; zeros leave gaps.
pub fn build_bricks(config: &GameConfig, level: u32) -> Vec<Brick> {
    let b = &config.bricks;
    let w = config.brick_width();
    let mut bricks = Vec::new();
    for (row, cells) in config.blueprint(level).iter().enumerate().take(b.rows) {
        for (col, &hits) in cells.iter().enumerate().take(b.cols) {
            if hits == 0 {
                continue;
            }
            bricks.push(Brick {
                rect: Rect::new(
                    b.gutter + col as f32 * (w + b.spacing),
                    b.gutter + row as f32 * (b.height + b.spacing),
                    w,
                    b.height,
                ),
                hits,
            });
        }
    }
    bricks
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Tuning payload, fixed for the lifetime of the state
    pub config: GameConfig,
    pub phase: GamePhase,
    pub player: PlayerGame,
    pub model: GameModel,
    /// Countdown driving the BallLost and LevelComplete freezes
    pub hold_ms: f32,
}

impl GameState {
    /// Build an idle state around a validated config
    pub fn new(config: GameConfig) -> Self {
        let player = PlayerGame::new(&config);
        let model = GameModel::new(&config, player.level);
        Self {
            config,
            phase: GamePhase::Idle,
            player,
            model,
            hold_ms: 0.0,
        }
    }

    /// Leave the idle screen and start playing
    pub fn start(&mut self) {
        if self.phase == GamePhase::Idle {
            self.phase = GamePhase::Running;
        }
    }

    /// Fresh run from the start-of-run values; valid from any phase
    pub fn restart(&mut self) {
        self.player.reset();
        self.model = GameModel::new(&self.config, self.player.level);
        self.hold_ms = 0.0;
        self.phase = GamePhase::Running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts;

    #[test]
    fn test_build_bricks_counts_per_level() {
        let config = GameConfig::default();
        // Level 0 is a full 3x10 wall; later blueprints punch holes
        assert_eq!(build_bricks(&config, 0).len(), 30);
        assert_eq!(build_bricks(&config, 1).len(), 36);
        assert_eq!(build_bricks(&config, 2).len(), 44);
    }

    #[test]
    fn test_bricks_stay_inside_the_gutter() {
        let config = GameConfig::default();
        for brick in build_bricks(&config, 2) {
            assert!(brick.rect.left() >= config.bricks.gutter - 0.001);
            assert!(brick.rect.right() <= consts::PLAYFIELD_W - config.bricks.gutter + 0.001);
            assert!(brick.rect.top() >= config.bricks.gutter - 0.001);
        }
    }

    #[test]
    fn test_serve_places_ball_above_paddle() {
        let config = GameConfig::default();
        let paddle = Paddle::new(&config);
        let ball = Ball::serve(&config, &paddle);
        assert!(ball.pos.y < paddle.y);
        assert!((ball.pos.x - paddle.rect().center().x).abs() < 0.001);
        assert!(ball.vel.y < 0.0);
        assert_eq!(ball.vel.x.abs(), config.ball.speed);
    }

    #[test]
    fn test_restart_resets_progress_and_wall() {
        let config = GameConfig::default();
        let mut state = GameState::new(config);
        state.start();
        state.player.add_score(500);
        state.player.next_level();
        state.player.lose_life();
        state.model.bricks.clear();
        state.phase = GamePhase::GameOver;

        state.restart();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.player.score, 0);
        assert_eq!(state.player.level, 0);
        assert_eq!(state.player.lives, state.config.game.lives);
        assert_eq!(state.model.bricks.len(), 30);
    }

    #[test]
    fn test_lose_life_saturates() {
        let config = GameConfig::default();
        let mut player = PlayerGame::new(&config);
        for _ in 0..10 {
            player.lose_life();
        }
        assert_eq!(player.lives, 0);
    }

    #[test]
    fn test_start_only_leaves_idle() {
        let config = GameConfig::default();
        let mut state = GameState::new(config);
        state.phase = GamePhase::GameOver;
        state.start();
        assert_eq!(state.phase, GamePhase::GameOver);
    }
}
