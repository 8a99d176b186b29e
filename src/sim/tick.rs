//! Frame sequencing: input application, phase transitions, and folding
//! resolution effects back into the game state
//!
//! `tick` is the whole local frame. The worker variant splits it: the
//! driver calls `tick_pre`, ships the model out for resolution, and feeds
//! the response through `apply_resolution` when it lands.

use serde::{Deserialize, Serialize};

use super::collide::{Cue, Outcome, Resolution, SideEffect, resolve};
use super::state::{Ball, GameModel, GamePhase, GameState};
use crate::consts;

/// Per-frame input gathered by the driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// New paddle target as a lane ratio, if any source produced one
    pub target_ratio: Option<f32>,
    /// Toggle pause (edge-triggered; the driver clears it after the frame)
    pub pause: bool,
}

/// Everything before physics: pause toggling, paddle targeting and easing,
/// and the freeze countdowns. Returns true when the frame still needs its
/// collisions resolved, locally or on the worker.
pub fn tick_pre(state: &mut GameState, input: &TickInput, dt: f32) -> bool {
    if input.pause {
        match state.phase {
            GamePhase::Running => state.phase = GamePhase::Paused,
            GamePhase::Paused => state.phase = GamePhase::Running,
            _ => {}
        }
    }

    if state.phase == GamePhase::Running {
        if let Some(ratio) = input.target_ratio {
            state.model.paddle.set_target(ratio, &state.config);
        }
    }

    // First frame after load or a tab switch arrives with dt == 0
    if dt <= 0.0 {
        return false;
    }

    match state.phase {
        GamePhase::Running => {
            state.model.paddle.advance(dt);
            true
        }
        GamePhase::BallLost => {
            state.hold_ms -= dt;
            if state.hold_ms <= 0.0 {
                state.model.ball = Ball::serve(&state.config, &state.model.paddle);
                state.phase = GamePhase::Running;
            }
            false
        }
        GamePhase::LevelComplete => {
            state.hold_ms -= dt;
            if state.hold_ms <= 0.0 {
                state.player.next_level();
                state.model = GameModel::new(&state.config, state.player.level);
                state.phase = GamePhase::Running;
            }
            false
        }
        GamePhase::Idle | GamePhase::Paused | GamePhase::GameOver => false,
    }
}

/// Fold one frame's resolution into the state: score lands on the player,
/// a lost ball burns a life, a cleared wall schedules the next level, and
/// a wedged ball counts as lost. Returns the effect list with the
/// game-over cue appended when this was the final life, ready for the
/// driver's sound dispatch.
pub fn apply_resolution(
    state: &mut GameState,
    outcome: Outcome,
    mut effects: Vec<SideEffect>,
) -> Vec<SideEffect> {
    if outcome == Outcome::Stuck && !effects.contains(&SideEffect::BallLost) {
        effects.push(SideEffect::BallLost);
    }

    for effect in &effects {
        match effect {
            SideEffect::Score(points) => state.player.add_score(*points),
            SideEffect::BallLost => {
                if state.player.lose_life() == 0 {
                    state.phase = GamePhase::GameOver;
                } else {
                    state.phase = GamePhase::BallLost;
                    state.hold_ms = consts::BALL_HOLD_MS;
                }
            }
            SideEffect::LevelCleared => {
                // Clearing the wall with the final ball does not undo the
                // game over
                if state.phase != GamePhase::GameOver {
                    state.phase = GamePhase::LevelComplete;
                    state.hold_ms = consts::LEVEL_HOLD_MS;
                }
            }
            SideEffect::Sound(_) => {}
        }
    }

    if state.phase == GamePhase::GameOver && !effects.contains(&SideEffect::Sound(Cue::GameOver)) {
        effects.push(SideEffect::Sound(Cue::GameOver));
    }
    effects
}

/// One full local frame. The returned effects are already applied to the
/// state; the driver only interprets the sound cues.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<SideEffect> {
    if !tick_pre(state, input, dt) {
        return Vec::new();
    }
    let Resolution { outcome, effects } = resolve(&mut state.model, dt, &state.config);
    apply_resolution(state, outcome, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use crate::sim::geom::Rect;
    use crate::sim::paddle::Tween;
    use crate::sim::state::Brick;
    use glam::Vec2;

    fn running_state() -> GameState {
        let mut state = GameState::new(GameConfig::default());
        state.start();
        state
    }

    /// Point the ball straight down from mid-field with the paddle parked
    /// off to the side, so the next big tick loses it
    fn doom_ball(state: &mut GameState) {
        state.model.ball.pos = Vec2::new(320.0, 300.0);
        state.model.ball.vel = Vec2::new(0.0, 0.4);
        state.model.ball.accel = 0.0;
        state.model.paddle.x = 10.0;
        state.model.paddle.tween = Tween::settled(10.0);
        state.model.bricks.clear();
    }

    #[test]
    fn test_pause_toggles_and_freezes() {
        let mut state = running_state();
        let pause = TickInput {
            pause: true,
            ..TickInput::default()
        };

        tick(&mut state, &pause, 16.0);
        assert_eq!(state.phase, GamePhase::Paused);

        let ball = state.model.ball;
        tick(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.model.ball, ball);

        tick(&mut state, &pause, 16.0);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_idle_state_does_not_move() {
        let mut state = GameState::new(GameConfig::default());
        let ball = state.model.ball;
        let effects = tick(&mut state, &TickInput::default(), 16.0);
        assert!(effects.is_empty());
        assert_eq!(state.model.ball, ball);
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_zero_dt_frame_is_inert() {
        let mut state = running_state();
        let ball = state.model.ball;
        let effects = tick(&mut state, &TickInput::default(), 0.0);
        assert!(effects.is_empty());
        assert_eq!(state.model.ball, ball);
    }

    #[test]
    fn test_lost_ball_burns_a_life_and_respawns() {
        let mut state = running_state();
        doom_ball(&mut state);

        let effects = tick(&mut state, &TickInput::default(), 1000.0);
        assert!(effects.contains(&SideEffect::BallLost));
        assert_eq!(state.player.lives, state.config.game.lives - 1);
        assert_eq!(state.phase, GamePhase::BallLost);

        // Sit out the freeze, then the serve comes back above the paddle
        tick(
            &mut state,
            &TickInput::default(),
            consts::BALL_HOLD_MS + 1.0,
        );
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.model.ball.vel.y < 0.0);
    }

    #[test]
    fn test_last_life_ends_the_run_with_a_cue() {
        let mut config = GameConfig::default();
        config.game.lives = 1;
        let mut state = GameState::new(config);
        state.start();
        doom_ball(&mut state);

        let effects = tick(&mut state, &TickInput::default(), 1000.0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.lives, 0);
        assert!(effects.contains(&SideEffect::Sound(Cue::GameOver)));

        // Nothing moves after the run ends
        let ball = state.model.ball;
        tick(&mut state, &TickInput::default(), 100.0);
        assert_eq!(state.model.ball, ball);
    }

    #[test]
    fn test_cleared_level_advances_after_the_hold() {
        let mut state = running_state();
        state.model.bricks = vec![Brick {
            rect: Rect::new(300.0, 100.0, 40.0, 16.0),
            hits: 1,
        }];
        state.model.ball.pos = Vec2::new(320.0, 200.0);
        state.model.ball.vel = Vec2::new(0.0, -0.2);
        state.model.ball.accel = 0.0;

        let effects = tick(&mut state, &TickInput::default(), 400.0);
        assert!(effects.contains(&SideEffect::LevelCleared));
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.player.score, state.config.game.brick_points);

        tick(
            &mut state,
            &TickInput::default(),
            consts::LEVEL_HOLD_MS + 1.0,
        );
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.player.level, 1);
        // Level 1 blueprint has 36 bricks
        assert_eq!(state.model.bricks.len(), 36);
        assert!(state.model.ball.vel.y < 0.0);
    }

    #[test]
    fn test_stuck_ball_counts_as_lost() {
        let mut state = running_state();
        state.model.bricks = vec![
            Brick {
                rect: Rect::new(280.0, 100.0, 80.0, 10.0),
                hits: 255,
            },
            Brick {
                rect: Rect::new(280.0, 117.0, 80.0, 10.0),
                hits: 255,
            },
        ];
        state.model.ball.pos = Vec2::new(320.0, 113.5);
        state.model.ball.vel = Vec2::new(0.0, 0.5);
        state.model.ball.accel = 0.0;
        state.model.ball.radius = 3.0;

        let lives_before = state.player.lives;
        tick(&mut state, &TickInput::default(), 1000.0);
        assert_eq!(state.player.lives, lives_before - 1);
        assert_eq!(state.phase, GamePhase::BallLost);
    }

    #[test]
    fn test_paddle_target_ignored_while_paused() {
        let mut state = running_state();
        tick(
            &mut state,
            &TickInput {
                pause: true,
                ..TickInput::default()
            },
            16.0,
        );

        let tween = state.model.paddle.tween;
        tick(
            &mut state,
            &TickInput {
                target_ratio: Some(0.0),
                ..TickInput::default()
            },
            16.0,
        );
        assert_eq!(state.model.paddle.tween, tween);
    }

    #[test]
    fn test_determinism_across_identical_runs() {
        let mut a = running_state();
        let mut b = a.clone();

        for frame in 0..240u32 {
            let input = TickInput {
                target_ratio: if frame % 30 == 0 {
                    Some((frame % 100) as f32 / 100.0)
                } else {
                    None
                },
                pause: false,
            };
            tick(&mut a, &input, 16.7);
            tick(&mut b, &input, 16.7);
        }

        assert_eq!(a.model.ball, b.model.ball);
        assert_eq!(a.player.score, b.player.score);
        assert_eq!(a.model.bricks, b.model.bricks);
    }
}
