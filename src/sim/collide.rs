//! Swept collision resolution, the heart of the game
//!
//! One frame of ball motion can bounce off several obstacles, so resolution
//! runs as a bounded multi-pass loop: sweep against every live obstacle,
//! snap to the nearest intercept, reflect, spend the consumed slice of `dt`,
//! then go again with whatever time is left. The pass cap turns a wedged
//! ball into a lost ball instead of a hung frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Intercept, Rect, Side, ball_intercept};
use super::kinematics::accelerate;
use super::state::GameModel;
use crate::config::GameConfig;
use crate::consts;

/// Audio cues the driver can fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    Brick,
    Paddle,
    GameOver,
}

/// Commands emitted by the sim for the outside world. The driver interprets
/// these with one fixed match; there is no other channel between the sim
/// and the platform layer, which keeps the worker variant honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEffect {
    Sound(Cue),
    Score(u32),
    BallLost,
    LevelCleared,
}

/// How a frame's resolution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// All of `dt` was consumed normally
    Resolved,
    /// The pass cap tripped; the ball is wedged and the round should end
    Stuck,
}

/// Result of resolving one frame of ball motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: Outcome,
    pub effects: Vec<SideEffect>,
}

/// What the swept ball can run into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    Wall,
    Floor,
    Paddle,
    Brick(usize),
}

/// The three reflecting walls just outside the playfield
fn side_walls() -> [Rect; 3] {
    let t = consts::WALL_THICKNESS;
    let (w, h) = (consts::PLAYFIELD_W, consts::PLAYFIELD_H);
    [
        Rect::new(-t, -t, t, h + 2.0 * t),
        Rect::new(w, -t, t, h + 2.0 * t),
        Rect::new(-t, -t, w + 2.0 * t, t),
    ]
}

/// The ball-loss sentinel below the playfield. The bottom is not a wall:
/// a ball that reaches it is gone for the round.
fn floor() -> Rect {
    let t = consts::WALL_THICKNESS;
    Rect::new(
        -t,
        consts::PLAYFIELD_H,
        consts::PLAYFIELD_W + 2.0 * t,
        t,
    )
}

/// Sweep the ball along `delta` and pick the closest thing it would hit.
/// Ties keep the first candidate in iteration order: bricks in layout
/// order, then the paddle, walls, floor.
fn nearest_intercept(model: &GameModel, delta: Vec2) -> Option<(Intercept, Hit)> {
    let ball = model.ball;
    let mut best: Option<(Intercept, Hit, f32)> = None;
    let mut consider = |rect: &Rect, hit: Hit| {
        if let Some(intercept) = ball_intercept(ball.pos, ball.radius, rect, delta) {
            let dist = (intercept.point - ball.pos).length();
            if best.as_ref().map_or(true, |(_, _, d)| dist < *d) {
                best = Some((intercept, hit, dist));
            }
        }
    };

    for (i, brick) in model.bricks.iter().enumerate() {
        if brick.hits == 0 {
            continue;
        }
        consider(&brick.rect, Hit::Brick(i));
    }
    consider(&model.paddle.rect(), Hit::Paddle);
    for wall in &side_walls() {
        consider(wall, Hit::Wall);
    }
    consider(&floor(), Hit::Floor);

    best.map(|(intercept, hit, _)| (intercept, hit))
}

/// Resolve one frame of ball motion against the model, mutating the ball
/// and bricks in place and reporting everything that happened as effects.
///
/// Each pass re-sweeps against the updated model, so a fast ball bounces
/// off several obstacles in one frame instead of tunnelling. Never panics;
/// degenerate states exhaust the pass cap and come back as `Stuck`.
pub fn resolve(model: &mut GameModel, dt: f32, config: &GameConfig) -> Resolution {
    let mut effects = Vec::new();
    let mut outcome = Outcome::Resolved;
    let mut destroyed_any = false;
    let mut remaining = dt;
    let mut passes = 0;

    while remaining > 0.0 {
        if passes >= config.game.pass_cap {
            outcome = Outcome::Stuck;
            break;
        }
        passes += 1;

        let motion = accelerate(model.ball.pos, model.ball.vel, model.ball.accel, remaining);

        let Some((intercept, hit)) = nearest_intercept(model, motion.delta) else {
            // Free flight for the rest of the frame
            model.ball.pos = motion.pos;
            model.ball.vel = motion.vel;
            break;
        };

        if hit == Hit::Floor {
            // Not a bounce; the ball parks at the sentinel line and the
            // round ends
            model.ball.pos = intercept.point;
            effects.push(SideEffect::BallLost);
            break;
        }

        let travelled = (intercept.point - model.ball.pos).length();
        let step_len = motion.delta.length();

        // Snap to the impact point and reflect the accelerated velocity
        model.ball.pos = intercept.point;
        model.ball.vel = motion.vel;
        match intercept.side {
            Side::Left | Side::Right => model.ball.vel.x = -model.ball.vel.x,
            Side::Top | Side::Bottom => model.ball.vel.y = -model.ball.vel.y,
        }

        match hit {
            Hit::Brick(i) => {
                let brick = &mut model.bricks[i];
                brick.hits = brick.hits.saturating_sub(1);
                if brick.hits == 0 {
                    destroyed_any = true;
                }
                effects.push(SideEffect::Sound(Cue::Brick));
                effects.push(SideEffect::Score(config.game.brick_points));
            }
            Hit::Paddle => {
                if intercept.side == Side::Top {
                    let paddle = &model.paddle;
                    let off = (intercept.point.x - paddle.x) / paddle.w - 0.5;
                    model.ball.vel.x += off * config.paddle.spin_impact;
                }
                effects.push(SideEffect::Sound(Cue::Paddle));
            }
            Hit::Wall | Hit::Floor => {}
        }

        // Spend the slice of time consumed before the impact. A zero-length
        // slice (ball resting exactly on a face) makes no progress and is
        // what the pass cap is for.
        if step_len > 0.0 {
            remaining -= remaining * (travelled / step_len);
        } else {
            break;
        }
    }

    model.bricks.retain(|b| b.hits > 0);
    if destroyed_any && model.bricks.is_empty() {
        effects.push(SideEffect::LevelCleared);
    }

    Resolution { outcome, effects }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::paddle::Paddle;
    use crate::sim::state::{Ball, Brick};

    /// A model with no bricks and the paddle parked far out of the way
    fn open_model(config: &GameConfig) -> GameModel {
        let mut model = GameModel::new(config, 0);
        model.bricks.clear();
        model.paddle.x = 2.0 * consts::PLAYFIELD_W;
        model
    }

    fn mid_ball(pos: Vec2, vel: Vec2, accel: f32) -> Ball {
        Ball {
            pos,
            vel,
            accel,
            radius: 5.0,
        }
    }

    #[test]
    fn test_free_flight_matches_kinematics() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        model.ball = mid_ball(Vec2::new(320.0, 240.0), Vec2::new(0.05, -0.05), 0.00001);

        let expected = accelerate(model.ball.pos, model.ball.vel, model.ball.accel, 16.0);
        let res = resolve(&mut model, 16.0, &config);

        assert_eq!(res.outcome, Outcome::Resolved);
        assert!(res.effects.is_empty());
        assert_eq!(model.ball.pos, expected.pos);
        assert_eq!(model.ball.vel, expected.vel);
    }

    #[test]
    fn test_left_wall_reflects_and_snaps() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        model.ball = mid_ball(Vec2::new(20.0, 240.0), Vec2::new(-0.2, 0.1), 0.0);

        let speed_before = model.ball.vel.length();
        let res = resolve(&mut model, 200.0, &config);

        assert_eq!(res.outcome, Outcome::Resolved);
        // Ball comes to rest radius-distance off the wall, dx flipped, no energy lost
        assert!(model.ball.vel.x > 0.0);
        assert!((model.ball.vel.length() - speed_before).abs() < 1e-4);
        // It bounced at x == radius at some point during the frame
        assert!(model.ball.pos.x > 5.0);
    }

    #[test]
    fn test_wall_bounce_contact_point() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        // Aimed straight at the top wall; dt ends exactly at the bounce
        model.ball = mid_ball(Vec2::new(320.0, 105.0), Vec2::new(0.0, -1.0), 0.0);

        resolve(&mut model, 100.0, &config);
        assert!((model.ball.pos.y - model.ball.radius).abs() < 0.001);
        assert!(model.ball.vel.y > 0.0);
    }

    #[test]
    fn test_paddle_top_hit_reflects_upward() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        model.paddle = Paddle::new(&config);
        model.paddle.x = 50.0;
        model.paddle.w = 100.0;
        // Falling down-right from above the paddle, center-ish hit
        model.ball = mid_ball(
            Vec2::new(95.0, model.paddle.y - 40.0),
            Vec2::new(0.1, 0.1),
            0.0,
        );

        let res = resolve(&mut model, 600.0, &config);
        assert!(res.effects.contains(&SideEffect::Sound(Cue::Paddle)));
        assert!(model.ball.vel.y < 0.0);
    }

    #[test]
    fn test_paddle_center_hit_has_no_spin() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        model.paddle = Paddle::new(&config);
        model.paddle.x = 100.0;
        model.paddle.w = 100.0;
        // Straight drop onto the exact paddle center
        model.ball = mid_ball(
            Vec2::new(150.0, model.paddle.y - 30.0),
            Vec2::new(0.0, 0.2),
            0.0,
        );

        resolve(&mut model, 400.0, &config);
        assert_eq!(model.ball.vel.x, 0.0);
        assert!(model.ball.vel.y < 0.0);
    }

    #[test]
    fn test_paddle_edge_hit_adds_spin() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        model.paddle = Paddle::new(&config);
        model.paddle.x = 100.0;
        model.paddle.w = 100.0;
        // Straight drop well right of center
        model.ball = mid_ball(
            Vec2::new(190.0, model.paddle.y - 30.0),
            Vec2::new(0.0, 0.2),
            0.0,
        );

        resolve(&mut model, 400.0, &config);
        // (190-100)/100 - 0.5 = 0.4 of the spin impact, pushing right
        assert!((model.ball.vel.x - 0.4 * config.paddle.spin_impact).abs() < 1e-4);
    }

    #[test]
    fn test_brick_hit_scores_and_depletes() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        model.bricks = vec![Brick {
            rect: Rect::new(300.0, 100.0, 40.0, 16.0),
            hits: 2,
        }];
        model.ball = mid_ball(Vec2::new(320.0, 200.0), Vec2::new(0.0, -0.2), 0.0);

        let res = resolve(&mut model, 400.0, &config);
        assert!(res.effects.contains(&SideEffect::Sound(Cue::Brick)));
        assert!(
            res.effects
                .contains(&SideEffect::Score(config.game.brick_points))
        );
        // Two hits left means the brick survives the first impact
        assert_eq!(model.bricks.len(), 1);
        assert_eq!(model.bricks[0].hits, 1);
        assert!(!res.effects.contains(&SideEffect::LevelCleared));
    }

    #[test]
    fn test_last_brick_clears_the_level() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        model.bricks = vec![Brick {
            rect: Rect::new(300.0, 100.0, 40.0, 16.0),
            hits: 1,
        }];
        model.ball = mid_ball(Vec2::new(320.0, 200.0), Vec2::new(0.0, -0.2), 0.0);

        let res = resolve(&mut model, 400.0, &config);
        assert!(model.bricks.is_empty());
        assert!(res.effects.contains(&SideEffect::LevelCleared));
    }

    #[test]
    fn test_ball_below_paddle_reaches_the_floor() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        model.ball = mid_ball(Vec2::new(320.0, 400.0), Vec2::new(0.0, 0.3), 0.0);

        let res = resolve(&mut model, 1000.0, &config);
        assert!(res.effects.contains(&SideEffect::BallLost));
        // Ball parks at the sentinel line instead of bouncing
        assert!((model.ball.pos.y - (consts::PLAYFIELD_H - model.ball.radius)).abs() < 0.001);
    }

    #[test]
    fn test_wedged_ball_trips_the_pass_cap() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        // Two tough bricks with a slot barely taller than the ball; it
        // ping-pongs vertically making almost no progress per pass
        model.bricks = vec![
            Brick {
                rect: Rect::new(280.0, 100.0, 80.0, 10.0),
                hits: 255,
            },
            Brick {
                rect: Rect::new(280.0, 117.0, 80.0, 10.0),
                hits: 255,
            },
        ];
        model.ball = Ball {
            pos: Vec2::new(320.0, 113.5),
            vel: Vec2::new(0.0, 0.5),
            accel: 0.0,
            radius: 3.0,
        };

        let res = resolve(&mut model, 1000.0, &config);
        assert_eq!(res.outcome, Outcome::Stuck);
    }

    #[test]
    fn test_two_bounces_in_one_frame() {
        let config = GameConfig::default();
        let mut model = open_model(&config);
        // Up-left into the corner region: left wall then top wall within one dt
        model.ball = mid_ball(Vec2::new(30.0, 30.0), Vec2::new(-0.5, -0.4), 0.0);

        let res = resolve(&mut model, 200.0, &config);
        assert_eq!(res.outcome, Outcome::Resolved);
        // Both components flipped back into the field
        assert!(model.ball.vel.x > 0.0);
        assert!(model.ball.vel.y > 0.0);
        assert!(res.effects.is_empty());
    }
}
