//! Axis-aligned geometry and the swept ball-vs-rectangle test
//!
//! Canvas coordinates: origin top-left, +y down. The sweep test reduces
//! circle-vs-rect to point-vs-expanded-rect (Minkowski sum) and only ever
//! tests the faces the ball is travelling toward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, origin at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Grow outward by `r` on all sides (Minkowski sum with a ball of radius `r`)
    pub fn expand(&self, r: f32) -> Rect {
        Rect::new(self.x - r, self.y - r, self.w + 2.0 * r, self.h + 2.0 * r)
    }
}

/// Which face of a rectangle a sweep first crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// First crossing of a swept ball into a rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intercept {
    pub point: Vec2,
    pub side: Side,
}

/// 2D segment-segment intersection, parametric form.
///
/// Returns `None` for parallel segments (zero denominator) or when the
/// crossing falls outside either segment's [0,1] parameter range. A
/// zero-length segment degenerates to the parallel case.
pub fn segment_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if denom == 0.0 {
        return None;
    }
    let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
    let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;
    if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
        return None;
    }
    Some(p1 + (p2 - p1) * ua)
}

/// Sweep a ball of `radius` from `center` along `delta` against `rect`.
///
/// Only the leading faces are tested: left/right picked by the sign of
/// `delta.x` first, then top/bottom by the sign of `delta.y` if there was
/// no horizontal hit. A ball cannot reach a trailing face within one
/// swept step, so the other two faces never need testing. The returned
/// point lies on the expanded rect, radius-distance off the true face.
pub fn ball_intercept(center: Vec2, radius: f32, rect: &Rect, delta: Vec2) -> Option<Intercept> {
    let end = center + delta;
    let e = rect.expand(radius);

    if delta.x > 0.0 {
        if let Some(point) = segment_intersect(
            center,
            end,
            Vec2::new(e.left(), e.top()),
            Vec2::new(e.left(), e.bottom()),
        ) {
            return Some(Intercept {
                point,
                side: Side::Left,
            });
        }
    } else if delta.x < 0.0 {
        if let Some(point) = segment_intersect(
            center,
            end,
            Vec2::new(e.right(), e.top()),
            Vec2::new(e.right(), e.bottom()),
        ) {
            return Some(Intercept {
                point,
                side: Side::Right,
            });
        }
    }

    if delta.y > 0.0 {
        if let Some(point) = segment_intersect(
            center,
            end,
            Vec2::new(e.left(), e.top()),
            Vec2::new(e.right(), e.top()),
        ) {
            return Some(Intercept {
                point,
                side: Side::Top,
            });
        }
    } else if delta.y < 0.0 {
        if let Some(point) = segment_intersect(
            center,
            end,
            Vec2::new(e.left(), e.bottom()),
            Vec2::new(e.right(), e.bottom()),
        ) {
            return Some(Intercept {
                point,
                side: Side::Bottom,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_segment_intersect_crossing() {
        // Two diagonals of a 10x10 box cross in the middle
        let p = segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        )
        .unwrap();
        assert!((p.x - 5.0).abs() < 0.001);
        assert!((p.y - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_segment_intersect_parallel() {
        let p = segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 5.0),
            Vec2::new(10.0, 5.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_segment_intersect_out_of_range() {
        // Lines cross but the segments stop short of the crossing
        let p = segment_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_ball_intercept_left_face() {
        // Ball at x=0 sweeping right into a rect at x∈[50,70]; radius 5
        // puts the expanded face at x=45
        let rect = Rect::new(50.0, 40.0, 20.0, 20.0);
        let hit = ball_intercept(Vec2::new(0.0, 50.0), 5.0, &rect, Vec2::new(100.0, 0.0)).unwrap();
        assert_eq!(hit.side, Side::Left);
        assert!((hit.point.x - 45.0).abs() < 0.001);
        assert!((hit.point.y - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_ball_intercept_top_face() {
        let rect = Rect::new(40.0, 100.0, 40.0, 10.0);
        let hit = ball_intercept(Vec2::new(60.0, 0.0), 4.0, &rect, Vec2::new(0.0, 200.0)).unwrap();
        assert_eq!(hit.side, Side::Top);
        assert!((hit.point.y - 96.0).abs() < 0.001);
    }

    #[test]
    fn test_ball_intercept_moving_away() {
        // Rect entirely to the ball's left while the ball moves right
        let rect = Rect::new(50.0, 40.0, 20.0, 20.0);
        let hit = ball_intercept(Vec2::new(100.0, 50.0), 5.0, &rect, Vec2::new(50.0, 0.0));
        assert!(hit.is_none());
    }

    #[test]
    fn test_ball_intercept_horizontal_face_wins_at_corner() {
        // A 45° sweep into a corner crosses left and top faces at the same
        // point; the horizontal test runs first and tags it Left
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        let hit = ball_intercept(Vec2::ZERO, 0.0, &rect, Vec2::new(20.0, 20.0)).unwrap();
        assert_eq!(hit.side, Side::Left);
    }

    #[test]
    fn test_ball_intercept_zero_delta() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(ball_intercept(Vec2::new(15.0, 15.0), 2.0, &rect, Vec2::ZERO).is_none());
    }

    proptest! {
        #[test]
        fn prop_no_hit_when_moving_away(
            bx in 150.0f32..300.0, by in -100.0f32..300.0,
            dx in 1.0f32..200.0, dy in -200.0f32..200.0,
        ) {
            // Ball starts strictly right of the expanded rect and keeps
            // moving right; x(t) can never re-enter the rect's x span
            let rect = Rect::new(100.0, 100.0, 40.0, 40.0);
            let hit = ball_intercept(Vec2::new(bx, by), 5.0, &rect, Vec2::new(dx, dy));
            prop_assert!(hit.is_none());
        }
    }
}
