//! Paddle target sources
//!
//! Keyboard, pointer and the face detector all end up producing the same
//! thing: a lane ratio in [0,1]. The face stream is the noisy one, so it
//! passes through a jitter gate and a once-per-frame limiter before it is
//! allowed to install a new target.

use crate::clamp01;
use crate::config::FaceSettings;

/// Shapes the face-detector event stream into at most one target per frame
#[derive(Debug, Clone)]
pub struct PaddleFeed {
    settings: FaceSettings,
    last_ratio: Option<f32>,
    open: bool,
}

impl PaddleFeed {
    pub fn new(settings: FaceSettings) -> Self {
        Self {
            settings,
            last_ratio: None,
            open: true,
        }
    }

    /// Called by the driver at the top of every animation frame
    pub fn begin_frame(&mut self) {
        self.open = true;
    }

    /// Back to the as-built state. Run on restart, so the first event of a
    /// new round is not jitter-gated against the previous round's ratio.
    pub fn reset(&mut self) {
        self.last_ratio = None;
        self.open = true;
    }

    /// Offer a normalized face x position from the detector. Returns the
    /// lane ratio to install, or `None` when the move is below the jitter
    /// threshold or this frame already accepted one.
    pub fn offer(&mut self, face_x: f32) -> Option<f32> {
        if !self.open {
            return None;
        }
        let ratio = self.map(face_x);
        if let Some(last) = self.last_ratio {
            if (ratio - last).abs() < self.settings.jitter {
                return None;
            }
        }
        self.open = false;
        self.last_ratio = Some(ratio);
        Some(ratio)
    }

    /// Map a camera-frame x into the lane. `side_margin` of the frame on
    /// each side maps off the ends, so the whole lane is reachable without
    /// moving your head to the edge of the picture.
    fn map(&self, face_x: f32) -> f32 {
        let m = self.settings.side_margin;
        let span = 1.0 - 2.0 * m;
        if span <= 0.0 {
            return 0.5;
        }
        clamp01((clamp01(face_x) - m) / span)
    }
}

/// Pointer position within the playfield element, as a lane ratio
pub fn pointer_ratio(x: f32, width: f32) -> f32 {
    if width <= 0.0 {
        return 0.5;
    }
    clamp01(x / width)
}

/// Step the current target by a signed fraction of the lane (arrow keys)
pub fn nudge(ratio: f32, step: f32) -> f32 {
    clamp01(ratio + step)
}
