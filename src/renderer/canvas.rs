//! Flat-shape painter over a 2D canvas context

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::sim::{GameState, Rect};

/// Owns the 2D context of the playfield canvas
pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasPainter {
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok());
        let Some(ctx) = ctx else {
            log::warn!("Canvas has no 2d context - nothing will be drawn");
            return None;
        };
        Some(Self {
            ctx,
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        })
    }

    /// Repaint the whole frame: bricks, paddle, ball
    pub fn draw(&self, state: &GameState) {
        // Transparent clear; the page supplies the backdrop (camera feed or CSS)
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);

        // Config validation guarantees at least one ramp color
        let colors = &state.config.bricks.colors;
        for brick in &state.model.bricks {
            let idx = usize::from(brick.hits.saturating_sub(1)).min(colors.len() - 1);
            self.ctx.set_fill_style_str(&colors[idx]);
            self.fill_rect(brick.rect);
        }

        self.ctx.set_fill_style_str(&state.config.paddle.color);
        self.fill_rect(state.model.paddle.rect());

        let ball = &state.model.ball;
        self.ctx.set_fill_style_str(&state.config.ball.color);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            f64::from(ball.pos.x),
            f64::from(ball.pos.y),
            f64::from(ball.radius),
            0.0,
            TAU,
        );
        self.ctx.fill();
    }

    fn fill_rect(&self, r: Rect) {
        self.ctx
            .fill_rect(f64::from(r.x), f64::from(r.y), f64::from(r.w), f64::from(r.h));
    }
}
