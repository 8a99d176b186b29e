//! Off-main-thread collision resolution
//!
//! The driver can resolve physics on a web worker. The protocol is an
//! explicit request/response pair with sequence numbers: at most one
//! request in flight, and responses that outlived their request get
//! dropped on the floor. The worker side is a pure function over the
//! serialized snapshot, so the local and offloaded paths run identical
//! code.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::sim::collide::{Outcome, SideEffect, resolve};
use crate::sim::state::{GameModel, GamePhase, GameState};
use crate::sim::tick::apply_resolution;

/// One frame's worth of physics shipped to the worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub seq: u64,
    pub dt: f32,
    pub model: GameModel,
    pub config: GameConfig,
}

/// The resolved snapshot coming back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub seq: u64,
    pub model: GameModel,
    pub outcome: Outcome,
    pub effects: Vec<SideEffect>,
}

/// Resolve a shipped snapshot. This is the entire worker computation.
pub fn resolve_snapshot(mut request: ResolveRequest) -> ResolveResponse {
    let resolution = resolve(&mut request.model, request.dt, &request.config);
    ResolveResponse {
        seq: request.seq,
        model: request.model,
        outcome: resolution.outcome,
        effects: resolution.effects,
    }
}

/// Worker-side entry point: JSON in, JSON out. The worker shim calls this
/// for every message and posts the reply back. Malformed input produces a
/// `null` reply, which the main thread ignores.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn resolve_step(request_json: &str) -> String {
    match serde_json::from_str::<ResolveRequest>(request_json) {
        Ok(request) => {
            let response = resolve_snapshot(request);
            serde_json::to_string(&response).unwrap_or_else(|_| "null".into())
        }
        Err(e) => {
            log::warn!("physics worker: dropping malformed request: {e}");
            "null".into()
        }
    }
}

/// Sequencing for the at-most-one-in-flight request channel
#[derive(Debug, Clone, Default)]
pub struct WorkerLink {
    next_seq: u64,
    in_flight: Option<u64>,
}

impl WorkerLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Claim a sequence number for a new request, or `None` while one is
    /// still out
    pub fn begin(&mut self) -> Option<u64> {
        if self.busy() {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        Some(seq)
    }

    /// Check a response in. `true` means it answers the outstanding
    /// request and should be absorbed; `false` means it is stale.
    pub fn accept(&mut self, seq: u64) -> bool {
        if self.in_flight == Some(seq) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Abandon the outstanding request (restart, level rebuild). Its
    /// response, if it ever arrives, is stale from here on.
    pub fn cancel(&mut self) {
        self.in_flight = None;
    }
}

/// Fold an accepted worker response into the state. The paddle keeps its
/// local, fresher position; ball and bricks come from the worker. Effects
/// run through the same application as the local path. Responses landing
/// outside `Running` (the user paused while the request was out) are
/// dropped whole.
pub fn absorb_response(state: &mut GameState, response: ResolveResponse) -> Vec<SideEffect> {
    if state.phase != GamePhase::Running {
        return Vec::new();
    }
    state.model.ball = response.model.ball;
    state.model.bricks = response.model.bricks;
    apply_resolution(state, response.outcome, response.effects)
}
