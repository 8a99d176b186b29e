//! Fire-and-forget audio cues
//!
//! Three clips created once at startup from the configured asset paths.
//! Playback errors (autoplay policy before the first gesture, missing
//! assets) are swallowed; sound is garnish, not game state.

use web_sys::HtmlAudioElement;

use crate::config::SoundPaths;
use crate::sim::Cue;

/// One audio element per cue
pub struct SoundBank {
    brick: Option<HtmlAudioElement>,
    paddle: Option<HtmlAudioElement>,
    game_over: Option<HtmlAudioElement>,
}

impl SoundBank {
    pub fn new(paths: &SoundPaths) -> Self {
        Self {
            brick: load_clip(&paths.brick),
            paddle: load_clip(&paths.paddle),
            game_over: load_clip(&paths.game_over),
        }
    }

    /// Restart the clip for `cue` from the top
    pub fn play(&self, cue: Cue) {
        let clip = match cue {
            Cue::Brick => &self.brick,
            Cue::Paddle => &self.paddle,
            Cue::GameOver => &self.game_over,
        };
        if let Some(el) = clip {
            el.set_current_time(0.0);
            let _ = el.play();
        }
    }
}

fn load_clip(src: &str) -> Option<HtmlAudioElement> {
    let el = HtmlAudioElement::new_with_src(src).ok();
    if el.is_none() {
        log::warn!("Failed to create audio element for {src} - cue disabled");
    }
    el
}
