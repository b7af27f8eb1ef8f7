//! Full-viewport fade veil. Alpha runs linearly between 0 (clear) and 1
//! (opaque) at a rate of 1/duration per second, driven by the `fadeIn` /
//! `fadeOut` commands and by `fadeAtStart` on scene entry.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FadeOverlay {
    alpha: f32,
    target: f32,
    rate: f32,
}

impl FadeOverlay {
    pub fn new() -> Self {
        FadeOverlay {
            alpha: 0.0,
            target: 0.0,
            rate: 0.0,
        }
    }

    /// Start opaque and clear over `duration` seconds.
    pub fn fade_in(&mut self, duration: f64) {
        self.alpha = 1.0;
        self.target = 0.0;
        self.rate = rate_for(duration);
    }

    /// Start clear and blacken over `duration` seconds.
    pub fn fade_out(&mut self, duration: f64) {
        self.alpha = 0.0;
        self.target = 1.0;
        self.rate = rate_for(duration);
    }

    pub fn update(&mut self, dt: f32) {
        if self.alpha == self.target {
            return;
        }
        let step = self.rate * dt;
        if self.alpha < self.target {
            self.alpha = (self.alpha + step).min(self.target);
        } else {
            self.alpha = (self.alpha - step).max(self.target);
        }
    }

    pub fn is_done(&self) -> bool {
        self.alpha == self.target
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl Default for FadeOverlay {
    fn default() -> Self {
        FadeOverlay::new()
    }
}

fn rate_for(duration: f64) -> f32 {
    if duration > 0.0 {
        (1.0 / duration) as f32
    } else {
        // Zero or negative duration snaps on the first update.
        f32::INFINITY
    }
}
