//! Input intents for one frame, and the scripted input plans the headless
//! host replays instead of polling real devices.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// 1/sqrt(2): diagonal presses are normalized so the actor's speed is
/// direction-independent.
pub const DIAGONAL_SCALE: f32 = std::f32::consts::FRAC_1_SQRT_2;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Discrete action press (use key), edge-triggered.
    pub action: bool,
    /// Debug cell probe at a pixel position.
    pub probe: Option<(f32, f32)>,
}

impl InputFrame {
    /// Unit direction vector from the held keys. Opposing keys cancel.
    pub fn direction(&self) -> (f32, f32) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.left {
            dx -= 1.0;
        }
        if self.right {
            dx += 1.0;
        }
        if self.up {
            dy -= 1.0;
        }
        if self.down {
            dy += 1.0;
        }
        if dx != 0.0 && dy != 0.0 {
            dx *= DIAGONAL_SCALE;
            dy *= DIAGONAL_SCALE;
        }
        (dx, dy)
    }
}

/// One stretch of held keys in a scripted input plan. `action` and `probe`
/// fire on the segment's first frame only, modeling discrete presses.
#[derive(Debug, Clone, Deserialize)]
pub struct InputSegment {
    pub frames: u32,
    #[serde(default)]
    pub hold: Vec<String>,
    #[serde(default)]
    pub action: bool,
    #[serde(default)]
    pub probe: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputPlan {
    pub segments: Vec<InputSegment>,
}

impl InputPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading input plan {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// A canned walk for smoke runs: right, down, a pause with an action
    /// press, then a drift back left.
    pub fn demo() -> Self {
        let segment = |frames, hold: &[&str], action| InputSegment {
            frames,
            hold: hold.iter().map(|s| s.to_string()).collect(),
            action,
            probe: None,
        };
        InputPlan {
            segments: vec![
                segment(45, &["right"], false),
                segment(30, &["down"], false),
                segment(10, &[], true),
                segment(30, &["left", "up"], false),
                segment(30, &[], false),
            ],
        }
    }

    /// An empty plan standing in for "no input": every frame idle.
    pub fn idle() -> Self {
        InputPlan {
            segments: Vec::new(),
        }
    }

    pub fn total_frames(&self) -> u32 {
        self.segments.iter().map(|segment| segment.frames).sum()
    }

    /// The input for frame `index`; idle once the plan is exhausted.
    pub fn frame_at(&self, index: u32) -> InputFrame {
        let mut offset = index;
        for segment in &self.segments {
            if offset < segment.frames {
                let mut frame = InputFrame::default();
                for key in &segment.hold {
                    match key.as_str() {
                        "up" => frame.up = true,
                        "down" => frame.down = true,
                        "left" => frame.left = true,
                        "right" => frame.right = true,
                        other => log::warn!("input plan holds unknown key `{other}`"),
                    }
                }
                if offset == 0 {
                    frame.action = segment.action;
                    frame.probe = segment.probe;
                }
                return frame;
            }
            offset -= segment.frames;
        }
        InputFrame::default()
    }
}
