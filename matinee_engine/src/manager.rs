//! Scene lifecycle. The manager owns the actor and the active scene, loads
//! scene documents from the game root, and walks transitions: video scenes
//! hand off to their follow-up scene, and any load failure falls back to the
//! content pack's error scene, then to a built-in blank scene.

use anyhow::{Context, Result};
use matinee_formats::{Color, GameRoot, GameSettings, SceneDoc};

use crate::actor::Actor;
use crate::events::EventLog;
use crate::fade::FadeOverlay;
use crate::input::InputFrame;
use crate::render::{DrawOp, FramePlan};
use crate::session::{SCENE_ENTRY_FADE_SECONDS, SceneSession};
use crate::video::{FramePacer, VideoBackend, VideoSource};

/// Scene loaded in place of any scene that fails to load.
pub const ERROR_SCENE: &str = "error";

/// Name reported for the built-in empty scene used when even the error scene
/// cannot be loaded.
pub const BLANK_SCENE: &str = "blank";

/// Bound on load redirects (video skips, error fallbacks) resolved in a
/// single transition, so cyclic content cannot hang the loop.
const MAX_SCENE_HOPS: usize = 8;

enum SceneState {
    Static(SceneSession),
    Video(VideoPlayback),
}

struct VideoPlayback {
    scene: String,
    source: Box<dyn VideoSource>,
    pacer: FramePacer,
    next_scene: Option<String>,
    fade: FadeOverlay,
    finished: bool,
}

impl VideoPlayback {
    /// Decode every frame due this tick. Returns the follow-up scene once the
    /// stream ends; a decode error ends playback early rather than stalling.
    fn update(&mut self, dt: f32, events: &mut EventLog) -> Option<String> {
        self.fade.update(dt);
        for _ in 0..self.pacer.advance(dt) {
            let more = match self.source.decode_next() {
                Ok(more) => more,
                Err(err) => {
                    log::warn!("{err}; ending playback");
                    false
                }
            };
            if !more {
                self.finished = true;
                events.push(format!("video.end {}", self.source.name()));
                break;
            }
        }
        if self.finished {
            Some(
                self.next_scene
                    .clone()
                    .unwrap_or_else(|| ERROR_SCENE.to_string()),
            )
        } else {
            None
        }
    }

    fn render_plan(&self) -> FramePlan {
        let mut plan = FramePlan::new();
        plan.push(DrawOp::Clear {
            color: Color::default(),
        });
        plan.push(DrawOp::VideoFrame {
            source: self.source.name().to_string(),
            frame: self.source.current_frame(),
        });
        if self.fade.alpha() > 0.0 {
            plan.push(DrawOp::FadeVeil {
                alpha: self.fade.alpha(),
            });
        }
        plan
    }
}

enum Loaded {
    Installed,
    Redirect(String),
}

pub struct SceneManager {
    root: GameRoot,
    viewport: (u32, u32),
    backend: Box<dyn VideoBackend>,
    state: SceneState,
    actor: Actor,
}

impl SceneManager {
    pub fn new(
        root: GameRoot,
        settings: &GameSettings,
        backend: Box<dyn VideoBackend>,
        events: &mut EventLog,
    ) -> Self {
        let viewport = (settings.window.width, settings.window.height);
        let mut manager = SceneManager {
            root,
            viewport,
            backend,
            state: SceneState::Static(SceneSession::new(
                BLANK_SCENE,
                &SceneDoc::default(),
                viewport,
                events,
            )),
            actor: Actor::new(),
        };
        manager.switch_to(&settings.initial_scene, events);
        manager
    }

    pub fn scene_name(&self) -> &str {
        match &self.state {
            SceneState::Static(session) => session.name(),
            SceneState::Video(video) => &video.scene,
        }
    }

    pub fn scene_kind(&self) -> &'static str {
        match &self.state {
            SceneState::Static(_) => "static",
            SceneState::Video(_) => "video",
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// The active static session, if the current scene is static.
    pub fn session(&self) -> Option<&SceneSession> {
        match &self.state {
            SceneState::Static(session) => Some(session),
            SceneState::Video(_) => None,
        }
    }

    pub fn fade_alpha(&self) -> f32 {
        match &self.state {
            SceneState::Static(session) => session.fade_alpha(),
            SceneState::Video(video) => video.fade.alpha(),
        }
    }

    /// Replace the active scene, resolving video skips and load-failure
    /// fallbacks until a scene installs. Never fails: the chain bottoms out
    /// in a built-in blank scene.
    pub fn switch_to(&mut self, name: &str, events: &mut EventLog) {
        let mut target = name.to_string();
        for _ in 0..MAX_SCENE_HOPS {
            match self.try_load(&target, events) {
                Ok(Loaded::Installed) => return,
                Ok(Loaded::Redirect(next)) => target = next,
                Err(err) => {
                    log::warn!("scene `{target}` failed to load: {err:#}");
                    events.push(format!("scene.fail {target}"));
                    if target == ERROR_SCENE {
                        break;
                    }
                    target = ERROR_SCENE.to_string();
                }
            }
        }
        self.install_static(BLANK_SCENE, &SceneDoc::default(), events);
    }

    fn try_load(&mut self, name: &str, events: &mut EventLog) -> Result<Loaded> {
        let doc = self.root.load_scene(name)?;
        if !doc.is_video() {
            self.install_static(name, &doc, events);
            return Ok(Loaded::Installed);
        }

        let Some(file) = doc.video_file.clone() else {
            log::warn!("video scene `{name}` names no videoFile; skipping ahead");
            return Ok(Loaded::Redirect(follow_up(name, &doc)?));
        };
        match self.backend.open(&self.root.asset_path(&file)) {
            Ok(source) => {
                events.push(format!("scene.load {name}"));
                events.push(format!("video.start {}", source.name()));
                let pacer = FramePacer::new(source.frame_delay_ms());
                let mut fade = FadeOverlay::new();
                if doc.fade_at_start {
                    fade.fade_in(SCENE_ENTRY_FADE_SECONDS);
                }
                self.state = SceneState::Video(VideoPlayback {
                    scene: name.to_string(),
                    source,
                    pacer,
                    next_scene: doc.next_scene.clone(),
                    fade,
                    finished: false,
                });
                Ok(Loaded::Installed)
            }
            Err(err) => {
                log::warn!("video `{file}` for scene `{name}` failed to open: {err}");
                Ok(Loaded::Redirect(follow_up(name, &doc)?))
            }
        }
    }

    fn install_static(&mut self, name: &str, doc: &SceneDoc, events: &mut EventLog) {
        events.push(format!("scene.load {name}"));
        let session = SceneSession::new(name, doc, self.viewport, events);
        let spawn = doc.player.clone().unwrap_or_default();
        self.actor
            .respawn(session.grid(), spawn.row, spawn.col, spawn.speed, &spawn.skin);
        self.state = SceneState::Static(session);
    }

    pub fn update(&mut self, dt: f32, input: &InputFrame, events: &mut EventLog) {
        let transition = match &mut self.state {
            SceneState::Static(session) => {
                session.update(dt, input, &mut self.actor, events);
                None
            }
            SceneState::Video(video) => video.update(dt, events),
        };
        if let Some(next) = transition {
            self.switch_to(&next, events);
        }
    }

    pub fn render_plan(&self) -> FramePlan {
        match &self.state {
            SceneState::Static(session) => session.render_plan(&self.actor),
            SceneState::Video(video) => video.render_plan(),
        }
    }
}

/// The scene a broken video falls through to: its `nextScene`, or an error
/// if the document names none.
fn follow_up(name: &str, doc: &SceneDoc) -> Result<String> {
    doc.next_scene
        .clone()
        .with_context(|| format!("video scene `{name}` has no nextScene"))
}
