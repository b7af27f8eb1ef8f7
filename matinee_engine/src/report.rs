//! End-of-run snapshot serialized to JSON. Harnesses diff this instead of
//! scraping log output; the integration tests drive the binary and assert on
//! the same structure.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::actor::Actor;
use crate::dialog::DialogState;
use crate::events::EventLog;
use crate::manager::SceneManager;
use crate::vars::VarStore;

#[derive(Debug, Serialize)]
pub struct SceneReport {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct ScriptReport {
    pub running: bool,
    pub active_group: Option<String>,
    pub queued: usize,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub frames: u32,
    pub scene: SceneReport,
    pub actor: Actor,
    pub vars: VarStore,
    pub script: ScriptReport,
    pub dialog: DialogState,
    pub fade_alpha: f32,
    pub events: Vec<String>,
}

impl RunReport {
    /// Snapshot the manager after `frames` fixed ticks. Video scenes carry no
    /// variable store or script state; those fields report empty.
    pub fn collect(frames: u32, manager: &SceneManager, events: &EventLog) -> Self {
        let session = manager.session();
        RunReport {
            frames,
            scene: SceneReport {
                name: manager.scene_name().to_string(),
                kind: manager.scene_kind().to_string(),
            },
            actor: manager.actor().clone(),
            vars: session.map(|s| s.vars().clone()).unwrap_or_default(),
            script: ScriptReport {
                running: session.is_some_and(|s| s.script_running()),
                active_group: session.and_then(|s| s.active_script().map(str::to_string)),
                queued: session.map_or(0, |s| s.script_queue_len()),
            },
            dialog: session.map_or(DialogState::Hidden, |s| s.dialog_state()),
            fade_alpha: manager.fade_alpha(),
            events: events.entries().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing run report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputFrame;
    use crate::video::SlateBackend;
    use matinee_formats::{GameRoot, GameSettings};
    use std::fs;

    #[test]
    fn report_captures_scene_vars_and_actor() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = GameRoot::new(dir.path());
        fs::create_dir_all(dir.path().join("scenes")).expect("scenes dir");
        fs::write(
            root.scene_path("room"),
            r#"{"GlobalVars": {"gold": 5}, "player": {"row": 2, "col": 3}}"#,
        )
        .expect("scene");

        let settings = GameSettings {
            initial_scene: "room".to_string(),
            window: Default::default(),
        };
        let mut events = EventLog::new();
        let mut manager = SceneManager::new(
            GameRoot::new(dir.path()),
            &settings,
            Box::<SlateBackend>::default(),
            &mut events,
        );
        for _ in 0..5 {
            manager.update(1.0 / 30.0, &InputFrame::default(), &mut events);
        }

        let report = RunReport::collect(5, &manager, &events);
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("json")).expect("parse");
        assert_eq!(json["scene"]["name"], "room");
        assert_eq!(json["scene"]["kind"], "static");
        assert_eq!(json["vars"]["gold"], 5);
        assert_eq!(json["actor"]["x"], 150.0);
        assert_eq!(json["dialog"], "Hidden");
        assert_eq!(json["frames"], 5);
        assert!(json["events"]
            .as_array()
            .expect("events array")
            .iter()
            .any(|line| line == "scene.load room"));
    }
}
