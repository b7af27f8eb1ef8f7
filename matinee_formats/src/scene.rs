//! Serde model for scene definition documents.
//!
//! One JSON document per scene, keyed by scene name on disk
//! (`scenes/<name>.json`). Field names follow the authored format exactly,
//! including its mixed capitalisation, so existing game content loads
//! unchanged.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::CommandDoc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    #[default]
    Static,
    Video,
}

impl<'de> Deserialize<'de> for SceneKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        if label.eq_ignore_ascii_case("video") {
            Ok(SceneKind::Video)
        } else {
            Ok(SceneKind::Static)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_alpha")]
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color {
            r: 0,
            g: 0,
            b: 0,
            a: 255,
        }
    }
}

fn default_alpha() -> u8 {
    255
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerDoc {
    pub image: String,
    #[serde(default)]
    pub z: i32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_opacity() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub struct CellDoc {
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptGroupDoc {
    pub name: String,
    #[serde(default)]
    pub script: Vec<CommandDoc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptCellsDoc {
    /// When true the group fires on the action key, not on cell entry.
    #[serde(rename = "needUseKey", default)]
    pub need_use_key: bool,
    #[serde(rename = "scriptGroup")]
    pub script_group: String,
    #[serde(default)]
    pub cells: Vec<CellDoc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DialogLineDoc {
    #[serde(default)]
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Optional total reveal time for the line, in seconds. Overrides the
    /// fixed per-character delay when present.
    #[serde(rename = "animDuration", default)]
    pub anim_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DialogGroupDoc {
    pub name: String,
    #[serde(default)]
    pub content: Vec<DialogLineDoc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerDoc {
    pub row: i32,
    pub col: i32,
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    #[serde(default = "default_player_skin")]
    pub skin: String,
}

/// Spawn defaults used when a scene omits the `player` block entirely.
impl Default for PlayerDoc {
    fn default() -> Self {
        PlayerDoc {
            row: 1,
            col: 1,
            speed: default_player_speed(),
            skin: default_player_skin(),
        }
    }
}

fn default_player_speed() -> f32 {
    200.0
}

fn default_player_skin() -> String {
    "player".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneDoc {
    #[serde(rename = "type", default)]
    pub kind: SceneKind,
    #[serde(rename = "backgroundColor", default)]
    pub background_color: Color,
    #[serde(rename = "showGrid", default)]
    pub show_grid: bool,
    #[serde(default)]
    pub layers: Vec<LayerDoc>,
    #[serde(default)]
    pub collisions: Vec<CellDoc>,
    #[serde(rename = "ScriptGroups", default)]
    pub script_groups: Vec<ScriptGroupDoc>,
    #[serde(rename = "ScriptCells", default)]
    pub script_cells: Vec<ScriptCellsDoc>,
    #[serde(rename = "DialogGroups", default)]
    pub dialog_groups: Vec<DialogGroupDoc>,
    #[serde(rename = "InitialScript", default)]
    pub initial_script: Vec<CommandDoc>,
    #[serde(rename = "GlobalVars", default)]
    pub global_vars: BTreeMap<String, Value>,
    #[serde(default)]
    pub player: Option<PlayerDoc>,
    #[serde(rename = "videoFile", default)]
    pub video_file: Option<String>,
    #[serde(rename = "nextScene", default)]
    pub next_scene: Option<String>,
    #[serde(rename = "fadeAtStart", default)]
    pub fade_at_start: bool,
}

impl SceneDoc {
    pub fn is_video(&self) -> bool {
        self.kind == SceneKind::Video
    }

    pub fn script_group(&self, name: &str) -> Option<&ScriptGroupDoc> {
        self.script_groups.iter().find(|group| group.name == name)
    }

    pub fn dialog_group(&self, name: &str) -> Option<&DialogGroupDoc> {
        self.dialog_groups.iter().find(|group| group.name == name)
    }

    /// Trigger groups that reference a script group this document does not
    /// define. The runtime drops such triggers silently; tooling reports them.
    pub fn dangling_script_refs(&self) -> Vec<&str> {
        self.script_cells
            .iter()
            .map(|cells| cells.script_group.as_str())
            .filter(|name| self.script_group(name).is_none())
            .collect()
    }
}

pub fn parse_scene(text: &str) -> Result<SceneDoc> {
    serde_json::from_str(text).context("parsing scene definition")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = r#"{
        "backgroundColor": {"r": 20, "g": 24, "b": 40},
        "showGrid": true,
        "layers": [
            {"image": "room/floor.png", "z": 0},
            {"image": "room/props.png", "z": 2, "opacity": 0.8}
        ],
        "collisions": [{"row": 0, "col": 0}, {"row": 0, "col": 1}],
        "ScriptGroups": [
            {"name": "door", "script": [
                {"showDialog": "doorKeeper"},
                {"if": {"condition": "hasKey", "then": [{"fadeOut": 1}], "else": []}}
            ]}
        ],
        "ScriptCells": [
            {"needUseKey": true, "scriptGroup": "door", "cells": [{"row": 3, "col": 7}]}
        ],
        "DialogGroups": [
            {"name": "doorKeeper", "content": [
                {"title": "Keeper", "text": "Halt!", "avatar": "keeper.png", "animDuration": 0.8},
                {"text": "Who goes there?"}
            ]}
        ],
        "InitialScript": [{"playerMovement": false}, {"fadeIn": 1}],
        "GlobalVars": {"hasKey": false, "gold": 12},
        "player": {"row": 5, "col": 2, "speed": 240, "skin": "willy"}
    }"#;

    #[test]
    fn parses_a_full_static_scene() {
        let doc = parse_scene(ROOM).expect("room scene");
        assert_eq!(doc.kind, SceneKind::Static);
        assert!(!doc.is_video());
        assert_eq!(doc.background_color.r, 20);
        assert_eq!(doc.background_color.a, 255);
        assert!(doc.show_grid);
        assert_eq!(doc.layers.len(), 2);
        assert_eq!(doc.layers[1].opacity, 0.8);
        assert_eq!(doc.collisions.len(), 2);

        let door = doc.script_group("door").expect("door group");
        assert_eq!(door.script.len(), 2);
        assert!(matches!(door.script[1], CommandDoc::If { .. }));

        assert!(doc.script_cells[0].need_use_key);
        assert_eq!(doc.script_cells[0].cells[0], CellDoc { row: 3, col: 7 });

        let keeper = doc.dialog_group("doorKeeper").expect("dialog group");
        assert_eq!(keeper.content[0].anim_duration, Some(0.8));
        assert_eq!(keeper.content[1].title, "");
        assert!(keeper.content[1].avatar.is_none());

        assert_eq!(doc.initial_script.len(), 2);
        assert_eq!(doc.global_vars.len(), 2);
        let player = doc.player.expect("player");
        assert_eq!((player.row, player.col), (5, 2));
        assert_eq!(player.speed, 240.0);
        assert_eq!(player.skin, "willy");
    }

    #[test]
    fn parses_a_video_scene() {
        let doc = parse_scene(
            r#"{
                "type": "video",
                "videoFile": "video/intro.ogv",
                "nextScene": "room1",
                "fadeAtStart": true
            }"#,
        )
        .expect("video scene");
        assert!(doc.is_video());
        assert_eq!(doc.video_file.as_deref(), Some("video/intro.ogv"));
        assert_eq!(doc.next_scene.as_deref(), Some("room1"));
        assert!(doc.fade_at_start);
        assert!(doc.player.is_none());
    }

    #[test]
    fn empty_document_defaults_to_a_blank_static_scene() {
        let doc = parse_scene("{}").expect("empty scene");
        assert_eq!(doc.kind, SceneKind::Static);
        assert_eq!(doc.background_color, Color::default());
        assert!(doc.layers.is_empty());
        assert!(doc.script_groups.is_empty());
        assert!(doc.player.is_none());
        assert!(!doc.fade_at_start);
    }

    #[test]
    fn unknown_type_labels_fall_back_to_static() {
        let doc = parse_scene(r#"{"type": "cutscene"}"#).expect("scene");
        assert_eq!(doc.kind, SceneKind::Static);
    }

    #[test]
    fn reports_dangling_trigger_references() {
        let doc = parse_scene(
            r#"{
                "ScriptGroups": [{"name": "real", "script": []}],
                "ScriptCells": [
                    {"scriptGroup": "real", "cells": []},
                    {"scriptGroup": "ghost", "cells": []}
                ]
            }"#,
        )
        .expect("scene");
        assert_eq!(doc.dangling_script_refs(), vec!["ghost"]);
    }

    #[test]
    fn malformed_script_entries_fail_the_whole_parse() {
        let err = parse_scene(
            r#"{"ScriptGroups": [{"name": "bad", "script": [{"warp": 3}]}]}"#,
        )
        .expect_err("unknown command should fail");
        assert!(format!("{err:#}").contains("unknown command"));
    }
}
