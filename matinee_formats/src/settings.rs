use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::scene::{SceneDoc, parse_scene};

pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        WindowSettings {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

fn default_width() -> u32 {
    DEFAULT_WINDOW_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_WINDOW_HEIGHT
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    #[serde(rename = "initialScene")]
    pub initial_scene: String,
    #[serde(default)]
    pub window: WindowSettings,
}

/// A game content directory: `settings.json` at the top, one
/// `scenes/<name>.json` per scene, asset paths resolved relative to the root.
#[derive(Debug, Clone)]
pub struct GameRoot {
    root: PathBuf,
}

impl GameRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GameRoot { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn scene_path(&self, name: &str) -> PathBuf {
        self.root.join("scenes").join(format!("{name}.json"))
    }

    pub fn asset_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn load_settings(&self) -> Result<GameSettings> {
        let path = self.settings_path();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn load_scene(&self, name: &str) -> Result<SceneDoc> {
        let path = self.scene_path(name);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        parse_scene(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Scene names available under `scenes/`, sorted. Nested directories are
    /// walked so content packs may group scenes in subfolders.
    pub fn list_scenes(&self) -> Vec<String> {
        let scenes_dir = self.root.join("scenes");
        let mut names: Vec<String> = WalkDir::new(&scenes_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    return None;
                }
                path.strip_prefix(&scenes_dir)
                    .ok()
                    .map(|rel| rel.with_extension(""))
                    .and_then(|rel| rel.to_str().map(|s| s.replace('\\', "/")))
            })
            .collect();
        names.sort();
        names
    }
}
