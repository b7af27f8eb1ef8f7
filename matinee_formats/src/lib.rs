pub mod command;
pub mod scene;
pub mod settings;

pub use command::{CommandDoc, ScriptParseError, parse_script};
pub use scene::{
    CellDoc, Color, DialogGroupDoc, DialogLineDoc, LayerDoc, PlayerDoc, SceneDoc, SceneKind,
    ScriptCellsDoc, ScriptGroupDoc, parse_scene,
};
pub use settings::{GameRoot, GameSettings, WindowSettings};
