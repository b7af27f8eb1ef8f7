use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Headless host that runs a scene content pack on a fixed tick",
    version
)]
pub struct Args {
    /// Game content directory holding settings.json and scenes/
    #[arg(long, default_value = ".")]
    pub game_root: PathBuf,

    /// Scene name overriding the settings' initialScene; with --inspect,
    /// check only this scene
    #[arg(long)]
    pub scene: Option<String>,

    /// Number of fixed ticks to simulate
    #[arg(long, default_value_t = 300)]
    pub frames: u32,

    /// JSON input plan file driving the run
    #[arg(long)]
    pub input_plan: Option<PathBuf>,

    /// Drive the run with the built-in walk demo instead of idle input
    #[arg(long)]
    pub walk_demo: bool,

    /// Path to write the end-of-run report as JSON
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Print the final frame's draw plan after the run
    #[arg(long)]
    pub dump_plan: bool,

    /// Validate every scene document in the pack and exit
    #[arg(long)]
    pub inspect: bool,

    /// List the scene names found under the game root and exit
    #[arg(long)]
    pub list_scenes: bool,
}

#[derive(Debug)]
pub enum Command {
    Run(RunArgs),
    Inspect(InspectArgs),
    ListScenes(ListScenesArgs),
}

#[derive(Debug)]
pub struct RunArgs {
    pub game_root: PathBuf,
    pub scene: Option<String>,
    pub frames: u32,
    pub input_plan: Option<PathBuf>,
    pub walk_demo: bool,
    pub report_json: Option<PathBuf>,
    pub dump_plan: bool,
}

#[derive(Debug)]
pub struct InspectArgs {
    pub game_root: PathBuf,
    pub scene: Option<String>,
}

#[derive(Debug)]
pub struct ListScenesArgs {
    pub game_root: PathBuf,
}

pub fn parse() -> Result<Command> {
    let args = Args::parse();
    args.into_command()
}

impl Args {
    fn into_command(self) -> Result<Command> {
        if self.inspect && self.list_scenes {
            bail!("--inspect and --list-scenes are mutually exclusive");
        }
        if self.list_scenes {
            return Ok(Command::ListScenes(ListScenesArgs {
                game_root: self.game_root,
            }));
        }
        if self.inspect {
            return Ok(Command::Inspect(InspectArgs {
                game_root: self.game_root,
                scene: self.scene,
            }));
        }

        if self.input_plan.is_some() && self.walk_demo {
            bail!("--input-plan conflicts with --walk-demo");
        }
        if self.frames == 0 {
            bail!("--frames must be at least 1");
        }
        Ok(Command::Run(RunArgs {
            game_root: self.game_root,
            scene: self.scene,
            frames: self.frames,
            input_plan: self.input_plan,
            walk_demo: self.walk_demo,
            report_json: self.report_json,
            dump_plan: self.dump_plan,
        }))
    }
}
