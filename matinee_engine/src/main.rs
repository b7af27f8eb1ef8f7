use std::collections::BTreeSet;
use std::fs;

use anyhow::{Context, Result, bail};
use matinee_formats::{CommandDoc, GameRoot};

mod actor;
mod cli;
mod dialog;
mod events;
mod fade;
mod grid;
mod input;
mod manager;
mod render;
mod report;
mod script;
mod session;
mod triggers;
mod vars;
mod video;

use cli::{Command, InspectArgs, ListScenesArgs, RunArgs};
use events::EventLog;
use input::InputPlan;
use manager::SceneManager;
use report::RunReport;
use video::SlateBackend;

/// Fixed simulation tick, thirty updates per second.
const TICK_SECONDS: f32 = 1.0 / 30.0;

fn main() -> Result<()> {
    env_logger::init();
    match cli::parse()? {
        Command::Run(args) => run(args),
        Command::Inspect(args) => inspect(args),
        Command::ListScenes(args) => list_scenes(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let root = GameRoot::new(&args.game_root);
    let mut settings = root
        .load_settings()
        .with_context(|| format!("loading game settings from {}", root.path().display()))?;
    if let Some(scene) = args.scene {
        settings.initial_scene = scene;
    }

    let plan = match args.input_plan.as_deref() {
        Some(path) => InputPlan::load(path)?,
        None if args.walk_demo => InputPlan::demo(),
        None => InputPlan::idle(),
    };

    let mut events = EventLog::new();
    let mut manager = SceneManager::new(
        root,
        &settings,
        Box::<SlateBackend>::default(),
        &mut events,
    );

    for frame in 0..args.frames {
        let input = plan.frame_at(frame);
        manager.update(TICK_SECONDS, &input, &mut events);
    }

    println!(
        "Ran {frames} ticks | scene {name} ({kind})",
        frames = args.frames,
        name = manager.scene_name(),
        kind = manager.scene_kind()
    );
    let actor = manager.actor();
    println!(
        "Actor at ({x:.1}, {y:.1}) facing {facing:?} frame {frame}",
        x = actor.x,
        y = actor.y,
        facing = actor.facing,
        frame = actor.frame
    );

    println!("\nEvents:");
    for line in events.entries() {
        println!("  {line}");
    }

    if args.dump_plan {
        println!("\nFinal draw plan:");
        for op in manager.render_plan().ops() {
            let json = serde_json::to_string(op).context("serializing draw op")?;
            println!("  {json}");
        }
    }

    if let Some(path) = args.report_json.as_ref() {
        let report = RunReport::collect(args.frames, &manager, &events);
        fs::write(path, report.to_json()?)
            .with_context(|| format!("writing run report to {}", path.display()))?;
        println!("\nSaved run report JSON to {}", path.display());
    }
    Ok(())
}

/// Parse every scene in the pack and report unresolved script and dialog
/// group references. Exits nonzero when any scene has problems.
fn inspect(args: InspectArgs) -> Result<()> {
    let root = GameRoot::new(&args.game_root);
    let names = match args.scene {
        Some(name) => vec![name],
        None => root.list_scenes(),
    };
    if names.is_empty() {
        bail!("no scenes found under {}", root.path().display());
    }

    let mut broken = 0usize;
    for name in &names {
        match root.load_scene(name) {
            Ok(doc) => {
                let mut problems: Vec<String> = doc
                    .dangling_script_refs()
                    .iter()
                    .map(|group| format!("script group `{group}`"))
                    .collect();
                let mut dialog_refs = BTreeSet::new();
                for group in &doc.script_groups {
                    CommandDoc::collect_dialog_refs(&group.script, &mut dialog_refs);
                }
                CommandDoc::collect_dialog_refs(&doc.initial_script, &mut dialog_refs);
                for dialog in dialog_refs {
                    if doc.dialog_group(&dialog).is_none() {
                        problems.push(format!("dialog group `{dialog}`"));
                    }
                }
                if doc.is_video() && doc.next_scene.is_none() {
                    problems.push("video scene without nextScene".to_string());
                }

                if problems.is_empty() {
                    println!("ok   {name}");
                } else {
                    broken += 1;
                    println!("warn {name}: unresolved {}", problems.join(", "));
                }
            }
            Err(err) => {
                broken += 1;
                println!("fail {name}: {err:#}");
            }
        }
    }

    println!(
        "{checked} scenes checked, {broken} with problems",
        checked = names.len()
    );
    if broken > 0 {
        bail!("{broken} scenes failed inspection");
    }
    Ok(())
}

fn list_scenes(args: ListScenesArgs) -> Result<()> {
    let root = GameRoot::new(&args.game_root);
    for name in root.list_scenes() {
        println!("{name}");
    }
    Ok(())
}
