use std::collections::BTreeSet;
use std::env;
use std::fs;

use anyhow::{Context, Result};
use matinee_formats::{CommandDoc, parse_scene};

fn main() -> Result<()> {
    let path = env::args().nth(1).context("usage: scene_dump <scene.json>")?;
    let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let doc = parse_scene(&text).with_context(|| format!("in {path}"))?;

    if doc.is_video() {
        println!(
            "video scene: file={} next={}",
            doc.video_file.as_deref().unwrap_or("<missing>"),
            doc.next_scene.as_deref().unwrap_or("<missing>")
        );
        return Ok(());
    }

    println!(
        "static scene: {} layers, {} collision cells, showGrid={}",
        doc.layers.len(),
        doc.collisions.len(),
        doc.show_grid
    );
    for layer in &doc.layers {
        println!(
            "  layer {image:<32} z={z:>3} opacity={opacity:.2}",
            image = layer.image,
            z = layer.z,
            opacity = layer.opacity
        );
    }
    for group in &doc.script_groups {
        println!("  script group {:<24} {} commands", group.name, group.script.len());
    }
    for cells in &doc.script_cells {
        println!(
            "  trigger {:<24} {} cells, needUseKey={}",
            cells.script_group,
            cells.cells.len(),
            cells.need_use_key
        );
    }
    for dialog in &doc.dialog_groups {
        println!("  dialog group {:<24} {} lines", dialog.name, dialog.content.len());
    }
    if !doc.global_vars.is_empty() {
        println!("  {} global vars", doc.global_vars.len());
    }
    if let Some(player) = &doc.player {
        println!(
            "  player at row={} col={} speed={} skin={}",
            player.row, player.col, player.speed, player.skin
        );
    }

    for name in doc.dangling_script_refs() {
        println!("  warning: trigger references unknown script group `{name}`");
    }
    let mut dialog_refs = BTreeSet::new();
    for group in &doc.script_groups {
        CommandDoc::collect_dialog_refs(&group.script, &mut dialog_refs);
    }
    CommandDoc::collect_dialog_refs(&doc.initial_script, &mut dialog_refs);
    for name in dialog_refs {
        if doc.dialog_group(&name).is_none() {
            println!("  warning: script references unknown dialog group `{name}`");
        }
    }

    Ok(())
}
