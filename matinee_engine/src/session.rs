//! One loaded static scene. The session owns the grid, collision and trigger
//! indices, variable store, overlays, and the script runner, and drives them
//! in a fixed per-frame order: actor movement, trigger evaluation, script
//! advancement, then dialog and fade animation. Rendering reads the session
//! after all updates and emits an ordered draw plan.

use std::collections::BTreeMap;

use matinee_formats::{Color, CommandDoc, DialogLineDoc, LayerDoc, SceneDoc};

use crate::actor::Actor;
use crate::dialog::{BOX_HEIGHT, DialogOverlay, DialogState};
use crate::events::EventLog;
use crate::fade::FadeOverlay;
use crate::grid::{Cell, CollisionMap, Grid};
use crate::input::InputFrame;
use crate::render::{DrawOp, FramePlan};
use crate::script::{CommandCtx, ScriptRunner};
use crate::triggers::TriggerIndex;
use crate::vars::VarStore;

/// Seconds for the `fadeAtStart` entry fade.
pub const SCENE_ENTRY_FADE_SECONDS: f64 = 1.0;

/// Group label used for a scene's `InitialScript` in events and reports.
pub const INITIAL_SCRIPT_LABEL: &str = "initial";

pub struct SceneSession {
    name: String,
    background: Color,
    show_grid: bool,
    layers: Vec<LayerDoc>,
    grid: Grid,
    collision: CollisionMap,
    triggers: TriggerIndex,
    script_groups: BTreeMap<String, Vec<CommandDoc>>,
    dialog_groups: BTreeMap<String, Vec<DialogLineDoc>>,
    vars: VarStore,
    dialog: DialogOverlay,
    fade: FadeOverlay,
    script: ScriptRunner,
}

impl SceneSession {
    pub fn new(name: &str, doc: &SceneDoc, viewport: (u32, u32), events: &mut EventLog) -> Self {
        let grid = Grid::for_viewport(viewport.0, viewport.1);
        let collision = CollisionMap::new(grid, &doc.collisions);
        let triggers = TriggerIndex::from_docs(&doc.script_cells);

        let mut script_groups = BTreeMap::new();
        for group in &doc.script_groups {
            if script_groups
                .insert(group.name.clone(), group.script.clone())
                .is_some()
            {
                log::warn!("scene `{name}` defines script group `{}` twice", group.name);
            }
        }
        let mut dialog_groups = BTreeMap::new();
        for group in &doc.dialog_groups {
            if dialog_groups
                .insert(group.name.clone(), group.content.clone())
                .is_some()
            {
                log::warn!("scene `{name}` defines dialog group `{}` twice", group.name);
            }
        }

        let mut layers = doc.layers.clone();
        layers.sort_by_key(|layer| layer.z);

        let vars = VarStore::seed(&doc.global_vars);
        let mut fade = FadeOverlay::new();
        if doc.fade_at_start {
            fade.fade_in(SCENE_ENTRY_FADE_SECONDS);
        }

        let mut session = SceneSession {
            name: name.to_string(),
            background: doc.background_color,
            show_grid: doc.show_grid,
            layers,
            grid,
            collision,
            triggers,
            script_groups,
            dialog_groups,
            vars,
            dialog: DialogOverlay::new(viewport.1 as f32),
            fade,
            script: ScriptRunner::new(),
        };
        if !doc.initial_script.is_empty() {
            session.script.arm(
                INITIAL_SCRIPT_LABEL,
                &doc.initial_script,
                &session.vars,
                events,
            );
        }
        session
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn vars(&self) -> &VarStore {
        &self.vars
    }

    pub fn script_running(&self) -> bool {
        self.script.is_running()
    }

    pub fn script_queue_len(&self) -> usize {
        self.script.queue_len()
    }

    pub fn active_script(&self) -> Option<&str> {
        self.script.active_group()
    }

    pub fn dialog_state(&self) -> DialogState {
        self.dialog.state()
    }

    pub fn fade_alpha(&self) -> f32 {
        self.fade.alpha()
    }

    /// The actor's feet-probe cells, deduplicated, in left-to-right order.
    fn probe_cells(&self, actor: &Actor) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(3);
        for (px, py) in actor.feet_probes() {
            let cell = self.grid.cell_containing(px, py);
            if !cells.contains(&cell) {
                cells.push(cell);
            }
        }
        cells
    }

    pub fn update(&mut self, dt: f32, input: &InputFrame, actor: &mut Actor, events: &mut EventLog) {
        // 1. Movement, collision-resolved per axis.
        let (dx, dy) = input.direction();
        actor.set_direction(dx, dy);
        actor.update(dt, &self.collision);

        if let Some((px, py)) = input.probe {
            match self.grid.cell_at(px, py) {
                Some(cell) => events.push(format!(
                    "grid.probe {},{} -> {},{}",
                    px as i32, py as i32, cell.row, cell.col
                )),
                None => events.push(format!("grid.probe {},{} -> outside", px as i32, py as i32)),
            }
        }

        // 2. Trigger evaluation against the post-move probe cells. An active
        // dialog consumes the action press; otherwise it arms use-key
        // triggers.
        let probe_cells = self.probe_cells(actor);
        let action_free = if input.action {
            if self.dialog.is_active() {
                self.dialog.advance_or_reveal();
                false
            } else {
                true
            }
        } else {
            false
        };

        let fired = self
            .triggers
            .match_probes(&probe_cells, false)
            .or_else(|| {
                if action_free {
                    self.triggers.match_probes(&probe_cells, true)
                } else {
                    None
                }
            })
            .map(|group| group.script_group.clone());

        if let Some(group_name) = fired {
            if self.script.is_running() {
                // Single-flight: competing trigger requests are dropped.
                log::debug!("trigger `{group_name}` dropped; a script is running");
            } else {
                match self.script_groups.get(&group_name) {
                    Some(commands) => {
                        self.script.arm(&group_name, commands, &self.vars, events)
                    }
                    None => {
                        log::warn!("trigger references unknown script group `{group_name}`")
                    }
                }
            }
        }

        // 3. Script queue advancement: at most one command transition.
        {
            let mut ctx = CommandCtx {
                vars: &mut self.vars,
                dialog: &mut self.dialog,
                dialog_groups: &self.dialog_groups,
                fade: &mut self.fade,
                actor,
                events,
            };
            self.script.update(dt, &mut ctx);
        }

        // 4. Overlay animation.
        self.dialog.update(dt);
        self.fade.update(dt);
    }

    pub fn render_plan(&self, actor: &Actor) -> FramePlan {
        let mut plan = FramePlan::new();
        plan.push(DrawOp::Clear {
            color: self.background,
        });
        for layer in &self.layers {
            plan.push(DrawOp::Layer {
                image: layer.image.clone(),
                z: layer.z,
                opacity: layer.opacity,
            });
        }
        if self.show_grid {
            plan.push(DrawOp::GridOverlay {
                rows: self.grid.rows,
                cols: self.grid.cols,
                cell_size: self.grid.cell_size,
            });
        }
        plan.push(DrawOp::Sprite {
            sheet: actor.skin.clone(),
            sheet_row: actor.facing.sheet_row(),
            frame: actor.frame,
            x: actor.x,
            y: actor.y,
            size: actor.size,
        });
        if let Some(view) = self.dialog.view() {
            plan.push(DrawOp::Dialog {
                group: view.group.to_string(),
                title: view.title.to_string(),
                text: view.revealed_text.to_string(),
                avatar: view.avatar.map(str::to_string),
                box_y: view.box_y,
                box_height: BOX_HEIGHT,
                line_complete: view.line_complete,
            });
        }
        if self.fade.alpha() > 0.0 {
            plan.push(DrawOp::FadeVeil {
                alpha: self.fade.alpha(),
            });
        }
        plan
    }
}
