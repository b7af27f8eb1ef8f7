//! The scripted-command interpreter: a flat queue of commands advanced by a
//! poll-based driver, one command transition per frame tick.
//!
//! `if` never reaches the queue. The queue builder evaluates branch
//! conditions against the variable store at arm time and splices the matching
//! branch inline, so the driver only ever sees leaf commands.

use std::collections::{BTreeMap, VecDeque};

use matinee_formats::{CommandDoc, DialogLineDoc};

use crate::actor::Actor;
use crate::dialog::DialogOverlay;
use crate::events::EventLog;
use crate::fade::FadeOverlay;
use crate::vars::VarStore;

/// Mutable borrows of everything a command may touch, split out of the scene
/// session for the duration of one interpreter step.
pub struct CommandCtx<'a> {
    pub vars: &'a mut VarStore,
    pub dialog: &'a mut DialogOverlay,
    pub dialog_groups: &'a BTreeMap<String, Vec<DialogLineDoc>>,
    pub fade: &'a mut FadeOverlay,
    pub actor: &'a mut Actor,
    pub events: &'a mut EventLog,
}

#[derive(Debug, Clone)]
enum CommandKind {
    ShowDialog { group: String },
    ShowDebugMessage { text: String },
    Wait { remaining: f64 },
    PlayerMovement { enabled: bool },
    FadeIn { duration: f64 },
    FadeOut { duration: f64 },
    SetVar { name: String, expr: String },
}

#[derive(Debug, Clone)]
pub struct Command {
    kind: CommandKind,
    started: bool,
    complete: bool,
}

impl Command {
    /// Instantiate a leaf command, interpolating `{var}` tokens in its string
    /// parameters with the store as it stands at queue-build time.
    fn from_doc(doc: &CommandDoc, vars: &VarStore) -> Option<Self> {
        let kind = match doc {
            CommandDoc::ShowDialog(group) => CommandKind::ShowDialog {
                group: vars.interpolate(group),
            },
            CommandDoc::ShowDebugMessage(text) => CommandKind::ShowDebugMessage {
                text: vars.interpolate(text),
            },
            CommandDoc::Wait(seconds) => CommandKind::Wait {
                remaining: *seconds,
            },
            CommandDoc::PlayerMovement(enabled) => CommandKind::PlayerMovement {
                enabled: *enabled,
            },
            CommandDoc::FadeIn(duration) => CommandKind::FadeIn {
                duration: *duration,
            },
            CommandDoc::FadeOut(duration) => CommandKind::FadeOut {
                duration: *duration,
            },
            CommandDoc::SetVar { name, expr } => CommandKind::SetVar {
                name: vars.interpolate(name),
                expr: vars.interpolate(expr),
            },
            CommandDoc::If { .. } => return None,
        };
        Some(Command {
            kind,
            started: false,
            complete: false,
        })
    }

    fn kind_name(&self) -> &'static str {
        match &self.kind {
            CommandKind::ShowDialog { .. } => "showDialog",
            CommandKind::ShowDebugMessage { .. } => "showDebugMessage",
            CommandKind::Wait { .. } => "wait",
            CommandKind::PlayerMovement { .. } => "playerMovement",
            CommandKind::FadeIn { .. } => "fadeIn",
            CommandKind::FadeOut { .. } => "fadeOut",
            CommandKind::SetVar { .. } => "setVar",
        }
    }

    fn start(&mut self, ctx: &mut CommandCtx<'_>) {
        match &self.kind {
            CommandKind::ShowDialog { group } => match ctx.dialog_groups.get(group) {
                Some(lines) => {
                    ctx.events.push(format!("dialog.open {group}"));
                    ctx.dialog.activate(group, lines);
                }
                None => {
                    log::warn!("showDialog references unknown dialog group `{group}`");
                    self.complete = true;
                }
            },
            CommandKind::ShowDebugMessage { text } => {
                log::info!("{text}");
                ctx.events.push(format!("debug.message {text}"));
                self.complete = true;
            }
            CommandKind::Wait { .. } => {}
            CommandKind::PlayerMovement { enabled } => {
                ctx.actor.set_movement_enabled(*enabled);
                ctx.events.push(format!("player.movement {enabled}"));
                self.complete = true;
            }
            CommandKind::FadeIn { duration } => {
                ctx.events.push(format!("fade.in {duration}"));
                ctx.fade.fade_in(*duration);
            }
            CommandKind::FadeOut { duration } => {
                ctx.events.push(format!("fade.out {duration}"));
                ctx.fade.fade_out(*duration);
            }
            CommandKind::SetVar { name, expr } => {
                let value = ctx.vars.eval_expression(expr);
                ctx.events.push(format!("var.set {name}={value}"));
                ctx.vars.set(name, value);
                self.complete = true;
            }
        }
    }

    fn poll(&mut self, dt: f32, ctx: &mut CommandCtx<'_>) {
        match &mut self.kind {
            CommandKind::Wait { remaining } => {
                *remaining -= dt as f64;
                if *remaining <= 0.0 {
                    self.complete = true;
                }
            }
            CommandKind::ShowDialog { .. } => {
                if !ctx.dialog.is_active() {
                    self.complete = true;
                }
            }
            CommandKind::FadeIn { .. } | CommandKind::FadeOut { .. } => {
                if ctx.fade.is_done() {
                    self.complete = true;
                }
            }
            // Immediate commands completed in start().
            _ => {}
        }
    }
}

/// Expand a command list into a flat execution queue, splicing `if` branches
/// in place. Conditions and `{var}` tokens are evaluated now, against the
/// store as it stands when the group fires.
pub fn build_queue(commands: &[CommandDoc], vars: &VarStore) -> VecDeque<Command> {
    let mut queue = VecDeque::new();
    append_commands(commands, vars, &mut queue);
    queue
}

fn append_commands(commands: &[CommandDoc], vars: &VarStore, queue: &mut VecDeque<Command>) {
    for doc in commands {
        if let CommandDoc::If {
            condition,
            then,
            otherwise,
        } = doc
        {
            let branch = if vars.eval_condition(condition) {
                then
            } else {
                otherwise
            };
            append_commands(branch, vars, queue);
        } else if let Some(command) = Command::from_doc(doc, vars) {
            queue.push_back(command);
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptRunner {
    queue: VecDeque<Command>,
    active_group: Option<String>,
}

impl ScriptRunner {
    pub fn new() -> Self {
        ScriptRunner::default()
    }

    /// The single-flight flag: true while queued commands remain.
    pub fn is_running(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn active_group(&self) -> Option<&str> {
        self.active_group.as_deref()
    }

    /// Replace the queue with a freshly expanded copy of `commands`. Callers
    /// enforce single-flight; arming always clears whatever was queued.
    pub fn arm(
        &mut self,
        group: &str,
        commands: &[CommandDoc],
        vars: &VarStore,
        events: &mut EventLog,
    ) {
        events.push(format!("script.start {group}"));
        self.queue = build_queue(commands, vars);
        self.active_group = Some(group.to_string());
        if self.queue.is_empty() {
            events.push(format!("script.complete {group}"));
            self.active_group = None;
        }
    }

    /// Advance the head command: start it if fresh, poll it, pop it when
    /// complete. At most one command leaves the queue per call; the successor
    /// is not touched until the next call.
    pub fn update(&mut self, dt: f32, ctx: &mut CommandCtx<'_>) {
        let Some(head) = self.queue.front_mut() else {
            return;
        };
        if !head.started {
            head.started = true;
            ctx.events.push(format!("script.command {}", head.kind_name()));
            head.start(ctx);
        }
        if !head.complete {
            head.poll(dt, ctx);
        }
        if head.complete {
            self.queue.pop_front();
            if self.queue.is_empty() {
                if let Some(group) = self.active_group.take() {
                    ctx.events.push(format!("script.complete {group}"));
                }
            }
        }
    }
}
