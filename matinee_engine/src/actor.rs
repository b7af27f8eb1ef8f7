//! The player actor: continuous position over the tile grid, three-point
//! feet collision probing, and sprite animation bookkeeping.

use serde::Serialize;

use crate::grid::{CollisionMap, Grid};

/// Seconds per animation frame and the walk cycle length, shared by every
/// facing row of a skin sheet.
pub const FRAME_DURATION: f32 = 0.15;
pub const FRAME_COUNT: u8 = 4;

/// Feet probe fractions along the collision box's lower edge.
const PROBE_FRACTIONS: [f32; 3] = [0.25, 0.5, 0.75];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Facing {
    Down,
    Left,
    Right,
    Up,
}

impl Facing {
    /// Row index into a 4-direction skin sheet.
    pub fn sheet_row(self) -> u8 {
        match self {
            Facing::Down => 0,
            Facing::Left => 1,
            Facing::Right => 2,
            Facing::Up => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimState {
    Idle,
    Walk,
}

#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub x: f32,
    pub y: f32,
    /// Unit direction from input; scaled by `speed` during update.
    pub vx: f32,
    pub vy: f32,
    pub speed: f32,
    pub size: f32,
    pub facing: Facing,
    pub anim: AnimState,
    pub frame: u8,
    #[serde(skip)]
    frame_clock: f32,
    pub movement_enabled: bool,
    pub skin: String,
}

impl Actor {
    pub fn new() -> Self {
        Actor {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            speed: 200.0,
            size: crate::grid::CELL_SIZE,
            facing: Facing::Down,
            anim: AnimState::Idle,
            frame: 0,
            frame_clock: 0.0,
            movement_enabled: true,
            skin: "player".to_string(),
        }
    }

    /// Reposition onto a spawn cell. The actor is created once per process
    /// and re-seeded here on every static scene load.
    pub fn respawn(&mut self, grid: &Grid, row: i32, col: i32, speed: f32, skin: &str) {
        self.x = col as f32 * grid.cell_size;
        self.y = row as f32 * grid.cell_size;
        self.vx = 0.0;
        self.vy = 0.0;
        self.speed = speed;
        self.size = grid.cell_size;
        self.facing = Facing::Down;
        self.anim = AnimState::Idle;
        self.frame = 0;
        self.frame_clock = 0.0;
        self.movement_enabled = true;
        self.skin = skin.to_string();
    }

    pub fn set_direction(&mut self, vx: f32, vy: f32) {
        self.vx = vx;
        self.vy = vy;
    }

    pub fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    /// The three feet probe points for a candidate position: quarter, center,
    /// and three-quarter marks along the lower edge of the collision box.
    pub fn feet_probes_at(&self, x: f32, y: f32) -> [(f32, f32); 3] {
        let feet_y = y + self.size;
        [
            (x + self.size * PROBE_FRACTIONS[0], feet_y),
            (x + self.size * PROBE_FRACTIONS[1], feet_y),
            (x + self.size * PROBE_FRACTIONS[2], feet_y),
        ]
    }

    pub fn feet_probes(&self) -> [(f32, f32); 3] {
        self.feet_probes_at(self.x, self.y)
    }

    fn probes_clear(&self, collision: &CollisionMap, x: f32, y: f32) -> bool {
        self.feet_probes_at(x, y)
            .iter()
            .all(|&(px, py)| !collision.is_blocked(px, py))
    }

    /// Advance one frame: per-axis move-and-slide against the collision map,
    /// then facing and animation. X resolves first; Y uses the committed X so
    /// diagonal presses slide along walls instead of stopping dead.
    pub fn update(&mut self, dt: f32, collision: &CollisionMap) {
        if !self.movement_enabled {
            self.vx = 0.0;
            self.vy = 0.0;
        }

        if self.vx != 0.0 {
            let candidate_x = self.x + self.vx * self.speed * dt;
            if self.probes_clear(collision, candidate_x, self.y) {
                self.x = candidate_x;
            }
        }
        if self.vy != 0.0 {
            let candidate_y = self.y + self.vy * self.speed * dt;
            if self.probes_clear(collision, self.x, candidate_y) {
                self.y = candidate_y;
            }
        }

        self.update_facing();
        self.update_animation(dt);
    }

    fn update_facing(&mut self) {
        let ax = self.vx.abs();
        let ay = self.vy.abs();
        if ax > ay {
            self.facing = if self.vx < 0.0 {
                Facing::Left
            } else {
                Facing::Right
            };
        } else if ay > ax {
            self.facing = if self.vy < 0.0 { Facing::Up } else { Facing::Down };
        }
        // Equal magnitudes (including rest) keep the prior facing.
    }

    fn update_animation(&mut self, dt: f32) {
        let moving = self.vx != 0.0 || self.vy != 0.0;
        if moving {
            self.anim = AnimState::Walk;
        } else if self.anim != AnimState::Idle {
            self.anim = AnimState::Idle;
            self.frame = 0;
            self.frame_clock = 0.0;
        }

        self.frame_clock += dt;
        while self.frame_clock >= FRAME_DURATION {
            self.frame_clock -= FRAME_DURATION;
            self.frame = (self.frame + 1) % FRAME_COUNT;
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Actor::new()
    }
}
