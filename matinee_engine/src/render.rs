//! The per-frame draw plan. The core never draws; it emits an ordered list
//! of draw operations for an opaque renderer to rasterize. The order encodes
//! the layering contract: clear, image layers by ascending z, debug grid,
//! actor sprite, dialog box, fade veil last.

use matinee_formats::Color;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Clear {
        color: Color,
    },
    Layer {
        image: String,
        z: i32,
        opacity: f32,
    },
    GridOverlay {
        rows: i32,
        cols: i32,
        cell_size: f32,
    },
    Sprite {
        sheet: String,
        sheet_row: u8,
        frame: u8,
        x: f32,
        y: f32,
        size: f32,
    },
    Dialog {
        group: String,
        title: String,
        text: String,
        avatar: Option<String>,
        box_y: f32,
        box_height: f32,
        line_complete: bool,
    },
    VideoFrame {
        source: String,
        frame: u64,
    },
    FadeVeil {
        alpha: f32,
    },
}

impl DrawOp {
    pub fn name(&self) -> &'static str {
        match self {
            DrawOp::Clear { .. } => "clear",
            DrawOp::Layer { .. } => "layer",
            DrawOp::GridOverlay { .. } => "gridOverlay",
            DrawOp::Sprite { .. } => "sprite",
            DrawOp::Dialog { .. } => "dialog",
            DrawOp::VideoFrame { .. } => "videoFrame",
            DrawOp::FadeVeil { .. } => "fadeVeil",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FramePlan {
    ops: Vec<DrawOp>,
}

impl FramePlan {
    pub fn new() -> Self {
        FramePlan::default()
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn op_names(&self) -> Vec<&'static str> {
        self.ops.iter().map(DrawOp::name).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
