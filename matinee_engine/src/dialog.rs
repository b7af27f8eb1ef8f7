//! Typewriter dialog overlay: a text box that slides up from the bottom of
//! the viewport, reveals each line character by character, and advances on
//! the action key.
//!
//! The overlay owns its animation and reveal state exclusively; the script
//! interpreter only ever asks `is_active` and forwards the action key via
//! `advance_or_reveal`.

use matinee_formats::DialogLineDoc;
use serde::Serialize;

pub const BOX_HEIGHT: f32 = 250.0;
pub const SLIDE_SPEED: f32 = 1000.0;
/// Default seconds per revealed character, when a line carries no
/// `animDuration` hint.
pub const CHAR_DELAY: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DialogState {
    Hidden,
    Opening,
    Stable,
    Closing,
}

#[derive(Debug, Clone)]
struct Line {
    title: String,
    text: String,
    avatar: Option<String>,
    char_delay: f64,
    char_count: usize,
}

impl Line {
    fn from_doc(doc: &DialogLineDoc) -> Self {
        let char_count = doc.text.chars().count();
        let char_delay = match doc.anim_duration {
            Some(total) if char_count > 0 => total / char_count as f64,
            _ => CHAR_DELAY,
        };
        Line {
            title: doc.title.clone(),
            text: doc.text.clone(),
            avatar: doc.avatar.clone(),
            char_delay,
            char_count,
        }
    }
}

/// Read-only view of the current line for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogView<'a> {
    pub group: &'a str,
    pub title: &'a str,
    pub revealed_text: &'a str,
    pub avatar: Option<&'a str>,
    pub box_y: f32,
    pub line_complete: bool,
}

#[derive(Debug, Clone)]
pub struct DialogOverlay {
    state: DialogState,
    group: String,
    lines: Vec<Line>,
    line_index: usize,
    revealed: usize,
    reveal_clock: f64,
    box_y: f32,
    viewport_height: f32,
}

impl DialogOverlay {
    pub fn new(viewport_height: f32) -> Self {
        DialogOverlay {
            state: DialogState::Hidden,
            group: String::new(),
            lines: Vec::new(),
            line_index: 0,
            revealed: 0,
            reveal_clock: 0.0,
            box_y: viewport_height,
            viewport_height,
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != DialogState::Hidden
    }

    /// Begin showing a dialog group. An empty group is ignored; the caller's
    /// completion poll then sees the overlay inactive right away.
    pub fn activate(&mut self, group: &str, lines: &[DialogLineDoc]) {
        if lines.is_empty() {
            log::warn!("dialog group `{group}` has no lines; not opening");
            return;
        }
        self.group = group.to_string();
        self.lines = lines.iter().map(Line::from_doc).collect();
        self.line_index = 0;
        self.revealed = 0;
        self.reveal_clock = 0.0;
        self.box_y = self.viewport_height;
        self.state = DialogState::Opening;
    }

    /// Action key while the box is on screen: reveal the rest of the line, or
    /// advance, or begin closing after the last line. Ignored while sliding.
    pub fn advance_or_reveal(&mut self) {
        if self.state != DialogState::Stable {
            return;
        }
        let line = &self.lines[self.line_index];
        if self.revealed < line.char_count {
            self.revealed = line.char_count;
            return;
        }
        if self.line_index + 1 < self.lines.len() {
            self.line_index += 1;
            self.revealed = 0;
            self.reveal_clock = 0.0;
        } else {
            self.state = DialogState::Closing;
        }
    }

    pub fn update(&mut self, dt: f32) {
        match self.state {
            DialogState::Hidden => {}
            DialogState::Opening => {
                let target = self.viewport_height - BOX_HEIGHT;
                self.box_y -= SLIDE_SPEED * dt;
                if self.box_y <= target {
                    self.box_y = target;
                    self.state = DialogState::Stable;
                }
            }
            DialogState::Stable => self.advance_reveal(dt as f64),
            DialogState::Closing => {
                self.box_y += SLIDE_SPEED * dt;
                if self.box_y >= self.viewport_height {
                    self.box_y = self.viewport_height;
                    self.state = DialogState::Hidden;
                    self.lines.clear();
                }
            }
        }
    }

    fn advance_reveal(&mut self, dt: f64) {
        let line = &self.lines[self.line_index];
        if self.revealed >= line.char_count {
            return;
        }
        self.reveal_clock += dt;
        while self.reveal_clock >= line.char_delay && self.revealed < line.char_count {
            self.reveal_clock -= line.char_delay;
            self.revealed += 1;
        }
    }

    pub fn view(&self) -> Option<DialogView<'_>> {
        if self.state == DialogState::Hidden {
            return None;
        }
        let line = self.lines.get(self.line_index)?;
        let revealed_text = match line.text.char_indices().nth(self.revealed) {
            Some((byte_index, _)) => &line.text[..byte_index],
            None => line.text.as_str(),
        };
        Some(DialogView {
            group: &self.group,
            title: &line.title,
            revealed_text,
            avatar: line.avatar.as_deref(),
            box_y: self.box_y,
            line_complete: self.revealed >= line.char_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[(&str, &str)]) -> Vec<DialogLineDoc> {
        texts
            .iter()
            .map(|&(title, text)| DialogLineDoc {
                title: title.to_string(),
                text: text.to_string(),
                avatar: None,
                anim_duration: None,
            })
            .collect()
    }

    fn open_overlay(docs: &[DialogLineDoc]) -> DialogOverlay {
        let mut overlay = DialogOverlay::new(600.0);
        overlay.activate("test", docs);
        // 250 px of travel at 1000 px/s.
        overlay.update(0.25);
        assert_eq!(overlay.state(), DialogState::Stable);
        overlay
    }

    #[test]
    fn slides_open_then_reveals_text_over_time() {
        let docs = lines(&[("Willy", "Hello")]);
        let mut overlay = DialogOverlay::new(600.0);
        overlay.activate("greeting", &docs);
        assert_eq!(overlay.state(), DialogState::Opening);
        overlay.update(0.1);
        assert_eq!(overlay.state(), DialogState::Opening);
        let view = overlay.view().expect("view while opening");
        assert_eq!(view.revealed_text, "");
        assert!((view.box_y - 500.0).abs() < 1e-3);

        overlay.update(0.15);
        assert_eq!(overlay.state(), DialogState::Stable);
        // 0.12 s at 0.05 s/char reveals two characters.
        overlay.update(0.12);
        let view = overlay.view().expect("view");
        assert_eq!(view.revealed_text, "He");
        assert!(!view.line_complete);

        overlay.update(1.0);
        let view = overlay.view().expect("view");
        assert_eq!(view.revealed_text, "Hello");
        assert!(view.line_complete);
    }

    #[test]
    fn action_reveals_instantly_then_advances_then_closes() {
        let docs = lines(&[("A", "first line"), ("B", "second")]);
        let mut overlay = open_overlay(&docs);

        overlay.advance_or_reveal();
        let view = overlay.view().expect("view");
        assert_eq!(view.revealed_text, "first line");

        overlay.advance_or_reveal();
        let view = overlay.view().expect("view");
        assert_eq!(view.title, "B");
        assert_eq!(view.revealed_text, "");

        overlay.advance_or_reveal();
        overlay.advance_or_reveal();
        assert_eq!(overlay.state(), DialogState::Closing);
        assert!(overlay.is_active());

        overlay.update(0.25);
        assert_eq!(overlay.state(), DialogState::Hidden);
        assert!(!overlay.is_active());
        assert!(overlay.view().is_none());
    }

    #[test]
    fn action_is_ignored_while_sliding() {
        let docs = lines(&[("A", "hi")]);
        let mut overlay = DialogOverlay::new(600.0);
        overlay.activate("g", &docs);
        overlay.advance_or_reveal();
        assert_eq!(overlay.state(), DialogState::Opening);
    }

    #[test]
    fn anim_duration_spreads_the_reveal_across_the_line() {
        let docs = vec![DialogLineDoc {
            title: String::new(),
            text: "abcd".to_string(),
            avatar: None,
            anim_duration: Some(2.0),
        }];
        let mut overlay = open_overlay(&docs);
        // Half the duration reveals half the line.
        overlay.update(1.0);
        let view = overlay.view().expect("view");
        assert_eq!(view.revealed_text, "ab");
    }

    #[test]
    fn empty_groups_never_open() {
        let mut overlay = DialogOverlay::new(600.0);
        overlay.activate("empty", &[]);
        assert!(!overlay.is_active());
    }

    #[test]
    fn multibyte_text_reveals_on_character_boundaries() {
        let docs = lines(&[("", "дверь")]);
        let mut overlay = open_overlay(&docs);
        overlay.update(0.1);
        let view = overlay.view().expect("view");
        assert_eq!(view.revealed_text, "дв");
    }
}
