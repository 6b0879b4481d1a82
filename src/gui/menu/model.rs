use crate::config::MenuSettings;
use crate::gui::menu::{
    CLOSE_HEIGHT, CLOSE_WIDTH, EDGE_MARGIN, MAX_SCALE, MIN_SCALE, MODAL_HEIGHT, MODAL_WIDTH,
    REFERENCE_HEIGHT, START_OFFSET,
};
use std::collections::HashMap;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Mounted,
    Destroyed,
}

#[derive(Debug, Default)]
pub struct MenuState {
    is_open: bool,
    lifecycle: Lifecycle,
    generation: u64,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn toggle(&mut self) -> Option<bool> {
        if !self.is_alive() {
            return None;
        }
        self.is_open = !self.is_open;
        self.generation += 1;
        Some(self.is_open)
    }

    pub fn destroy(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.lifecycle = Lifecycle::Destroyed;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CachedStyle {
    pub background: Option<String>,
    pub transform: Option<String>,
}

#[derive(Debug, Default)]
pub struct HoverCache {
    entries: HashMap<usize, CachedStyle>,
}

impl HoverCache {
    // a repeated enter keeps the first cached values
    pub fn enter(&mut self, index: usize, style: CachedStyle) -> bool {
        if self.entries.contains_key(&index) {
            return false;
        }
        self.entries.insert(index, style);
        true
    }

    pub fn leave(&mut self, index: usize) -> Option<CachedStyle> {
        self.entries.remove(&index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotGeometry {
    pub center: Point,
    pub radius: f64,
}

impl SlotGeometry {
    pub fn angle(index: usize, count: usize) -> f64 {
        START_OFFSET + index as f64 * (2.0 * PI / count.max(1) as f64)
    }

    pub fn calculate(
        index: usize,
        count: usize,
        anchor: Point,
        settings: &MenuSettings,
        scale_factor: f64,
    ) -> Self {
        let angle = Self::angle(index, count);
        let ring = settings.radius * scale_factor;
        Self {
            center: Point::new(anchor.x + ring * angle.cos(), anchor.y + ring * angle.sin()),
            radius: settings.slot_radius * scale_factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Toggle,
    Action(usize),
    Modal,
    ModalClose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub area: Rect,
    pub anchor: Point,
    pub scale_factor: f64,
    pub toggle_radius: f64,
    pub slots: Vec<SlotGeometry>,
    pub modal: Rect,
    pub modal_close: Rect,
}

impl Layout {
    pub fn new(settings: &MenuSettings, count: usize, width: f64, height: f64) -> Self {
        let scale_factor = (height / REFERENCE_HEIGHT).clamp(MIN_SCALE, MAX_SCALE);
        let reach = (settings.radius + settings.slot_radius) * scale_factor + EDGE_MARGIN;
        let anchor = Point::new(width - reach, height - reach);

        let slots = (0..count)
            .map(|i| SlotGeometry::calculate(i, count, anchor, settings, scale_factor))
            .collect();

        let (mw, mh) = (MODAL_WIDTH * scale_factor, MODAL_HEIGHT * scale_factor);
        let modal = Rect::new((width - mw) / 2.0, (height - mh) / 2.0, mw, mh);
        let (cw, ch) = (CLOSE_WIDTH * scale_factor, CLOSE_HEIGHT * scale_factor);
        let pad = EDGE_MARGIN * scale_factor / 2.0;
        let modal_close = Rect::new(
            modal.x + modal.width - cw - pad,
            modal.y + modal.height - ch - pad,
            cw,
            ch,
        );

        Self {
            area: Rect::new(0.0, 0.0, width, height),
            anchor,
            scale_factor,
            toggle_radius: settings.toggle_radius * scale_factor,
            slots,
            modal,
            modal_close,
        }
    }

    // an open About card captures every point
    pub fn hit_test(&self, p: Point, open: bool, modal_open: bool) -> Option<Target> {
        if modal_open {
            if self.modal_close.contains(p) {
                return Some(Target::ModalClose);
            }
            return self.modal.contains(p).then_some(Target::Modal);
        }

        if p.distance(self.anchor) <= self.toggle_radius {
            return Some(Target::Toggle);
        }

        if !open {
            return None;
        }

        self.slots
            .iter()
            .position(|slot| p.distance(slot.center) <= slot.radius)
            .map(Target::Action)
    }
}
