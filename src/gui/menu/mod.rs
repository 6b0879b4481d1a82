use std::f64::consts::PI;

pub mod component;
pub mod model;
pub mod view;

pub use component::{Callback, CircularMenu, MenuError, MenuOptions, VrIntegration};
pub use model::{CachedStyle, HoverCache, Layout, MenuState, Point, Rect, SlotGeometry, Target};
pub use view::draw;

pub const REFERENCE_HEIGHT: f64 = 720.0;
pub const MIN_SCALE: f64 = 0.75;
pub const MAX_SCALE: f64 = 2.0;
pub const START_OFFSET: f64 = -PI / 2.0; // first slot points north
pub const EDGE_MARGIN: f64 = 24.0;
pub const MODAL_WIDTH: f64 = 360.0;
pub const MODAL_HEIGHT: f64 = 200.0;
pub const CLOSE_WIDTH: f64 = 96.0;
pub const CLOSE_HEIGHT: f64 = 32.0;

// Stable class names other code (and stylesheets) may select on.
pub const ROOT_CLASS: &str = "circular-menu";
pub const TOGGLE_CLASS: &str = "menu-toggle";
pub const PANEL_CLASS: &str = "menu-panel";
pub const ACTION_CLASS: &str = "action-button";
pub const HOVER_CLASS: &str = "hovered";
pub const OPEN_CLASS: &str = "open";
pub const MODAL_CLASS: &str = "modal";
pub const MODAL_CLOSE_CLASS: &str = "modal-close";
