pub mod anim;
pub mod config;
pub mod dom;
pub mod events;
pub mod gui;
pub mod hud;
pub mod sys;

pub use gui::menu::{CircularMenu, MenuError, MenuOptions, VrIntegration};
