pub mod app;
pub mod hud;
pub mod menu;
pub mod pointer;
pub mod theme;
