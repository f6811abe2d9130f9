//! keyway: a terminal keystroke visualizer.
//!
//! A settings surface and an overlay surface share three parameter groups
//! over an in-process [`bus::Bus`]. Nothing is persisted; every launch starts
//! from the defaults in [`params`].

pub mod app;
pub mod bus;
pub mod capture;
pub mod config;
pub mod event;
pub mod host;
pub mod keyboard;
pub mod logging;
pub mod overlay;
pub mod params;
pub mod settings;
pub mod topic;
pub mod ui;
