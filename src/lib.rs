pub mod api;
pub mod config;
pub mod fetch;
pub mod state;
pub mod views;

pub use launch_core;
