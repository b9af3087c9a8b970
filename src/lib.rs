//! Toroidal game-of-life engine, usable headless or behind the bundled TUI.

pub use config::GridConfig;
mod config;

pub use error::{ConfigError, PatternError};
mod error;

pub use grid::{Cell, Grid};
mod grid;

pub use ticker::Ticker;
mod ticker;

pub use sim::{ControlState, Engine, Sim, SimCmd, SimHandle, Snapshot};
mod sim;
