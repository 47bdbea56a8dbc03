//! Random perfect mazes and grid-based avatar movement, with a terminal frontend.
//!
//! - `maze`: wall grid and recursive-backtracker generation
//! - `movement`: wall-aware position updates in pixel space
//! - `game`: round lifecycle, win check and best time
//! - `input` / `render` / `terminal`: crossterm glue

pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod maze;
pub mod movement;
pub mod render;
pub mod terminal;

pub use components::{Direction, Entity, Intent};
pub use maze::{CellPos, Edge, Maze};
pub use movement::resolve_movement;
