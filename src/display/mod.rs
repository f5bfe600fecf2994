//! Vestaboard output

mod client;
mod layout;
mod subscriber;

pub use client::{Board, VestaboardClient};
pub use layout::{blank_grid, now_playing_layout, Align, CharacterGrid, Component, Justify};
pub use subscriber::{BoardCommand, BoardSubscriber};
