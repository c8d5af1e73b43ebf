//! Hex Tactics - two-player hex-grid turn-based wargame core

pub mod battle;
pub mod command;
pub mod core;
