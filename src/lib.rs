//! Deterministic, fixed-tick simulation core for a Pac-Man clone.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg_attr(coverage_nightly, coverage(off))]
pub mod app;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod formatter;

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod game;
pub mod hud;
pub mod input;
pub mod map;
pub mod snapshot;
pub mod systems;
