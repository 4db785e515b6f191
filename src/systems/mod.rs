//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod audio;
pub mod collision;
pub mod components;
pub mod ghost;
pub mod movement;
pub mod player;
pub mod state;

pub use self::audio::*;
pub use self::collision::*;
pub use self::components::*;
pub use self::ghost::*;
pub use self::movement::*;
pub use self::player::*;
pub use self::state::*;
