//! # World Model
//!
//! The authoring side of Ravi: typed entity schemas, the immutable states
//! generated from them, and the guarded choices that move between states.
//! This crate knows nothing about graphs or exploration; it is the single
//! source of truth for what a narrative state is.

pub mod entities;
pub mod error;
pub mod mechanics;
pub mod world_state;

pub use entities::*;
pub use error::{ModelError, Result};
pub use mechanics::*;
pub use world_state::*;
