//! bgz Core - Foundational types for the bgz effect toolkit
//!
//! This crate provides the types every other bgz crate depends on:
//! - `LoopId` - Stable identifiers for effect loops
//! - `Vec2`, `Bounds` - Planar types in surface pixels
//! - `Color` - RGBA color with CSS-style parsing
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{BgzError, ConfigError, Result};
pub use id::LoopId;
pub use types::{Bounds, Color, Vec2};
