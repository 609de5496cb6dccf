//! bgz Surface - Drawing targets for effect loops
//!
//! Provides the surface adapter seam between effects and whatever they draw on:
//! - `Surface`: clear/fill/primitive drawing contract with a readable size
//! - `RecordingSurface`: records draw commands (headless and tests)
//! - `RasterSurface`: CPU rasterizer backed by an `image::RgbaImage`
//! - `Document` / `ElementLookup`: selector-to-element resolution
//! - `web` (feature): `CanvasRenderingContext2d` adapter and animation-frame driver

mod document;
mod raster;
mod recording;
mod surface;
#[cfg(feature = "web")]
pub mod web;

pub use document::{Document, Element, ElementLookup};
pub use raster::RasterSurface;
pub use recording::{DrawCommand, RecordingSurface};
pub use surface::{Paint, Surface, SurfaceRef};
