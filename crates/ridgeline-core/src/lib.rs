//! Ridgeline Core - Foundational types for the Ridgeline terrain renderer
//!
//! This crate provides the types the other Ridgeline crates depend on:
//! - `Grid2` - Dense, bounds-checked row-major 2D storage
//! - `Frustum` - Six-plane view-frustum tests
//! - Error types and Result alias

mod error;
mod frustum;
mod grid;

pub use error::{Axis, Result, RidgelineError};
pub use frustum::Frustum;
pub use grid::Grid2;

pub use glam;
