//! relief - procedural heightmap erosion viewer.
//!
//! The `terrain` module is the algorithmic core (grid topology, height field,
//! update state machine) and has no windowing or GPU dependencies. The
//! remaining modules wire it to a wgpu wireframe renderer with an egui
//! overlay.

pub mod input;
pub mod renderer;
pub mod terrain;
pub mod ui;
