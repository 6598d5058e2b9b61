//! wps-scene-viewer
//!
//! An interactive front-end for terrain scenes exported by a WPS
//! `exportScene` process. Key presses request a JSON or COLLADA model built
//! from a request template, and every response replaces the model currently
//! on display. Rendering and geometry live behind the `SceneEngine` trait;
//! this crate owns the request protocol, the scene object swap and the
//! keyboard controller.
//!
//! High-level modules
//! - `cli`: command-line configuration and the initial form field values
//! - `console`: user-facing status lines (file or log)
//! - `context`: the viewer session that owns the scene and all mutable state
//! - `data_structures`: meshes, scene objects, the scene engine seam, motion
//! - `flow`: the winit event loop and the tokio tasks that run requests
//! - `input`: keyboard commands, key bindings and render modes
//! - `resources`: fetching templates, posting requests, building meshes, and
//!   the terrain export encoders those meshes come from
//! - `template`: request parameters and placeholder substitution
//!

pub mod cli;
pub mod console;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod input;
pub mod resources;
pub mod template;

// Re-exports commonly used types for convenience in downstream code.
pub use winit::keyboard::KeyCode;
