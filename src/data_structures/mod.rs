//! Scene data: meshes, scene objects, placement and motion.
//!
//! - `mesh` holds the mesh type with bounding boxes and copy-with-transform
//! - `scene_graph` holds scene objects, the `SceneEngine` trait and `HeadlessScene`
//! - `instance` is the per-object position/rotation/scale
//! - `animation` is keyframed motion for loaded models
//! - `modifier` is the property bundle applied to every loaded model

pub mod animation;
pub mod instance;
pub mod mesh;
pub mod modifier;
pub mod scene_graph;
