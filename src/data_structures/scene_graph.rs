//! Scene objects and the engine capabilities the viewer relies on.
//!
//! The viewer never draws anything itself. Everything it needs from a 3D
//! engine goes through [`SceneEngine`]: building meshes from service
//! responses, looking up, removing and binding named objects, and advancing
//! animation time. [`HeadlessScene`] is the in-process implementation used by
//! the binary and the tests.

use crate::{
    data_structures::{animation::Motion, instance::Instance, mesh::Mesh},
    resources::{collada, mesh},
};

/// A mesh placed in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub mesh: Mesh,
    pub instance: Instance,
    pub motion: Option<Motion>,
}

impl SceneObject {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            name: mesh.name.clone(),
            mesh,
            instance: Instance::default(),
            motion: None,
        }
    }
}

pub trait SceneEngine {
    /// Build one mesh from a JSON model document.
    fn mesh_from_json(&self, document: &serde_json::Value) -> anyhow::Result<Mesh>;

    /// Build every mesh contained in a COLLADA document. May be empty.
    fn load_collada(&self, document: &str) -> anyhow::Result<Vec<Mesh>>;

    fn scene_objects(&self) -> &[SceneObject];

    /// First object bound under `name`.
    fn get_scene_object(&self, name: &str) -> Option<&SceneObject> {
        self.scene_objects().iter().find(|o| o.name == name)
    }

    fn get_scene_objects_mut(&mut self, name: &str) -> Vec<&mut SceneObject>;

    /// Remove every object bound under `name`, returning how many went.
    fn remove_scene_objects(&mut self, name: &str) -> usize;

    fn bind_scene_object(&mut self, object: SceneObject);

    /// Advance animated objects to `seconds` since start.
    fn evaluate(&mut self, seconds: f32);
}

#[derive(Debug, Default)]
pub struct HeadlessScene {
    objects: Vec<SceneObject>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneEngine for HeadlessScene {
    fn mesh_from_json(&self, document: &serde_json::Value) -> anyhow::Result<Mesh> {
        mesh::mesh_from_json(document)
    }

    fn load_collada(&self, document: &str) -> anyhow::Result<Vec<Mesh>> {
        collada::load_collada(document)
    }

    fn scene_objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn get_scene_objects_mut(&mut self, name: &str) -> Vec<&mut SceneObject> {
        self.objects.iter_mut().filter(|o| o.name == name).collect()
    }

    fn remove_scene_objects(&mut self, name: &str) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| o.name != name);
        before - self.objects.len()
    }

    fn bind_scene_object(&mut self, object: SceneObject) {
        log::debug!(
            "Binding scene object {} ({} points, {} faces)",
            object.name,
            object.mesh.points.len(),
            object.mesh.faces.len()
        );
        self.objects.push(object);
    }

    fn evaluate(&mut self, seconds: f32) {
        for object in self.objects.iter_mut() {
            if let Some(motion) = &object.motion {
                let rotation = motion.rotation_at(seconds);
                object.instance.set_rotation_deg(rotation);
            }
        }
    }
}
