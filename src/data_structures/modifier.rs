//! The property bundle applied to every freshly loaded model.

use cgmath::Vector3;

use crate::data_structures::{
    animation::{Behavior, Envelope, Motion},
    scene_graph::SceneObject,
};

/// Properties copied onto each new scene object after a load.
///
/// `name` doubles as the lookup key for the model currently on display.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelModifier {
    pub name: String,
    pub scale: Vector3<f32>,
    pub motion: Option<Motion>,
}

impl ModelModifier {
    /// Copy every property onto `object`, overwriting what it had.
    pub fn apply(&self, object: &mut SceneObject) {
        object.name = self.name.clone();
        object.instance.scale = self.scale;
        object.motion = self.motion.clone();
    }
}

impl Default for ModelModifier {
    /// Flattened terrain slowly turning around its vertical axis.
    fn default() -> Self {
        Self {
            name: "terrainMesh".to_string(),
            scale: Vector3::new(1.0, 1.0, 0.01),
            motion: Some(
                Motion::rotate_z(Envelope::new([(0.0, 0.0), (4.0, 90.0)], Behavior::Offset))
                    .with_behavior(Behavior::Repeat),
            ),
        }
    }
}
