use anyhow::{Context, bail};
use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::data_structures::mesh::Mesh;

/**
 * JSON model document as produced by the `exportScene` process:
 * `{"name": .., "points": [[x, y, z], ..], "faces": [[i, j, k], ..]}`.
 */
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct MeshData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub points: Vec<[f32; 3]>,
    #[serde(default)]
    pub faces: Vec<Vec<u32>>,
}

impl From<&Mesh> for MeshData {
    fn from(mesh: &Mesh) -> Self {
        Self {
            name: Some(mesh.name.clone()),
            points: mesh.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
            faces: mesh.faces.clone(),
        }
    }
}

pub fn mesh_from_json(document: &serde_json::Value) -> anyhow::Result<Mesh> {
    let data = MeshData::deserialize(document).context("Model document is not a mesh")?;
    let point_count = data.points.len();
    if let Some((idx, face)) = data
        .faces
        .iter()
        .enumerate()
        .find(|(_, face)| face.iter().any(|&i| i as usize >= point_count))
    {
        bail!(
            "Face {} ({:?}) references a point outside of the {} points provided",
            idx,
            face,
            point_count
        );
    }
    let points = data.points.into_iter().map(Vector3::from).collect();
    Ok(Mesh::from_parts(
        data.name.unwrap_or_else(|| "mesh".to_string()),
        points,
        data.faces,
    ))
}
