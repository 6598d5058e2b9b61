//! Triangle/polygon meshes as handed out by the scene engine.

use std::collections::BTreeSet;

use cgmath::{Matrix4, Point3, Transform, Vector3};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vector3<f32>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(
            Aabb {
                min: first,
                max: first,
            },
            |bb, p| Aabb {
                min: Vector3::new(bb.min.x.min(p.x), bb.min.y.min(p.y), bb.min.z.min(p.z)),
                max: Vector3::new(bb.max.x.max(p.x), bb.max.y.max(p.y), bb.max.z.max(p.z)),
            },
        ))
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// A mesh: points, polygon faces indexing into them, and display flags.
///
/// Faces are kept as index lists so that both triangulated terrain and
/// arbitrary polygons survive a copy. `edges` and `bb` are derived data and
/// only valid after [`Mesh::build_edges`] and [`Mesh::prepare`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub points: Vec<Vector3<f32>>,
    pub faces: Vec<Vec<u32>>,
    pub edges: Vec<(u32, u32)>,
    pub bb: Option<Aabb>,
    wireframe: bool,
    point_mode: bool,
    prepared: bool,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_parts(
        name: impl Into<String>,
        points: Vec<Vector3<f32>>,
        faces: Vec<Vec<u32>>,
    ) -> Self {
        let mut mesh = Self::new(name);
        mesh.points = points;
        mesh.faces = faces;
        mesh
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.points)
    }

    /// Append `other`'s geometry transformed by `transform`.
    ///
    /// Face indices of `other` are shifted past the points already present.
    pub fn boolean_add(&mut self, other: &Mesh, transform: &Matrix4<f32>) {
        let offset = self.points.len() as u32;
        self.points.extend(other.points.iter().map(|p| {
            let moved = transform.transform_point(Point3::new(p.x, p.y, p.z));
            Vector3::new(moved.x, moved.y, moved.z)
        }));
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|face| face.iter().map(|i| i + offset).collect::<Vec<_>>()),
        );
        self.prepared = false;
    }

    /// Rebuild the unique, undirected edge list from the faces.
    pub fn build_edges(&mut self) {
        let mut edges = BTreeSet::new();
        for face in self.faces.iter().filter(|f| f.len() >= 2) {
            for (k, &a) in face.iter().enumerate() {
                let b = face[(k + 1) % face.len()];
                if a != b {
                    edges.insert((a.min(b), a.max(b)));
                }
            }
        }
        self.edges = edges.into_iter().collect();
    }

    /// Finalize for rendering: refresh the bounding box and mark ready.
    pub fn prepare(&mut self) {
        self.bb = self.bounding_box();
        self.prepared = true;
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    pub fn set_point_mode(&mut self, point_mode: bool) {
        self.point_mode = point_mode;
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn point_mode(&self) -> bool {
        self.point_mode
    }
}
