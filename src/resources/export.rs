//! The encoder side of `exportScene`: an elevation grid becomes a Delaunay
//! triangulated terrain mesh, written out as the JSON or COLLADA documents the
//! loaders read back.

use std::collections::HashMap;

use anyhow::bail;
use cgmath::Vector3;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{data_structures::mesh::Mesh, resources::mesh::MeshData};

pub const TERRAIN_NAME: &str = "terrainMesh";

const COLLADA_NAMESPACE: &str = "http://www.collada.org/2005/11/COLLADASchema";
const VISUAL_SCENE_ID: &str = "gis_visual_scene";

/// Row-major raster samples, one elevation per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationGrid {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl ElevationGrid {
    pub fn new(width: usize, height: usize, samples: Vec<f32>) -> anyhow::Result<Self> {
        if width == 0 || height == 0 {
            bail!("Elevation grid must not be empty, got {}x{}", width, height);
        }
        if samples.len() != width * height {
            bail!(
                "Elevation grid {}x{} needs {} samples, got {}",
                width,
                height,
                width * height,
                samples.len()
            );
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn from_rows(rows: &[Vec<f32>]) -> anyhow::Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().position(|r| r.len() != width) {
            bail!("Row {} has {} samples, expected {}", row, rows[row].len(), width);
        }
        Self::new(width, rows.len(), rows.concat())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn sample(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }

    /// One point per pixel, rows first: `(column, row, sample)`.
    pub fn point_cloud(&self) -> Vec<Vector3<f32>> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &z)| Vector3::new((i % self.width) as f32, (i / self.width) as f32, z))
            .collect()
    }
}

/// Triangulate the grid in the XY plane.
///
/// Points are numbered in the order the faces first use them, so a point
/// no triangle touches is left out. A grid with a single row or column has
/// no triangles and gives an empty mesh.
pub fn triangulate(grid: &ElevationGrid) -> Mesh {
    let cloud = grid.point_cloud();
    let sites: Vec<delaunator::Point> = cloud
        .iter()
        .map(|p| delaunator::Point {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    let triangulation = delaunator::triangulate(&sites);

    let mut renumbered: HashMap<usize, u32> = HashMap::new();
    let mut points = Vec::new();
    let mut faces = Vec::with_capacity(triangulation.triangles.len() / 3);
    for triangle in triangulation.triangles.chunks_exact(3) {
        let mut face = Vec::with_capacity(3);
        for &site in triangle {
            let index = *renumbered.entry(site).or_insert_with(|| {
                points.push(cloud[site]);
                (points.len() - 1) as u32
            });
            face.push(index);
        }
        faces.push(face);
    }
    log::debug!(
        "Triangulated {}x{} grid into {} faces",
        grid.width,
        grid.height,
        faces.len()
    );

    Mesh::from_parts(TERRAIN_NAME, points, faces)
}

/// `{"name": .., "points": [[x, y, z], ..], "faces": [[i, j, k], ..]}`
pub fn to_json(mesh: &Mesh) -> anyhow::Result<String> {
    Ok(serde_json::to_string(&MeshData::from(mesh))?)
}

/// A COLLADA 1.4.1 document with one `<geometry>` per mesh, all instanced by
/// a single visual scene node.
///
/// The first geometry uses the plain `gis_*` ids, later ones get a `_2`,
/// `_3`.. suffix. Meshes whose faces are all triangles are written as
/// `<triangles>`, anything else as `<polylist>`.
pub fn to_collada(meshes: &[Mesh]) -> anyhow::Result<String> {
    let mut out = ColladaWriter {
        writer: Writer::new_with_indent(Vec::new(), b' ', 2),
    };
    out.writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    out.open(
        "COLLADA",
        &[("xmlns", COLLADA_NAMESPACE), ("version", "1.4.1")],
    )?;

    let ids: Vec<GeometryIds> = (0..meshes.len()).map(GeometryIds::new).collect();

    out.open("library_visual_scenes", &[])?;
    out.open("visual_scene", &[("id", VISUAL_SCENE_ID), ("name", VISUAL_SCENE_ID)])?;
    out.open("node", &[])?;
    for id in &ids {
        out.empty("instance_geometry", &[("url", format!("#{}", id.geometry).as_str())])?;
    }
    out.close("node")?;
    out.close("visual_scene")?;
    out.close("library_visual_scenes")?;

    out.open("library_geometries", &[])?;
    for (mesh, id) in meshes.iter().zip(&ids) {
        out.geometry(mesh, id)?;
    }
    out.close("library_geometries")?;

    out.open("scene", &[])?;
    out.empty(
        "instance_visual_scene",
        &[("url", format!("#{}", VISUAL_SCENE_ID).as_str())],
    )?;
    out.close("scene")?;
    out.close("COLLADA")?;

    Ok(String::from_utf8(out.writer.into_inner())?)
}

struct GeometryIds {
    geometry: String,
    source: String,
    values: String,
    vertices: String,
}

impl GeometryIds {
    fn new(index: usize) -> Self {
        let suffix = match index {
            0 => String::new(),
            n => format!("_{}", n + 1),
        };
        let source = format!("gis_mesh_source_vertex{}", suffix);
        Self {
            geometry: format!("gis_geometry{}", suffix),
            values: format!("{}_values", source),
            source,
            vertices: format!("gis_mesh_vertices{}", suffix),
        }
    }
}

struct ColladaWriter {
    writer: Writer<Vec<u8>>,
}

impl ColladaWriter {
    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> anyhow::Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> anyhow::Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> anyhow::Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> anyhow::Result<()> {
        self.open(name, attributes)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn geometry(&mut self, mesh: &Mesh, ids: &GeometryIds) -> anyhow::Result<()> {
        let floats = join(mesh.points.iter().flat_map(|p| [p.x, p.y, p.z]));
        let float_count = (mesh.points.len() * 3).to_string();
        let point_count = mesh.points.len().to_string();
        let face_count = mesh.faces.len().to_string();

        self.open("geometry", &[("id", ids.geometry.as_str()), ("name", ids.geometry.as_str())])?;
        self.open("mesh", &[])?;

        self.open("source", &[("id", ids.source.as_str()), ("name", ids.source.as_str())])?;
        self.text(
            "float_array",
            &[
                ("id", ids.values.as_str()),
                ("name", ids.values.as_str()),
                ("count", float_count.as_str()),
            ],
            &floats,
        )?;
        self.open("technique_common", &[])?;
        self.open(
            "accessor",
            &[
                ("source", format!("#{}", ids.values).as_str()),
                ("count", point_count.as_str()),
                ("stride", "3"),
            ],
        )?;
        for axis in ["X", "Y", "Z"] {
            self.empty("param", &[("name", axis), ("type", "float")])?;
        }
        self.close("accessor")?;
        self.close("technique_common")?;
        self.close("source")?;

        self.open("vertices", &[("id", ids.vertices.as_str()), ("name", ids.vertices.as_str())])?;
        self.empty(
            "input",
            &[("semantic", "POSITION"), ("source", format!("#{}", ids.source).as_str())],
        )?;
        self.close("vertices")?;

        let primitive = if mesh.faces.iter().all(|face| face.len() == 3) {
            "triangles"
        } else {
            "polylist"
        };
        self.open(primitive, &[("count", face_count.as_str())])?;
        self.empty(
            "input",
            &[
                ("semantic", "VERTEX"),
                ("source", format!("#{}", ids.vertices).as_str()),
                ("offset", "0"),
            ],
        )?;
        if primitive == "polylist" {
            self.text("vcount", &[], &join(mesh.faces.iter().map(Vec::len)))?;
        }
        self.text("p", &[], &join(mesh.faces.iter().flatten()))?;
        self.close(primitive)?;

        self.close("mesh")?;
        self.close("geometry")
    }
}

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
