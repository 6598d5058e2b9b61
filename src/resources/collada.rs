//! COLLADA geometry extraction.
//!
//! Only what a terrain export carries is read: per `<geometry>`, the position
//! `<source>` referenced by `<vertices>` and the `<triangles>`/`<polylist>`
//! primitives indexing it. Normals, texture coordinates, materials and node
//! transforms are ignored.

use std::collections::HashMap;

use anyhow::{Context, anyhow, bail};
use cgmath::Vector3;
use quick_xml::{Reader, events::BytesStart, events::Event};

use crate::{data_structures::mesh::Mesh, resources::ows::exception_report};

#[derive(Default)]
struct Primitive {
    inputs: Vec<(String, String, usize)>,
    vcount: Vec<u32>,
    p: Vec<u32>,
    triangles: bool,
}

#[derive(Default)]
struct Geometry {
    name: String,
    sources: HashMap<String, Vec<f32>>,
    vertices: HashMap<String, String>,
    primitives: Vec<Primitive>,
}

enum Capture {
    Floats(String),
    VCount,
    P,
}

/// Build one mesh per `<geometry>` in the document.
pub fn load_collada(document: &str) -> anyhow::Result<Vec<Mesh>> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut meshes = Vec::new();
    let mut geometry: Option<Geometry> = None;
    let mut source_id: Option<String> = None;
    let mut vertices_id: Option<String> = None;
    let mut primitive: Option<Primitive> = None;
    let mut capture: Option<Capture> = None;
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("Malformed COLLADA at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let empty = matches!(event, Event::Empty(_));
                let tag = e.local_name();
                match tag.as_ref() {
                    b"COLLADA" => seen_root = true,
                    b"geometry" => {
                        let name = attribute(e, "name")?
                            .or(attribute(e, "id")?)
                            .unwrap_or_else(|| format!("geometry{}", meshes.len()));
                        geometry = Some(Geometry {
                            name,
                            ..Default::default()
                        });
                    }
                    b"source" if geometry.is_some() => source_id = attribute(e, "id")?,
                    b"float_array" => {
                        if let Some(id) = &source_id {
                            capture = Some(Capture::Floats(id.clone()));
                        }
                    }
                    b"vertices" => vertices_id = attribute(e, "id")?,
                    b"triangles" | b"polylist" if !empty => {
                        primitive = Some(Primitive {
                            triangles: tag.as_ref() == b"triangles",
                            ..Default::default()
                        });
                    }
                    b"input" => {
                        let semantic = attribute(e, "semantic")?.unwrap_or_default();
                        let source = attribute(e, "source")?
                            .unwrap_or_default()
                            .trim_start_matches('#')
                            .to_string();
                        if let Some(primitive) = primitive.as_mut() {
                            let offset = attribute(e, "offset")?
                                .map(|o| o.parse::<usize>())
                                .transpose()
                                .context("Invalid input offset")?
                                .unwrap_or(0);
                            primitive.inputs.push((semantic, source, offset));
                        } else if let (Some(id), Some(geometry)) = (&vertices_id, geometry.as_mut())
                        {
                            if semantic == "POSITION" {
                                geometry.vertices.insert(id.clone(), source);
                            }
                        }
                    }
                    b"vcount" if primitive.is_some() => capture = Some(Capture::VCount),
                    b"p" if primitive.is_some() => capture = Some(Capture::P),
                    _ => {}
                }
                if empty {
                    capture = None;
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                match (&capture, geometry.as_mut(), primitive.as_mut()) {
                    (Some(Capture::Floats(id)), Some(geometry), _) => {
                        let values = geometry.sources.entry(id.clone()).or_default();
                        values.extend(parse_list::<f32>(&text)?);
                    }
                    (Some(Capture::VCount), _, Some(primitive)) => {
                        primitive.vcount.extend(parse_list::<u32>(&text)?)
                    }
                    (Some(Capture::P), _, Some(primitive)) => {
                        primitive.p.extend(parse_list::<u32>(&text)?)
                    }
                    _ => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"float_array" | b"vcount" | b"p" => capture = None,
                b"source" => source_id = None,
                b"vertices" => vertices_id = None,
                b"triangles" | b"polylist" => {
                    if let (Some(done), Some(geometry)) = (primitive.take(), geometry.as_mut()) {
                        geometry.primitives.push(done);
                    }
                }
                b"geometry" => {
                    if let Some(done) = geometry.take() {
                        meshes.push(build_mesh(done)?);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        if let Some(report) = exception_report(document) {
            bail!("Service exception: {}", report);
        }
        bail!("Document has no COLLADA root element");
    }
    Ok(meshes)
}

fn attribute(element: &BytesStart, name: &str) -> anyhow::Result<Option<String>> {
    match element.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn parse_list<T: std::str::FromStr>(text: &str) -> anyhow::Result<Vec<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .with_context(|| format!("Invalid number {token:?}"))
        })
        .collect()
}

fn build_mesh(geometry: Geometry) -> anyhow::Result<Mesh> {
    let mut faces = Vec::new();
    let mut position_source: Option<&str> = None;

    for primitive in &geometry.primitives {
        let (_, vertex_source, vertex_offset) = primitive
            .inputs
            .iter()
            .find(|(semantic, _, _)| semantic == "VERTEX")
            .ok_or_else(|| anyhow!("Geometry {} has a primitive without VERTEX input", geometry.name))?;
        let source = geometry
            .vertices
            .get(vertex_source)
            .map(String::as_str)
            .unwrap_or(vertex_source.as_str());
        position_source.get_or_insert(source);

        let stride = primitive.inputs.iter().map(|(_, _, o)| o + 1).max().unwrap_or(1);
        let indices: Vec<u32> = primitive
            .p
            .chunks(stride)
            .filter_map(|chunk| chunk.get(*vertex_offset).copied())
            .collect();

        if primitive.triangles || primitive.vcount.is_empty() {
            faces.extend(indices.chunks_exact(3).map(<[u32]>::to_vec));
        } else {
            let mut rest = indices.as_slice();
            for &count in &primitive.vcount {
                let count = count as usize;
                if count > rest.len() {
                    bail!("Geometry {} declares more polygon vertices than it lists", geometry.name);
                }
                let (face, tail) = rest.split_at(count);
                faces.push(face.to_vec());
                rest = tail;
            }
        }
    }

    let floats = match position_source {
        Some(id) => geometry
            .sources
            .get(id)
            .ok_or_else(|| anyhow!("Geometry {} references missing source {}", geometry.name, id))?
            .clone(),
        None => geometry.sources.values().next().cloned().unwrap_or_default(),
    };
    let points: Vec<Vector3<f32>> = floats
        .chunks_exact(3)
        .map(|xyz| Vector3::new(xyz[0], xyz[1], xyz[2]))
        .collect();

    if let Some(face) = faces
        .iter()
        .find(|face| face.iter().any(|&i| i as usize >= points.len()))
    {
        bail!(
            "Geometry {} has face {:?} outside of its {} points",
            geometry.name,
            face,
            points.len()
        );
    }

    Ok(Mesh::from_parts(geometry.name, points, faces))
}
