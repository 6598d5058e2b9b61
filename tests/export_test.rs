use std::collections::HashSet;

use cgmath::Vector3;
use futures::executor::block_on;
use wps_scene_viewer::{
    context::Out,
    data_structures::{mesh::Mesh, scene_graph::SceneEngine},
    resources::{
        collada::load_collada,
        export::{ElevationGrid, TERRAIN_NAME, to_collada, to_json, triangulate},
        mesh::mesh_from_json,
        model::{ModelFormat, request_model},
    },
};

mod common;

use crate::common::test_utils::{MockFetcher, TEMPLATE, viewer};

fn hill() -> ElevationGrid {
    ElevationGrid::from_rows(&[
        vec![1.0, 2.0, 3.0, 2.0],
        vec![2.0, 5.0, 6.0, 3.0],
        vec![1.0, 4.0, 4.0, 2.0],
    ])
    .unwrap()
}

fn area(mesh: &Mesh, face: &[u32]) -> f32 {
    let [a, b, c] = [0, 1, 2].map(|i| mesh.points[face[i] as usize]);
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() / 2.0
}

fn key(p: &Vector3<f32>) -> [u32; 3] {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

#[test]
fn should_lay_out_grid_points_row_by_row() {
    let grid = hill();

    assert_eq!((grid.width(), grid.height()), (4, 3));
    assert_eq!(grid.sample(2, 1), Some(6.0));
    assert_eq!(grid.sample(4, 0), None);
    assert_eq!(grid.sample(0, 3), None);

    let cloud = grid.point_cloud();
    assert_eq!(cloud.len(), 12);
    assert_eq!(cloud[1], Vector3::new(1.0, 0.0, 2.0));
    assert_eq!(cloud[6], Vector3::new(2.0, 1.0, 6.0));
}

#[test]
fn should_reject_grids_with_wrong_sample_count() {
    assert!(ElevationGrid::new(3, 2, vec![0.0; 5]).is_err());
    assert!(ElevationGrid::new(0, 2, Vec::new()).is_err());
    assert!(ElevationGrid::from_rows(&[vec![0.0, 1.0], vec![2.0]]).is_err());
    assert!(ElevationGrid::from_rows(&[]).is_err());
}

#[test]
fn should_cover_grid_with_triangles() {
    let grid = hill();
    let mesh = triangulate(&grid);

    assert_eq!(mesh.name, TERRAIN_NAME);
    assert_eq!(mesh.points.len(), 12);
    let expected: HashSet<_> = grid.point_cloud().iter().map(key).collect();
    let actual: HashSet<_> = mesh.points.iter().map(key).collect();
    assert_eq!(actual, expected);

    assert!(mesh.faces.iter().all(|f| f.len() == 3));
    assert!(mesh.faces.iter().flatten().all(|&i| (i as usize) < mesh.points.len()));
    let covered: f32 = mesh.faces.iter().map(|f| area(&mesh, f)).sum();
    assert!((covered - 6.0).abs() < 1e-4, "{}", covered);
}

#[test]
fn should_number_points_in_first_use_order() {
    let mesh = triangulate(&hill());

    let mut next = 0;
    for &index in mesh.faces.iter().flatten() {
        assert!(index <= next, "index {} used before {}", index, next);
        if index == next {
            next += 1;
        }
    }
    assert_eq!(next as usize, mesh.points.len());
}

#[test]
fn should_give_empty_mesh_for_single_row() {
    let grid = ElevationGrid::new(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
    let mesh = triangulate(&grid);

    assert!(mesh.faces.is_empty());
    assert!(mesh.points.is_empty());
}

#[test]
fn should_read_back_json_export() {
    let exported = triangulate(&hill());
    let document: serde_json::Value = serde_json::from_str(&to_json(&exported).unwrap()).unwrap();

    assert_eq!(document["name"], "terrainMesh");
    assert_eq!(document["points"][0].as_array().map(Vec::len), Some(3));

    let loaded = mesh_from_json(&document).unwrap();
    assert_eq!(loaded, exported);
}

#[test]
fn should_read_back_collada_export() {
    let exported = triangulate(&hill());
    let document = to_collada(std::slice::from_ref(&exported)).unwrap();

    assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    assert!(document.contains("version=\"1.4.1\""));
    assert!(document.contains("<instance_geometry url=\"#gis_geometry\"/>"));
    assert!(document.contains("<instance_visual_scene url=\"#gis_visual_scene\"/>"));
    assert!(document.contains(&format!("count=\"{}\"", exported.points.len() * 3)));

    let loaded = load_collada(&document).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "gis_geometry");
    assert_eq!(loaded[0].points, exported.points);
    assert_eq!(loaded[0].faces, exported.faces);
}

#[test]
fn should_write_polygons_as_polylist() {
    let quad = Mesh::from_parts(
        "quad",
        vec![
            Vector3::new(0.0, 0.0, 0.5),
            Vector3::new(1.0, 0.0, 0.5),
            Vector3::new(1.0, 1.0, 0.5),
            Vector3::new(0.0, 1.0, 0.5),
            Vector3::new(2.0, 0.0, 0.5),
        ],
        vec![vec![0, 1, 2, 3], vec![1, 4, 2]],
    );
    let document = to_collada(&[quad.clone()]).unwrap();

    assert!(document.contains("<polylist count=\"2\">"));
    assert!(document.contains("<vcount>4 3</vcount>"));
    assert_eq!(load_collada(&document).unwrap()[0].faces, quad.faces);
}

#[test]
fn should_suffix_ids_of_later_geometries() {
    let triangle = Mesh::from_parts(
        "t",
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ],
        vec![vec![0, 1, 2]],
    );
    let document = to_collada(&[triangle.clone(), triangle.clone(), triangle]).unwrap();

    let names: Vec<String> = load_collada(&document)
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, ["gis_geometry", "gis_geometry_2", "gis_geometry_3"]);
    assert!(document.contains("id=\"gis_mesh_source_vertex_3_values\""));
}

#[test]
fn should_load_exported_terrain_into_viewer() {
    let document = to_json(&triangulate(&hill())).unwrap();
    let (mut ctx, _) = viewer();
    let fetcher = MockFetcher::json(TEMPLATE, &document);
    let request = match ctx.request(ModelFormat::Json) {
        Out::Load(request) => request,
        _ => panic!("expected a model request"),
    };

    ctx.apply_outcome(block_on(request_model(&fetcher, request, |_: String| {})));

    let objects = ctx.engine.scene_objects();
    assert_eq!(objects.len(), 1);
    let bb = objects[0].mesh.bb.unwrap();
    assert_eq!((bb.min.x, bb.max.x), (-1.5, 1.5));
    assert_eq!((bb.min.y, bb.max.y), (-1.0, 1.0));
    assert_eq!((bb.min.z, bb.max.z), (1.0, 6.0));
}
