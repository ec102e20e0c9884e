use nalgebra as na;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io::Write;

use na::Vector3;
use posegen::camera::Pinhole;
use posegen::mesh::{Mesh, MeshLoadError};
use posegen::render::{DepthRenderer, RasterRenderer};
use posegen::stable_pose::{PrincipalAxesEnumerator, StablePoseParameters, StablePoseSource};
use posegen::Float;

fn test_renderer() -> RasterRenderer {
    let camera = Pinhole::<Float>::new(260.0, 260.0, 32.0, 32.0);
    RasterRenderer::overhead(camera, 64, 64, 0.05, 3.0, 0.8)
}

#[test]
fn obj_loading_handles_quads_and_index_styles() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "# a unit quad, two ways\n\
                  v 0.0 0.0 0.0\n\
                  v 1.0 0.0 0.0\n\
                  v 1.0 1.0 0.0\n\
                  v 0.0 1.0 0.0\n\
                  f 1/1/1 2/2/2 3/3/3 4/4/4\n\
                  f -4 -3 -2\n").unwrap();

    let mesh = Mesh::load_obj(file.path()).unwrap();
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.faces.len(), 3); // quad fans into 2 + 1 explicit
}

#[test]
fn malformed_obj_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "v 0.0 zero 0.0\n").unwrap();
    assert!(matches!(Mesh::load_obj(file.path()), Err(MeshLoadError::Parse { line: 1, .. })));

    let empty = tempfile::NamedTempFile::new().unwrap();
    assert!(matches!(Mesh::load_obj(empty.path()), Err(MeshLoadError::Empty)));
}

#[test]
fn non_finite_vertices_are_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "v nan 0.0 0.0\n\
                  v 1.0 0.0 0.0\n\
                  v 0.0 inf 0.0\n\
                  f 1 2 3\n").unwrap();
    assert!(matches!(Mesh::load_obj(file.path()), Err(MeshLoadError::Parse { line: 1, .. })));
}

#[test]
fn cuboid_center_of_mass_is_the_origin() {
    let mesh = Mesh::cuboid(0.04, 0.06, 0.1);
    assert!(mesh.center_of_mass().norm() < 1e-12);
    assert!(mesh.scale > 0.0);
}

#[test]
fn stable_poses_rest_the_mesh_on_the_support_plane() {
    let mesh = Mesh::cuboid(0.04, 0.06, 0.1);
    let enumerator = PrincipalAxesEnumerator::new();
    let parameters = StablePoseParameters { com_sigma: 0.005, num_samples: 500, min_probability: 0.05 };
    let mut rng = SmallRng::seed_from_u64(11);

    let poses = enumerator.compute(&mesh, &parameters, &mut rng);
    assert!(!poses.is_empty());

    let total: Float = poses.iter().map(|p| p.probability).sum();
    assert!(total <= 1.0 + 1e-9);

    for stable_pose in &poses {
        assert!(stable_pose.probability >= parameters.min_probability);
        let transformed = mesh.transformed_vertices(&stable_pose.pose);
        let min_z = transformed.iter().map(|v| v[2]).fold(f64::MAX, |acc, z| acc.min(z));
        assert!(min_z.abs() < 1e-9);
    }
}

#[test]
fn rendering_is_deterministic_and_centered() {
    let mesh = Mesh::cuboid(0.04, 0.06, 0.1);
    let renderer = test_renderer();
    let pose = na::Matrix4::<Float>::new_translation(&Vector3::new(0.0, 0.0, 0.05));

    let image_a = renderer.render(&mesh, &pose);
    let image_b = renderer.render(&mesh, &pose);
    assert_eq!(image_a.buffer, image_b.buffer);

    // object in the viewport center, empty corner is background
    assert!(image_a.buffer[(32, 32)] > 0.0);
    assert_eq!(image_a.buffer[(0, 0)], 0.0);
}

#[test]
fn identical_images_have_zero_distance() {
    let mesh = Mesh::cuboid(0.04, 0.06, 0.1);
    let renderer = test_renderer();
    let pose = na::Matrix4::<Float>::new_translation(&Vector3::new(0.0, 0.0, 0.05));

    let image = renderer.render(&mesh, &pose);
    assert_eq!(image.l2_distance(&image.clone()), 0.0);
}
