use nalgebra as na;

use na::{Matrix4, UnitQuaternion, Vector3};
use posegen::camera::Pinhole;
use posegen::controller::{Controller, OraclePredictor};
use posegen::mesh::Mesh;
use posegen::render::RasterRenderer;
use posegen::Float;

#[test]
fn oracle_predictor_converges_to_the_goal_orientation() {
    let camera = Pinhole::<Float>::new(260.0, 260.0, 32.0, 32.0);
    let renderer = RasterRenderer::overhead(camera, 64, 64, 0.05, 3.0, 0.8);
    let mesh = Mesh::cuboid(0.04, 0.06, 0.1);
    let goal_pose = Matrix4::<Float>::new_translation(&Vector3::new(0.0, 0.0, 0.05));

    let mut controller = Controller::new(&renderer, 10, std::f64::consts::PI/6.0, 13);
    let (start_pose, start_quat) = controller.sample_start_pose(&goal_pose).unwrap();
    let mut predictor = OraclePredictor::new(UnitQuaternion::from_quaternion(start_quat).inverse(), 0.5);

    let trace = controller.run(&mesh, &goal_pose, &start_pose, &mut predictor);
    assert_eq!(trace.errors.len(), 11);
    assert!(trace.errors[0] > 0.0);
    assert!(trace.errors.last().unwrap() < &1e-2);
    assert!(trace.errors.last().unwrap() < &trace.errors[0]);
}

#[test]
fn start_pose_stays_within_the_angle_bound() {
    let camera = Pinhole::<Float>::new(260.0, 260.0, 32.0, 32.0);
    let renderer = RasterRenderer::overhead(camera, 64, 64, 0.05, 3.0, 0.8);
    let goal_pose = Matrix4::<Float>::new_translation(&Vector3::new(0.0, 0.0, 0.05));
    let bound = std::f64::consts::PI/6.0;

    let mut controller = Controller::new(&renderer, 1, bound, 3);
    for _ in 0..20 {
        let (_, quat) = controller.sample_start_pose(&goal_pose).unwrap();
        assert!(posegen::quaternion::rotation_angle(&quat) <= bound + 1e-9);
    }
}
