extern crate nalgebra as na;

use std::fs;
use std::path::Path;
use color_eyre::eyre::Result;
use na::UnitQuaternion;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use posegen::camera::Pinhole;
use posegen::controller::{Controller, OraclePredictor};
use posegen::io;
use posegen::mesh::Mesh;
use posegen::quaternion;
use posegen::render::RasterRenderer;
use posegen::stable_pose::{PrincipalAxesEnumerator, StablePoseParameters, StablePoseSource};
use posegen::visualize::plot;
use posegen::Float;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = std::env::args().collect::<Vec<String>>();
    let mesh = match args.get(1) {
        Some(path) => Mesh::load_obj(Path::new(path))?,
        None => Mesh::cuboid(0.06, 0.09, 0.15)
    };

    let output_dir = "controller_out";
    fs::create_dir_all(output_dir)?;

    let camera = Pinhole::<Float>::new(260.0, 260.0, 64.0, 64.0);
    let renderer = RasterRenderer::overhead(camera, 128, 128, 0.05, 3.0, 0.8);

    let enumerator = PrincipalAxesEnumerator::new();
    let parameters = StablePoseParameters { com_sigma: 0.01, num_samples: 200, min_probability: 0.05 };
    let mut rng = SmallRng::seed_from_u64(7);
    let stable_poses = enumerator.compute(&mesh, &parameters, &mut rng);
    if stable_poses.is_empty() {
        println!("no stable poses for this mesh");
        return Ok(());
    }

    let goal_pose = stable_poses[0].pose;
    io::save_pose_matrix(&Path::new(output_dir).join("matrix_goal.txt"), &goal_pose)?;
    io::save_quaternion(&Path::new(output_dir).join("quat_goal.txt"), &quaternion::from_pose_matrix(&goal_pose).coords)?;

    let mut controller = Controller::new(&renderer, 10, std::f64::consts::PI/6.0, 7);
    let (start_pose, start_quat) = controller.sample_start_pose(&goal_pose)?;
    let mut predictor = OraclePredictor::new(UnitQuaternion::from_quaternion(start_quat).inverse(), 0.5);

    let trace = controller.run(&mesh, &goal_pose, &start_pose, &mut predictor);
    for (i, pose) in trace.poses.iter().enumerate() {
        io::save_pose_matrix(&Path::new(output_dir).join(format!("matrix_{}.txt", i)), pose)?;
    }

    let degrees = trace.errors.iter().map(|e| e*180.0/std::f64::consts::PI).collect::<Vec<Float>>();
    println!("angle error per iteration (deg): {:?}", degrees.iter().map(|d| (d*100.0).round()/100.0).collect::<Vec<Float>>());
    plot::draw_convergence_graph(&trace.errors, output_dir, "loss.png").map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    Ok(())
}
