extern crate nalgebra as na;

use std::path::Path;
use color_eyre::eyre::{eyre, Result};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use posegen::camera::Pinhole;
use posegen::config::GenConfig;
use posegen::dataset::DatasetWriter;
use posegen::io;
use posegen::mesh::Mesh;
use posegen::pairgen::{GenStats, PairGenerator};
use posegen::render::RasterRenderer;
use posegen::stable_pose::{PrincipalAxesEnumerator, StablePoseSource};
use posegen::visualize::plot;
use posegen::Float;

const FLUSH_EVERY_N_OBJECTS: usize = 10;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = std::env::args().collect::<Vec<String>>();
    if args.len() < 2 {
        return Err(eyre!("usage: data_gen_quat <config.yaml> [max_objects]"));
    }
    let config = GenConfig::load(Path::new(&args[1]))?;
    let max_objects = args.get(2).map(|a| a.parse::<usize>()).transpose()?;

    let cam = &config.state_space.camera;
    let camera = Pinhole::<Float>::new(cam.fx, cam.fy, cam.cx, cam.cy);
    let renderer = RasterRenderer::overhead(camera, cam.width, cam.height, cam.znear, cam.zfar, cam.view_distance);

    let mut writer = DatasetWriter::new(Path::new(&config.dataset.output_dir), cam.width, cam.height, config.dataset.shard_capacity)?;
    let mut generator = PairGenerator::new(config.pairgen_parameters(), &renderer);
    let enumerator = PrincipalAxesEnumerator::new();
    let stable_pose_parameters = config.stable_pose_parameters();
    let mut pose_rng = SmallRng::seed_from_u64(config.dataset.seed ^ 0x5ab1e);

    let entries = io::enumerate_meshes(
        Path::new(&config.state_space.objects.mesh_dir),
        &config.state_space.objects.collections)?;
    log::info!("{} objects across {} collections", entries.len(), config.state_space.objects.collections.len());

    let mut stats = GenStats::default();
    for (processed, entry) in entries.iter().enumerate() {
        // object sample source exhausted - expected clean termination
        if let Some(max) = max_objects {
            if processed >= max {
                log::info!("reached object limit {}, stopping", max);
                break;
            }
        }

        log::info!("------------- object {} ({}) -------------", entry.obj_id, entry.path.display());
        let mesh = match Mesh::load_obj(&entry.path) {
            Ok(mesh) => mesh,
            Err(e) => {
                log::error!("obj {}: {}, skipping", entry.obj_id, e);
                stats.objects_skipped += 1;
                continue;
            }
        };

        let stable_poses = enumerator.compute(&mesh, &stable_pose_parameters, &mut pose_rng);
        generator.generate_for_mesh(&mesh, entry.obj_id, &stable_poses, &mut writer, &mut stats)?;

        if (processed + 1) % FLUSH_EVERY_N_OBJECTS == 0 {
            writer.flush()?;
        }
    }

    writer.flush()?;
    log::info!("done: {} datapoints written, {} objects processed, {} skipped, {} poses rejected, {} low-information pairs",
        stats.datapoints_written, stats.objects_processed, stats.objects_skipped, stats.poses_rejected, stats.low_info_pairs);

    if config.debug {
        if let Err(e) = plot::draw_score_histogram(&stats.scores, 20, &config.dataset.output_dir, "scores.png") {
            log::warn!("could not plot score histogram: {}", e);
        }
    }
    println!("{} datapoints -> {}", stats.datapoints_written, config.dataset.output_dir);

    Ok(())
}
