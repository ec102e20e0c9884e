extern crate nalgebra as na;
extern crate rand;

use na::{Matrix4, Point3, Vector3};
use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::Float;
use crate::dataset::{Datapoint, DatasetError, DatasetWriter, TransformLabel};
use crate::image::DepthImage;
use crate::mesh::Mesh;
use crate::quaternion;
use crate::quaternion::QuaternionError;
use crate::render::DepthRenderer;
use crate::stable_pose::StablePose;

#[derive(Error, Debug)]
pub enum PairGenError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Quaternion(#[from] QuaternionError),
}

/**
 * Which relative transforms get applied per stable pose. The canonical sets
 * label datapoints with a class id, the sampled mode with a quaternion.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformSet {
    /// {0 Z, 90 X, 90 Y, 90 Z}
    CanonicalXyz,
    /// {0 Z, 90 Z, 180 Z, 270 Z}
    CanonicalZ,
    /// one rotation drawn by rejection sampling, angle bounded
    SampledQuaternion { max_angle: Float }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dissimilarity {
    /// L2 distance in pixel space
    PixelL2,
    /// symmetric Chamfer distance between the mesh point cloud and its rotated copy
    ShapeMatch { points: usize }
}

#[derive(Debug, Clone)]
pub struct PairGenParameters {
    pub transform_set: TransformSet,
    pub dissimilarity: Dissimilarity,
    /// pairs scoring below this are flagged low-information
    pub similarity_threshold: Float,
    /// explicit switch for the symmetry-rejection policy; off accepts every pair
    pub reject_symmetric: bool,
    /// reject a stable pose once this many of its pairs are low-information ..
    pub low_info_limit: usize,
    /// .. and this many of its second images collapse onto each other
    pub collapse_limit: usize,
    pub samples_per_object: usize,
    pub seed: u64
}

impl Default for PairGenParameters {
    fn default() -> PairGenParameters {
        PairGenParameters {
            transform_set: TransformSet::CanonicalXyz,
            dissimilarity: Dissimilarity::PixelL2,
            similarity_threshold: 0.75,
            reject_symmetric: false,
            low_info_limit: 2,
            collapse_limit: 3,
            samples_per_object: 1,
            seed: 0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenStats {
    pub objects_processed: usize,
    pub objects_skipped: usize,
    pub poses_rejected: usize,
    pub low_info_pairs: usize,
    pub datapoints_written: usize,
    /// dissimilarity score of every generated pair, rejected poses included
    pub scores: Vec<Float>
}

/**
 * Generates labeled depth-image pairs for one object and stable pose at a
 * time: yaw-randomized base pose, one render per side of the pair, a
 * dissimilarity score against the configured threshold and a per-pose
 * acceptance decision. Owns a seeded rng so runs are reproducible.
 */
pub struct PairGenerator<'a, T: DepthRenderer> {
    pub parameters: PairGenParameters,
    renderer: &'a T,
    rng: SmallRng
}

impl<'a, T: DepthRenderer> PairGenerator<'a, T> {

    pub fn new(parameters: PairGenParameters, renderer: &'a T) -> PairGenerator<'a, T> {
        let rng = SmallRng::seed_from_u64(parameters.seed);
        PairGenerator { parameters, renderer, rng }
    }

    /**
     * Runs all configured samples for one object. Returns the number of
     * datapoints written; zero stable poses writes nothing and is not an
     * error.
     */
    pub fn generate_for_mesh(&mut self, mesh: &Mesh, obj_id: u32, stable_poses: &Vec<StablePose>, writer: &mut DatasetWriter, stats: &mut GenStats) -> Result<usize, PairGenError> {
        if stable_poses.is_empty() {
            log::info!("obj {}: no stable poses, skipping", obj_id);
            stats.objects_skipped += 1;
            return Ok(0);
        }

        let mut written = 0;
        for _ in 0..self.parameters.samples_per_object {
            for (pose_idx, stable_pose) in stable_poses.iter().enumerate() {
                log::debug!("obj {}: stable pose {} (p={:.3})", obj_id, pose_idx, stable_pose.probability);
                let (datapoints, scores, collapsed) = self.generate_for_pose(mesh, obj_id, stable_pose)?;

                let low_info = scores.iter().filter(|s| **s < self.parameters.similarity_threshold).count();
                stats.low_info_pairs += low_info;
                stats.scores.extend(&scores);
                if self.reject_pose(low_info, collapsed) {
                    log::info!("obj {}: rejecting stable pose {}, {} low-information pairs, {} collapsed second images", obj_id, pose_idx, low_info, collapsed);
                    stats.poses_rejected += 1;
                    continue;
                }

                for datapoint in datapoints {
                    writer.add(datapoint)?;
                    written += 1;
                }
            }
        }

        stats.objects_processed += 1;
        stats.datapoints_written += written;
        Ok(written)
    }

    /**
     * All K pairs for one stable pose, together with their dissimilarity
     * scores and the number of pairwise-similar second images.
     */
    fn generate_for_pose(&mut self, mesh: &Mesh, obj_id: u32, stable_pose: &StablePose) -> Result<(Vec<Datapoint>, Vec<Float>, usize), PairGenError> {
        let center_of_mass = stable_pose.pose.fixed_view::<3, 1>(0, 3).into_owned();
        let transforms = self.relative_transforms(&center_of_mass)?;

        let mut datapoints = Vec::<Datapoint>::with_capacity(transforms.len());
        let mut scores = Vec::<Float>::with_capacity(transforms.len());

        for (transform, label) in transforms {
            let yaw: Float = self.rng.gen_range(0.0..2.0*std::f64::consts::PI);
            let base_pose = quaternion::rotation_from_axis_and_origin(&Vector3::z(), &center_of_mass, yaw)?*stable_pose.pose;
            let target_pose = transform*base_pose;

            let image1 = self.renderer.render(mesh, &base_pose);
            let image2 = self.renderer.render(mesh, &target_pose);

            let score = self.dissimilarity(&image1, &image2, mesh, &transform);
            if score < self.parameters.similarity_threshold {
                log::debug!("obj {}: pair too similar, score {:.4}", obj_id, score);
            }

            scores.push(score);
            datapoints.push(Datapoint { depth_image1: image1, depth_image2: image2, label, obj_id });
        }

        let mut collapsed = 0;
        for i in 0..datapoints.len() {
            for j in i + 1..datapoints.len() {
                if datapoints[i].depth_image2.l2_distance(&datapoints[j].depth_image2) < self.parameters.similarity_threshold {
                    collapsed += 1;
                }
            }
        }

        Ok((datapoints, scores, collapsed))
    }

    fn reject_pose(&self, low_info: usize, collapsed: usize) -> bool {
        self.parameters.reject_symmetric
            && low_info >= self.parameters.low_info_limit
            && collapsed >= self.parameters.collapse_limit
    }

    fn relative_transforms(&mut self, center_of_mass: &Vector3<Float>) -> Result<Vec<(Matrix4<Float>, TransformLabel)>, QuaternionError> {
        let half_pi = std::f64::consts::FRAC_PI_2;
        match self.parameters.transform_set {
            TransformSet::CanonicalXyz => {
                let axes_angles = [
                    (Vector3::<Float>::z(), 0.0),
                    (Vector3::<Float>::x(), half_pi),
                    (Vector3::<Float>::y(), half_pi),
                    (Vector3::<Float>::z(), half_pi),
                ];
                axes_angles.iter().enumerate()
                    .map(|(id, (axis, angle))| Ok((quaternion::rotation_from_axis_and_origin(axis, center_of_mass, *angle)?, TransformLabel::Id(id as u32))))
                    .collect()
            },
            TransformSet::CanonicalZ => {
                (0..4).map(|id| {
                    let angle = half_pi*(id as Float);
                    Ok((quaternion::rotation_from_axis_and_origin(&Vector3::z(), center_of_mass, angle)?, TransformLabel::Id(id as u32)))
                }).collect()
            },
            TransformSet::SampledQuaternion { max_angle } => {
                let quat = quaternion::sample_bounded(&mut self.rng, max_angle)?;
                Ok(vec!((quaternion::rotation_about(&quat, center_of_mass), TransformLabel::Quaternion(quat.coords))))
            }
        }
    }

    fn dissimilarity(&mut self, image1: &DepthImage, image2: &DepthImage, mesh: &Mesh, transform: &Matrix4<Float>) -> Float {
        match self.parameters.dissimilarity {
            Dissimilarity::PixelL2 => image1.l2_distance(image2),
            Dissimilarity::ShapeMatch { points } => {
                let cloud = mesh.sample_surface(points, &mut self.rng);
                let rotated = cloud.iter().map(|p| transform.transform_point(p)).collect::<Vec<Point3<Float>>>();
                chamfer_distance(&cloud, &rotated)
            }
        }
    }
}

/**
 * Symmetric Chamfer distance, brute force nearest neighbors. Point counts
 * here are small enough that an acceleration structure is not worth it.
 */
pub fn chamfer_distance(a: &Vec<Point3<Float>>, b: &Vec<Point3<Float>>) -> Float {
    (mean_nearest_distance(a, b) + mean_nearest_distance(b, a))/2.0
}

fn mean_nearest_distance(from: &Vec<Point3<Float>>, to: &Vec<Point3<Float>>) -> Float {
    if from.is_empty() || to.is_empty() {
        return 0.0;
    }
    let sum: Float = from.iter().map(|p| {
        to.iter().map(|q| (p - q).norm()).fold(crate::float::MAX, |acc, d| acc.min(d))
    }).sum();
    sum/(from.len() as Float)
}
