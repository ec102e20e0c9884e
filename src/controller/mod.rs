extern crate nalgebra as na;
extern crate rand;

use na::{Matrix4, Quaternion, UnitQuaternion};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::Float;
use crate::image::DepthImage;
use crate::mesh::Mesh;
use crate::quaternion;
use crate::quaternion::QuaternionError;
use crate::render::DepthRenderer;

/**
 * Source of relative rotation estimates for the closed loop. The learned
 * model lives behind this seam; implementations only see the two depth
 * images.
 */
pub trait PosePredictor {
    fn predict(&mut self, current: &DepthImage, goal: &DepthImage) -> Quaternion<Float>;
}

/**
 * A cheating predictor for tests and demos: it is told the start-to-goal
 * rotation up front and emits a fixed fraction of the remaining correction
 * each step, ignoring the images.
 */
pub struct OraclePredictor {
    remaining: UnitQuaternion<Float>,
    pub step_fraction: Float
}

impl OraclePredictor {
    pub fn new(start_to_goal: UnitQuaternion<Float>, step_fraction: Float) -> OraclePredictor {
        OraclePredictor { remaining: start_to_goal, step_fraction }
    }
}

impl PosePredictor for OraclePredictor {
    fn predict(&mut self, _current: &DepthImage, _goal: &DepthImage) -> Quaternion<Float> {
        let step = UnitQuaternion::identity().slerp(&self.remaining, self.step_fraction);
        self.remaining = step.inverse()*self.remaining;
        *step.quaternion()
    }
}

#[derive(Debug, Clone)]
pub struct ControllerTrace {
    /// angular distance to the goal orientation per iteration, radians
    pub errors: Vec<Float>,
    pub poses: Vec<Matrix4<Float>>
}

/**
 * Closed-loop pose servoing: start a bounded rotation away from the goal,
 * then iteratively apply predicted corrections about the current center of
 * mass and re-render. Mirrors the evaluation loop used for trained models.
 */
pub struct Controller<'a, T: DepthRenderer> {
    renderer: &'a T,
    pub iterations: usize,
    pub start_angle_bound: Float,
    rng: SmallRng
}

impl<'a, T: DepthRenderer> Controller<'a, T> {

    pub fn new(renderer: &'a T, iterations: usize, start_angle_bound: Float, seed: u64) -> Controller<'a, T> {
        Controller { renderer, iterations, start_angle_bound, rng: SmallRng::seed_from_u64(seed) }
    }

    pub fn sample_start_pose(&mut self, goal_pose: &Matrix4<Float>) -> Result<(Matrix4<Float>, Quaternion<Float>), QuaternionError> {
        let center_of_mass = goal_pose.fixed_view::<3, 1>(0, 3).into_owned();
        let quat = quaternion::sample_bounded(&mut self.rng, self.start_angle_bound)?;
        Ok((quaternion::rotation_about(&quat, &center_of_mass)*goal_pose, quat))
    }

    pub fn run<P: PosePredictor>(&mut self, mesh: &Mesh, goal_pose: &Matrix4<Float>, start_pose: &Matrix4<Float>, predictor: &mut P) -> ControllerTrace {
        let goal_image = self.renderer.render(mesh, goal_pose);
        let goal_quat = quaternion::from_pose_matrix(goal_pose);

        let mut current_pose = *start_pose;
        let mut errors = Vec::<Float>::with_capacity(self.iterations + 1);
        let mut poses = Vec::<Matrix4<Float>>::with_capacity(self.iterations + 1);

        errors.push(quaternion::angular_distance(&quaternion::from_pose_matrix(&current_pose), &goal_quat));
        poses.push(current_pose);

        for _ in 0..self.iterations {
            let current_image = self.renderer.render(mesh, &current_pose);
            let correction = predictor.predict(&current_image, &goal_image);
            let center_of_mass = current_pose.fixed_view::<3, 1>(0, 3).into_owned();
            current_pose = quaternion::rotation_about(&correction, &center_of_mass)*current_pose;

            errors.push(quaternion::angular_distance(&quaternion::from_pose_matrix(&current_pose), &goal_quat));
            poses.push(current_pose);
        }

        ControllerTrace { errors, poses }
    }
}
