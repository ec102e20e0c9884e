extern crate nalgebra as na;
extern crate rand;

use na::{Quaternion, UnitQuaternion, Unit, Vector3, Matrix4, Translation3, Isometry3};
use rand::Rng;
use thiserror::Error;

use crate::Float;

/**
 * All quaternions produced here are canonicalized: the scalar component w
 * holds the largest-magnitude component and is non-negative. This removes the
 * (q,-q) double cover and keeps labels unique. Component order follows
 * nalgebra's coords layout (i,j,k,w).
 */

pub const CANONICAL_INDEX: usize = 3;
pub const MAX_SAMPLE_DRAWS: usize = 10000;
const AXIS_EPS: Float = 1e-8;

#[derive(Error, Debug)]
pub enum QuaternionError {
    #[error("rotation axis has norm {0:e}, below epsilon")]
    InvalidAxis(Float),
    #[error("rejection sampling did not satisfy angle bound {bound} rad after {draws} draws")]
    SamplingTimeout { draws: usize, bound: Float },
}

/**
 * Moves the largest-magnitude component into the w slot and fixes its sign
 * positive. Note the swap relabels which axis the dominant component belongs
 * to, so this is a labeling convention, not a rotation-preserving map.
 */
pub fn canonicalize(quat: &Quaternion<Float>) -> Quaternion<Float> {
    let mut coords = quat.coords;
    let mut max_i = 0;
    for i in 1..4 {
        if coords[i].abs() > coords[max_i].abs() {
            max_i = i;
        }
    }
    coords.swap_rows(max_i, CANONICAL_INDEX);
    if coords[CANONICAL_INDEX] < 0.0 {
        coords *= -1.0;
    }
    Quaternion::from_vector(coords)
}

/**
 * One draw of Shoemake's subgroup algorithm - uniform over SO(3).
 * planning.cs.uiuc.edu/node198.html
 */
fn shoemake_draw<R: Rng>(rng: &mut R) -> Quaternion<Float> {
    let u1: Float = rng.gen_range(0.0..1.0);
    let u2: Float = rng.gen_range(0.0..1.0);
    let u3: Float = rng.gen_range(0.0..1.0);

    let sqrt_one_minus_u1 = (1.0 - u1).sqrt();
    let sqrt_u1 = u1.sqrt();
    let two_pi_u2 = 2.0 * std::f64::consts::PI * u2;
    let two_pi_u3 = 2.0 * std::f64::consts::PI * u3;

    Quaternion::from_vector(na::Vector4::<Float>::new(
        sqrt_one_minus_u1 * two_pi_u2.sin(),
        sqrt_one_minus_u1 * two_pi_u2.cos(),
        sqrt_u1 * two_pi_u3.sin(),
        sqrt_u1 * two_pi_u3.cos(),
    ))
}

/**
 * Uniform random rotation with angular magnitude bounded by max_angle.
 * Rejection sampling on the dominant component: |q_max| >= cos(max_angle/2)
 * guarantees rotation angle <= max_angle after canonicalization.
 */
pub fn sample_bounded<R: Rng>(rng: &mut R, max_angle: Float) -> Result<Quaternion<Float>, QuaternionError> {
    let threshold = (max_angle / 2.0).cos();
    for _ in 0..MAX_SAMPLE_DRAWS {
        let quat = shoemake_draw(rng);
        if quat.coords.amax() >= threshold {
            return Ok(canonicalize(&quat));
        }
    }
    Err(QuaternionError::SamplingTimeout { draws: MAX_SAMPLE_DRAWS, bound: max_angle })
}

/**
 * 4 independent uniform(-1,1) draws, normalized and canonicalized. This is
 * not the Haar measure over the restricted set - kept as in the original
 * sampling scheme, where the bias was accepted.
 */
pub fn sample_uniform_hemisphere<R: Rng>(rng: &mut R) -> Quaternion<Float> {
    let mut coords = na::Vector4::<Float>::zeros();
    loop {
        for i in 0..4 {
            coords[i] = rng.gen_range(-1.0..1.0);
        }
        let norm = coords.norm();
        if norm > AXIS_EPS {
            coords /= norm;
            break;
        }
    }
    canonicalize(&Quaternion::from_vector(coords))
}

pub fn axis_angle(axis: &Vector3<Float>, angle: Float) -> Result<UnitQuaternion<Float>, QuaternionError> {
    let norm = axis.norm();
    if norm < AXIS_EPS {
        return Err(QuaternionError::InvalidAxis(norm));
    }
    Ok(UnitQuaternion::from_axis_angle(&Unit::new_normalize(*axis), angle))
}

/**
 * Rigid transform rotating about a pivot point rather than the origin. The
 * pivot becomes the translation component: t = p - R*p.
 */
pub fn rotation_about(quat: &Quaternion<Float>, pivot: &Vector3<Float>) -> Matrix4<Float> {
    let unit = UnitQuaternion::from_quaternion(*quat);
    let translation = pivot - unit * pivot;
    Isometry3::from_parts(Translation3::from(translation), unit).to_homogeneous()
}

pub fn rotation_from_axis_and_origin(axis: &Vector3<Float>, origin: &Vector3<Float>, angle: Float) -> Result<Matrix4<Float>, QuaternionError> {
    let unit = axis_angle(axis, angle)?;
    Ok(rotation_about(&unit.into_inner(), origin))
}

/**
 * Recovers the canonicalized rotation quaternion from the upper-left 3x3
 * block of a pose matrix. Only the sign is fixed here - component order is
 * left untouched so the quaternion still maps back to the same rotation.
 */
pub fn from_pose_matrix(pose: &Matrix4<Float>) -> Quaternion<Float> {
    let rot = pose.fixed_view::<3, 3>(0, 0).into_owned();
    let unit = UnitQuaternion::from_matrix(&rot);
    let mut quat = *unit.quaternion();
    if quat.coords[CANONICAL_INDEX] < 0.0 {
        quat = Quaternion::from_vector(-quat.coords);
    }
    quat
}

pub fn rotation_angle(quat: &Quaternion<Float>) -> Float {
    2.0 * quat.coords[CANONICAL_INDEX].abs().min(1.0).acos()
}

/**
 * Angle of the relative rotation between two unit quaternions, sign agnostic.
 */
pub fn angular_distance(a: &Quaternion<Float>, b: &Quaternion<Float>) -> Float {
    let dot = a.coords.dot(&b.coords).abs().min(1.0);
    2.0 * dot.acos()
}
