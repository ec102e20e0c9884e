use nalgebra as na;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use na::Vector3;
use posegen::quaternion::{self, QuaternionError, CANONICAL_INDEX};
use posegen::Float;

#[test]
fn canonicalized_component_is_max_and_non_negative() {
    let mut rng = SmallRng::seed_from_u64(0);
    for _ in 0..1000 {
        let quat = quaternion::sample_uniform_hemisphere(&mut rng);
        let dominant = quat.coords[CANONICAL_INDEX];
        assert!(dominant >= 0.0);
        for i in 0..4 {
            assert!(quat.coords[i].abs() <= dominant + 1e-12);
        }
        assert!((quat.coords.norm() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn bounded_sampling_respects_angle_bound() {
    let mut rng = SmallRng::seed_from_u64(1);
    let bound = std::f64::consts::PI/6.0;
    for _ in 0..1000 {
        let quat = quaternion::sample_bounded(&mut rng, bound).unwrap();
        assert!(quaternion::rotation_angle(&quat) <= bound + 1e-9);
        assert!(quat.coords[CANONICAL_INDEX] >= 0.0);
    }
}

#[test]
fn bounded_sampling_is_deterministic_for_a_seed() {
    let mut rng_a = SmallRng::seed_from_u64(42);
    let mut rng_b = SmallRng::seed_from_u64(42);
    for _ in 0..50 {
        let a = quaternion::sample_bounded(&mut rng_a, 0.8).unwrap();
        let b = quaternion::sample_bounded(&mut rng_b, 0.8).unwrap();
        assert_eq!(a.coords, b.coords);
    }
}

#[test]
fn rotation_matrix_round_trip_recovers_quaternion_up_to_sign() {
    let mut rng = SmallRng::seed_from_u64(2);
    let pivot = Vector3::<Float>::new(0.1, -0.2, 0.3);
    for _ in 0..100 {
        let quat = quaternion::sample_uniform_hemisphere(&mut rng);
        let pose = quaternion::rotation_about(&quat, &pivot);
        let recovered = quaternion::from_pose_matrix(&pose);

        let direct = (recovered.coords - quat.coords).norm();
        let negated = (recovered.coords + quat.coords).norm();
        assert!(direct.min(negated) < 1e-6);
    }
}

#[test]
fn rotation_about_pivot_leaves_pivot_fixed() {
    let mut rng = SmallRng::seed_from_u64(3);
    let pivot = Vector3::<Float>::new(-0.05, 0.02, 0.4);
    for _ in 0..20 {
        let quat = quaternion::sample_uniform_hemisphere(&mut rng);
        let pose = quaternion::rotation_about(&quat, &pivot);
        let mapped = pose.transform_point(&na::Point3::from(pivot));
        assert!((mapped.coords - pivot).norm() < 1e-9);
    }
}

#[test]
fn zero_axis_is_rejected() {
    let result = quaternion::axis_angle(&Vector3::<Float>::zeros(), 1.0);
    assert!(matches!(result, Err(QuaternionError::InvalidAxis(_))));
}

#[test]
fn angular_distance_is_zero_for_identical_rotations() {
    let mut rng = SmallRng::seed_from_u64(4);
    let quat = quaternion::sample_uniform_hemisphere(&mut rng);
    assert!(quaternion::angular_distance(&quat, &quat) < 1e-6);

    let negated = na::Quaternion::from_vector(-quat.coords);
    assert!(quaternion::angular_distance(&quat, &negated) < 1e-6);
}
