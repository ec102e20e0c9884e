extern crate nalgebra as na;
extern crate rand;
extern crate rand_distr;

use na::{Matrix3, Matrix4, Vector2, Vector3, Unit, UnitQuaternion, Isometry3, Translation3};
use rand::Rng;
use rand_distr::{Normal, Distribution};

use crate::Float;
use crate::mesh::Mesh;

/**
 * A resting orientation of a mesh on the z=0 support plane with the
 * probability of the object coming to rest in it.
 */
#[derive(Debug, Clone)]
pub struct StablePose {
    pub pose: Matrix4<Float>,
    pub probability: Float
}

pub struct StablePoseParameters {
    pub com_sigma: Float,
    pub num_samples: usize,
    pub min_probability: Float
}

/**
 * Seam for the stable pose computation. An empty result is a valid outcome
 * meaning "skip this mesh", never an error.
 */
pub trait StablePoseSource {
    fn compute<R: Rng>(&self, mesh: &Mesh, parameters: &StablePoseParameters, rng: &mut R) -> Vec<StablePose>;
}

/**
 * Quasi-static enumerator. Candidate orientations come from resting the mesh
 * on each principal axis direction; stability of a candidate is the fraction
 * of sigma-perturbed center-of-mass samples whose ground projection stays
 * inside the convex hull of the contact vertices. Probabilities are
 * normalized across candidates before thresholding.
 */
pub struct PrincipalAxesEnumerator {
    pub contact_tolerance: Float
}

impl PrincipalAxesEnumerator {

    pub fn new() -> PrincipalAxesEnumerator {
        PrincipalAxesEnumerator { contact_tolerance: 1e-3 }
    }

    fn candidate_rotations(&self, mesh: &Mesh) -> Vec<UnitQuaternion<Float>> {
        let com = mesh.center_of_mass();
        let mut covariance = Matrix3::<Float>::zeros();
        for v in &mesh.vertices {
            let d = v.coords - com;
            covariance += d*d.transpose();
        }
        covariance /= mesh.vertices.len() as Float;

        let eigen = na::SymmetricEigen::new(covariance);
        let mut rotations = Vec::<UnitQuaternion<Float>>::with_capacity(6);
        let down = -Vector3::<Float>::z();
        for i in 0..3 {
            let axis = eigen.eigenvectors.column(i).into_owned();
            for direction in &[axis, -axis] {
                let rotation = match UnitQuaternion::rotation_between(direction, &down) {
                    Some(r) => r,
                    // antiparallel case, flip around any perpendicular
                    None => UnitQuaternion::from_axis_angle(&Unit::new_normalize(perpendicular(direction)), std::f64::consts::PI)
                };
                rotations.push(rotation);
            }
        }
        rotations
    }
}

impl StablePoseSource for PrincipalAxesEnumerator {

    fn compute<R: Rng>(&self, mesh: &Mesh, parameters: &StablePoseParameters, rng: &mut R) -> Vec<StablePose> {
        let com = mesh.center_of_mass();
        let tolerance = self.contact_tolerance*mesh.scale.max(1e-6);
        let normal = Normal::new(0.0, parameters.com_sigma.max(1e-12)).expect("com sigma is not finite");

        let mut candidates = Vec::<(Matrix4<Float>, Float)>::new();
        for rotation in self.candidate_rotations(mesh) {
            let rotated = mesh.vertices.iter().map(|v| rotation*v).collect::<Vec<na::Point3<Float>>>();
            let min_z = rotated.iter().map(|v| v[2]).fold(crate::float::MAX, |acc, z| acc.min(z));

            let rotated_com = rotation*com;
            let translation = Vector3::<Float>::new(-rotated_com[0], -rotated_com[1], -min_z);
            let pose = Isometry3::from_parts(Translation3::from(translation), rotation).to_homogeneous();

            let contact = rotated.iter()
                .filter(|v| v[2] - min_z < tolerance)
                .map(|v| Vector2::<Float>::new(v[0] + translation[0], v[1] + translation[1]))
                .collect::<Vec<Vector2<Float>>>();
            let hull = convex_hull_2d(&contact);
            if hull.len() < 3 {
                continue;
            }

            let mut inside = 0;
            for _ in 0..parameters.num_samples {
                let px = normal.sample(rng);
                let py = normal.sample(rng);
                // translated com sits on the origin in the xy plane
                if point_in_convex_polygon(&Vector2::<Float>::new(px, py), &hull) {
                    inside += 1;
                }
            }
            let score = inside as Float/parameters.num_samples.max(1) as Float;
            if score > 0.0 {
                candidates.push((pose, score));
            }
        }

        let total: Float = candidates.iter().map(|c| c.1).sum();
        if total <= 0.0 {
            return Vec::new();
        }

        candidates.into_iter()
            .map(|(pose, score)| StablePose { pose, probability: score/total })
            .filter(|p| p.probability >= parameters.min_probability)
            .collect::<Vec<StablePose>>()
    }
}

fn perpendicular(v: &Vector3<Float>) -> Vector3<Float> {
    let candidate = match v[0].abs() < 0.9 {
        true => Vector3::<Float>::x(),
        false => Vector3::<Float>::y()
    };
    v.cross(&candidate)
}

/**
 * Monotone chain. Returns hull vertices in counter-clockwise order.
 */
pub fn convex_hull_2d(points: &Vec<Vector2<Float>>) -> Vec<Vector2<Float>> {
    if points.len() < 3 {
        return points.clone();
    }

    let mut sorted = points.clone();
    sorted.sort_by(|a, b| (a[0], a[1]).partial_cmp(&(b[0], b[1])).expect("non finite contact point"));
    sorted.dedup_by(|a, b| (a[0] - b[0]).abs() < 1e-12 && (a[1] - b[1]).abs() < 1e-12);
    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: &Vector2<Float>, a: &Vector2<Float>, b: &Vector2<Float>| {
        (a[0] - o[0])*(b[1] - o[1]) - (a[1] - o[1])*(b[0] - o[0])
    };

    let mut lower = Vec::<Vector2<Float>>::new();
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len()-2], &lower[lower.len()-1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper = Vec::<Vector2<Float>>::new();
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len()-2], &upper[upper.len()-1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

pub fn point_in_convex_polygon(point: &Vector2<Float>, hull: &Vec<Vector2<Float>>) -> bool {
    if hull.len() < 3 {
        return false;
    }
    for i in 0..hull.len() {
        let a = &hull[i];
        let b = &hull[(i + 1)%hull.len()];
        let cross = (b[0] - a[0])*(point[1] - a[1]) - (b[1] - a[1])*(point[0] - a[0]);
        if cross < 0.0 {
            return false;
        }
    }
    true
}
