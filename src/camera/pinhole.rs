extern crate nalgebra as na;
extern crate num_traits;

use na::{Matrix3, Vector3, Vector2, SimdRealField, ComplexField, base::Scalar};
use num_traits::{float, NumAssign};
use crate::camera::Camera;

#[derive(Copy, Clone, Debug)]
pub struct Pinhole<F: float::Float + Scalar + NumAssign + SimdRealField + ComplexField> {
    pub projection: Matrix3<F>,
    pub inverse_projection: Matrix3<F>
}

impl<F: float::Float + Scalar + NumAssign + SimdRealField + ComplexField> Pinhole<F> {
    pub fn new(fx: F, fy: F, cx: F, cy: F) -> Pinhole<F> {
        let projection = Matrix3::<F>::new(
            fx, F::zero(), cx,
            F::zero(), fy, cy,
            F::zero(), F::zero(), F::one());
        let inverse_projection = Matrix3::<F>::new(
            F::one()/fx, F::zero(), -cx/fx,
            F::zero(), F::one()/fy, -cy/fy,
            F::zero(), F::zero(), F::one());

        Pinhole{projection, inverse_projection}
    }

    pub fn from_matrix(mat: &Matrix3<F>) -> Pinhole<F> {
        Pinhole::new(mat[(0,0)], mat[(1,1)], mat[(0,2)], mat[(1,2)])
    }

    pub fn get_fx(&self) -> F {
        self.projection[(0,0)]
    }

    pub fn get_fy(&self) -> F {
        self.projection[(1,1)]
    }

    pub fn get_cx(&self) -> F {
        self.projection[(0,2)]
    }

    pub fn get_cy(&self) -> F {
        self.projection[(1,2)]
    }
}

impl<F: float::Float + Scalar + NumAssign + SimdRealField + ComplexField> Camera<F> for Pinhole<F> {
    fn get_projection(&self) -> Matrix3<F> {
        self.projection
    }

    fn get_inverse_projection(&self) -> Matrix3<F> {
        self.inverse_projection
    }

    fn project(&self, position: &Vector3<F>) -> Vector2<F> {
        let z = position[2];
        let homogeneous = position/z;
        let projected_coordinates = self.projection*homogeneous;
        Vector2::<F>::new(projected_coordinates[0], projected_coordinates[1])
    }

    fn backproject(&self, point: &Vector2<F>, depth: F) -> Vector3<F> {
        let homogeneous = Vector3::<F>::new(point[0], point[1], F::one());
        (self.inverse_projection*homogeneous).scale(depth)
    }
}
