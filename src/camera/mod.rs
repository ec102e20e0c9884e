extern crate nalgebra as na;
extern crate num_traits;

use na::{Matrix3, Vector3, Vector2, SimdRealField, ComplexField, base::Scalar};
use num_traits::{float, NumAssign};

pub mod pinhole;

pub use self::pinhole::Pinhole;

pub trait Camera<F: float::Float + Scalar + NumAssign + SimdRealField + ComplexField> {
    fn get_projection(&self) -> Matrix3<F>;
    fn get_inverse_projection(&self) -> Matrix3<F>;
    fn project(&self, position: &Vector3<F>) -> Vector2<F>;
    fn backproject(&self, point: &Vector2<F>, depth: F) -> Vector3<F>;
}
