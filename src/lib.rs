
pub mod quaternion;
pub mod mesh;
pub mod stable_pose;
pub mod camera;
pub mod image;
pub mod render;
pub mod dataset;
pub mod pairgen;
pub mod controller;
pub mod visualize;
pub mod io;
pub mod config;

macro_rules! define_float {
    ($f:tt) => {
        pub use std::$f as float;
        pub type Float = $f;
    }
}

define_float!(f64);
