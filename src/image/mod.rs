extern crate image as image_rs;
extern crate nalgebra as na;

use std::path::Path;
use image_rs::{GrayImage, Luma};
use na::DMatrix;

use crate::Float;

/**
 * A rendered depth map in normalized camera range. The stored convention is
 * inverted depth: background (far/empty) pixels are 0.0, near foreground
 * pixels approach 1.0. All dissimilarity scores assume this convention.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    pub buffer: DMatrix<Float>
}

impl DepthImage {

    pub fn from_matrix(matrix: DMatrix<Float>) -> DepthImage {
        DepthImage { buffer: matrix }
    }

    pub fn zeros(width: usize, height: usize) -> DepthImage {
        DepthImage { buffer: DMatrix::<Float>::zeros(height, width) }
    }

    pub fn width(&self) -> usize {
        self.buffer.ncols()
    }

    pub fn height(&self) -> usize {
        self.buffer.nrows()
    }

    pub fn size(&self) -> usize {
        self.buffer.ncols()*self.buffer.nrows()
    }

    /**
     * Maps normalized depth to the inverted foreground convention.
     */
    pub fn from_normalized_depth(depth: &DMatrix<Float>) -> DepthImage {
        let mut buffer = depth.clone();
        for elem in buffer.iter_mut() {
            *elem = 1.0 - *elem;
        }
        DepthImage { buffer }
    }

    /**
     * Pixel-space L2 distance (Frobenius norm of the difference). Zero iff
     * the images are identical.
     */
    pub fn l2_distance(&self, other: &DepthImage) -> Float {
        assert_eq!(self.buffer.shape(), other.buffer.shape());
        (&self.buffer - &other.buffer).norm()
    }

    pub fn to_gray_image(&self) -> GrayImage {
        let width = self.width() as u32;
        let height = self.height() as u32;
        GrayImage::from_fn(width, height, |x, y| {
            let v = self.buffer[(y as usize, x as usize)].max(0.0).min(1.0);
            Luma([(v*255.0) as u8])
        })
    }

    pub fn save_png(&self, file_path: &Path) -> Result<(), image_rs::ImageError> {
        self.to_gray_image().save(file_path)
    }
}
