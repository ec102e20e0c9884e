extern crate nalgebra as na;

use na::{Matrix4, Vector2, Vector3, Unit, Isometry3, Translation3, UnitQuaternion, DMatrix};

use crate::Float;
use crate::camera::{Camera, Pinhole};
use crate::image::DepthImage;
use crate::mesh::Mesh;

/**
 * Stateless depth rendering seam. Implementations must be deterministic:
 * identical mesh and pose always produce the identical image.
 */
pub trait DepthRenderer {
    fn render(&self, mesh: &Mesh, pose: &Matrix4<Float>) -> DepthImage;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
}

/**
 * Software z-buffer rasterizer with a fixed overhead camera looking down the
 * world -Z axis from view_distance above the support plane. Depth values are
 * normalized to [0,1] over [znear,zfar] and stored inverted (see DepthImage).
 */
pub struct RasterRenderer {
    pub camera: Pinhole<Float>,
    pub viewport_width: usize,
    pub viewport_height: usize,
    pub znear: Float,
    pub zfar: Float,
    view: Isometry3<Float>
}

impl RasterRenderer {

    pub fn overhead(camera: Pinhole<Float>, viewport_width: usize, viewport_height: usize, znear: Float, zfar: Float, view_distance: Float) -> RasterRenderer {
        // camera frame: +z points into the scene, so flip around x
        let camera_pose = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, view_distance),
            UnitQuaternion::from_axis_angle(&Unit::new_normalize(Vector3::x()), std::f64::consts::PI));
        RasterRenderer { camera, viewport_width, viewport_height, znear, zfar, view: camera_pose.inverse() }
    }

    fn normalize_depth(&self, z: Float) -> Float {
        ((z - self.znear)/(self.zfar - self.znear)).max(0.0).min(1.0)
    }
}

impl DepthRenderer for RasterRenderer {

    fn render(&self, mesh: &Mesh, pose: &Matrix4<Float>) -> DepthImage {
        let mut depth = DMatrix::<Float>::from_element(self.viewport_height, self.viewport_width, self.zfar);

        let camera_space = mesh.vertices.iter()
            .map(|v| self.view*pose.transform_point(v))
            .collect::<Vec<na::Point3<Float>>>();

        for face in &mesh.faces {
            let a = &camera_space[face[0]];
            let b = &camera_space[face[1]];
            let c = &camera_space[face[2]];

            if a[2] <= self.znear || b[2] <= self.znear || c[2] <= self.znear {
                continue;
            }

            let pa = self.camera.project(&a.coords);
            let pb = self.camera.project(&b.coords);
            let pc = self.camera.project(&c.coords);

            rasterize_triangle(&mut depth, (&pa, a[2]), (&pb, b[2]), (&pc, c[2]));
        }

        let normalized = depth.map(|z| self.normalize_depth(z));
        DepthImage::from_normalized_depth(&normalized)
    }

    fn width(&self) -> usize {
        self.viewport_width
    }

    fn height(&self) -> usize {
        self.viewport_height
    }
}

fn edge(a: &Vector2<Float>, b: &Vector2<Float>, p: &Vector2<Float>) -> Float {
    (b[0] - a[0])*(p[1] - a[1]) - (b[1] - a[1])*(p[0] - a[0])
}

fn rasterize_triangle(depth: &mut DMatrix<Float>, (pa, za): (&Vector2<Float>, Float), (pb, zb): (&Vector2<Float>, Float), (pc, zc): (&Vector2<Float>, Float)) {
    let height = depth.nrows();
    let width = depth.ncols();

    let area = edge(pa, pb, pc);
    if area.abs() < 1e-12 {
        return;
    }

    let min_x = pa[0].min(pb[0]).min(pc[0]).floor().max(0.0) as usize;
    let max_x = (pa[0].max(pb[0]).max(pc[0]).ceil() as usize).min(width.saturating_sub(1));
    let min_y = pa[1].min(pb[1]).min(pc[1]).floor().max(0.0) as usize;
    let max_y = (pa[1].max(pb[1]).max(pc[1]).ceil() as usize).min(height.saturating_sub(1));

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Vector2::<Float>::new(x as Float + 0.5, y as Float + 0.5);
            let w0 = edge(pb, pc, &p)/area;
            let w1 = edge(pc, pa, &p)/area;
            let w2 = edge(pa, pb, &p)/area;

            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let z = w0*za + w1*zb + w2*zc;
            if z < depth[(y, x)] {
                depth[(y, x)] = z;
            }
        }
    }
}
