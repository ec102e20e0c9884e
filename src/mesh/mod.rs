extern crate nalgebra as na;
extern crate rand;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use na::{Point3, Vector3, Matrix4};
use rand::Rng;
use thiserror::Error;

use crate::Float;

#[derive(Error, Debug)]
pub enum MeshLoadError {
    #[error("io error reading mesh: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed mesh file at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("mesh has no faces")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Point3<Float>>,
    pub faces: Vec<[usize; 3]>,
    pub scale: Float,
}

impl Mesh {
    pub fn new(vertices: Vec<Point3<Float>>, faces: Vec<[usize; 3]>) -> Mesh {
        let scale = extent(&vertices);
        Mesh { vertices, faces, scale }
    }

    /**
     * Wavefront OBJ, v/f records only. Faces with more than 3 indices are
     * fanned into triangles. Indices are 1-based and may carry /vt/vn parts.
     */
    pub fn load_obj(file_path: &Path) -> Result<Mesh, MeshLoadError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);

        let mut vertices = Vec::<Point3<Float>>::new();
        let mut faces = Vec::<[usize; 3]>::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = idx + 1;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let coords = tokens
                        .take(3)
                        .map(|t| t.parse::<Float>())
                        .collect::<Result<Vec<Float>, _>>()
                        .map_err(|e| MeshLoadError::Parse { line: line_number, message: e.to_string() })?;
                    if coords.len() != 3 {
                        return Err(MeshLoadError::Parse { line: line_number, message: format!("vertex has {} coordinates", coords.len()) });
                    }
                    if coords.iter().any(|c| !c.is_finite()) {
                        return Err(MeshLoadError::Parse { line: line_number, message: String::from("non-finite vertex coordinate") });
                    }
                    vertices.push(Point3::new(coords[0], coords[1], coords[2]));
                },
                Some("f") => {
                    let indices = tokens
                        .map(|t| parse_face_index(t, vertices.len()).ok_or(MeshLoadError::Parse { line: line_number, message: format!("bad face index '{}'", t) }))
                        .collect::<Result<Vec<usize>, _>>()?;
                    if indices.len() < 3 {
                        return Err(MeshLoadError::Parse { line: line_number, message: format!("face has {} indices", indices.len()) });
                    }
                    for i in 1..indices.len() - 1 {
                        faces.push([indices[0], indices[i], indices[i + 1]]);
                    }
                },
                _ => () // comments, normals, materials
            }
        }

        if faces.is_empty() {
            return Err(MeshLoadError::Empty);
        }

        Ok(Mesh::new(vertices, faces))
    }

    /**
     * Area-weighted centroid over the triangle surface. Used as the pivot for
     * all sampled rotations.
     */
    pub fn center_of_mass(&self) -> Vector3<Float> {
        let mut weighted = Vector3::<Float>::zeros();
        let mut total_area = 0.0;
        for face in &self.faces {
            let (a, b, c) = self.triangle(face);
            let area = (b - a).cross(&(c - a)).norm() / 2.0;
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            weighted += area * centroid;
            total_area += area;
        }
        match total_area > 0.0 {
            true => weighted / total_area,
            false => weighted
        }
    }

    pub fn triangle(&self, face: &[usize; 3]) -> (Point3<Float>, Point3<Float>, Point3<Float>) {
        (self.vertices[face[0]], self.vertices[face[1]], self.vertices[face[2]])
    }

    /**
     * Area-weighted surface sampling, used for the shape-match dissimilarity.
     */
    pub fn sample_surface<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Point3<Float>> {
        if self.faces.is_empty() {
            return Vec::new();
        }
        let areas = self.faces.iter().map(|face| {
            let (a, b, c) = self.triangle(face);
            (b - a).cross(&(c - a)).norm() / 2.0
        }).collect::<Vec<Float>>();
        let total: Float = areas.iter().sum();

        let mut points = Vec::<Point3<Float>>::with_capacity(count);
        for _ in 0..count {
            let mut pick = rng.gen_range(0.0..1.0) * total;
            let mut face_idx = self.faces.len() - 1;
            for (i, area) in areas.iter().enumerate() {
                if pick <= *area {
                    face_idx = i;
                    break;
                }
                pick -= area;
            }
            let (a, b, c) = self.triangle(&self.faces[face_idx]);
            let mut r1 = rng.gen_range(0.0..1.0);
            let mut r2 = rng.gen_range(0.0..1.0);
            if r1 + r2 > 1.0 {
                r1 = 1.0 - r1;
                r2 = 1.0 - r2;
            }
            points.push(a + (b - a) * r1 + (c - a) * r2);
        }
        points
    }

    pub fn transformed_vertices(&self, pose: &Matrix4<Float>) -> Vec<Point3<Float>> {
        self.vertices.iter().map(|v| pose.transform_point(v)).collect::<Vec<Point3<Float>>>()
    }

    /**
     * Axis-aligned box centered on the origin. Test and demo fixture.
     */
    pub fn cuboid(x: Float, y: Float, z: Float) -> Mesh {
        let hx = x / 2.0;
        let hy = y / 2.0;
        let hz = z / 2.0;
        let vertices = vec!(
            Point3::new(-hx, -hy, -hz), Point3::new(hx, -hy, -hz),
            Point3::new(hx, hy, -hz), Point3::new(-hx, hy, -hz),
            Point3::new(-hx, -hy, hz), Point3::new(hx, -hy, hz),
            Point3::new(hx, hy, hz), Point3::new(-hx, hy, hz),
        );
        let faces = vec!(
            [0, 2, 1], [0, 3, 2], // bottom
            [4, 5, 6], [4, 6, 7], // top
            [0, 1, 5], [0, 5, 4],
            [1, 2, 6], [1, 6, 5],
            [2, 3, 7], [2, 7, 6],
            [3, 0, 4], [3, 4, 7],
        );
        Mesh::new(vertices, faces)
    }
}

fn parse_face_index(token: &str, vertex_count: usize) -> Option<usize> {
    let first = token.split('/').next()?;
    let idx = first.parse::<i64>().ok()?;
    let resolved = match idx {
        i if i > 0 => i as usize - 1,
        i if i < 0 => (vertex_count as i64 + i) as usize, // negative indices count from the end
        _ => return None
    };
    match resolved < vertex_count {
        true => Some(resolved),
        false => None
    }
}

fn extent(vertices: &Vec<Point3<Float>>) -> Float {
    if vertices.is_empty() {
        return 0.0;
    }
    let mut min = vertices[0];
    let mut max = vertices[0];
    for v in vertices {
        for i in 0..3 {
            min[i] = min[i].min(v[i]);
            max[i] = max[i].max(v[i]);
        }
    }
    (max - min).norm()
}
