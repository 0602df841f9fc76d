use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use obj::raw::{object::Polygon, parse_obj};
use thiserror::Error;

use crate::math::{vec4, Vec4};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read obj file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse obj file: {0}")]
    Parse(#[from] obj::ObjError),
    #[error("face with {0} vertices, only triangulated models are supported")]
    NotTriangulated(usize),
}

/// Single counter-clockwise triangle covering most of the viewport.
#[allow(unused)]
pub fn triangle() -> Vec<Vec4> {
    vec![
        vec4(-0.8, -0.8, 0.0, 1.0),
        vec4(0.8, -0.8, 0.0, 1.0),
        vec4(0.0, 0.8, 0.0, 1.0),
    ]
}

/// Two triangles forming a centered quad in the z = 0 plane.
#[allow(unused)]
pub fn quad(width: f32) -> Vec<Vec4> {
    let h = width / 2.0;
    vec![
        vec4(-h, -h, 0.0, 1.0),
        vec4(h, -h, 0.0, 1.0),
        vec4(h, h, 0.0, 1.0),
        vec4(-h, -h, 0.0, 1.0),
        vec4(h, h, 0.0, 1.0),
        vec4(-h, h, 0.0, 1.0),
    ]
}

/// Axis-aligned cube centered on the origin, 12 triangles wound
/// counter-clockwise when seen from outside.
#[allow(unused)]
pub fn cube(width: f32) -> Vec<Vec4> {
    let h = width / 2.0;

    // Each face as its four corners, counter-clockwise from outside.
    let faces = [
        // Near (z towards the viewer)
        [(-h, -h, h), (h, -h, h), (h, h, h), (-h, h, h)],
        // Far
        [(h, -h, -h), (-h, -h, -h), (-h, h, -h), (h, h, -h)],
        // Left
        [(-h, -h, -h), (-h, -h, h), (-h, h, h), (-h, h, -h)],
        // Right
        [(h, -h, h), (h, -h, -h), (h, h, -h), (h, h, h)],
        // Top
        [(-h, h, h), (h, h, h), (h, h, -h), (-h, h, -h)],
        // Bottom
        [(-h, -h, -h), (h, -h, -h), (h, -h, h), (-h, -h, h)],
    ];

    let mut vertices = Vec::with_capacity(faces.len() * 6);
    for corners in &faces {
        let mut add_triangle = |i: usize, j: usize, k: usize| {
            for &(x, y, z) in &[corners[i], corners[j], corners[k]] {
                vertices.push(vec4(x, y, z, 1.0));
            }
        };
        add_triangle(0, 1, 2);
        add_triangle(0, 2, 3);
    }

    vertices
}

/// Loads a triangulated Wavefront OBJ as a flat triangle list, positions
/// only, w forced to 1.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Vec<Vec4>, LoadError> {
    let raw = parse_obj(BufReader::new(File::open(path.as_ref())?))?;

    let mut vertices = Vec::with_capacity(raw.polygons.len() * 3);
    for polygon in &raw.polygons {
        let indices: Vec<usize> = match polygon {
            Polygon::P(v) => v.clone(),
            Polygon::PT(v) => v.iter().map(|&(p, _)| p).collect(),
            Polygon::PN(v) => v.iter().map(|&(p, _)| p).collect(),
            Polygon::PTN(v) => v.iter().map(|&(p, _, _)| p).collect(),
        };
        if indices.len() != 3 {
            return Err(LoadError::NotTriangulated(indices.len()));
        }
        for i in indices {
            let (x, y, z, _) = raw.positions[i];
            vertices.push(vec4(x, y, z, 1.0));
        }
    }

    log::info!(
        "loaded {} triangles from {}",
        vertices.len() / 3,
        path.as_ref().display()
    );
    Ok(vertices)
}
