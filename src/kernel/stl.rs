//! Binary STL output.
//!
//! Layout: 80-byte header, u32 triangle count, then 50 bytes per triangle
//! (normal, three vertices, u16 attribute count), all little-endian.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::models::Bounds;

/// A facet with its outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub normal: [f32; 3],
    pub vertices: [[f32; 3]; 3],
}

/// Corner indices and outward normal of each box face, wound
/// counter-clockwise as seen from outside.
const BOX_FACES: [([usize; 4], [f32; 3]); 6] = [
    ([0, 3, 2, 1], [0.0, 0.0, -1.0]),
    ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
    ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
    ([1, 2, 6, 5], [1.0, 0.0, 0.0]),
    ([2, 3, 7, 6], [0.0, 1.0, 0.0]),
    ([3, 0, 4, 7], [-1.0, 0.0, 0.0]),
];

/// Tessellate a bounding box into 12 triangles.
pub fn box_triangles(bounds: &Bounds) -> Vec<Triangle> {
    let corners = bounds
        .corners()
        .map(|c| [c[0] as f32, c[1] as f32, c[2] as f32]);

    BOX_FACES
        .iter()
        .flat_map(|&([a, b, c, d], normal)| {
            [
                Triangle {
                    normal,
                    vertices: [corners[a], corners[b], corners[c]],
                },
                Triangle {
                    normal,
                    vertices: [corners[a], corners[c], corners[d]],
                },
            ]
        })
        .collect()
}

/// Write triangles to `path` in binary STL format.
pub fn write_stl(path: &Path, triangles: &[Triangle]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let header = format!("cadlink STL export - {} triangles", triangles.len());
    let mut header_bytes = [b' '; 80];
    let header_len = header.len().min(80);
    header_bytes[..header_len].copy_from_slice(&header.as_bytes()[..header_len]);
    writer.write_all(&header_bytes)?;

    writer.write_all(&(triangles.len() as u32).to_le_bytes())?;

    for triangle in triangles {
        for component in triangle.normal {
            writer.write_all(&component.to_le_bytes())?;
        }
        for vertex in triangle.vertices {
            for component in vertex {
                writer.write_all(&component.to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()
}
