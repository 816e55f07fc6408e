// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Procedural meshes used in place of file-loaded models.

/// A vertex with position, normal, tangent and texture coordinates.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit normal.
    pub normal: [f32; 3],
    /// Unit tangent along increasing `u`.
    pub tangent_u: [f32; 3],
    /// Texture coordinates.
    pub tex_coord: [f32; 2],
}

impl Vertex {
    fn new(position: [f32; 3], normal: [f32; 3], tangent_u: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tangent_u,
            tex_coord,
        }
    }
}

/// CPU-side mesh data with 32-bit indices.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex list.
    pub vertices: Vec<Vertex>,
    /// Triangle list indices.
    pub indices32: Vec<u32>,
}

impl MeshData {
    /// The indices narrowed to 16 bits, or `None` if any index does not fit.
    pub fn indices16(&self) -> Option<Vec<u16>> {
        self.indices32
            .iter()
            .map(|&i| u16::try_from(i).ok())
            .collect()
    }
}

/// An axis-aligned box centered at the origin, four vertices per face.
pub fn create_box(width: f32, height: f32, depth: f32) -> MeshData {
    let (w, h, d) = (0.5 * width, 0.5 * height, 0.5 * depth);

    // (normal, tangent, four corners counter-clockwise seen from outside)
    let faces: [([f32; 3], [f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [[-w, -h, -d], [-w, h, -d], [w, h, -d], [w, -h, -d]]),
        ([0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [[-w, -h, d], [w, -h, d], [w, h, d], [-w, h, d]]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [[-w, h, -d], [-w, h, d], [w, h, d], [w, h, -d]]),
        ([0.0, -1.0, 0.0], [-1.0, 0.0, 0.0], [[-w, -h, -d], [w, -h, -d], [w, -h, d], [-w, -h, d]]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [[-w, -h, d], [-w, h, d], [-w, h, -d], [-w, -h, -d]]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [[w, -h, -d], [w, h, -d], [w, h, d], [w, -h, d]]),
    ];
    let uvs = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

    let mut mesh = MeshData::default();
    for (normal, tangent, corners) in faces {
        let base = mesh.vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(uvs) {
            mesh.vertices.push(Vertex::new(corner, normal, tangent, uv));
        }
        mesh.indices32
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// A flat `width` x `depth` grid in the XZ plane with `rows` x `cols` vertices.
///
/// # Panics
///
/// Panics if `rows` or `cols` is below 2.
pub fn create_grid(width: f32, depth: f32, rows: u32, cols: u32) -> MeshData {
    assert!(rows >= 2 && cols >= 2, "a grid needs at least 2x2 vertices");

    let (half_w, half_d) = (0.5 * width, 0.5 * depth);
    let dx = width / (cols - 1) as f32;
    let dz = depth / (rows - 1) as f32;
    let du = 1.0 / (cols - 1) as f32;
    let dv = 1.0 / (rows - 1) as f32;

    let mut mesh = MeshData {
        vertices: Vec::with_capacity((rows * cols) as usize),
        indices32: Vec::with_capacity(((rows - 1) * (cols - 1) * 6) as usize),
    };
    for i in 0..rows {
        let z = half_d - i as f32 * dz;
        for j in 0..cols {
            let x = -half_w + j as f32 * dx;
            mesh.vertices.push(Vertex::new(
                [x, 0.0, z],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [j as f32 * du, i as f32 * dv],
            ));
        }
    }
    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let at = |r: u32, c: u32| r * cols + c;
            mesh.indices32.extend_from_slice(&[
                at(i, j),
                at(i, j + 1),
                at(i + 1, j),
                at(i + 1, j),
                at(i, j + 1),
                at(i + 1, j + 1),
            ]);
        }
    }
    mesh
}
