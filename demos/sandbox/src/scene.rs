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

//! The procedural demo scene: hills, crates, pillars and a sky box.

use anyhow::{Context, Result};
use inflight_core::math::{Mat4, Vec3};
use inflight_core::renderer::{
    scene_root_signature, CompareFunction, CpuDescriptorHandle, DepthStencilState,
    DescriptorHeapDescriptor, DescriptorHeapType, GpuDescriptorHandle, GraphicsDevice,
    MaterialConstants, PipelineRegistry, PipelineStateDescriptor, StencilOperation, StencilState,
    TextureDescriptor, TextureFormat, OPAQUE_PIPELINE, OUTLINE_PIPELINE, SKY_PIPELINE,
};
use inflight_data::mesh::{create_box, create_grid, MeshData};
use inflight_data::{
    DrawRange, Geometry, MaterialDescriptor, RenderLayer, RenderableDescriptor, RenderableHandle,
    SceneRegistry,
};
use inflight_lanes::GlobalBindings;

// Shader-visible heap layout: three textures per material, then the cube map.
const GRASS_SRV: u32 = 0;
const CRATE_SRV: u32 = 3;
const STONE_SRV: u32 = 6;
const SKY_SRV: u32 = 9;
const SRV_HEAP_CAPACITY: u32 = 10;

/// Builds the shared root signature and the three named pipelines.
///
/// The headless backend never runs shaders, so the bytecode is empty.
pub fn create_pipelines(device: &dyn GraphicsDevice) -> Result<PipelineRegistry> {
    let root = device.create_root_signature(&scene_root_signature())?;
    let mut registry = PipelineRegistry::new(root);

    let states = [
        (
            SKY_PIPELINE,
            DepthStencilState {
                depth_compare: CompareFunction::LessEqual,
                ..DepthStencilState::default()
            },
        ),
        (
            OPAQUE_PIPELINE,
            DepthStencilState {
                stencil: Some(StencilState {
                    compare: CompareFunction::Always,
                    pass_op: StencilOperation::Replace,
                }),
                ..DepthStencilState::default()
            },
        ),
        (
            OUTLINE_PIPELINE,
            DepthStencilState {
                depth_test: false,
                depth_write: false,
                stencil: Some(StencilState {
                    compare: CompareFunction::NotEqual,
                    pass_op: StencilOperation::Keep,
                }),
                ..DepthStencilState::default()
            },
        ),
    ];
    for (name, depth_stencil) in states {
        let pipeline = device.create_pipeline_state(&PipelineStateDescriptor {
            label: name,
            root_signature: root,
            vertex_shader: &[],
            pixel_shader: &[],
            depth_stencil,
            render_target_format: TextureFormat::Bgra8Unorm,
            depth_stencil_format: TextureFormat::Depth24UnormStencil8,
        })?;
        registry.register(name, pipeline)?;
    }
    Ok(registry)
}

/// Creates the shader-visible heap, one placeholder texture per slot, and the
/// sky cube map.
pub fn create_bindings(device: &dyn GraphicsDevice) -> Result<GlobalBindings> {
    let srv_heap = device.create_descriptor_heap(&DescriptorHeapDescriptor {
        label: Some("srv_heap".to_string()),
        heap_type: DescriptorHeapType::CbvSrvUav,
        capacity: SRV_HEAP_CAPACITY,
        shader_visible: true,
    })?;

    for (name, first) in [("grass", GRASS_SRV), ("crate", CRATE_SRV), ("stone", STONE_SRV)] {
        for (offset, kind) in ["diffuse", "specular", "normal"].iter().enumerate() {
            let texture = device.create_texture(&TextureDescriptor {
                label: Some(format!("{name}_{kind}")),
                width: 256,
                height: 256,
                array_layers: 1,
                format: TextureFormat::Rgba8Unorm,
            })?;
            device.create_shader_resource_view(
                texture,
                CpuDescriptorHandle::new(srv_heap, first + offset as u32),
            )?;
        }
    }

    let cubemap = device.create_texture(&TextureDescriptor {
        label: Some("sky_cubemap".to_string()),
        width: 512,
        height: 512,
        array_layers: 6,
        format: TextureFormat::Rgba8Unorm,
    })?;
    device.create_shader_resource_view(cubemap, CpuDescriptorHandle::new(srv_heap, SKY_SRV))?;

    Ok(GlobalBindings {
        srv_heap,
        sky_cubemap: Some(GpuDescriptorHandle::new(srv_heap, SKY_SRV)),
    })
}

/// The registry plus the handles the demo animates.
pub struct DemoScene {
    pub registry: SceneRegistry,
    spinning: RenderableHandle,
}

impl DemoScene {
    pub fn build(device: &dyn GraphicsDevice, frame_count: usize) -> Result<Self> {
        let mut registry = SceneRegistry::new(frame_count);

        let land = hills(create_grid(160.0, 160.0, 50, 50));
        let land = registry.add_geometry(Geometry::upload(
            device,
            "land",
            &land.vertices,
            &land.indices32,
        )?)?;
        let shapes = registry.add_geometry(shapes_geometry(device)?)?;
        let sky_box = create_box(1.0, 1.0, 1.0);
        let sky_indices = sky_box
            .indices16()
            .context("sky box does not fit 16-bit indices")?;
        let sky = registry.add_geometry(Geometry::upload(
            device,
            "sky",
            &sky_box.vertices,
            &sky_indices,
        )?)?;

        let grass = registry.add_material(MaterialDescriptor {
            constants: MaterialConstants {
                diffuse_albedo: [0.2, 0.6, 0.2, 1.0],
                fresnel_r0: [0.01, 0.01, 0.01],
                roughness: 0.9,
                ..MaterialConstants::default()
            },
            ..MaterialDescriptor::new("grass", GRASS_SRV)
        })?;
        let wood = registry.add_material(MaterialDescriptor {
            constants: MaterialConstants {
                fresnel_r0: [0.05, 0.05, 0.05],
                roughness: 0.2,
                specular_shininess: 32.0,
                ..MaterialConstants::default()
            },
            ..MaterialDescriptor::new("crate", CRATE_SRV)
        })?;
        let stone = registry.add_material(MaterialDescriptor::new("stone", STONE_SRV))?;
        let sky_material = registry.add_material(MaterialDescriptor::new("sky", SKY_SRV))?;

        registry.add_renderable(
            RenderableDescriptor::new(sky, sky_material)
                .with_world(Mat4::from_scale(Vec3::new(5000.0, 5000.0, 5000.0)))
                .in_layer(RenderLayer::Sky),
        )?;
        registry.add_renderable(RenderableDescriptor::new(land, grass))?;

        let crate_world = crate_transform(0.0);
        let spinning = registry.add_renderable(
            RenderableDescriptor::new(shapes, wood)
                .with_submesh("crate")
                .with_world(crate_world),
        )?;
        registry.add_renderable(
            RenderableDescriptor::new(shapes, wood)
                .with_submesh("crate")
                .with_world(crate_world * Mat4::from_scale(Vec3::new(1.05, 1.05, 1.05)))
                .in_layer(RenderLayer::Outline),
        )?;

        for i in 0..5 {
            let z = -10.0 + 5.0 * i as f32;
            for x in [-5.0, 5.0] {
                registry.add_renderable(
                    RenderableDescriptor::new(shapes, stone)
                        .with_submesh("pillar")
                        .with_world(Mat4::from_translation(Vec3::new(x, hill_height(x, z) + 1.5, z))),
                )?;
            }
        }

        log::info!(
            "Sandbox: scene with {} renderables and {} materials",
            registry.object_count(),
            registry.material_count()
        );
        Ok(Self { registry, spinning })
    }

    /// Turns the crate. Its outline stays put, which shows the stencil pass.
    pub fn animate(&mut self, total_time: f32) -> Result<()> {
        self.registry
            .set_world_transform(self.spinning, crate_transform(total_time))?;
        Ok(())
    }
}

fn crate_transform(angle: f32) -> Mat4 {
    let (x, z) = (0.0, 0.0);
    Mat4::from_translation(Vec3::new(x, hill_height(x, z) + 2.0, z)) * Mat4::from_rotation_y(angle)
}

fn hill_height(x: f32, z: f32) -> f32 {
    0.3 * (z * (0.1 * x).sin() + x * (0.1 * z).cos())
}

fn hill_normal(x: f32, z: f32) -> Vec3 {
    Vec3::new(
        -0.03 * z * (0.1 * x).cos() - 0.3 * (0.1 * z).cos(),
        1.0,
        -0.3 * (0.1 * x).sin() + 0.03 * x * (0.1 * z).sin(),
    )
    .normalize()
}

fn hills(mut grid: MeshData) -> MeshData {
    for v in &mut grid.vertices {
        let [x, _, z] = v.position;
        v.position[1] = hill_height(x, z);
        v.normal = hill_normal(x, z).to_array();
    }
    grid
}

/// A crate and a pillar sharing one vertex and index buffer.
fn shapes_geometry(device: &dyn GraphicsDevice) -> Result<Geometry> {
    let crate_mesh = create_box(3.0, 3.0, 3.0);
    let pillar_mesh = create_box(1.0, 3.0, 1.0);

    let crate_range = DrawRange {
        index_count: crate_mesh.indices32.len() as u32,
        start_index: 0,
        base_vertex: 0,
    };
    let pillar_range = DrawRange {
        index_count: pillar_mesh.indices32.len() as u32,
        start_index: crate_range.index_count,
        base_vertex: crate_mesh.vertices.len() as i32,
    };

    let vertices: Vec<_> = crate_mesh
        .vertices
        .iter()
        .chain(&pillar_mesh.vertices)
        .copied()
        .collect();
    let indices: Vec<u32> = crate_mesh
        .indices32
        .iter()
        .chain(&pillar_mesh.indices32)
        .copied()
        .collect();

    let mut geometry = Geometry::upload(device, "shapes", &vertices, &indices)?;
    geometry.add_draw_range("crate", crate_range)?;
    geometry.add_draw_range("pillar", pillar_range)?;
    Ok(geometry)
}
