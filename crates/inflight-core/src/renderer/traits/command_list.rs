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

use std::any::Any;
use std::fmt::Debug;

use crate::renderer::api::{
    ClearFlags, CpuDescriptorHandle, DescriptorHeapId, GpuAddress, GpuDescriptorHandle,
    IndexBufferView, PipelineStateId, PrimitiveTopology, ResourceBarrier, RootSignatureId,
    ScissorRect, VertexBufferView, Viewport,
};
use crate::renderer::error::RenderError;

/// Backing memory for recorded commands.
///
/// Resetting reclaims that memory, so it must only happen once the GPU has
/// finished every command list recorded into it.
pub trait CommandAllocator: Send + Debug {
    /// Makes the allocator reusable.
    fn reset(&mut self) -> Result<(), RenderError>;

    /// Allows downcasting to a concrete backend.
    fn as_any(&self) -> &dyn Any;
}

/// A list of GPU commands recorded on the CPU and executed by a
/// [`CommandQueue`](super::CommandQueue).
///
/// Recording calls are infallible; misuse (recording while closed) is reported
/// by [`CommandList::close`], the way native APIs defer validation.
pub trait CommandList: Send + Debug {
    /// Starts recording into `allocator` with `initial_pipeline` bound.
    fn reset(
        &mut self,
        allocator: &dyn CommandAllocator,
        initial_pipeline: Option<PipelineStateId>,
    ) -> Result<(), RenderError>;

    /// Finishes recording. The list can then be executed, and nothing more can be
    /// recorded until the next reset.
    fn close(&mut self) -> Result<(), RenderError>;

    /// Whether the list is between a reset and a close.
    fn is_recording(&self) -> bool;

    /// Binds a pipeline-state object.
    fn set_pipeline_state(&mut self, pipeline: PipelineStateId);

    /// Binds the graphics root signature.
    fn set_graphics_root_signature(&mut self, root_signature: RootSignatureId);

    /// Binds the shader-visible descriptor heaps.
    fn set_descriptor_heaps(&mut self, heaps: &[DescriptorHeapId]);

    /// Sets the viewport.
    fn set_viewport(&mut self, viewport: &Viewport);

    /// Sets the scissor rectangle.
    fn set_scissor_rect(&mut self, rect: &ScissorRect);

    /// Records resource-state transitions.
    fn resource_barrier(&mut self, barriers: &[ResourceBarrier]);

    /// Binds the color and depth-stencil targets.
    fn set_render_targets(
        &mut self,
        render_target: CpuDescriptorHandle,
        depth_stencil: Option<CpuDescriptorHandle>,
    );

    /// Clears a render target view.
    fn clear_render_target_view(&mut self, view: CpuDescriptorHandle, color: [f32; 4]);

    /// Clears a depth-stencil view.
    fn clear_depth_stencil_view(
        &mut self,
        view: CpuDescriptorHandle,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    );

    /// Sets the stencil reference value.
    fn set_stencil_ref(&mut self, reference: u32);

    /// Sets the primitive topology.
    fn set_primitive_topology(&mut self, topology: PrimitiveTopology);

    /// Binds vertex buffers starting at `start_slot`.
    fn set_vertex_buffers(&mut self, start_slot: u32, views: &[VertexBufferView]);

    /// Binds the index buffer.
    fn set_index_buffer(&mut self, view: &IndexBufferView);

    /// Binds a root constant buffer by GPU address.
    fn set_graphics_root_constant_buffer_view(&mut self, parameter: u32, address: GpuAddress);

    /// Binds a root descriptor table.
    fn set_graphics_root_descriptor_table(&mut self, parameter: u32, base: GpuDescriptorHandle);

    /// Issues an indexed, instanced draw.
    fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    );

    /// Allows downcasting to a concrete backend.
    fn as_any(&self) -> &dyn Any;
}
