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
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use inflight_core::renderer::{
    ClearFlags, CommandAllocator, CommandList, CpuDescriptorHandle, DescriptorHeapId, GpuAddress,
    GpuDescriptorHandle, IndexBufferView, PipelineStateId, PrimitiveTopology, RenderError,
    ResourceBarrier, RootSignatureId, ScissorRect, VertexBufferView, Viewport,
};

/// One command as recorded by a [`HeadlessCommandList`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// `set_pipeline_state`, including the initial pipeline passed to `reset`.
    SetPipelineState(PipelineStateId),
    /// `set_graphics_root_signature`.
    SetRootSignature(RootSignatureId),
    /// `set_descriptor_heaps`.
    SetDescriptorHeaps(Vec<DescriptorHeapId>),
    /// `set_viewport`.
    SetViewport(Viewport),
    /// `set_scissor_rect`.
    SetScissorRect(ScissorRect),
    /// `resource_barrier`.
    ResourceBarrier(Vec<ResourceBarrier>),
    /// `set_render_targets`.
    SetRenderTargets {
        /// Color target.
        render_target: CpuDescriptorHandle,
        /// Depth-stencil target.
        depth_stencil: Option<CpuDescriptorHandle>,
    },
    /// `clear_render_target_view`.
    ClearRenderTarget {
        /// Cleared view.
        view: CpuDescriptorHandle,
        /// Clear color.
        color: [f32; 4],
    },
    /// `clear_depth_stencil_view`.
    ClearDepthStencil {
        /// Cleared view.
        view: CpuDescriptorHandle,
        /// Cleared aspects.
        flags: ClearFlags,
        /// Depth value.
        depth: f32,
        /// Stencil value.
        stencil: u8,
    },
    /// `set_stencil_ref`.
    SetStencilRef(u32),
    /// `set_primitive_topology`.
    SetPrimitiveTopology(PrimitiveTopology),
    /// `set_vertex_buffers`.
    SetVertexBuffers {
        /// First slot.
        start_slot: u32,
        /// Bound views.
        views: Vec<VertexBufferView>,
    },
    /// `set_index_buffer`.
    SetIndexBuffer(IndexBufferView),
    /// `set_graphics_root_constant_buffer_view`.
    SetRootConstantBufferView {
        /// Root slot.
        parameter: u32,
        /// Bound address.
        address: GpuAddress,
    },
    /// `set_graphics_root_descriptor_table`.
    SetRootDescriptorTable {
        /// Root slot.
        parameter: u32,
        /// Table base.
        base: GpuDescriptorHandle,
    },
    /// `draw_indexed_instanced`.
    DrawIndexedInstanced {
        /// Indices per instance.
        index_count: u32,
        /// Instances.
        instance_count: u32,
        /// First index.
        start_index: u32,
        /// Added to each index.
        base_vertex: i32,
        /// First instance.
        start_instance: u32,
    },
}

impl RecordedCommand {
    /// Whether this command is a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, RecordedCommand::DrawIndexedInstanced { .. })
    }
}

/// Command memory tracking how many submissions recorded into it are still
/// executing. Resetting while any are refuses with an error.
#[derive(Debug)]
pub struct HeadlessCommandAllocator {
    label: String,
    in_flight: Arc<AtomicUsize>,
    reset_count: usize,
}

impl HeadlessCommandAllocator {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            reset_count: 0,
        }
    }

    /// Submissions recorded into this allocator that the queue has not finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Successful resets so far.
    pub fn reset_count(&self) -> usize {
        self.reset_count
    }
}

impl CommandAllocator for HeadlessCommandAllocator {
    fn reset(&mut self) -> Result<(), RenderError> {
        let pending = self.in_flight();
        if pending > 0 {
            return Err(RenderError::InvalidCommandListState(format!(
                "allocator '{}' reset while {pending} submission(s) still execute",
                self.label
            )));
        }
        self.reset_count += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListState {
    Closed,
    Recording,
}

/// A command list that stores what it records.
#[derive(Debug)]
pub struct HeadlessCommandList {
    label: String,
    state: ListState,
    commands: Vec<RecordedCommand>,
    allocator_in_flight: Option<Arc<AtomicUsize>>,
    deferred_error: Option<String>,
}

impl HeadlessCommandList {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            state: ListState::Closed,
            commands: Vec::new(),
            allocator_in_flight: None,
            deferred_error: None,
        }
    }

    /// Everything recorded since the last reset.
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Counter of the allocator this list last recorded into.
    pub(crate) fn allocator_in_flight(&self) -> Option<&Arc<AtomicUsize>> {
        self.allocator_in_flight.as_ref()
    }

    /// Debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    fn record(&mut self, command: RecordedCommand) {
        if self.state == ListState::Recording {
            self.commands.push(command);
        } else if self.deferred_error.is_none() {
            self.deferred_error = Some(format!("{command:?} recorded into a closed list"));
        }
    }
}

impl CommandList for HeadlessCommandList {
    fn reset(
        &mut self,
        allocator: &dyn CommandAllocator,
        initial_pipeline: Option<PipelineStateId>,
    ) -> Result<(), RenderError> {
        if self.state == ListState::Recording {
            return Err(RenderError::InvalidCommandListState(format!(
                "list '{}' reset while still recording",
                self.label
            )));
        }
        let allocator = allocator
            .as_any()
            .downcast_ref::<HeadlessCommandAllocator>()
            .ok_or_else(|| {
                RenderError::InvalidCommandListState(
                    "allocator does not belong to the headless backend".to_string(),
                )
            })?;

        self.allocator_in_flight = Some(allocator.in_flight.clone());
        self.commands.clear();
        self.deferred_error = None;
        self.state = ListState::Recording;
        if let Some(pipeline) = initial_pipeline {
            self.commands.push(RecordedCommand::SetPipelineState(pipeline));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), RenderError> {
        if self.state == ListState::Closed {
            return Err(RenderError::InvalidCommandListState(format!(
                "list '{}' closed twice",
                self.label
            )));
        }
        self.state = ListState::Closed;
        match self.deferred_error.take() {
            Some(msg) => Err(RenderError::InvalidCommandListState(msg)),
            None => Ok(()),
        }
    }

    fn is_recording(&self) -> bool {
        self.state == ListState::Recording
    }

    fn set_pipeline_state(&mut self, pipeline: PipelineStateId) {
        self.record(RecordedCommand::SetPipelineState(pipeline));
    }

    fn set_graphics_root_signature(&mut self, root_signature: RootSignatureId) {
        self.record(RecordedCommand::SetRootSignature(root_signature));
    }

    fn set_descriptor_heaps(&mut self, heaps: &[DescriptorHeapId]) {
        self.record(RecordedCommand::SetDescriptorHeaps(heaps.to_vec()));
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.record(RecordedCommand::SetViewport(*viewport));
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        self.record(RecordedCommand::SetScissorRect(*rect));
    }

    fn resource_barrier(&mut self, barriers: &[ResourceBarrier]) {
        self.record(RecordedCommand::ResourceBarrier(barriers.to_vec()));
    }

    fn set_render_targets(
        &mut self,
        render_target: CpuDescriptorHandle,
        depth_stencil: Option<CpuDescriptorHandle>,
    ) {
        self.record(RecordedCommand::SetRenderTargets {
            render_target,
            depth_stencil,
        });
    }

    fn clear_render_target_view(&mut self, view: CpuDescriptorHandle, color: [f32; 4]) {
        self.record(RecordedCommand::ClearRenderTarget { view, color });
    }

    fn clear_depth_stencil_view(
        &mut self,
        view: CpuDescriptorHandle,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        self.record(RecordedCommand::ClearDepthStencil {
            view,
            flags,
            depth,
            stencil,
        });
    }

    fn set_stencil_ref(&mut self, reference: u32) {
        self.record(RecordedCommand::SetStencilRef(reference));
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.record(RecordedCommand::SetPrimitiveTopology(topology));
    }

    fn set_vertex_buffers(&mut self, start_slot: u32, views: &[VertexBufferView]) {
        self.record(RecordedCommand::SetVertexBuffers {
            start_slot,
            views: views.to_vec(),
        });
    }

    fn set_index_buffer(&mut self, view: &IndexBufferView) {
        self.record(RecordedCommand::SetIndexBuffer(*view));
    }

    fn set_graphics_root_constant_buffer_view(&mut self, parameter: u32, address: GpuAddress) {
        self.record(RecordedCommand::SetRootConstantBufferView { parameter, address });
    }

    fn set_graphics_root_descriptor_table(&mut self, parameter: u32, base: GpuDescriptorHandle) {
        self.record(RecordedCommand::SetRootDescriptorTable { parameter, base });
    }

    fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    ) {
        self.record(RecordedCommand::DrawIndexedInstanced {
            index_count: index_count_per_instance,
            instance_count,
            start_index,
            base_vertex,
            start_instance,
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_start_closed_and_record_after_reset() {
        let allocator = HeadlessCommandAllocator::new("a");
        let mut list = HeadlessCommandList::new("l");
        assert!(!list.is_recording());

        list.reset(&allocator, Some(PipelineStateId(4))).unwrap();
        list.set_stencil_ref(1);
        list.close().unwrap();
        assert_eq!(
            list.commands(),
            &[
                RecordedCommand::SetPipelineState(PipelineStateId(4)),
                RecordedCommand::SetStencilRef(1)
            ]
        );
    }

    #[test]
    fn test_recording_into_closed_list_fails_at_close() {
        let allocator = HeadlessCommandAllocator::new("a");
        let mut list = HeadlessCommandList::new("l");
        list.reset(&allocator, None).unwrap();
        list.close().unwrap();

        list.set_stencil_ref(1);
        list.reset(&allocator, None).unwrap();
        // The stray command is discarded by the reset.
        assert!(list.commands().is_empty());
        list.close().unwrap();

        list.set_stencil_ref(2);
        assert!(list.close().is_err());
    }

    #[test]
    fn test_allocator_reset_refuses_while_in_flight() {
        let mut allocator = HeadlessCommandAllocator::new("a");
        allocator.in_flight.fetch_add(1, Ordering::AcqRel);
        assert!(matches!(
            allocator.reset(),
            Err(RenderError::InvalidCommandListState(_))
        ));
        allocator.in_flight.fetch_sub(1, Ordering::AcqRel);
        allocator.reset().unwrap();
        assert_eq!(allocator.reset_count(), 1);
    }

    #[test]
    fn test_double_reset_is_rejected() {
        let allocator = HeadlessCommandAllocator::new("a");
        let mut list = HeadlessCommandList::new("l");
        list.reset(&allocator, None).unwrap();
        assert!(list.reset(&allocator, None).is_err());
    }
}
