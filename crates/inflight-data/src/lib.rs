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

//! # Inflight Data
//!
//! The scene side of the frame loop: shared immutable geometry, shared
//! materials, and the renderable instances that reference both through
//! handles into one owning [`SceneRegistry`].

#![warn(missing_docs)]

pub mod mesh;
pub mod registry;

pub use registry::{
    DrawRange, FramesDirty, Geometry, GeometryHandle, IndexElement, Material, MaterialDescriptor,
    MaterialHandle, RenderLayer, Renderable, RenderableDescriptor, RenderableHandle,
    SceneRegistry,
};
