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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Every variant here is fatal for the frame loop: callers propagate with `?`
//! and nothing is retried.

use std::fmt;

/// An error related to the creation or use of a GPU resource.
#[derive(Debug)]
pub enum ResourceError {
    /// The backend refused to create a resource.
    CreationFailed {
        /// A label for the resource being created.
        label: String,
        /// Backend-provided details.
        details: String,
    },
    /// A resource or named entry could not be found.
    NotFound(String),
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// A fixed-capacity container was asked to hold more than it was sized for.
    CapacityExceeded {
        /// What overflowed (e.g. `"object constants"`).
        what: &'static str,
        /// The index or count that was requested.
        requested: usize,
        /// The capacity fixed at construction.
        capacity: usize,
    },
    /// A resource with the same name is already registered.
    AlreadyExists(String),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::CreationFailed { label, details } => {
                write!(f, "Failed to create resource '{label}': {details}")
            }
            ResourceError::NotFound(name) => write!(f, "Resource not found: {name}"),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::CapacityExceeded {
                what,
                requested,
                capacity,
            } => write!(
                f,
                "Capacity exceeded for {what}: requested {requested}, capacity {capacity}"
            ),
            ResourceError::AlreadyExists(name) => {
                write!(f, "Resource already registered: {name}")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error raised by the frame loop or the graphics device.
#[derive(Debug)]
pub enum RenderError {
    /// An operation was attempted before the renderer was initialized.
    NotInitialized,
    /// The renderer could not be set up (bad settings, missing pipelines).
    InitializationFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// A fence or wait primitive could not be created or waited on.
    SynchronizationFailed(String),
    /// A command list or allocator was used in the wrong state
    /// (recording into a closed list, resetting an allocator still in flight).
    InvalidCommandListState(String),
    /// The graphics device was lost.
    DeviceLost,
    /// A critical, unrecoverable rendering operation failed.
    RenderingFailed(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => write!(f, "The renderer is not initialized."),
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize renderer: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::SynchronizationFailed(msg) => {
                write!(f, "GPU synchronization failed: {msg}")
            }
            RenderError::InvalidCommandListState(msg) => {
                write!(f, "Invalid command list state: {msg}")
            }
            RenderError::DeviceLost => write!(f, "The graphics device was lost."),
            RenderError::RenderingFailed(msg) => {
                write!(f, "A critical rendering operation failed: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_capacity_exceeded_display() {
        let err = ResourceError::CapacityExceeded {
            what: "object constants",
            requested: 8,
            capacity: 4,
        };
        assert_eq!(
            format!("{err}"),
            "Capacity exceeded for object constants: requested 8, capacity 4"
        );
    }

    #[test]
    fn test_render_error_wraps_resource_error() {
        let render_err: RenderError = ResourceError::InvalidHandle.into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Invalid resource handle or ID."
        );
        assert!(render_err.source().is_some());
    }

    #[test]
    fn test_synchronization_failure_has_no_source() {
        let err = RenderError::SynchronizationFailed("fence poisoned".to_string());
        assert_eq!(format!("{err}"), "GPU synchronization failed: fence poisoned");
        assert!(err.source().is_none());
    }
}
