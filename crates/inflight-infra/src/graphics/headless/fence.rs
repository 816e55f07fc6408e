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
use std::sync::{Condvar, Mutex};

use inflight_core::renderer::{Fence, RenderError};

/// A fence backed by a mutex and a condition variable.
///
/// The value only moves forward: signaling a value below the current one is
/// ignored, which matches how a GPU queue retires work in order.
#[derive(Debug)]
pub struct HeadlessFence {
    value: Mutex<u64>,
    reached: Condvar,
}

impl HeadlessFence {
    /// Creates a fence at `initial_value`.
    pub fn new(initial_value: u64) -> Self {
        Self {
            value: Mutex::new(initial_value),
            reached: Condvar::new(),
        }
    }
}

impl Fence for HeadlessFence {
    fn completed_value(&self) -> u64 {
        match self.value.lock() {
            Ok(value) => *value,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn wait_for_value(&self, value: u64) -> Result<(), RenderError> {
        let guard = self
            .value
            .lock()
            .map_err(|e| RenderError::SynchronizationFailed(e.to_string()))?;
        let _reached = self
            .reached
            .wait_while(guard, |completed| *completed < value)
            .map_err(|e| RenderError::SynchronizationFailed(e.to_string()))?;
        Ok(())
    }

    fn signal(&self, value: u64) -> Result<(), RenderError> {
        let mut current = self
            .value
            .lock()
            .map_err(|e| RenderError::SynchronizationFailed(e.to_string()))?;
        if value > *current {
            *current = value;
            self.reached.notify_all();
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
