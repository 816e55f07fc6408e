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

//! Fence bookkeeping for the frame ring.

use std::sync::Arc;
use std::time::{Duration, Instant};

use inflight_core::renderer::{CommandQueue, Fence, GraphicsDevice, RenderError};

/// Whether a ring slot can be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never submitted, or the GPU has passed its watermark.
    Idle,
    /// The GPU has not reached this watermark yet.
    InFlight(u64),
}

/// How [`FrameSynchronizer::wait_for_completion`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The watermark was already reached.
    Ready,
    /// The caller blocked for this long.
    Waited(Duration),
}

/// Owns the frame fence and the monotonically increasing watermark signaled
/// after each submission.
#[derive(Debug)]
pub struct FrameSynchronizer {
    fence: Arc<dyn Fence>,
    queue: Arc<dyn CommandQueue>,
    last_signaled: u64,
}

impl FrameSynchronizer {
    /// Creates a fence at zero on `device` and signals it through `queue`.
    pub fn new(
        device: &dyn GraphicsDevice,
        queue: Arc<dyn CommandQueue>,
    ) -> Result<Self, RenderError> {
        let fence = device.create_fence(0).map_err(|e| {
            log::error!("FrameSynchronizer: fence creation failed: {e}");
            e
        })?;
        Ok(Self::from_parts(fence, queue))
    }

    /// Wraps an existing fence. Signaling continues from its completed value.
    pub fn from_parts(fence: Arc<dyn Fence>, queue: Arc<dyn CommandQueue>) -> Self {
        let last_signaled = fence.completed_value();
        Self {
            fence,
            queue,
            last_signaled,
        }
    }

    /// The highest watermark the GPU has completed.
    pub fn last_completed(&self) -> u64 {
        self.fence.completed_value()
    }

    /// The highest watermark handed to the queue.
    pub fn last_signaled(&self) -> u64 {
        self.last_signaled
    }

    /// Classifies a slot by its stored watermark. Zero means never submitted.
    pub fn slot_state(&self, watermark: u64) -> SlotState {
        if watermark != 0 && watermark > self.last_completed() {
            SlotState::InFlight(watermark)
        } else {
            SlotState::Idle
        }
    }

    /// Blocks until the GPU has completed `watermark`. There is no timeout.
    ///
    /// Returns immediately when the slot is [`SlotState::Idle`].
    pub fn wait_for_completion(&self, watermark: u64) -> Result<WaitOutcome, RenderError> {
        match self.slot_state(watermark) {
            SlotState::Idle => Ok(WaitOutcome::Ready),
            SlotState::InFlight(value) => {
                log::debug!(
                    "FrameSynchronizer: waiting for fence {value} (completed {})",
                    self.last_completed()
                );
                let start = Instant::now();
                self.fence.wait_for_value(value)?;
                Ok(WaitOutcome::Waited(start.elapsed()))
            }
        }
    }

    /// Asks the queue to signal the next watermark once all prior work is
    /// done, and returns it.
    pub fn signal(&mut self) -> Result<u64, RenderError> {
        let value = self.last_signaled + 1;
        self.queue.signal(&self.fence, value)?;
        self.last_signaled = value;
        Ok(value)
    }

    /// Signals a final watermark and blocks until the GPU reaches it.
    pub fn flush(&mut self) -> Result<u64, RenderError> {
        let value = self.signal()?;
        self.wait_for_completion(value)?;
        log::debug!("FrameSynchronizer: flushed at fence {value}");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inflight_infra::graphics::headless::{HeadlessFence, HeadlessQueue};

    fn synchronizer(completed: u64) -> FrameSynchronizer {
        FrameSynchronizer::from_parts(
            Arc::new(HeadlessFence::new(completed)),
            Arc::new(HeadlessQueue::new()),
        )
    }

    #[test]
    fn test_zero_watermark_is_idle() {
        assert_eq!(synchronizer(0).slot_state(0), SlotState::Idle);
    }

    #[test]
    fn test_equal_watermark_is_idle() {
        let sync = synchronizer(5);
        assert_eq!(sync.slot_state(5), SlotState::Idle);
        assert_eq!(sync.slot_state(6), SlotState::InFlight(6));
    }

    #[test]
    fn test_signal_is_monotonic_from_completed_value() {
        let mut sync = synchronizer(7);
        assert_eq!(sync.signal().unwrap(), 8);
        assert_eq!(sync.signal().unwrap(), 9);
        assert_eq!(sync.last_signaled(), 9);
    }

    #[test]
    fn test_flush_reaches_its_watermark() {
        let mut sync = synchronizer(0);
        let value = sync.flush().unwrap();
        assert_eq!(sync.last_completed(), value);
    }
}
