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

//! Per-entity dirty tracking for the constant-buffer ring.

/// How many ring slots still hold a stale copy of an entity's constants.
///
/// A change marks the entity dirty for every slot in the ring; each slot's
/// refresh consumes exactly one count, so after `frame_count` refreshes of
/// distinct slots every copy is current and no further writes happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramesDirty(usize);

impl FramesDirty {
    /// A counter that requires `frame_count` refreshes.
    pub const fn new(frame_count: usize) -> Self {
        Self(frame_count)
    }

    /// Records a change: every one of the `frame_count` slots is now stale.
    #[inline]
    pub fn mark(&mut self, frame_count: usize) {
        self.0 = frame_count;
    }

    /// Whether some slot still needs a refresh.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.0 > 0
    }

    /// Remaining stale slots.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.0
    }

    /// Consumes one count. Returns `false` (and changes nothing) if already clean.
    #[inline]
    pub fn consume(&mut self) -> bool {
        if self.0 == 0 {
            return false;
        }
        self.0 -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_decays_once_per_consume() {
        let mut dirty = FramesDirty::new(3);
        assert!(dirty.consume());
        assert!(dirty.consume());
        assert_eq!(dirty.remaining(), 1);
        assert!(dirty.consume());
        assert!(!dirty.is_dirty());
        assert!(!dirty.consume());
        assert_eq!(dirty.remaining(), 0);
    }

    #[test]
    fn test_mark_resets_to_ring_size() {
        let mut dirty = FramesDirty::new(3);
        dirty.consume();
        dirty.mark(2);
        assert_eq!(dirty.remaining(), 2);
    }
}
