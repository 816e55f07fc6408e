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

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use inflight_core::renderer::{BufferId, GpuAddress, HeapType};

/// Allocations start on 64 KiB boundaries, like placed resources.
const ALLOCATION_ALIGNMENT: u64 = 64 * 1024;
/// Keeps address 0 free as the null address.
const FIRST_ADDRESS: u64 = ALLOCATION_ALIGNMENT;

/// One block of emulated GPU memory.
#[derive(Debug)]
pub(crate) struct Allocation {
    pub(crate) id: BufferId,
    pub(crate) base: GpuAddress,
    pub(crate) heap: HeapType,
    pub(crate) bytes: Mutex<Vec<u8>>,
}

impl Allocation {
    pub(crate) fn size(&self) -> u64 {
        lock(&self.bytes).len() as u64
    }
}

/// The device's address space: every live allocation keyed by base address.
#[derive(Debug)]
pub(crate) struct MemoryArena {
    allocations: Mutex<BTreeMap<u64, Arc<Allocation>>>,
    next_address: AtomicU64,
}

impl Default for MemoryArena {
    fn default() -> Self {
        Self {
            allocations: Mutex::new(BTreeMap::new()),
            next_address: AtomicU64::new(FIRST_ADDRESS),
        }
    }
}

impl MemoryArena {
    pub(crate) fn allocate(&self, id: BufferId, heap: HeapType, size: u64) -> Arc<Allocation> {
        let reserved = size.max(1).div_ceil(ALLOCATION_ALIGNMENT) * ALLOCATION_ALIGNMENT;
        let base = self.next_address.fetch_add(reserved, Ordering::Relaxed);
        let allocation = Arc::new(Allocation {
            id,
            base: GpuAddress(base),
            heap,
            bytes: Mutex::new(vec![0; size as usize]),
        });
        lock(&self.allocations).insert(base, allocation.clone());
        allocation
    }

    pub(crate) fn release(&self, base: GpuAddress) -> Option<Arc<Allocation>> {
        lock(&self.allocations).remove(&base.0)
    }

    pub(crate) fn find_by_id(&self, id: BufferId) -> Option<Arc<Allocation>> {
        lock(&self.allocations)
            .values()
            .find(|a| a.id == id)
            .cloned()
    }

    /// Copies `len` bytes starting at `address`, if they lie in one allocation.
    pub(crate) fn read(&self, address: GpuAddress, len: usize) -> Option<Vec<u8>> {
        let allocations = lock(&self.allocations);
        let (_, allocation) = allocations.range(..=address.0).next_back()?;
        let start = (address.0 - allocation.base.0) as usize;
        let bytes = lock(&allocation.bytes);
        bytes.get(start..start.checked_add(len)?).map(<[u8]>::to_vec)
    }

    pub(crate) fn total_size(&self, heap: HeapType) -> u64 {
        lock(&self.allocations)
            .values()
            .filter(|a| a.heap == heap)
            .map(|a| a.size())
            .sum()
    }

    pub(crate) fn live_count(&self) -> usize {
        lock(&self.allocations).len()
    }
}

/// Locks a mutex, recovering the data if another thread panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_do_not_overlap() {
        let arena = MemoryArena::default();
        let a = arena.allocate(BufferId(1), HeapType::Upload, 100);
        let b = arena.allocate(BufferId(2), HeapType::Upload, 70_000);
        let c = arena.allocate(BufferId(3), HeapType::Upload, 10);
        assert_eq!(a.base.0 % ALLOCATION_ALIGNMENT, 0);
        assert!(b.base.0 >= a.base.0 + 100);
        assert!(c.base.0 >= b.base.0 + 70_000);
    }

    #[test]
    fn test_read_by_interior_address() {
        let arena = MemoryArena::default();
        let a = arena.allocate(BufferId(1), HeapType::Upload, 512);
        lock(&a.bytes)[256..260].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(arena.read(a.base.offset(256), 4), Some(vec![1, 2, 3, 4]));
        assert_eq!(arena.read(a.base.offset(510), 4), None);
        assert_eq!(arena.read(GpuAddress::NULL, 4), None);
    }

    #[test]
    fn test_release_removes_allocation() {
        let arena = MemoryArena::default();
        let a = arena.allocate(BufferId(1), HeapType::Default, 16);
        assert_eq!(arena.live_count(), 1);
        assert!(arena.release(a.base).is_some());
        assert_eq!(arena.live_count(), 0);
        assert_eq!(arena.read(a.base, 1), None);
    }
}
