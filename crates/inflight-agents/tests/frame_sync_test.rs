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

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use inflight_agents::{FrameSynchronizer, SlotState, WaitOutcome};
use inflight_core::renderer::{CommandQueue, Fence};
use inflight_infra::graphics::headless::{HeadlessFence, HeadlessQueue};

fn synchronizer_at(completed: u64) -> (FrameSynchronizer, Arc<HeadlessFence>) {
    let fence = Arc::new(HeadlessFence::new(completed));
    let queue: Arc<dyn CommandQueue> = Arc::new(HeadlessQueue::new());
    (FrameSynchronizer::from_parts(fence.clone(), queue), fence)
}

#[test]
fn test_watermark_equal_to_completed_does_not_block() {
    // --- 1. ARRANGE ---
    let (sync, _fence) = synchronizer_at(5);

    // --- 2. ACT ---
    let outcome = sync.wait_for_completion(5).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(outcome, WaitOutcome::Ready);
    assert_eq!(sync.slot_state(5), SlotState::Idle);
}

#[test]
fn test_watermark_above_completed_blocks_until_signaled() {
    // --- 1. ARRANGE ---
    let (sync, fence) = synchronizer_at(4);
    assert_eq!(sync.slot_state(5), SlotState::InFlight(5));
    let signaler = thread::spawn(move || {
        thread::sleep(Duration::from_millis(40));
        fence.signal(5).unwrap();
    });

    // --- 2. ACT ---
    let outcome = sync.wait_for_completion(5).unwrap();

    // --- 3. ASSERT ---
    match outcome {
        WaitOutcome::Waited(waited) => assert!(waited >= Duration::from_millis(20)),
        WaitOutcome::Ready => panic!("the wait returned before the fence was signaled"),
    }
    assert!(sync.last_completed() >= 5);
    signaler.join().unwrap();
}

#[test]
fn test_signals_are_applied_by_the_queue_in_order() {
    // --- 1. ARRANGE ---
    let fence = Arc::new(HeadlessFence::new(0));
    let queue = Arc::new(HeadlessQueue::new());
    let mut sync = FrameSynchronizer::from_parts(fence.clone(), queue.clone());
    queue.pause();

    // --- 2. ACT ---
    let first = sync.signal().unwrap();
    let second = sync.signal().unwrap();

    // --- 3. ASSERT ---
    assert_eq!((first, second), (1, 2));
    assert_eq!(fence.completed_value(), 0);
    queue.resume();
    fence.wait_for_value(2).unwrap();
    assert_eq!(queue.log().signals_processed(), 2);
}
