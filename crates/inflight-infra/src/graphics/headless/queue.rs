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

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use inflight_core::renderer::{CommandList, CommandQueue, Fence, RenderError};

use super::command::{HeadlessCommandList, RecordedCommand};
use super::memory::lock;

const RECENT_LISTS: usize = 8;

enum Submission {
    Execute {
        label: String,
        commands: Vec<RecordedCommand>,
        in_flight: Option<Arc<AtomicUsize>>,
    },
    Signal {
        fence: Arc<dyn Fence>,
        value: u64,
    },
}

/// A command list as the queue worker executed it.
#[derive(Debug, Clone)]
pub struct ExecutedList {
    /// Label of the list.
    pub label: String,
    /// Commands in recording order.
    pub commands: Vec<RecordedCommand>,
}

impl ExecutedList {
    /// Number of draws in the list.
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }
}

#[derive(Debug, Default)]
struct LogState {
    lists_executed: u64,
    draws_executed: u64,
    signals_processed: u64,
    recent: VecDeque<ExecutedList>,
}

/// What the queue worker has executed so far.
#[derive(Debug, Default)]
pub struct ExecutionLog {
    state: Mutex<LogState>,
}

impl ExecutionLog {
    /// Lists executed.
    pub fn lists_executed(&self) -> u64 {
        lock(&self.state).lists_executed
    }

    /// Draws executed across all lists.
    pub fn draws_executed(&self) -> u64 {
        lock(&self.state).draws_executed
    }

    /// Fence signals processed.
    pub fn signals_processed(&self) -> u64 {
        lock(&self.state).signals_processed
    }

    /// The most recently executed list.
    pub fn last_list(&self) -> Option<ExecutedList> {
        lock(&self.state).recent.back().cloned()
    }

    /// Up to the last few executed lists, oldest first.
    pub fn recent_lists(&self) -> Vec<ExecutedList> {
        lock(&self.state).recent.iter().cloned().collect()
    }

    fn record(&self, list: ExecutedList) {
        let mut state = lock(&self.state);
        state.lists_executed += 1;
        state.draws_executed += list.draw_count() as u64;
        if state.recent.len() == RECENT_LISTS {
            state.recent.pop_front();
        }
        state.recent.push_back(list);
    }

    fn record_signal(&self) {
        lock(&self.state).signals_processed += 1;
    }
}

#[derive(Debug, Default)]
struct PauseGate {
    paused: Mutex<bool>,
    changed: Condvar,
}

impl PauseGate {
    fn set(&self, paused: bool) {
        *lock(&self.paused) = paused;
        self.changed.notify_all();
    }

    fn wait_open(&self) {
        let guard = lock(&self.paused);
        let _open = self
            .changed
            .wait_while(guard, |paused| *paused)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
    }
}

/// A command queue that executes on a worker thread.
///
/// Submissions are processed strictly in order. Each one can be delayed by a
/// fixed latency, and the worker can be paused to hold the "GPU" behind the CPU.
pub struct HeadlessQueue {
    sender: Option<flume::Sender<Submission>>,
    worker: Option<thread::JoinHandle<()>>,
    log: Arc<ExecutionLog>,
    gate: Arc<PauseGate>,
}

impl std::fmt::Debug for HeadlessQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessQueue")
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl Default for HeadlessQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessQueue {
    /// Creates a queue that executes submissions as soon as they arrive.
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Creates a queue whose worker sleeps `latency` before each submission.
    pub fn with_latency(latency: Duration) -> Self {
        let (sender, receiver) = flume::unbounded::<Submission>();
        let log = Arc::new(ExecutionLog::default());
        let gate = Arc::new(PauseGate::default());

        let worker = {
            let log = log.clone();
            let gate = gate.clone();
            thread::spawn(move || {
                log::debug!("HeadlessQueue: worker started");
                for submission in receiver.iter() {
                    gate.wait_open();
                    if !latency.is_zero() {
                        thread::sleep(latency);
                    }
                    match submission {
                        Submission::Execute {
                            label,
                            commands,
                            in_flight,
                        } => {
                            log::trace!("HeadlessQueue: executing '{label}'");
                            log.record(ExecutedList { label, commands });
                            if let Some(counter) = in_flight {
                                counter.fetch_sub(1, Ordering::AcqRel);
                            }
                        }
                        Submission::Signal { fence, value } => {
                            if let Err(e) = fence.signal(value) {
                                log::error!("HeadlessQueue: fence signal {value} failed: {e}");
                            }
                            log.record_signal();
                        }
                    }
                }
                log::debug!("HeadlessQueue: worker stopped");
            })
        };

        Self {
            sender: Some(sender),
            worker: Some(worker),
            log,
            gate,
        }
    }

    /// Holds the worker before its next submission until [`HeadlessQueue::resume`].
    pub fn pause(&self) {
        log::debug!("HeadlessQueue: paused");
        self.gate.set(true);
    }

    /// Lets the worker continue.
    pub fn resume(&self) {
        log::debug!("HeadlessQueue: resumed");
        self.gate.set(false);
    }

    /// The execution log shared with the worker.
    pub fn log(&self) -> Arc<ExecutionLog> {
        self.log.clone()
    }

    fn send(&self, submission: Submission) -> Result<(), RenderError> {
        self.sender
            .as_ref()
            .ok_or(RenderError::DeviceLost)?
            .send(submission)
            .map_err(|_| RenderError::DeviceLost)
    }
}

impl CommandQueue for HeadlessQueue {
    fn execute_command_lists(&self, lists: &[&dyn CommandList]) -> Result<(), RenderError> {
        for list in lists {
            let list = list
                .as_any()
                .downcast_ref::<HeadlessCommandList>()
                .ok_or_else(|| {
                    RenderError::InvalidCommandListState(
                        "list does not belong to the headless backend".to_string(),
                    )
                })?;
            if list.is_recording() {
                return Err(RenderError::InvalidCommandListState(format!(
                    "list '{}' executed before close",
                    list.label()
                )));
            }
            let in_flight = list.allocator_in_flight().cloned();
            if let Some(counter) = &in_flight {
                counter.fetch_add(1, Ordering::AcqRel);
            }
            self.send(Submission::Execute {
                label: list.label().to_string(),
                commands: list.commands().to_vec(),
                in_flight,
            })?;
        }
        Ok(())
    }

    fn signal(&self, fence: &Arc<dyn Fence>, value: u64) -> Result<(), RenderError> {
        self.send(Submission::Signal {
            fence: fence.clone(),
            value,
        })
    }
}

impl Drop for HeadlessQueue {
    fn drop(&mut self) {
        self.resume();
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("HeadlessQueue: worker panicked");
            }
        }
    }
}
