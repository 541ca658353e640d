//=========================================================================
// Task Executor
//=========================================================================
//
// Cooperative, frame-budgeted FIFO of deferred work.
//
// Architecture:
//   submit() (any thread) → crossbeam channel → run(budget) (owner thread)
//
// Each `run()` first counts the tasks already queued and never runs more
// than that, so work submitted during a pass (including from inside a
// running task) waits for the next frame. The budget is checked between
// tasks: a task that has started always finishes.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, trace};

//=== Task ================================================================

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

//=== TaskExecutor ========================================================

/// Frame-budgeted task queue.
///
/// Shared between contexts across a scene swap; tasks queued by the old
/// scene keep running after the handoff.
pub struct TaskExecutor {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
}

impl TaskExecutor {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    //--- Submission -------------------------------------------------------

    /// Queues `task`. Safe from any thread, including from inside a task.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // Both channel ends live in `self`, so the send cannot fail.
        let _ = self.sender.send(Box::new(task));
    }

    /// Tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    //--- Execution --------------------------------------------------------

    /// Runs queued tasks in FIFO order until the queue as of this call is
    /// drained or `budget` has elapsed. Returns the number of tasks run.
    pub fn run(&self, budget: Duration) -> usize {
        let available = self.receiver.len();
        if available == 0 {
            return 0;
        }

        let start = Instant::now();
        let mut executed = 0;

        while executed < available {
            if start.elapsed() >= budget {
                debug!(
                    target: "executor",
                    "Budget of {:?} spent, deferring {} task(s)",
                    budget,
                    available - executed
                );
                break;
            }

            let Ok(task) = self.receiver.try_recv() else {
                break;
            };
            task();
            executed += 1;
        }

        trace!(target: "executor", "Ran {} task(s) in {:?}", executed, start.elapsed());
        executed
    }
}

impl Default for TaskExecutor {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
