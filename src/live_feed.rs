//! Live transaction feed simulation state machine.
//!
//! The feed itself performs no I/O and never sleeps. A driver calls
//! [`LiveFeed::next_iteration`] once per tick, scores the sampled row when it
//! gets an iteration number back, then waits before the next tick. Start and
//! stop commands are applied between ticks, so a stop is observed at the next
//! boundary and the in-flight iteration always completes.

use serde::Serialize;

/// Iteration budget of one live run.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Manual,
    BudgetExhausted,
}

/// Feed state. `Stopped` behaves like `Idle` for restarting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum FeedState {
    Idle,
    Running,
    Stopped(StopReason),
}

/// Effect of a start or stop command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    AlreadyRunning,
    Stopped,
    NotRunning,
}

/// Session-scoped simulation state.
#[derive(Debug, Clone)]
pub struct LiveFeed {
    state: FeedState,
    completed: u32,
    max_iterations: u32,
}

impl LiveFeed {
    pub fn new(max_iterations: u32) -> Self {
        Self {
            state: FeedState::Idle,
            completed: 0,
            max_iterations,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == FeedState::Running
    }

    /// Iterations claimed in the current (or last) run.
    pub fn completed_iterations(&self) -> u32 {
        self.completed
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Begin a run. Idempotent while running.
    pub fn start(&mut self) -> Transition {
        if self.is_running() {
            return Transition::AlreadyRunning;
        }
        self.state = FeedState::Running;
        self.completed = 0;
        Transition::Started
    }

    /// End the run. A no-op when nothing is running.
    pub fn stop(&mut self) -> Transition {
        if !self.is_running() {
            return Transition::NotRunning;
        }
        self.state = FeedState::Stopped(StopReason::Manual);
        Transition::Stopped
    }

    /// Boundary check. Returns the 1-based number of the iteration to run, or
    /// `None` when the feed is not running.
    ///
    /// Claiming the last iteration of the budget stops the feed, so the driver
    /// sees `is_running() == false` once that iteration is done.
    pub fn next_iteration(&mut self) -> Option<u32> {
        if !self.is_running() {
            return None;
        }
        if self.completed >= self.max_iterations {
            self.state = FeedState::Stopped(StopReason::BudgetExhausted);
            return None;
        }

        self.completed += 1;
        if self.completed >= self.max_iterations {
            self.state = FeedState::Stopped(StopReason::BudgetExhausted);
        }
        Some(self.completed)
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}
