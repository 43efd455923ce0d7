//! FSM execution engine.
//!
//! ## Tick Order
//! Every call to [`Controller::execute`] performs, in this order:
//! 1. Record `last_state`.
//! 2. Drop the machine if it was not engaged since the previous tick and
//!    its current state is not `must_finish`.
//! 3. If the current state is timed and its elapsed time has reached the
//!    duration, switch to the declared successor without running the
//!    action routine.
//! 4. Otherwise run the action routine.
//! 5. Apply the pending transition. A transition requested by the running
//!    state wins over one queued from outside with [`Fsm::request`].
//! 6. Reset the controller's intent fields.
//!
//! Time is supplied by the caller. Elapsed time is measured from a state's
//! first run, whether it was entered through `engage` or by a transition,
//! so a timed state of duration `D` runs `D / period` times.

use core::time::Duration;

use tracing::debug;

use super::table::{Exit, StateId, StateTable};

/// Result of an external transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome<S> {
    /// Applied at the end of the next tick unless the state moves first.
    Queued(S),
    Refused(&'static str),
}

/// Context handed to the action routine of the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<S> {
    pub state: S,
    pub now: Duration,
    /// Time spent in `state`, measured from its entry.
    pub elapsed: Duration,
    /// First run since the state was entered.
    pub initial_call: bool,
}

/// Runtime state of one machine.
#[derive(Debug, Clone)]
pub struct Fsm<S: StateId> {
    table: StateTable<S>,
    current: Option<S>,
    last: Option<S>,
    next: Option<S>,
    requested: Option<S>,
    entered_at: Option<Duration>,
    fresh: bool,
    engaged: bool,
}

impl<S: StateId> Fsm<S> {
    pub fn new(table: StateTable<S>) -> Self {
        Self {
            table,
            current: None,
            last: None,
            next: None,
            requested: None,
            entered_at: None,
            fresh: false,
            engaged: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.table.machine()
    }

    #[inline]
    pub fn table(&self) -> &StateTable<S> {
        &self.table
    }

    // ─── Engagement ─────────────────────────────────────────────────

    /// Keep the machine running for the next tick, entering the `first`
    /// state if it is inactive.
    pub fn engage(&mut self) {
        if self.current.is_none() {
            self.start(self.table.first());
        }
        self.engaged = true;
    }

    /// Keep the machine running, making `state` current.
    ///
    /// Idempotent: engaging at the state that is already current changes
    /// nothing but the engagement flag.
    pub fn engage_at(&mut self, state: S) {
        if self.current != Some(state) {
            self.start(state);
        }
        self.engaged = true;
    }

    /// Stop immediately. The machine is inactive until engaged again.
    pub fn done(&mut self) {
        if let Some(state) = self.current {
            debug!(machine = self.name(), from = state.name(), "done");
        }
        self.current = None;
        self.next = None;
        self.requested = None;
        self.entered_at = None;
        self.fresh = false;
        self.engaged = false;
    }

    fn start(&mut self, state: S) {
        debug!(
            machine = self.name(),
            from = self.current.map(StateId::name),
            to = state.name(),
            "engaged"
        );
        self.current = Some(state);
        self.next = None;
        self.requested = None;
        self.entered_at = None;
        self.fresh = true;
    }

    // ─── Transitions ────────────────────────────────────────────────

    /// Request a transition from inside the running action routine.
    #[inline]
    pub fn next_state(&mut self, state: S) {
        self.next = Some(state);
    }

    /// Queue a transition from outside the machine.
    ///
    /// Refused while the machine is inactive or its current state is
    /// `must_finish`: such a state only leaves on its own.
    pub fn request(&mut self, state: S) -> RequestOutcome<S> {
        let Some(current) = self.current else {
            return RequestOutcome::Refused("machine is inactive");
        };
        if self.table.is_must_finish(current) {
            debug!(
                machine = self.name(),
                current = current.name(),
                requested = state.name(),
                "request refused"
            );
            return RequestOutcome::Refused("current state must finish");
        }
        self.requested = Some(state);
        RequestOutcome::Queued(state)
    }

    fn enter(&mut self, state: S) {
        debug!(
            machine = self.name(),
            from = self.current.map(StateId::name),
            to = state.name(),
            "state transition"
        );
        self.current = Some(state);
        self.entered_at = None;
        self.fresh = true;
    }

    // ─── Queries ────────────────────────────────────────────────────

    #[inline]
    pub fn current_state(&self) -> Option<S> {
        self.current
    }

    /// State observed at the start of the most recent tick.
    #[inline]
    pub fn last_state(&self) -> Option<S> {
        self.last
    }

    #[inline]
    pub fn is_executing(&self) -> bool {
        self.current.is_some()
    }

    /// The most recent tick moved the machine from `from` to `to`.
    #[inline]
    pub fn just_transitioned(&self, from: S, to: S) -> bool {
        self.last == Some(from) && self.current == Some(to)
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// First half of a tick. Returns the step to run, or `None` when the
    /// machine is inactive or a timed state just expired.
    pub fn begin(&mut self, now: Duration) -> Option<Step<S>> {
        self.last = self.current;
        let state = self.current?;

        if !self.engaged && !self.table.is_must_finish(state) {
            self.done();
            return None;
        }
        self.engaged = false;

        let entered_at = *self.entered_at.get_or_insert(now);
        let elapsed = now.saturating_sub(entered_at);

        let expired = self
            .table
            .timed(state)
            .filter(|timed| elapsed >= timed.duration);
        if let Some(timed) = expired {
            self.next = None;
            self.requested = None;
            match timed.exit {
                Exit::To(successor) => self.enter(successor),
                Exit::Done => self.done(),
            }
            return None;
        }

        Some(Step {
            state,
            now,
            elapsed,
            initial_call: self.fresh,
        })
    }

    /// Second half of a tick: apply the pending transition.
    pub fn finish(&mut self) {
        self.fresh = false;
        let requested = self.requested.take();
        if self.current.is_none() {
            // The action routine called `done`.
            self.next = None;
            return;
        }
        if let Some(state) = self.next.take().or(requested) {
            self.enter(state);
        }
    }
}

/// A controller driven by one [`Fsm`].
///
/// `Io` is whatever the action routines need to reach collaborators.
pub trait Controller<Io: ?Sized> {
    type State: StateId;

    fn fsm_mut(&mut self) -> &mut Fsm<Self::State>;

    /// Action routine of `step.state`.
    fn run_state(&mut self, step: Step<Self::State>, io: &mut Io);

    /// Return intent fields to their defaults.
    fn reset_intents(&mut self) {}

    /// Run one tick.
    fn execute(&mut self, io: &mut Io, now: Duration) {
        if let Some(step) = self.fsm_mut().begin(now) {
            self.run_state(step, io);
            self.fsm_mut().finish();
        }
        self.reset_intents();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
