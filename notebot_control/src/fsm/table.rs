//! Declarative state tables.
//!
//! Each machine describes its states once, at construction, as a slice of
//! [`StateDecl`]s. [`StateTable::new`] validates the description and stores
//! it in a fixed-capacity vector; the engine only ever reads it afterwards.

use core::fmt::Debug;
use core::time::Duration;

use heapless::Vec;
use notebot_common::consts::MAX_STATES;

use crate::error::FsmError;

/// Identifier of one state of a machine.
///
/// Implemented by a fieldless enum. `ALL` must list every variant so that
/// the table can prove each one was declared.
pub trait StateId: Copy + Eq + Debug + 'static {
    const ALL: &'static [Self];

    /// Stable snake_case name used in logs and errors.
    fn name(self) -> &'static str;
}

/// Where a timed state goes once its duration has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit<S> {
    To(S),
    /// The machine becomes inactive.
    Done,
}

/// Fixed duration and successor of a timed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timed<S> {
    pub duration: Duration,
    pub exit: Exit<S>,
}

/// Per-state metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDecl<S> {
    pub id: S,
    pub first: bool,
    pub must_finish: bool,
    pub timed: Option<Timed<S>>,
}

impl<S: StateId> StateDecl<S> {
    pub fn new(id: S) -> Self {
        Self {
            id,
            first: false,
            must_finish: false,
            timed: None,
        }
    }

    /// Entered by default when the machine is engaged.
    pub fn first(mut self) -> Self {
        self.first = true;
        self
    }

    /// Keeps running on ticks where the machine was not engaged.
    pub fn must_finish(mut self) -> Self {
        self.must_finish = true;
        self
    }

    pub fn timed(mut self, duration: Duration, exit: Exit<S>) -> Self {
        self.timed = Some(Timed { duration, exit });
        self
    }
}

/// Validated, immutable registry of a machine's states.
#[derive(Debug, Clone)]
pub struct StateTable<S: StateId> {
    machine: &'static str,
    states: Vec<StateDecl<S>, MAX_STATES>,
    first: S,
}

impl<S: StateId> StateTable<S> {
    /// Validate `decls` and build the table.
    ///
    /// # Errors
    /// Any [`FsmError`]: the machine must not be started with it.
    pub fn new(machine: &'static str, decls: &[StateDecl<S>]) -> Result<Self, FsmError> {
        if decls.is_empty() {
            return Err(FsmError::Empty { machine });
        }
        if decls.len() > MAX_STATES {
            return Err(FsmError::TooManyStates {
                machine,
                count: decls.len(),
            });
        }

        let mut states: Vec<StateDecl<S>, MAX_STATES> = Vec::new();
        let mut first: Option<S> = None;
        for decl in decls {
            if states.iter().any(|s| s.id == decl.id) {
                return Err(FsmError::DuplicateState {
                    machine,
                    state: decl.id.name(),
                });
            }
            if decl.first {
                if let Some(prev) = first {
                    return Err(FsmError::DuplicateFirst {
                        machine,
                        a: prev.name(),
                        b: decl.id.name(),
                    });
                }
                first = Some(decl.id);
            }
            if decl.timed.is_some_and(|t| t.duration.is_zero()) {
                return Err(FsmError::ZeroDuration {
                    machine,
                    state: decl.id.name(),
                });
            }
            let pushed = states.push(*decl);
            debug_assert!(pushed.is_ok(), "length checked above");
        }

        for &id in S::ALL {
            if !states.iter().any(|s| s.id == id) {
                return Err(FsmError::Unregistered {
                    machine,
                    state: id.name(),
                });
            }
        }

        let first = first.ok_or(FsmError::MissingFirst { machine })?;
        Ok(Self {
            machine,
            states,
            first,
        })
    }

    #[inline]
    pub fn machine(&self) -> &'static str {
        self.machine
    }

    #[inline]
    pub fn first(&self) -> S {
        self.first
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Metadata for `id`. Always `Some` for a validated table.
    pub fn decl(&self, id: S) -> Option<&StateDecl<S>> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn is_must_finish(&self, id: S) -> bool {
        self.decl(id).is_some_and(|s| s.must_finish)
    }

    pub fn timed(&self, id: S) -> Option<Timed<S>> {
        self.decl(id).and_then(|s| s.timed)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
