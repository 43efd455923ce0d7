//! Fixed-period robot loop.
//!
//! ## Tick Order
//! 1. Mode logic: the autonomous sequencer, or held operator input.
//! 2. Note manager.
//! 3. Standalone aim-and-fire (quick shot).
//! 4. [`RobotIo::execute`] pushes commands to the collaborators.
//! 5. The match clock advances by one period.
//!
//! ## Pacing
//! With the `rt` feature the loop runs locked in memory under `SCHED_FIFO`
//! and sleeps to absolute `CLOCK_MONOTONIC` deadlines. Without it
//! [`rt_setup`] does nothing and real-time pacing uses `std::thread::sleep`.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use notebot_common::config::ConfigError;
use notebot_common::subsystem::RobotIo;
use thiserror::Error;
use tracing::{info, warn};

use crate::autonomous::{AutoIo, Routine, Sequencer};
use crate::controller::{AimAndFire, NoteManager, NoteTimings};
use crate::error::{FsmError, RoutineError};
use crate::fsm::Controller;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Wall-clock cost of each cycle body, folded in as it is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    /// Cycles whose body ran past the period.
    pub overruns: u64,
    pub fastest: Duration,
    pub slowest: Duration,
    /// Worst gap between a deadline and the wake-up that served it.
    pub worst_latency: Duration,
    total_ns: u128,
    total_sq_ns: u128,
}

impl CycleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one cycle. Returns `true` when `body` overran `budget`.
    pub fn record(&mut self, body: Duration, latency: Duration, budget: Duration) -> bool {
        let ns = body.as_nanos();
        self.fastest = if self.cycles == 0 {
            body
        } else {
            self.fastest.min(body)
        };
        self.slowest = self.slowest.max(body);
        self.worst_latency = self.worst_latency.max(latency);
        self.total_ns = self.total_ns.saturating_add(ns);
        self.total_sq_ns = self.total_sq_ns.saturating_add(ns.saturating_mul(ns));
        self.cycles += 1;

        let overrun = body > budget;
        if overrun {
            self.overruns += 1;
        }
        overrun
    }

    pub fn mean(&self) -> Duration {
        match self.cycles {
            0 => Duration::ZERO,
            n => Duration::from_nanos(
                u64::try_from(self.total_ns / u128::from(n)).unwrap_or(u64::MAX),
            ),
        }
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> Duration {
        if self.cycles == 0 {
            return Duration::ZERO;
        }
        let n = self.cycles as f64;
        let mean = self.total_ns as f64 / n;
        let variance = (self.total_sq_ns as f64 / n - mean * mean).max(0.0);
        Duration::from_nanos(variance.sqrt() as u64)
    }
}

// ─── Match Clock ────────────────────────────────────────────────────

/// Deterministic time source: `ticks × period`, exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchClock {
    period: Duration,
    ticks: u32,
}

impl MatchClock {
    pub const fn new(period: Duration) -> Self {
        Self { period, ticks: 0 }
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.period.saturating_mul(self.ticks)
    }

    #[inline]
    pub fn advance(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    #[inline]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    #[inline]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

// ─── Robot ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Disabled,
    Autonomous,
    Teleop,
}

/// Held operator controls, applied every teleop tick until replaced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OperatorInput {
    /// Field-relative velocity [m/s].
    pub vx: f64,
    pub vy: f64,
    /// Rotation rate [rad/s]. Non-zero releases heading snapping.
    pub omega: f64,
    pub intake: bool,
    pub cancel: bool,
    pub shoot: bool,
    /// Aim and fire directly, bypassing the note lifecycle.
    pub quick_shot: bool,
}

/// Every controller of one robot plus its collaborators.
pub struct Robot<R: RobotIo> {
    io: R,
    notes: NoteManager,
    quick_shot: AimAndFire,
    auto: Sequencer,
    mode: Mode,
    input: OperatorInput,
    clock: MatchClock,
    mode_started_at: Duration,
}

impl<R: RobotIo> Robot<R> {
    pub fn new(
        io: R,
        timings: NoteTimings,
        routine: Routine,
        period: Duration,
    ) -> Result<Self, CycleError> {
        Ok(Self {
            io,
            notes: NoteManager::new(timings)?,
            quick_shot: AimAndFire::new(timings.fire_duration)?,
            auto: Sequencer::new(routine)?,
            mode: Mode::Disabled,
            input: OperatorInput::default(),
            clock: MatchClock::new(period),
            mode_started_at: Duration::ZERO,
        })
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        info!(from = ?self.mode, to = ?mode, t = ?self.clock.now(), "mode change");
        self.mode = mode;
        self.mode_started_at = self.clock.now();
        self.input = OperatorInput::default();
        self.quick_shot.done();
        self.auto.stop();
        match mode {
            Mode::Disabled => {
                self.notes.on_disable();
                self.io.chassis().drive(0.0, 0.0, 0.0);
                self.io.chassis().stop_snapping();
            }
            Mode::Autonomous => {
                self.notes.on_enable(&mut self.io);
                self.auto.start();
            }
            Mode::Teleop => self.notes.on_enable(&mut self.io),
        }
    }

    #[inline]
    pub fn set_operator_input(&mut self, input: OperatorInput) {
        self.input = input;
    }

    /// Run one control cycle.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        match self.mode {
            Mode::Disabled => {}
            Mode::Autonomous => {
                self.auto.execute(
                    &mut AutoIo {
                        robot: &mut self.io,
                        notes: &mut self.notes,
                    },
                    now,
                );
            }
            Mode::Teleop => self.apply_operator_input(),
        }

        if self.mode != Mode::Disabled {
            self.notes.execute(&mut self.io, now);
            self.quick_shot.execute(&mut self.io, now);
            if self.quick_shot.just_stopped() {
                self.io.chassis().stop_snapping();
            }
        }

        self.io.execute();
        self.clock.advance();
    }

    fn apply_operator_input(&mut self) {
        let input = self.input;
        let chassis = self.io.chassis();
        chassis.drive(input.vx, input.vy, input.omega);
        if input.omega != 0.0 {
            chassis.stop_snapping();
        }
        if input.intake {
            self.notes.try_intake();
        }
        if input.cancel {
            self.notes.cancel_intake();
        }
        if input.shoot {
            self.notes.try_shoot();
        }
        if input.quick_shot {
            self.quick_shot.engage();
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Time since the current mode was entered.
    #[inline]
    pub fn mode_elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.mode_started_at)
    }

    #[inline]
    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    #[inline]
    pub fn notes(&self) -> &NoteManager {
        &self.notes
    }

    #[inline]
    pub fn sequencer(&self) -> &Sequencer {
        &self.auto
    }

    #[inline]
    pub fn quick_shot(&self) -> &AimAndFire {
        &self.quick_shot
    }

    #[inline]
    pub fn io(&self) -> &R {
        &self.io
    }

    #[inline]
    pub fn io_mut(&mut self) -> &mut R {
        &mut self.io
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors raised while setting up the robot loop.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("RT setup error: {0}")]
    RtSetup(String),

    #[error("invalid state machine: {0}")]
    Fsm(#[from] FsmError),

    #[error("invalid routine: {0}")]
    Routine(#[from] RoutineError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock memory, pin the loop to `cpu_core` and switch it to `SCHED_FIFO`
/// at `rt_priority`. Call once before the first cycle.
#[cfg(feature = "rt")]
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::sys::mman::{MlockallFlags, mlockall};
    use nix::unistd::Pid;

    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| rt_error("mlockall", e))?;

    let mut cpus = CpuSet::new();
    cpus.set(cpu_core)
        .map_err(|e| rt_error(&format!("cpu core {cpu_core}"), e))?;
    sched_setaffinity(Pid::from_raw(0), &cpus).map_err(|e| rt_error("sched_setaffinity", e))?;

    let param = libc::sched_param {
        sched_priority: rt_priority,
    };
    // SAFETY: `param` is valid for the duration of the call; pid 0 is us.
    if unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) } != 0 {
        return Err(rt_error(
            &format!("SCHED_FIFO priority {rt_priority}"),
            std::io::Error::last_os_error(),
        ));
    }

    info!(cpu_core, rt_priority, "real-time setup complete");
    Ok(())
}

#[cfg(not(feature = "rt"))]
pub fn rt_setup(_cpu_core: usize, _rt_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_error(what: &str, cause: impl core::fmt::Display) -> CycleError {
    CycleError::RtSetup(format!("{what}: {cause}"))
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// How the runner spaces cycles in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// One cycle per period.
    #[default]
    RealTime,
    /// Back to back, for simulation.
    Fast,
}

/// Drives a [`Robot`] at its period and collects timing statistics.
pub struct CycleRunner<R: RobotIo> {
    pub robot: Robot<R>,
    pub stats: CycleStats,
    cycle_time: Duration,
    pacing: Pacing,
    running: Arc<AtomicBool>,
}

impl<R: RobotIo> CycleRunner<R> {
    pub fn new(robot: Robot<R>, pacing: Pacing) -> Self {
        let cycle_time = robot.clock().period();
        Self {
            robot,
            stats: CycleStats::new(),
            cycle_time,
            pacing,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag that stops the loop at the next cycle boundary when cleared.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run up to `cycles` cycles. Returns how many ran before a stop.
    pub fn run_cycles(&mut self, cycles: u32) -> Result<u32, CycleError> {
        match self.pacing {
            Pacing::Fast => Ok(self.run_fast(cycles)),
            #[cfg(feature = "rt")]
            Pacing::RealTime => self.run_rt_loop(cycles),
            #[cfg(not(feature = "rt"))]
            Pacing::RealTime => Ok(self.run_sleep_loop(cycles)),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Time and record one cycle body.
    fn timed_cycle(&mut self, latency: Duration) {
        let start = Instant::now();
        self.robot.tick();
        let body = start.elapsed();
        if self.stats.record(body, latency, self.cycle_time) {
            warn!(
                body_us = body.as_micros() as u64,
                period_us = self.cycle_time.as_micros() as u64,
                tick = self.robot.clock().ticks(),
                "cycle overrun"
            );
        }
    }

    fn run_fast(&mut self, cycles: u32) -> u32 {
        let mut done = 0;
        while done < cycles && self.is_running() {
            self.timed_cycle(Duration::ZERO);
            done += 1;
        }
        done
    }

    #[cfg(not(feature = "rt"))]
    fn run_sleep_loop(&mut self, cycles: u32) -> u32 {
        let mut done = 0;
        while done < cycles && self.is_running() {
            let start = Instant::now();
            self.timed_cycle(Duration::ZERO);
            done += 1;
            if let Some(remaining) = self.cycle_time.checked_sub(start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
        done
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, cycles: u32) -> Result<u32, CycleError> {
        use nix::errno::Errno;
        use nix::sys::time::{TimeSpec, TimeValLike};
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let period = TimeSpec::from_duration(self.cycle_time);
        let read_clock = || clock_gettime(clock).map_err(|e| rt_error("clock_gettime", e));
        let mut deadline = read_clock()?;

        let mut done = 0;
        while done < cycles && self.is_running() {
            let late_ns = (read_clock()? - deadline).num_nanoseconds();
            self.timed_cycle(Duration::from_nanos(u64::try_from(late_ns).unwrap_or(0)));
            done += 1;

            deadline = deadline + period;
            match clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &deadline) {
                Ok(_) | Err(Errno::EINTR) => {}
                Err(e) => return Err(rt_error("clock_nanosleep", e)),
            }
        }
        Ok(done)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
