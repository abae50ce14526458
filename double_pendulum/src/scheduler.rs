use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Default cap on the wall-clock interval consumed by a single tick, in seconds.
pub const MAX_FRAME_TIME: f64 = 0.1;

// slack so that e.g. 0.07 / 0.01 = 7.000000000000001 still plans 7 steps
const STEP_COUNT_SLACK: f64 = 1e-9;

/// How simulated time follows the ticks.
///
/// - `RealTime`: each tick integrates the wall-clock time elapsed since the previous tick,
///   split into equal sub-steps no longer than the nominal `dt`. Trajectories then depend
///   on frame timing.
/// - `Fixed`: each tick takes exactly one nominal step, reproducing fixed-`dt` trajectories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    #[default]
    RealTime,
    Fixed,
}

/// A batch of equal sub-steps covering one elapsed interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatchUp {
    pub steps: usize,
    pub dt: f64,
}

impl CatchUp {
    /// Splits `elapsed` into the fewest sub-steps no longer than `nominal_dt`.
    ///
    /// `steps * dt` equals `elapsed` up to rounding. Non-positive intervals plan nothing.
    pub fn plan(elapsed: f64, nominal_dt: f64) -> Self {
        if !(elapsed > 0.0 && nominal_dt > 0.0) {
            return Self {
                steps: 0,
                dt: nominal_dt,
            };
        }
        let steps = ((elapsed / nominal_dt - STEP_COUNT_SLACK).ceil() as usize).max(1);
        Self {
            steps,
            dt: elapsed / steps as f64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// The session is paused; nothing was integrated.
    Idle,
    /// First tick after (re)starting; only the timestamp was recorded.
    Started,
    Stepped(CatchUp),
    /// The run length has been reached and the session was paused.
    Finished,
}

/// Drives a `Session` from a stream of timestamps.
///
/// Ticks take `&mut Session`, so a tick can never begin while another is in flight.
#[derive(Clone, Debug)]
pub struct Scheduler {
    mode: SyncMode,
    max_frame_time: f64,
    last_timestamp: Option<f64>,
    epoch: Option<u64>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SyncMode::default())
    }
}

impl Scheduler {
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            max_frame_time: MAX_FRAME_TIME,
            last_timestamp: None,
            epoch: None,
        }
    }

    pub fn with_max_frame_time(mut self, max_frame_time: f64) -> Self {
        self.max_frame_time = max_frame_time;
        self
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Forgets the previous timestamp, e.g. after a pause or restart.
    pub fn reset(&mut self) {
        self.last_timestamp = None;
    }

    /// Advances the session for a tick at time `now` (seconds, any monotonic origin).
    pub fn tick(&mut self, session: &mut Session, now: f64) -> TickOutcome {
        if !session.is_running() {
            self.last_timestamp = None;
            return TickOutcome::Idle;
        }
        if self.epoch != Some(session.epoch()) {
            // restarted or resumed since the last tick, paused wall time is not simulated
            self.epoch = Some(session.epoch());
            self.last_timestamp = None;
        }
        if session.is_finished() {
            return self.finish(session);
        }

        let previous = self.last_timestamp.replace(now);
        let plan = match self.mode {
            SyncMode::Fixed => CatchUp {
                steps: 1,
                dt: session.pendulum().dt(),
            },
            SyncMode::RealTime => {
                let Some(previous) = previous else {
                    return TickOutcome::Started;
                };
                let elapsed = (now - previous).min(self.max_frame_time).max(0.0);
                CatchUp::plan(elapsed, session.pendulum().dt())
            }
        };

        let pendulum = session.pendulum_mut();
        for _ in 0..plan.steps {
            pendulum.step_by(plan.dt);
        }
        tracing::trace!(steps = plan.steps, dt = plan.dt, "tick");

        if session.is_finished() {
            return self.finish(session);
        }
        TickOutcome::Stepped(plan)
    }

    fn finish(&mut self, session: &mut Session) -> TickOutcome {
        session.pause();
        self.last_timestamp = None;
        tracing::debug!(time = session.pendulum().time(), "run length reached");
        TickOutcome::Finished
    }
}
