use serde::{Deserialize, Serialize};

use crate::{
    pendulum::{DoublePendulum, PendulumOptions},
    trail::{DEFAULT_TRAIL_LENGTH, TrailLimit},
    viewport::{Frame, Viewport},
};

/// Values a user types in: initial angles in degrees and the run length in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationInputs {
    pub theta1_deg: f64,
    pub theta2_deg: f64,
    pub run_length: f64,
}

impl Default for SimulationInputs {
    fn default() -> Self {
        Self {
            theta1_deg: 90.0,
            theta2_deg: 90.0,
            run_length: 60.0,
        }
    }
}

impl SimulationInputs {
    pub fn new(theta1_deg: f64, theta2_deg: f64, run_length: f64) -> Self {
        Self {
            theta1_deg,
            theta2_deg,
            run_length,
        }
    }

    pub fn theta1(&self) -> f64 {
        self.theta1_deg.to_radians()
    }

    pub fn theta2(&self) -> f64 {
        self.theta2_deg.to_radians()
    }
}

/// State of one interactive run: the engine plus the flags a front end toggles.
///
/// A restart replaces the engine; the physics template (lengths, masses, gravity, dt,
/// initial rates) carries over while the angles come from the inputs.
#[derive(Clone, Debug)]
pub struct Session {
    pendulum: DoublePendulum,
    template: PendulumOptions,
    inputs: SimulationInputs,
    running: bool,
    show_trail: bool,
    keep_full_trail: bool,
    epoch: u64,
}

impl Session {
    pub fn new(template: PendulumOptions, inputs: SimulationInputs) -> Self {
        let mut session = Self {
            pendulum: build_pendulum(&template, &inputs),
            template,
            inputs,
            running: false,
            show_trail: true,
            keep_full_trail: true,
            epoch: 0,
        };
        session.apply_trail_limit();
        session
    }

    /// Play/pause. Changed inputs restart the run and start it immediately.
    pub fn toggle(&mut self, inputs: SimulationInputs) -> bool {
        if self.inputs_changed(&inputs) {
            tracing::debug!(?inputs, "inputs changed, restarting");
            self.restart(inputs);
            self.running = true;
        } else {
            self.running = !self.running;
            if self.running {
                self.epoch += 1;
            }
        }
        self.running
    }

    /// Rebuilds the engine from `inputs` and leaves the session paused.
    pub fn restart(&mut self, inputs: SimulationInputs) {
        self.inputs = inputs;
        self.pendulum = build_pendulum(&self.template, &inputs);
        self.running = false;
        self.keep_full_trail = true;
        self.epoch += 1;
        self.apply_trail_limit();
        tracing::debug!(
            theta1 = inputs.theta1_deg,
            theta2 = inputs.theta2_deg,
            run_length = inputs.run_length,
            "session restarted"
        );
    }

    /// Showing the trail again also switches back to keeping the full history.
    pub fn toggle_trail(&mut self) -> bool {
        self.show_trail = !self.show_trail;
        if self.show_trail {
            self.keep_full_trail = true;
            self.apply_trail_limit();
        }
        tracing::debug!(show_trail = self.show_trail, "trail visibility toggled");
        self.show_trail
    }

    pub fn toggle_full_trail(&mut self) -> bool {
        self.keep_full_trail = !self.keep_full_trail;
        self.apply_trail_limit();
        tracing::debug!(keep_full_trail = self.keep_full_trail, "trail history toggled");
        self.keep_full_trail
    }

    /// Sets both trail flags at once, e.g. from a config file.
    pub fn with_trail_flags(mut self, show_trail: bool, keep_full_trail: bool) -> Self {
        self.show_trail = show_trail;
        self.keep_full_trail = keep_full_trail;
        self.apply_trail_limit();
        self
    }

    pub fn inputs_changed(&self, inputs: &SimulationInputs) -> bool {
        *inputs != self.inputs
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Changes every time the run is restarted or resumed.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.pendulum.time() >= self.inputs.run_length
    }

    pub fn show_trail(&self) -> bool {
        self.show_trail
    }

    pub fn keep_full_trail(&self) -> bool {
        self.keep_full_trail
    }

    pub fn inputs(&self) -> &SimulationInputs {
        &self.inputs
    }

    pub fn pendulum(&self) -> &DoublePendulum {
        &self.pendulum
    }

    pub fn pendulum_mut(&mut self) -> &mut DoublePendulum {
        &mut self.pendulum
    }

    pub fn time_display(&self) -> String {
        format!(
            "Time: {:.2}s / {:.2}s",
            self.pendulum.time(),
            self.inputs.run_length
        )
    }

    pub fn frame(&self, viewport: &Viewport) -> Frame {
        Frame::capture(&self.pendulum, viewport, self.show_trail)
    }

    fn apply_trail_limit(&mut self) {
        let limit = if self.keep_full_trail {
            TrailLimit::Unbounded
        } else {
            TrailLimit::Capped(DEFAULT_TRAIL_LENGTH)
        };
        self.pendulum.set_max_history_length(limit);
    }
}

fn build_pendulum(template: &PendulumOptions, inputs: &SimulationInputs) -> DoublePendulum {
    DoublePendulum::from_options(
        template
            .with_theta1(inputs.theta1())
            .with_theta2(inputs.theta2()),
    )
}
