use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use swing_diffeq::RungeKutta;
use swing_result::{ResultErrors, ResultManager, SwingResult};

use crate::{
    model::{AngularState, Energy, PendulumParameters, Positions},
    trail::{Trail, TrailLimit},
};

/// Everything a caller may override when constructing a `DoublePendulum`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumOptions {
    pub theta1: f64,
    pub theta2: f64,
    pub omega1: f64,
    pub omega2: f64,
    pub parameters: PendulumParameters,
    pub dt: f64,
}

impl Default for PendulumOptions {
    fn default() -> Self {
        Self {
            theta1: FRAC_PI_2,
            theta2: FRAC_PI_2,
            omega1: 0.0,
            omega2: 0.0,
            parameters: PendulumParameters::default(),
            dt: 0.01,
        }
    }
}

impl PendulumOptions {
    pub fn with_theta1(mut self, theta1: f64) -> Self {
        self.theta1 = theta1;
        self
    }

    pub fn with_theta2(mut self, theta2: f64) -> Self {
        self.theta2 = theta2;
        self
    }

    pub fn with_omega1(mut self, omega1: f64) -> Self {
        self.omega1 = omega1;
        self
    }

    pub fn with_omega2(mut self, omega2: f64) -> Self {
        self.omega2 = omega2;
        self
    }

    pub fn with_length1(mut self, length1: f64) -> Self {
        self.parameters.length1 = length1;
        self
    }

    pub fn with_length2(mut self, length2: f64) -> Self {
        self.parameters.length2 = length2;
        self
    }

    pub fn with_mass1(mut self, mass1: f64) -> Self {
        self.parameters.mass1 = mass1;
        self
    }

    pub fn with_mass2(mut self, mass2: f64) -> Self {
        self.parameters.mass2 = mass2;
        self
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.parameters.gravity = gravity;
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }
}

/// The double pendulum simulation engine.
///
/// Owns the angular state, the fixed physical constants, the RK4 integrator buffers and
/// the tip trail. Positions and the trail are refreshed every time the angles change.
#[derive(Clone, Debug)]
pub struct DoublePendulum {
    state: AngularState,
    parameters: PendulumParameters,
    dt: f64,
    time: f64,
    positions: Positions,
    trail: Trail,
    solver: RungeKutta<AngularState, 4>,
    result_id: Option<u32>,
}

impl Default for DoublePendulum {
    fn default() -> Self {
        Self::from_options(PendulumOptions::default())
    }
}

impl DoublePendulum {
    /// Creates a pendulum at rest at the given angles (radians) with default constants.
    pub fn new(theta1: f64, theta2: f64) -> Self {
        Self::from_options(
            PendulumOptions::default()
                .with_theta1(theta1)
                .with_theta2(theta2),
        )
    }

    pub fn from_options(options: PendulumOptions) -> Self {
        let mut pendulum = Self {
            state: AngularState::new(
                options.theta1,
                options.theta2,
                options.omega1,
                options.omega2,
            ),
            parameters: options.parameters,
            dt: options.dt,
            time: 0.0,
            positions: Positions::default(),
            trail: Trail::default(),
            solver: RungeKutta::default(),
            result_id: None,
        };
        pendulum.update_positions();
        pendulum
    }

    /// Advances one nominal time step.
    pub fn step(&mut self) {
        self.step_by(self.dt);
    }

    /// Advances by `h` seconds with one RK4 step, leaving the nominal `dt` untouched.
    pub fn step_by(&mut self, h: f64) {
        let x = self.state;
        self.solver
            .step(&self.parameters, self.time, h, &x, &mut self.state);
        self.update_positions();
        self.time += h;
    }

    /// Zeroes the rates and the clock, clears the trail and optionally moves the arms.
    ///
    /// Constants, `dt` and the trail limit are kept.
    pub fn reset(&mut self, theta1: Option<f64>, theta2: Option<f64>) {
        if let Some(theta1) = theta1 {
            self.state.theta1 = theta1;
        }
        if let Some(theta2) = theta2 {
            self.state.theta2 = theta2;
        }
        self.state.omega1 = 0.0;
        self.state.omega2 = 0.0;
        self.time = 0.0;
        self.trail.clear();
        self.update_positions();
    }

    pub fn set_max_history_length(&mut self, limit: impl Into<TrailLimit>) {
        self.trail.set_limit(limit.into());
    }

    pub fn max_history_length(&self) -> TrailLimit {
        self.trail.limit()
    }

    pub fn positions(&self) -> Positions {
        self.positions
    }

    pub fn tip_history(&self) -> &Trail {
        &self.trail
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn set_dt(&mut self, dt: f64) {
        self.dt = dt;
    }

    pub fn state(&self) -> &AngularState {
        &self.state
    }

    pub fn parameters(&self) -> &PendulumParameters {
        &self.parameters
    }

    pub fn energy(&self) -> Energy {
        self.parameters.energy(&self.state)
    }

    fn update_positions(&mut self) {
        self.positions = Positions::from_angles(self.state.theta1, self.state.theta2, &self.parameters);
        self.trail.push(self.positions.tip());
    }
}

impl SwingResult for DoublePendulum {
    fn new_result(&mut self, results: &mut ResultManager) -> Result<(), ResultErrors> {
        let headers = [
            "t", "theta1", "theta2", "omega1", "omega2", "x1", "y1", "x2", "y2", "energy",
        ];
        self.result_id = Some(results.new_writer("pendulum", &headers)?);
        Ok(())
    }

    fn write_result(&self, results: &mut ResultManager) -> Result<(), ResultErrors> {
        if let Some(id) = self.result_id {
            results.write_record(
                id,
                &[
                    self.time.to_string(),
                    self.state.theta1.to_string(),
                    self.state.theta2.to_string(),
                    self.state.omega1.to_string(),
                    self.state.omega2.to_string(),
                    self.positions.x1.to_string(),
                    self.positions.y1.to_string(),
                    self.positions.x2.to_string(),
                    self.positions.y2.to_string(),
                    self.energy().total.to_string(),
                ],
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::MIN_TRAIL_LENGTH;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    fn assert_closed_form(pendulum: &DoublePendulum) {
        let s = pendulum.state();
        let p = pendulum.parameters();
        let pos = pendulum.positions();
        assert_abs_diff_eq!(pos.x1, p.length1 * s.theta1.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(pos.y1, -p.length1 * s.theta1.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(pos.x2, pos.x1 + p.length2 * s.theta2.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(pos.y2, pos.y1 - p.length2 * s.theta2.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_construction() {
        let pendulum = DoublePendulum::new(0.7, -2.0);
        assert_closed_form(&pendulum);
        assert_eq!(pendulum.tip_history().len(), 1);
        assert_eq!(pendulum.time(), 0.0);
        assert_eq!(pendulum.dt(), 0.01);
        assert_eq!(pendulum.max_history_length(), TrailLimit::Capped(1000));
    }

    #[test]
    fn test_options_override_defaults() {
        let pendulum = DoublePendulum::from_options(
            PendulumOptions::default()
                .with_theta1(0.1)
                .with_omega2(-3.0)
                .with_length1(2.0)
                .with_mass2(0.25)
                .with_gravity(-1.62)
                .with_dt(0.005),
        );
        assert_eq!(pendulum.state().omega2, -3.0);
        assert_eq!(pendulum.parameters().length1, 2.0);
        assert_eq!(pendulum.parameters().mass2, 0.25);
        assert_eq!(pendulum.parameters().gravity, -1.62);
        assert_eq!(pendulum.dt(), 0.005);
        assert_closed_form(&pendulum);
    }

    #[test]
    fn test_step_updates_everything() {
        let mut pendulum = DoublePendulum::default();
        pendulum.step();
        assert_closed_form(&pendulum);
        assert_eq!(pendulum.tip_history().len(), 2);
        assert_abs_diff_eq!(pendulum.time(), 0.01, epsilon = 1e-15);
        assert_eq!(pendulum.tip_history().last(), Some(&pendulum.positions().tip()));
    }

    #[test]
    fn test_fixed_point() {
        let mut pendulum = DoublePendulum::new(0.0, 0.0);
        pendulum.step();
        assert_eq!(*pendulum.state(), AngularState::default());
    }

    #[test]
    fn test_step_by_keeps_nominal_dt() {
        let mut pendulum = DoublePendulum::default();
        pendulum.step_by(0.004);
        pendulum.step_by(0.004);
        assert_eq!(pendulum.dt(), 0.01);
        assert_abs_diff_eq!(pendulum.time(), 0.008, epsilon = 1e-15);
    }

    #[test]
    fn test_reset() {
        let mut pendulum = DoublePendulum::default();
        pendulum.set_max_history_length(TrailLimit::Unbounded);
        for _ in 0..37 {
            pendulum.step();
        }
        pendulum.reset(Some(0.25), None);
        assert_eq!(pendulum.time(), 0.0);
        assert_eq!(pendulum.state().omega1, 0.0);
        assert_eq!(pendulum.state().omega2, 0.0);
        assert_eq!(pendulum.state().theta1, 0.25);
        assert_eq!(pendulum.tip_history().len(), 1);
        assert_eq!(pendulum.max_history_length(), TrailLimit::Unbounded);
        assert_closed_form(&pendulum);
    }

    #[test]
    fn test_history_clamp() {
        let mut pendulum = DoublePendulum::default();
        pendulum.set_max_history_length(TrailLimit::Capped(5));
        assert_eq!(pendulum.max_history_length(), TrailLimit::Capped(MIN_TRAIL_LENGTH));
    }

    #[test]
    fn test_energy_is_roughly_conserved() {
        let mut pendulum = DoublePendulum::default();
        let e0 = pendulum.energy().total;
        for _ in 0..1000 {
            pendulum.step();
        }
        assert_abs_diff_eq!(pendulum.energy().total, e0, epsilon = 1e-2);
    }

    #[test]
    fn test_writes_result_rows() {
        let dir = tempdir().unwrap();
        let mut results = ResultManager::new(dir.path().to_path_buf());
        let mut pendulum = DoublePendulum::default();
        pendulum.new_result(&mut results).unwrap();
        pendulum.write_result(&mut results).unwrap();
        pendulum.step();
        pendulum.write_result(&mut results).unwrap();
        results.flush().unwrap();

        let contents = std::fs::read_to_string(results.path_of("pendulum")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("t,theta1,theta2"));
        assert!(lines[2].starts_with("0.01,"));
    }
}
