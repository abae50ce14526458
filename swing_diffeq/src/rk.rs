use std::array;

use crate::{DiffeqErrors, Integrable, OdeModel, result::MemoryResult, tableau::ButcherTableau};

// a span within this many steps of a whole number of steps takes no extra tail step
const STEP_COUNT_SLACK: f64 = 1e-9;

// preallocated buffers for intermediate calculations
#[derive(Clone, Debug)]
struct RKBuffers<State: Integrable, const STAGES: usize> {
    k: [State; STAGES],
    state: State,
    derivative: State,
}

impl<State: Integrable, const STAGES: usize> Default for RKBuffers<State, STAGES> {
    fn default() -> Self {
        Self {
            k: array::from_fn(|_| State::default()),
            state: State::default(),
            derivative: State::default(),
        }
    }
}

/// Explicit fixed-step Runge-Kutta integrator driven by a Butcher tableau.
///
/// Stage states live in the integrator's own buffers, so the caller's state is only
/// touched when the combined result is written to `y`.
#[derive(Clone, Debug)]
pub struct RungeKutta<State: Integrable, const STAGES: usize> {
    tableau: ButcherTableau<STAGES>,
    buffers: RKBuffers<State, STAGES>,
}

impl<State: Integrable> Default for RungeKutta<State, 4> {
    fn default() -> Self {
        Self::new(ButcherTableau::<4>::RK4)
    }
}

impl<State: Integrable, const STAGES: usize> RungeKutta<State, STAGES> {
    pub fn new(tableau: ButcherTableau<STAGES>) -> Self {
        Self {
            tableau,
            buffers: RKBuffers::default(),
        }
    }

    /// Advances `x` by one step of size `h` from time `t`, writing the result to `y`.
    ///
    /// Stage slopes are stored pre-scaled, `k_s = h f(t + c_s h, x + sum(a_si k_i))`, and
    /// combined as `y = x + b_scale * sum(b_s k_s)`. For RK4 this is the textbook
    /// `x + (k1 + 2 k2 + 2 k3 + k4) / 6` with the same order of floating point operations.
    pub fn step<Model: OdeModel<State = State>>(
        &mut self,
        model: &Model,
        t: f64,
        h: f64,
        x: &State,
        y: &mut State,
    ) {
        let k = &mut self.buffers.k;

        // k0
        model.f(t, x, &mut k[0]);
        k[0] *= h;

        // k1 - ks
        for s in 1..STAGES {
            // in place calculation of intermediate points
            self.buffers.state.clone_from(x);
            for i in 0..s {
                let a = self.tableau.a[s][i];
                if a == 0.0 {
                    continue;
                }
                self.buffers.derivative.clone_from(&k[i]);
                self.buffers.derivative *= a;
                self.buffers.state += &self.buffers.derivative;
            }

            model.f(t + self.tableau.c[s] * h, &self.buffers.state, &mut k[s]);
            k[s] *= h;
        }

        // weighted sum of the stages, then the common factor
        self.buffers.state.clone_from(&k[0]);
        self.buffers.state *= self.tableau.b[0];
        for s in 1..STAGES {
            self.buffers.derivative.clone_from(&k[s]);
            self.buffers.derivative *= self.tableau.b[s];
            self.buffers.state += &self.buffers.derivative;
        }
        self.buffers.state *= self.tableau.b_scale;

        y.clone_from(x);
        *y += &self.buffers.state;
    }

    /// Integrates from `tspan.0` to `tspan.1` with step `dt`, saving every step in memory.
    ///
    /// The initial state is saved first. The final step is shortened if needed so the
    /// last saved time lands on `tspan.1`; a remainder of rounding size is dropped
    /// instead of taking an extra near-zero step.
    pub fn solve_fixed<Model: OdeModel<State = State>>(
        &mut self,
        model: &Model,
        x0: &State,
        tspan: (f64, f64),
        dt: f64,
    ) -> Result<MemoryResult<State>, DiffeqErrors> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(DiffeqErrors::InvalidStep(dt));
        }
        if tspan.1 < tspan.0 {
            return Err(DiffeqErrors::InvalidSpan(tspan.0, tspan.1));
        }

        let n = ((tspan.1 - tspan.0) / dt - STEP_COUNT_SLACK).ceil().max(0.0) as usize;
        let mut result = MemoryResult::new(n + 1);
        let mut x = x0.clone();
        let mut y = x0.clone();
        result.insert(tspan.0, x0);

        for i in 0..n {
            let t = tspan.0 + i as f64 * dt;
            let (h, t_next) = if i + 1 == n {
                (tspan.1 - t, tspan.1)
            } else {
                (dt, t + dt)
            };
            self.step(model, t, h, &x, &mut y);
            result.insert(t_next, &y);
            x.clone_from(&y);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateArray;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[derive(Debug)]
    struct Decay;

    impl OdeModel for Decay {
        type State = StateArray<1>;
        fn f(&self, _t: f64, x: &StateArray<1>, dx: &mut StateArray<1>) {
            dx[0] = -x[0];
        }
    }

    #[derive(Debug)]
    struct Oscillator {
        omega: f64,
    }

    impl OdeModel for Oscillator {
        type State = StateArray<2>;
        fn f(&self, _t: f64, x: &StateArray<2>, dx: &mut StateArray<2>) {
            dx[0] = x[1];
            dx[1] = -self.omega * self.omega * x[0];
        }
    }

    #[derive(Debug)]
    struct Clock;

    impl OdeModel for Clock {
        type State = StateArray<1>;
        fn f(&self, t: f64, _x: &StateArray<1>, dx: &mut StateArray<1>) {
            dx[0] = 3.0 * t * t;
        }
    }

    #[test]
    fn test_exponential_decay() {
        let mut rk4 = RungeKutta::<_, 4>::default();
        let result = rk4
            .solve_fixed(&Decay, &StateArray::new([1.0]), (0.0, 1.0), 0.01)
            .unwrap();
        let (t, y) = result.last().unwrap();
        assert_abs_diff_eq!(t, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y[0], (-1.0f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_harmonic_oscillator_period() {
        let mut rk4 = RungeKutta::<_, 4>::default();
        let model = Oscillator { omega: 1.0 };
        let result = rk4
            .solve_fixed(&model, &StateArray::new([1.0, 0.0]), (0.0, 2.0 * PI), 0.01)
            .unwrap();
        let (_, y) = result.last().unwrap();
        assert_abs_diff_eq!(y[0], 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(y[1], 0.0, epsilon = 1e-7);
    }

    #[test]
    fn test_time_dependent_rhs_is_exact() {
        // RK4 integrates cubics in t exactly
        let mut rk4 = RungeKutta::<_, 4>::default();
        let result = rk4
            .solve_fixed(&Clock, &StateArray::new([0.0]), (0.0, 2.0), 0.25)
            .unwrap();
        let (_, y) = result.last().unwrap();
        assert_abs_diff_eq!(y[0], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_saves_initial_state_and_each_step() {
        let mut rk4 = RungeKutta::<_, 4>::default();
        let result = rk4
            .solve_fixed(&Decay, &StateArray::new([2.0]), (0.0, 0.1), 0.01)
            .unwrap();
        assert_eq!(result.len(), 11);
        assert_eq!(result.y[0][0], 2.0);
        assert_eq!(result.t[0], 0.0);
    }

    #[test]
    fn test_no_tail_step_from_rounding() {
        // 0.07 / 0.01 = 7.000000000000001
        let mut rk4 = RungeKutta::<_, 4>::default();
        let result = rk4
            .solve_fixed(&Decay, &StateArray::new([1.0]), (0.0, 0.07), 0.01)
            .unwrap();
        assert_eq!(result.len(), 8);
        assert_eq!(result.t[7], 0.07);
        assert!(result.t.windows(2).all(|w| w[1] - w[0] > 0.009));
    }

    #[test]
    fn test_partial_last_step_lands_on_end() {
        let mut rk4 = RungeKutta::<_, 4>::default();
        let result = rk4
            .solve_fixed(&Decay, &StateArray::new([1.0]), (0.0, 0.105), 0.01)
            .unwrap();
        assert_eq!(result.len(), 12);
        assert_eq!(result.t[11], 0.105);
        assert_abs_diff_eq!(result.y[11][0], (-0.105f64).exp(), epsilon = 1e-10);
    }

    #[test]
    fn test_rk4_matches_hand_written_form() {
        // k = h f, stages x + k/2 and x + k3, result x + (k1 + 2 k2 + 2 k3 + k4) / 6
        let model = Oscillator { omega: 3.0 };
        let f = |x: [f64; 2]| [x[1], -9.0 * x[0]];
        let h = 0.05;
        let mut expected = [0.7, -0.2];
        let mut x = StateArray::new(expected);
        let mut y = StateArray::default();
        let mut rk4 = RungeKutta::<_, 4>::default();
        for _ in 0..200 {
            let k1 = f(expected).map(|v| h * v);
            let k2 = f([expected[0] + 0.5 * k1[0], expected[1] + 0.5 * k1[1]]).map(|v| h * v);
            let k3 = f([expected[0] + 0.5 * k2[0], expected[1] + 0.5 * k2[1]]).map(|v| h * v);
            let k4 = f([expected[0] + k3[0], expected[1] + k3[1]]).map(|v| h * v);
            for j in 0..2 {
                expected[j] += (1.0 / 6.0) * (k1[j] + 2.0 * k2[j] + 2.0 * k3[j] + k4[j]);
            }
            rk4.step(&model, 0.0, h, &x, &mut y);
            x = y;
        }
        assert_eq!(*x, expected);
    }

    #[test]
    fn test_step_leaves_input_untouched() {
        let mut rk4 = RungeKutta::<_, 4>::default();
        let x = StateArray::new([1.0, 0.5]);
        let mut y = StateArray::default();
        rk4.step(&Oscillator { omega: 2.0 }, 0.0, 0.1, &x, &mut y);
        assert_eq!(x, StateArray::new([1.0, 0.5]));
        assert!(y[0] != x[0]);
    }

    #[test]
    fn test_rejects_bad_step() {
        let mut rk4 = RungeKutta::<_, 4>::default();
        let x0 = StateArray::new([1.0]);
        assert!(matches!(
            rk4.solve_fixed(&Decay, &x0, (0.0, 1.0), 0.0),
            Err(DiffeqErrors::InvalidStep(_))
        ));
        assert!(matches!(
            rk4.solve_fixed(&Decay, &x0, (1.0, 0.0), 0.1),
            Err(DiffeqErrors::InvalidSpan(_, _))
        ));
    }
}
