use std::ops::{AddAssign, MulAssign};

use serde::{Deserialize, Serialize};
use swing_diffeq::OdeModel;

/// The four dynamic variables of the double pendulum.
///
/// Angles are in radians and are never wrapped, angular rates are in radians per second.
/// As a derivative, the same fields hold `(omega1, omega2, alpha1, alpha2)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AngularState {
    pub theta1: f64,
    pub theta2: f64,
    pub omega1: f64,
    pub omega2: f64,
}

impl AngularState {
    pub fn new(theta1: f64, theta2: f64, omega1: f64, omega2: f64) -> Self {
        Self {
            theta1,
            theta2,
            omega1,
            omega2,
        }
    }
}

impl AddAssign<&Self> for AngularState {
    fn add_assign(&mut self, rhs: &Self) {
        self.theta1 += rhs.theta1;
        self.theta2 += rhs.theta2;
        self.omega1 += rhs.omega1;
        self.omega2 += rhs.omega2;
    }
}

impl MulAssign<f64> for AngularState {
    fn mul_assign(&mut self, rhs: f64) {
        self.theta1 *= rhs;
        self.theta2 *= rhs;
        self.omega1 *= rhs;
        self.omega2 *= rhs;
    }
}

/// Physical constants of a lumped-mass, massless-rod, frictionless planar double pendulum.
///
/// `gravity` is signed. The default of `-9.8` together with `y = -l cos(theta)` puts the
/// unstable equilibrium at `theta = 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParameters {
    pub length1: f64,
    pub length2: f64,
    pub mass1: f64,
    pub mass2: f64,
    pub gravity: f64,
}

impl Default for PendulumParameters {
    fn default() -> Self {
        Self {
            length1: 1.0,
            length2: 1.0,
            mass1: 1.0,
            mass2: 1.0,
            gravity: -9.8,
        }
    }
}

impl PendulumParameters {
    /// Closed-form equations of motion.
    ///
    /// Returns `(omega1, omega2, alpha1, alpha2)` packed as an `AngularState`. A vanishing
    /// denominator yields non-finite accelerations rather than an error.
    pub fn derivatives(&self, x: &AngularState) -> AngularState {
        let (t1, t2) = (x.theta1, x.theta2);
        let (w1, w2) = (x.omega1, x.omega2);
        let (m1, m2) = (self.mass1, self.mass2);
        let (l1, l2) = (self.length1, self.length2);
        let g = self.gravity;

        let delta = t1 - t2;
        let denom = 2.0 * m1 + m2 - m2 * (2.0 * delta).cos();

        let num1 = -g * (2.0 * m1 + m2) * t1.sin() - m2 * g * (t1 - 2.0 * t2).sin();
        let num2 = -2.0 * delta.sin() * m2 * (w2.powi(2) * l2 + w1.powi(2) * l1 * delta.cos());
        let alpha1 = (num1 + num2) / (l1 * denom);

        let num1 = 2.0 * delta.sin();
        let num2 = w1.powi(2) * l1 * (m1 + m2)
            + g * (m1 + m2) * t1.cos()
            + w2.powi(2) * l2 * m2 * delta.cos();
        let alpha2 = (num1 * num2) / (l2 * denom);

        AngularState::new(w1, w2, alpha1, alpha2)
    }

    /// Kinetic and potential energy, using the same signed gravity as the equations of motion.
    pub fn energy(&self, x: &AngularState) -> Energy {
        let (m1, m2) = (self.mass1, self.mass2);
        let (l1, l2) = (self.length1, self.length2);
        let g = self.gravity;

        let kinetic = 0.5 * m1 * (l1 * x.omega1).powi(2)
            + 0.5
                * m2
                * ((l1 * x.omega1).powi(2)
                    + (l2 * x.omega2).powi(2)
                    + 2.0 * l1 * l2 * x.omega1 * x.omega2 * (x.theta1 - x.theta2).cos());
        let potential = -(m1 + m2) * g * l1 * x.theta1.cos() - m2 * g * l2 * x.theta2.cos();

        Energy {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }
}

impl OdeModel for PendulumParameters {
    type State = AngularState;

    fn f(&self, _t: f64, x: &AngularState, dx: &mut AngularState) {
        *dx = self.derivatives(x);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Cartesian positions of both bobs relative to the pivot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Positions {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Positions {
    pub fn from_angles(theta1: f64, theta2: f64, parameters: &PendulumParameters) -> Self {
        let x1 = parameters.length1 * theta1.sin();
        let y1 = -parameters.length1 * theta1.cos();
        Self {
            x1,
            y1,
            x2: x1 + parameters.length2 * theta2.sin(),
            y2: y1 - parameters.length2 * theta2.cos(),
        }
    }

    pub fn bob1(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn tip(&self) -> Point {
        Point::new(self.x2, self.y2)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Energy {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}
