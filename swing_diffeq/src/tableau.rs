/// Coefficients of an explicit Runge-Kutta method.
///
/// `a` is strictly lower triangular for explicit methods and `c` holds the stage time
/// fractions. The combination weights are stored factored as `b_scale * b`, so a method
/// whose weights share a denominator combines its stages exactly as it is written by
/// hand, e.g. RK4 as `(k1 + 2 k2 + 2 k3 + k4) / 6`.
#[derive(Clone, Copy, Debug)]
pub struct ButcherTableau<const STAGES: usize> {
    pub a: [[f64; STAGES]; STAGES],
    pub b: [f64; STAGES],
    pub b_scale: f64,
    pub c: [f64; STAGES],
}

impl ButcherTableau<4> {
    // usage is ButcherTableau::<4>::RK4
    pub const RK4: Self = Self {
        a: [
            [0., 0., 0., 0.],
            [1. / 2., 0., 0., 0.],
            [0., 1. / 2., 0., 0.],
            [0., 0., 1., 0.],
        ],
        b: [1., 2., 2., 1.],
        b_scale: 1. / 6.,
        c: [0., 1.0 / 2.0, 1.0 / 2.0, 1.0],
    };
}

impl<const STAGES: usize> ButcherTableau<STAGES> {
    /// The effective weight of stage `s`.
    pub fn weight(&self, s: usize) -> f64 {
        self.b_scale * self.b[s]
    }
}
