//! Butcher tableaux for the explicit Runge-Kutta steppers.
//!
//! Every stepper is an explicit tableau run by the same stage loop. Adaptive
//! tableaux carry embedded lower-order weights `b_hat`; the step error is
//! `h * Σ (b[i] - b_hat[i]) * k[i]`.

/// Coefficients of an explicit Runge-Kutta method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tableau {
    /// Nodes; `c[0]` is always zero.
    pub c: &'static [f64],

    /// Strictly lower-triangular stage matrix; row `i` has `i` entries.
    pub a: &'static [&'static [f64]],

    /// Weights of the propagated solution.
    pub b: &'static [f64],

    /// Weights of the embedded solution, present for adaptive methods.
    pub b_hat: Option<&'static [f64]>,

    /// Order of the propagated solution.
    pub order: u32,

    /// Order of the embedded solution (zero for fixed-step methods).
    pub embedded_order: u32,

    /// The last stage is evaluated at the new point (first same as last).
    pub fsal: bool,
}

impl Tableau {
    /// Number of stages.
    #[must_use]
    pub fn stages(&self) -> usize {
        self.b.len()
    }

    /// Whether this method has an error estimate.
    #[must_use]
    pub fn is_adaptive(&self) -> bool {
        self.b_hat.is_some()
    }
}

pub const EULER: Tableau = Tableau {
    c: &[0.0],
    a: &[&[]],
    b: &[1.0],
    b_hat: None,
    order: 1,
    embedded_order: 0,
    fsal: false,
};

pub const HEUN: Tableau = Tableau {
    c: &[0.0, 1.0],
    a: &[&[], &[1.0]],
    b: &[0.5, 0.5],
    b_hat: None,
    order: 2,
    embedded_order: 0,
    fsal: false,
};

pub const RK4: Tableau = Tableau {
    c: &[0.0, 0.5, 0.5, 1.0],
    a: &[&[], &[0.5], &[0.0, 0.5], &[0.0, 0.0, 1.0]],
    b: &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
    b_hat: None,
    order: 4,
    embedded_order: 0,
    fsal: false,
};

/// Heun's method with an embedded Euler step.
pub const HEUN_EULER: Tableau = Tableau {
    c: &[0.0, 1.0],
    a: &[&[], &[1.0]],
    b: &[0.5, 0.5],
    b_hat: Some(&[1.0, 0.0]),
    order: 2,
    embedded_order: 1,
    fsal: false,
};

/// Bogacki–Shampine 3(2).
pub const BOGACKI_SHAMPINE_23: Tableau = Tableau {
    c: &[0.0, 0.5, 0.75, 1.0],
    a: &[
        &[],
        &[0.5],
        &[0.0, 0.75],
        &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
    ],
    b: &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0, 0.0],
    b_hat: Some(&[7.0 / 24.0, 1.0 / 4.0, 1.0 / 3.0, 1.0 / 8.0]),
    order: 3,
    embedded_order: 2,
    fsal: true,
};

/// Dormand–Prince 5(4).
pub const DORMAND_PRINCE_5: Tableau = Tableau {
    c: &[0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0],
    a: &[
        &[],
        &[1.0 / 5.0],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
        &[
            19372.0 / 6561.0,
            -25360.0 / 2187.0,
            64448.0 / 6561.0,
            -212.0 / 729.0,
        ],
        &[
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
        ],
        &[
            35.0 / 384.0,
            0.0,
            500.0 / 1113.0,
            125.0 / 192.0,
            -2187.0 / 6784.0,
            11.0 / 84.0,
        ],
    ],
    b: &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
        0.0,
    ],
    b_hat: Some(&[
        5179.0 / 57600.0,
        0.0,
        7571.0 / 16695.0,
        393.0 / 640.0,
        -92097.0 / 339_200.0,
        187.0 / 2100.0,
        1.0 / 40.0,
    ]),
    order: 5,
    embedded_order: 4,
    fsal: true,
};
