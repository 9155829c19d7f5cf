/// Event emitted by the integrator for each accepted point.
///
/// Step 0 is the initial point before any integration. Steps 1..N are emitted
/// after each accepted step. `dx` is the drift `f(t, x, 0)` at the point and
/// `aux` the auxiliary outputs from the same evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Accepted step number (0 for the initial point).
    pub step: usize,

    /// Time of this point.
    pub t: f64,

    /// Size of the step that reached this point (0 for the initial point).
    pub dt: f64,

    /// State at this point.
    pub x: &'a [f64],

    /// Drift at this point.
    pub dx: &'a [f64],

    /// Auxiliary outputs at this point.
    pub aux: &'a [f64],
}
