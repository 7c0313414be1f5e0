/// Gravity compensation and numerical integration primitives.
/// The logger reports acceleration in g; everything downstream works in m/s².

pub const GRAVITY: f64 = 9.81; // m/s²

/// Scale a Y-axis reading from g to m/s² and flip its sign so that motion
/// away from the sensor face is positive.
pub fn g_compensate_invert(acc_y: f64) -> f64 {
    -(acc_y * GRAVITY)
}

/// Running trapezoidal integral over `(dt, value)` samples.
///
/// The first sample only seeds the previous value; its increment is 0.
/// Each later sample adds `0.5 * (value + previous) * dt`.
#[derive(Clone, Debug, Default)]
pub struct TrapezoidIntegrator {
    previous: Option<f64>,
    accum: f64,
}

impl TrapezoidIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next sample and return `(increment, running_total)`.
    pub fn apply(&mut self, value: f64, dt: f64) -> (f64, f64) {
        let increment = match self.previous {
            Some(prev) => 0.5 * (value + prev) * dt,
            None => 0.0,
        };
        self.previous = Some(value);
        self.accum += increment;
        (increment, self.accum)
    }
}
