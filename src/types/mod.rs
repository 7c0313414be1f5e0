use serde::{Deserialize, Serialize};

/// One logged accelerometer sample, in source row order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: i64, // unix seconds
    pub sample_index: i64,
    pub acc_x: f64,
    pub acc_y: f64,
    pub acc_z: f64, // copied through, never integrated
}

impl Reading {
    pub fn new(timestamp: i64, sample_index: i64, acc_x: f64, acc_y: f64, acc_z: f64) -> Self {
        Self {
            timestamp,
            sample_index,
            acc_x,
            acc_y,
            acc_z,
        }
    }
}

/// Values derived for a single reading by the recurrence engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub elapsed_time: f64,           // s
    pub g_compensated_inverted: f64, // m/s^2
    pub shifted_accel: f64,          // m/s^2
    pub delta_t: f64,                // s
    pub velocity_increment: f64,     // m/s
    pub velocity: f64,               // m/s
    pub displacement_increment: f64, // m
    pub displacement: f64,           // m
}

/// Scalar summaries over the whole derived sequence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub max_displacement: f64,
    pub max_velocity: f64,
    pub max_abs_acceleration: f64,
    pub mean_velocity: f64,
    pub mean_acceleration: f64,
}

impl Insights {
    /// Label/value pairs in the order they are laid out in the output table.
    pub fn labelled(&self) -> [(&'static str, f64); 5] {
        [
            ("Total Distance Travelled", self.max_displacement),
            ("Max Velocity Attained", self.max_velocity),
            ("Max Acceleration Attained", self.max_abs_acceleration),
            ("Mean Velocity", self.mean_velocity),
            ("Mean Acceleration", self.mean_acceleration),
        ]
    }
}
