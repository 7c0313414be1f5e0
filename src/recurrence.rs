use log::debug;

use crate::error::{AccelError, Result};
use crate::physics::{g_compensate_invert, TrapezoidIntegrator};
use crate::types::{DerivedRow, Reading};

/// Derived rows for a data set together with the bias that was removed.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedSeries {
    pub shift_value: f64,
    pub rows: Vec<DerivedRow>,
}

/// Mean of `values` over the inclusive, 1-based range `from..=to`.
pub fn shift_value(values: &[f64], from: usize, to: usize) -> Result<f64> {
    if from == 0 || from > to || to > values.len() {
        return Err(AccelError::InvalidShiftRange {
            from,
            to,
            len: values.len(),
        });
    }
    let window = &values[from - 1..to];
    Ok(window.iter().sum::<f64>() / window.len() as f64)
}

/// Run the recurrence over `readings`, removing the mean bias measured over
/// readings `from..=to` (1-based, inclusive).
///
/// Every reading yields exactly one [`DerivedRow`]. The first row is the
/// start-of-motion boundary: elapsed time, deltaT, both increments, velocity
/// and displacement are all 0 there. Rows must be produced in order since
/// each one reads its predecessor.
pub fn derive(readings: &[Reading], from: usize, to: usize) -> Result<DerivedSeries> {
    let compensated: Vec<f64> = readings
        .iter()
        .map(|r| g_compensate_invert(r.acc_y))
        .collect();
    let shift = shift_value(&compensated, from, to)?;
    debug!("shift value {shift:.6} m/s² over readings {from}..={to}");

    let mut velocity = TrapezoidIntegrator::new();
    let mut displacement = TrapezoidIntegrator::new();
    let mut rows: Vec<DerivedRow> = Vec::with_capacity(readings.len());

    for (i, reading) in readings.iter().enumerate() {
        let shifted_accel = compensated[i] - shift;

        let elapsed_time = match (i.checked_sub(1), rows.last()) {
            (Some(p), Some(prev)) => {
                prev.elapsed_time + (reading.timestamp - readings[p].timestamp) as f64
            }
            _ => 0.0,
        };
        let delta_t = rows
            .last()
            .map_or(0.0, |prev| elapsed_time - prev.elapsed_time);

        let (velocity_increment, v) = velocity.apply(shifted_accel, delta_t);
        let (displacement_increment, d) = displacement.apply(v, delta_t);

        rows.push(DerivedRow {
            elapsed_time,
            g_compensated_inverted: compensated[i],
            shifted_accel,
            delta_t,
            velocity_increment,
            velocity: v,
            displacement_increment,
            displacement: d,
        });
    }

    Ok(DerivedSeries {
        shift_value: shift,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn readings(timestamps: &[i64], acc_y: &[f64]) -> Vec<Reading> {
        timestamps
            .iter()
            .zip(acc_y)
            .enumerate()
            .map(|(i, (&t, &y))| Reading::new(t, i as i64 + 1, 0.0, y, 1.0))
            .collect()
    }

    #[test]
    fn test_reference_sequence() {
        let data = readings(&[0, 1, 2, 3], &[0.0, -1.0, -1.0, 0.0]);
        let series = derive(&data, 1, 1).unwrap();

        assert_eq!(series.shift_value, 0.0);
        let compensated: Vec<f64> = series.rows.iter().map(|r| r.g_compensated_inverted).collect();
        assert_relative_eq!(compensated[1], 9.81);
        assert_relative_eq!(compensated[2], 9.81);
        assert_eq!(compensated[0], 0.0);
        assert_eq!(compensated[3], 0.0);

        let v: Vec<f64> = series.rows.iter().map(|r| r.velocity).collect();
        assert_eq!(v[0], 0.0);
        assert_relative_eq!(v[1], 4.905, epsilon = 1e-9);
        assert_relative_eq!(v[2], 14.715, epsilon = 1e-9);
        assert_relative_eq!(v[3], 19.62, epsilon = 1e-9);
    }

    #[test]
    fn test_displacement_follows_velocity() {
        let data = readings(&[0, 1, 2, 3], &[0.0, -1.0, -1.0, 0.0]);
        let rows = derive(&data, 1, 1).unwrap().rows;

        // d[2] = 0.5 * (4.905 + 0) * 1
        assert_relative_eq!(rows[1].displacement, 2.4525, epsilon = 1e-9);
        // d[3] = d[2] + 0.5 * (14.715 + 4.905)
        assert_relative_eq!(rows[2].displacement, 12.2625, epsilon = 1e-9);
        // d[4] = d[3] + 0.5 * (19.62 + 14.715)
        assert_relative_eq!(rows[3].displacement, 29.43, epsilon = 1e-9);
        assert_relative_eq!(
            rows[3].displacement_increment,
            rows[3].displacement - rows[2].displacement,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_one_row_per_reading() {
        for n in 1..12 {
            let ts: Vec<i64> = (0..n).collect();
            let acc: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
            let series = derive(&readings(&ts, &acc), 1, 1).unwrap();
            assert_eq!(series.rows.len(), n as usize);
        }
    }

    #[test]
    fn test_first_row_is_at_rest() {
        let data = readings(&[100, 102, 105], &[-0.4, -0.9, 0.2]);
        let first = derive(&data, 2, 3).unwrap().rows[0];
        assert_eq!(first.elapsed_time, 0.0);
        assert_eq!(first.delta_t, 0.0);
        assert_eq!(first.velocity_increment, 0.0);
        assert_eq!(first.velocity, 0.0);
        assert_eq!(first.displacement_increment, 0.0);
        assert_eq!(first.displacement, 0.0);
    }

    #[test]
    fn test_elapsed_time_accumulates_gaps() {
        let data = readings(&[1_592_643_200, 1_592_643_201, 1_592_643_203, 1_592_643_208], &[0.0; 4]);
        let rows = derive(&data, 1, 4).unwrap().rows;
        let elapsed: Vec<f64> = rows.iter().map(|r| r.elapsed_time).collect();
        let dt: Vec<f64> = rows.iter().map(|r| r.delta_t).collect();
        assert_eq!(elapsed, vec![0.0, 1.0, 3.0, 8.0]);
        assert_eq!(dt, vec![0.0, 1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_shift_removes_bias() {
        // Sensor tilted: constant 0.1 g on Y while at rest
        let data = readings(&[0, 1, 2, 3, 4], &[0.1; 5]);
        let series = derive(&data, 1, 5).unwrap();
        assert_relative_eq!(series.shift_value, -0.981, epsilon = 1e-12);
        for row in &series.rows {
            assert_relative_eq!(row.shifted_accel, 0.0, epsilon = 1e-12);
            assert_relative_eq!(row.velocity, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_shift_value_inclusive_range() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_relative_eq!(shift_value(&values, 2, 4).unwrap(), 3.0);
        assert_relative_eq!(shift_value(&values, 1, 5).unwrap(), 22.0);
    }

    #[test]
    fn test_single_row_shift_range() {
        let values = [1.5, -2.0, 7.25];
        assert_eq!(shift_value(&values, 3, 3).unwrap(), 7.25);
        assert_eq!(shift_value(&values, 1, 1).unwrap(), 1.5);
    }

    #[test]
    fn test_out_of_range_shift_is_fatal() {
        let data = readings(&[0, 1, 2], &[0.0, 0.1, 0.2]);
        for (from, to) in [(0, 1), (2, 4), (3, 2), (4, 4)] {
            assert!(matches!(
                derive(&data, from, to),
                Err(AccelError::InvalidShiftRange { len: 3, .. })
            ));
        }
    }

    #[test]
    fn test_acc_z_is_ignored() {
        let mut a = readings(&[0, 1, 2], &[0.0, -0.5, -0.2]);
        let b = a.clone();
        for r in a.iter_mut() {
            r.acc_z = 123.0;
            r.acc_x = -7.0;
        }
        assert_eq!(derive(&a, 1, 1).unwrap(), derive(&b, 1, 1).unwrap());
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let ts: Vec<i64> = (0..50).map(|i| i * 2).collect();
        let acc: Vec<f64> = (0..50).map(|i| (i as f64 / 7.0).cos() * 0.3).collect();
        let data = readings(&ts, &acc);
        let first = derive(&data, 1, 5).unwrap();
        let second = derive(&data, 1, 5).unwrap();
        for (a, b) in first.rows.iter().zip(&second.rows) {
            assert_eq!(a.displacement.to_bits(), b.displacement.to_bits());
            assert_eq!(a.velocity.to_bits(), b.velocity.to_bits());
        }
    }

    #[test]
    fn test_nan_propagates() {
        let data = readings(&[0, 1, 2], &[0.0, f64::NAN, 0.0]);
        let rows = derive(&data, 1, 1).unwrap().rows;
        assert!(rows[1].velocity.is_nan());
        assert!(rows[2].displacement.is_nan());
    }
}
