use ndarray::Array1;

use crate::types::{DerivedRow, Insights};

fn column<F>(rows: &[DerivedRow], field: F) -> Array1<f64>
where
    F: Fn(&DerivedRow) -> f64,
{
    rows.iter().map(field).collect()
}

// Any NaN makes the maximum NaN, like the means.
fn max_of(values: &Array1<f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, |m, &v| {
        if m.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            m.max(v)
        }
    })
}

/// Reduce the derived sequence to its headline numbers.
///
/// Returns `None` for an empty sequence. A NaN anywhere in a column makes
/// both its maximum and its mean NaN.
pub fn summarize(rows: &[DerivedRow]) -> Option<Insights> {
    if rows.is_empty() {
        return None;
    }

    let displacement = column(rows, |r| r.displacement);
    let velocity = column(rows, |r| r.velocity);
    let accel = column(rows, |r| r.shifted_accel);

    Some(Insights {
        max_displacement: max_of(&displacement),
        max_velocity: max_of(&velocity),
        max_abs_acceleration: max_of(&accel.mapv(f64::abs)),
        mean_velocity: velocity.mean()?,
        mean_acceleration: accel.mean()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::derive;
    use crate::types::Reading;
    use approx::assert_relative_eq;

    fn row(velocity: f64, displacement: f64, shifted_accel: f64) -> DerivedRow {
        DerivedRow {
            velocity,
            displacement,
            shifted_accel,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_extrema_and_means() {
        let rows = [
            row(0.0, 0.0, 0.0),
            row(4.0, 2.0, 3.0),
            row(6.0, 7.0, -9.0),
            row(2.0, 11.0, 2.0),
        ];
        let insights = summarize(&rows).unwrap();
        assert_eq!(insights.max_displacement, 11.0);
        assert_eq!(insights.max_velocity, 6.0);
        assert_eq!(insights.max_abs_acceleration, 9.0);
        assert_relative_eq!(insights.mean_velocity, 3.0);
        assert_relative_eq!(insights.mean_acceleration, -1.0);
    }

    #[test]
    fn test_negative_motion() {
        let rows = [row(0.0, 0.0, 0.0), row(-2.0, -1.0, -4.0), row(-3.0, -3.5, -1.0)];
        let insights = summarize(&rows).unwrap();
        // the first row pins both maxima at rest
        assert_eq!(insights.max_velocity, 0.0);
        assert_eq!(insights.max_displacement, 0.0);
        assert_eq!(insights.max_abs_acceleration, 4.0);
        assert_relative_eq!(insights.mean_velocity, -5.0 / 3.0);
    }

    #[test]
    fn test_nan_handling() {
        let rows = [row(1.0, 1.0, 1.0), row(f64::NAN, 2.0, 3.0)];
        let insights = summarize(&rows).unwrap();
        assert!(insights.max_velocity.is_nan());
        assert!(insights.mean_velocity.is_nan());
        assert_eq!(insights.max_displacement, 2.0);
        assert_eq!(insights.max_abs_acceleration, 3.0);
    }

    #[test]
    fn test_nan_reading_reaches_insights() {
        let ay = [0.0, 0.0, f64::NAN, -1.0];
        let readings: Vec<Reading> = ay
            .iter()
            .enumerate()
            .map(|(i, &y)| Reading::new(i as i64, i as i64 + 1, 0.0, y, 1.0))
            .collect();

        // one bad row mid-run
        let series = derive(&readings, 1, 2).unwrap();
        let insights = summarize(&series.rows).unwrap();
        assert!(insights.max_velocity.is_nan());
        assert!(insights.max_displacement.is_nan());
        assert!(insights.max_abs_acceleration.is_nan());
        assert!(insights.mean_velocity.is_nan());

        // NaN inside the shift window poisons every shifted value
        let series = derive(&readings, 2, 3).unwrap();
        let insights = summarize(&series.rows).unwrap();
        assert!(insights.max_abs_acceleration.is_nan());
        assert!(insights.mean_acceleration.is_nan());
    }
}
