//! Pure metric functions over solver readings.

pub type MetricResult<T> = Result<T, MetricError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("No rating available")]
    MissingRating,

    #[error("Rating must be positive, got {rating}")]
    NonPositiveRating { rating: f64 },

    #[error("Expected {expected} values, got {got}")]
    ShortVector { expected: usize, got: usize },
}

/// `100 * observed / rating`.
pub fn utilization(observed: f64, rating: Option<f64>) -> MetricResult<f64> {
    let rating = rating.ok_or(MetricError::MissingRating)?;
    if rating.is_nan() || rating <= 0.0 {
        return Err(MetricError::NonPositiveRating { rating });
    }
    Ok(100.0 * observed / rating)
}

pub fn daily_max(series: &[f64]) -> Option<f64> {
    series.iter().copied().reduce(f64::max)
}

/// Mean magnitude over the first `phases` magnitude/angle pairs.
pub fn phase_average(mag_angle: &[f64], phases: usize) -> MetricResult<f64> {
    let phases = phases.max(1);
    let expected = 2 * phases;
    if phases == 1 && !mag_angle.is_empty() {
        return Ok(mag_angle[0]);
    }
    if mag_angle.len() < expected {
        return Err(MetricError::ShortVector {
            expected,
            got: mag_angle.len(),
        });
    }
    let sum: f64 = mag_angle.iter().step_by(2).take(phases).sum();
    Ok(sum / phases as f64)
}

/// `sqrt(P^2 + Q^2)` with P and Q summed over the first `conductors` P/Q pairs.
pub fn apparent_power(pq: &[f64], conductors: usize) -> MetricResult<f64> {
    let expected = 2 * conductors.max(1);
    if pq.len() < expected {
        return Err(MetricError::ShortVector {
            expected,
            got: pq.len(),
        });
    }
    let (p, q) = pq[..expected]
        .chunks_exact(2)
        .fold((0.0, 0.0), |(p, q), pair| (p + pair[0], q + pair[1]));
    Ok(p.hypot(q))
}
