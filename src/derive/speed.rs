use crate::oem::StateVector;

/// Instantaneous speed in km/s.
pub fn speed(vector: &StateVector) -> f64 {
    let [vx, vy, vz] = vector.velocity;
    (vx * vx + vy * vy + vz * vz).sqrt()
}

/// Mean instantaneous speed over `vectors`, 0 when there are none.
pub fn average_speed(vectors: &[StateVector]) -> f64 {
    if vectors.is_empty() {
        return 0.0;
    }
    vectors.iter().map(speed).sum::<f64>() / vectors.len() as f64
}
