/// Exponentially Weighted Moving Average filter.
///
/// Smooths a noisy series by weighting recent values more heavily. Used to
/// turn the per-tick raw link score into the smoothed score.
///
/// The smoothing factor `alpha` controls responsiveness:
/// - `alpha` near 1.0: tracks input closely (low smoothing)
/// - `alpha` near 0.0: retains history (high smoothing)
#[derive(Debug, Clone)]
pub struct Ewma {
    value: f64,
    alpha: f64,
    initialized: bool,
}

impl Ewma {
    /// Creates a new EWMA filter with the given smoothing factor (`0.0 ≤ alpha ≤ 1.0`).
    /// Out-of-range factors are clamped.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            value: 0.0,
            alpha,
            initialized: false,
        }
    }

    /// Feeds a new measurement into the filter, updating the smoothed value.
    ///
    /// The first measurement seeds the filter directly. NaN or infinite
    /// measurements are ignored.
    pub fn update(&mut self, measurement: f64) {
        if !measurement.is_finite() {
            return;
        }
        if !self.initialized {
            self.value = measurement;
            self.initialized = true;
        } else {
            self.value = self.value * (1.0 - self.alpha) + measurement * self.alpha;
        }
    }

    /// Overwrite the smoothed value, e.g. after applying a post-filter adjustment.
    pub fn set(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value;
            self.initialized = true;
        }
    }

    /// Returns the current smoothed value (0 before the first measurement).
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_seeds_value() {
        let mut ewma = Ewma::new(0.25);
        assert!(!ewma.is_initialized());
        ewma.update(0.8);
        assert!(ewma.is_initialized());
        assert!((ewma.value() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn blends_with_alpha() {
        let mut ewma = Ewma::new(0.5);
        ewma.update(10.0);
        ewma.update(20.0);
        assert!((ewma.value() - 15.0).abs() < f64::EPSILON);
        ewma.update(30.0);
        assert!((ewma.value() - 22.5).abs() < f64::EPSILON);
    }

    #[test]
    fn alpha_one_follows_input() {
        let mut ewma = Ewma::new(1.0);
        ewma.update(0.2);
        ewma.update(0.9);
        assert!((ewma.value() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn alpha_zero_holds_seed() {
        let mut ewma = Ewma::new(0.0);
        ewma.update(0.4);
        ewma.update(1.0);
        assert!((ewma.value() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_alpha_is_clamped() {
        let mut ewma = Ewma::new(3.0);
        ewma.update(1.0);
        ewma.update(0.0);
        assert_eq!(ewma.value(), 0.0);
    }

    #[test]
    fn non_finite_measurements_are_ignored() {
        let mut ewma = Ewma::new(0.5);
        ewma.update(f64::NAN);
        assert!(!ewma.is_initialized());
        ewma.update(10.0);
        ewma.update(f64::INFINITY);
        ewma.update(f64::NEG_INFINITY);
        assert!((ewma.value() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_overrides_value() {
        let mut ewma = Ewma::new(0.5);
        ewma.update(0.6);
        ewma.set(0.5);
        ewma.update(0.7);
        assert!((ewma.value() - 0.6).abs() < 1e-12);
    }
}
