//! Recursive vector smoothing filter
//!
//! Scalar-gain Kalman filter applied identically to x, y and z. Noise is
//! treated as isotropic so one variance `p` covers all three components.
//!
//! ```text
//! k = (p + q) / (p + q + r)
//! p = r(p + q) / (r + p + q)
//! x = x + k(z - x)
//! ```

use nalgebra::Vector3;

/// Default process variance Q
pub const DEFAULT_Q: f32 = 0.000001;
/// Default measurement variance R
pub const DEFAULT_R: f32 = 0.01;
/// Initial estimate variance P
pub const DEFAULT_P: f32 = 1.0;

/// Order of a batch passed to [`VectorFilter::update_batch`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasurementOrder {
    OldestFirst,
    NewestFirst,
}

/// Kalman-style smoother for a 3D point or direction
#[derive(Clone, Debug)]
pub struct VectorFilter {
    /// Current estimate
    estimate: Vector3<f32>,
    /// Gain applied on the last update
    gain: f32,
    /// Estimate variance
    variance: f32,
    /// Process variance (how fast the true value may drift)
    q: f32,
    /// Measurement variance (how noisy each sample is)
    r: f32,
}

impl VectorFilter {
    pub fn new(q: f32, r: f32) -> Self {
        Self {
            estimate: Vector3::zeros(),
            gain: 0.0,
            variance: DEFAULT_P,
            q,
            r,
        }
    }

    /// Fold one measurement into the estimate.
    ///
    /// `q` / `r` override the stored variances when given; the override
    /// persists for later calls.
    pub fn update(&mut self, measurement: Vector3<f32>, q: Option<f32>, r: Option<f32>) -> Vector3<f32> {
        if let Some(q) = q {
            self.q = q;
        }
        if let Some(r) = r {
            self.r = r;
        }

        let pq = self.variance + self.q;
        self.gain = pq / (pq + self.r);
        self.variance = self.r * pq / (self.r + pq);

        self.estimate += (measurement - self.estimate) * self.gain;
        self.estimate
    }

    /// Replay a list of measurements and return the final estimate
    pub fn update_batch(
        &mut self,
        measurements: &[Vector3<f32>],
        order: MeasurementOrder,
        q: Option<f32>,
        r: Option<f32>,
    ) -> Vector3<f32> {
        match order {
            MeasurementOrder::OldestFirst => {
                for m in measurements {
                    self.update(*m, q, r);
                }
            }
            MeasurementOrder::NewestFirst => {
                for m in measurements.iter().rev() {
                    self.update(*m, q, r);
                }
            }
        }
        self.estimate
    }

    /// Clear the estimate back to zero and restore the initial variance
    pub fn reset(&mut self) {
        self.estimate = Vector3::zeros();
        self.gain = 0.0;
        self.variance = DEFAULT_P;
    }

    /// Start over from a known value instead of zero. The seed is also
    /// folded in once as a measurement, so the variance has already settled
    /// off `DEFAULT_P` and the next real measurement is not taken almost whole.
    pub fn reset_to(&mut self, estimate: Vector3<f32>) {
        self.reset();
        self.estimate = estimate;
        self.update(estimate, None, None);
    }

    pub fn estimate(&self) -> Vector3<f32> {
        self.estimate
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn variance(&self) -> f32 {
        self.variance
    }

    /// Current (process, measurement) variance pair
    pub fn variances(&self) -> (f32, f32) {
        (self.q, self.r)
    }
}

impl Default for VectorFilter {
    fn default() -> Self {
        Self::new(DEFAULT_Q, DEFAULT_R)
    }
}
