//! Algebraic least-squares sphere fit
//!
//! Every point on a sphere with center c and radius r satisfies
//! `|p|² = 2p·c + (r² - |c|²)`, which is linear in `[c, r² - |c|²]`.
//! Stacking one row `[2x, 2y, 2z, 1]` per point gives an overdetermined
//! system `A·u = b` with `b = |p|²`, solved through the 4x4 normal equations
//! `AᵀA·u = Aᵀb`.
//!
//! Points are centered on their centroid first so the normal matrix stays
//! well conditioned far from the world origin. Accumulation runs in f64.

use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use super::error::PointerError;
use super::joints::SampleSet;

/// Below this, `det(AᵀA) / Π diag(AᵀA)` is treated as singular.
/// The ratio is 1 for orthogonal columns and 0 for dependent ones.
const DEGENERACY_RATIO: f64 = 1e-10;

/// A fitted sphere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereFit {
    pub center: Point3<f32>,
    pub radius: f32,
}

/// Sphere fitter with reusable per-point scratch columns
#[derive(Clone, Debug, Default)]
pub struct SphereFitSolver {
    two_x: Vec<f64>,
    two_y: Vec<f64>,
    two_z: Vec<f64>,
    ones: Vec<f64>,
    dist_sq: Vec<f64>,
}

impl SphereFitSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit a sphere to the sample points.
    ///
    /// Fails with `DegenerateInput` when the samples are collinear,
    /// coplanar or coincident.
    pub fn fit(&mut self, samples: &SampleSet) -> Result<SphereFit, PointerError> {
        let points = samples.points();
        let n = points.len();
        if n == 0 {
            return Err(PointerError::DegenerateInput);
        }

        let mean = points
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.coords.cast::<f64>())
            / n as f64;

        self.resize(n);
        for (i, p) in points.iter().enumerate() {
            let pos = p.coords.cast::<f64>() - mean;
            self.dist_sq[i] = pos.norm_squared();
            self.two_x[i] = 2.0 * pos.x;
            self.two_y[i] = 2.0 * pos.y;
            self.two_z[i] = 2.0 * pos.z;
        }

        let atb = Vector4::new(
            dot(&self.two_x, &self.dist_sq)?,
            dot(&self.two_y, &self.dist_sq)?,
            dot(&self.two_z, &self.dist_sq)?,
            dot(&self.ones, &self.dist_sq)?,
        );

        let xy = dot(&self.two_x, &self.two_y)?;
        let xz = dot(&self.two_x, &self.two_z)?;
        let yz = dot(&self.two_y, &self.two_z)?;
        let sum_x = dot(&self.two_x, &self.ones)?;
        let sum_y = dot(&self.two_y, &self.ones)?;
        let sum_z = dot(&self.two_z, &self.ones)?;
        let ata = Matrix4::new(
            dot(&self.two_x, &self.two_x)?, xy, xz, sum_x,
            xy, dot(&self.two_y, &self.two_y)?, yz, sum_y,
            xz, yz, dot(&self.two_z, &self.two_z)?, sum_z,
            sum_x, sum_y, sum_z, n as f64,
        );

        if is_singular(&ata) {
            return Err(PointerError::DegenerateInput);
        }
        let u = ata.lu().solve(&atb).ok_or(PointerError::DegenerateInput)?;

        let centered = Vector3::new(u[0], u[1], u[2]);
        let radius_sq = u[3] + centered.norm_squared();
        // Rounding can leave a tiny negative for near-zero radii
        let radius = radius_sq.max(0.0).sqrt();
        let center = centered + mean;

        if !center.iter().all(|c| c.is_finite()) || !radius.is_finite() {
            return Err(PointerError::DegenerateInput);
        }

        Ok(SphereFit {
            center: Point3::from(center.cast::<f32>()),
            radius: radius as f32,
        })
    }

    fn resize(&mut self, n: usize) {
        if self.ones.len() != n {
            self.two_x.resize(n, 0.0);
            self.two_y.resize(n, 0.0);
            self.two_z.resize(n, 0.0);
            self.dist_sq.resize(n, 0.0);
            self.ones.clear();
            self.ones.resize(n, 1.0);
        }
    }
}

/// Dot product of two equal-length columns
pub(crate) fn dot(a: &[f64], b: &[f64]) -> Result<f64, PointerError> {
    if a.len() != b.len() {
        return Err(PointerError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

fn is_singular(ata: &Matrix4<f64>) -> bool {
    let diag_product: f64 = ata.diagonal().iter().product();
    if !(diag_product > 0.0) {
        return true;
    }
    let det = ata.determinant();
    !(det / diag_product > DEGENERACY_RATIO)
}
