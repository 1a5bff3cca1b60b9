//! Refined position estimate
use itertools::{Itertools, MinMaxResult};

use crate::{
    geodetic::{Converter, ErrorEllipsoid},
    position::{EcefPosition, GeodeticPosition},
    prelude::{Matrix3, Vector3},
    Error,
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// One refinement step
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct IterationSample {
    /// Position after correction
    pub position: EcefPosition,
    /// Norm of the applied correction [m]
    pub residual: f64,
    /// Raw (not normalized) weight of this sample
    pub weight: f64,
}

/// Estimate quality indicators
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct QualityMetrics {
    /// Mean standard deviation [m] of the last 10 positions
    pub position_stability: f64,
    /// Logarithmic decay rate of the inter-iteration displacement
    pub convergence_rate: f64,
    /// Relative reduction of the residual over the run
    pub residual_reduction: f64,
}

/// Inter-iteration displacement statistics [m]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ConvergenceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

/// Weighted position estimate, always formed from the complete
/// iteration history it retains.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PositionEstimate {
    /// Weighted mean position
    pub position: EcefPosition,
    /// Weighted standard deviation [m] per axis
    pub std_dev: Vector3<f64>,
    /// Weighted sample covariance [m^2]
    pub covariance: Matrix3<f64>,
    /// sqrt(sum of axis variances) [m]
    pub precision: f64,
    /// Number of iterations performed (samples)
    pub iterations: usize,
    /// Residual of the last iteration [m]
    pub final_residual: f64,
    /// Iterations history
    pub samples: Vec<IterationSample>,
    /// Inter-iteration displacements [m], one less than samples
    pub convergence: Vec<f64>,
    /// Normalized weights (sum is 1), one per sample
    pub weights: Vec<f64>,
    /// Quality metrics
    pub quality: QualityMetrics,
    /// Displacement statistics
    pub convergence_stats: ConvergenceStats,
    /// True when the displacement threshold was reached
    pub converged: bool,
    /// True when the run was interrupted: this is a partial estimate
    pub cancelled: bool,
}

impl PositionEstimate {
    /// Forms the estimate from the iteration history
    pub(crate) fn new(
        samples: Vec<IterationSample>,
        convergence: Vec<f64>,
        converged: bool,
        cancelled: bool,
    ) -> Result<Self, Error> {
        let first = samples.first().ok_or(Error::DegenerateWeights)?;

        let sum = samples.iter().map(|s| s.weight).sum::<f64>();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(Error::DegenerateWeights);
        }
        let weights = samples.iter().map(|s| s.weight / sum).collect::<Vec<_>>();

        // mean is accumulated relative to the first sample
        let origin = first.position.ecef();
        let offset = samples
            .iter()
            .zip(weights.iter())
            .fold(Vector3::<f64>::zeros(), |acc, (s, w)| {
                acc + (s.position.ecef() - origin) * *w
            });
        let mean = origin + offset;

        let mut variance = Vector3::<f64>::zeros();
        let mut scatter = Matrix3::<f64>::zeros();
        for (s, w) in samples.iter().zip(weights.iter()) {
            let dev = s.position.ecef() - mean;
            variance += dev.component_mul(&dev) * *w;
            scatter += dev * dev.transpose() * *w;
        }

        // unbiased reliability weights
        let sum_w2 = weights.iter().map(|w| w * w).sum::<f64>();
        let covariance = if 1.0 - sum_w2 > 0.0 {
            scatter / (1.0 - sum_w2)
        } else {
            Matrix3::zeros()
        };

        let std_dev = variance.map(f64::sqrt);
        let precision = variance.sum().sqrt();

        let residuals = samples.iter().map(|s| s.residual).collect::<Vec<_>>();
        let quality = QualityMetrics {
            position_stability: Self::position_stability(&samples),
            convergence_rate: Self::convergence_rate(&convergence),
            residual_reduction: Self::residual_reduction(&residuals),
        };

        Ok(Self {
            position: EcefPosition::from_ecef(mean),
            std_dev,
            covariance,
            precision,
            iterations: samples.len(),
            final_residual: residuals.last().copied().unwrap_or_default(),
            convergence_stats: ConvergenceStats::new(&convergence),
            quality,
            weights,
            samples,
            convergence,
            converged,
            cancelled,
        })
    }
    /// Mean over axes of the standard deviation of the last 10 positions
    fn position_stability(samples: &[IterationSample]) -> f64 {
        if samples.len() < 2 {
            return 0.0;
        }
        let tail = &samples[samples.len() - samples.len().min(10)..];
        let n = tail.len() as f64;
        let origin = tail[0].position.ecef();
        let offset = tail.iter().fold(Vector3::<f64>::zeros(), |acc, s| {
            acc + (s.position.ecef() - origin)
        }) / n;
        let variance = tail.iter().fold(Vector3::<f64>::zeros(), |acc, s| {
            let dev = s.position.ecef() - origin - offset;
            acc + dev.component_mul(&dev)
        }) / n;
        variance.map(f64::sqrt).mean()
    }
    fn convergence_rate(convergence: &[f64]) -> f64 {
        match (convergence.first(), convergence.last()) {
            (Some(first), Some(last)) if convergence.len() > 1 && *first > 0.0 && *last > 0.0 => {
                (first / last).ln() / convergence.len() as f64
            },
            _ => 0.0,
        }
    }
    fn residual_reduction(residuals: &[f64]) -> f64 {
        match (residuals.first(), residuals.last()) {
            (Some(first), Some(last)) if residuals.len() > 1 && *first != 0.0 => {
                (first - last) / first
            },
            _ => 0.0,
        }
    }
    /// Residuals history [m]
    pub fn residuals(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.residual).collect()
    }
    /// [ErrorEllipsoid] described by this estimate's covariance
    pub fn error_ellipsoid(&self) -> ErrorEllipsoid {
        ErrorEllipsoid::from_covariance(&self.covariance)
    }
    /// Geodetic coordinates of this estimate
    pub fn geodetic(&self, converter: &Converter) -> GeodeticPosition {
        converter.ecef_to_geodetic(&self.position)
    }
}

impl ConvergenceStats {
    fn new(convergence: &[f64]) -> Self {
        let (min, max) = match convergence.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => return Self::default(),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let n = convergence.len() as f64;
        let mean = convergence.iter().sum::<f64>() / n;
        let std = (convergence.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n).sqrt();
        Self {
            min,
            max,
            mean,
            std,
        }
    }
}
