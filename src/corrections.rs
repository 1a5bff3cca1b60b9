//! Synthetic correction model driving the refinement iterations.
//!
//! Corrections are not derived from ranging observations: each one combines
//! a decaying deterministic step, gaussian noise and periodic terms emulating
//! orbital and rotational effects.
use rand::Rng;
use rand_distr::StandardNormal;

use crate::{ellipsoid::WGS84, position::EcefPosition, prelude::Vector3};

#[derive(Debug, Copy, Clone)]
pub(crate) struct CorrectionModel {
    max_iterations: f64,
}

impl CorrectionModel {
    const BASE_STEP: f64 = 0.5;

    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations as f64,
        }
    }
    /// Step size, decays exponentially over the run
    fn adaptive_step(&self, i: usize) -> f64 {
        Self::BASE_STEP * (-(i as f64) / (self.max_iterations / 3.0)).exp()
    }
    fn nonlinear_factor(&self, i: usize) -> f64 {
        let i = i as f64;
        if i < self.max_iterations / 4.0 {
            1.5
        } else if i < self.max_iterations / 2.0 {
            1.0
        } else {
            0.5
        }
    }
    /// Deterministic component, identical on all axes
    pub fn main(&self, i: usize) -> f64 {
        -self.adaptive_step(i) * self.nonlinear_factor(i) / ((i + 1) as f64).powf(0.7)
    }
    /// Standard deviation of the stochastic component
    pub fn noise_std(&self, i: usize) -> f64 {
        self.adaptive_step(i) * 0.2 * (-(i as f64) / 20.0).exp()
    }
    /// Independent gaussian samples, one per axis
    fn noise<R: Rng>(&self, i: usize, rng: &mut R) -> Vector3<f64> {
        let sigma = self.noise_std(i);
        let (nx, ny, nz): (f64, f64, f64) = (
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
        );
        Vector3::new(nx, ny, nz) * sigma
    }
    /// Periodic component, function of the iteration and position
    pub fn systematic(i: usize, position: &EcefPosition) -> Vector3<f64> {
        let t = i as f64 * 0.1;

        let mut dx = 0.01 * t.sin() + 0.005 * (2.3 * t).sin();
        let mut dy = 0.008 * (1.7 * t).cos() + 0.003 * (3.1 * t).sin();
        let mut dz = 0.006 * (0.9 * t).sin() + 0.004 * (2.7 * t).cos();

        let k = position.norm() / WGS84.a;
        dx += 0.0001 * k * t.sin();
        dy += 0.0001 * k * t.cos();
        dz += 0.00005 * k * (1.5 * t).sin();

        Vector3::new(dx, dy, dz)
    }
    /// Correction vector [m] to apply to `position` at iteration `i`
    pub fn correction<R: Rng>(
        &self,
        i: usize,
        position: &EcefPosition,
        rng: &mut R,
    ) -> Vector3<f64> {
        let main = self.main(i);
        Vector3::new(main, main, main) + self.noise(i, rng) + Self::systematic(i, position)
    }
    /// Iteration weight: logistic curve centered on the middle of the run
    pub fn weight(&self, i: usize) -> f64 {
        1.0 / (1.0 + (-(i as f64 - self.max_iterations / 2.0) / 10.0).exp())
    }
}
