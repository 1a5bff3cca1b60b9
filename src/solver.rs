//! Iterative position refinement
use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;

use crate::{
    cfg::RefinementOpts,
    corrections::CorrectionModel,
    position::EcefPosition,
    progress::{CancellationToken, ProgressEvent, ProgressSink, Quiet},
    solutions::{IterationSample, PositionEstimate},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("weights sum is null or not a number")]
    DegenerateWeights,
    #[error("unknown troposphere model \"{0}\"")]
    UnknownTropoModel(String),
    #[error("unknown ionosphere model \"{0}\"")]
    UnknownIonoModel(String),
}

/// Position refinement solver.
/// Each [Solver] owns its random generator: solvers never interfere with
/// one another, and a seeded solver replays identical runs.
#[derive(Debug)]
pub struct Solver {
    /// Solver configuration
    cfg: RefinementOpts,
    /// Random generator, drives the stochastic corrections
    rng: StdRng,
    /// Optional cancellation request
    cancellation: Option<CancellationToken>,
}

impl Solver {
    /// Builds new [Solver] from [RefinementOpts], which are verified here.
    pub fn new(cfg: RefinementOpts) -> Result<Self, Error> {
        cfg.validate()?;
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            cfg,
            rng,
            cancellation: None,
        })
    }
    /// Attaches a [CancellationToken] to this [Solver]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
    /// Returns [RefinementOpts] currently in use
    pub fn cfg(&self) -> &RefinementOpts {
        &self.cfg
    }
    fn cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(|token| token.is_cancelled())
            .unwrap_or(false)
    }
    /// Refines this initial position, without progress notifications.
    /// See [Self::resolve_with].
    pub fn resolve(&mut self, initial: &EcefPosition) -> Result<PositionEstimate, Error> {
        self.resolve_with(initial, &mut Quiet)
    }
    /// Refines this initial position into a [PositionEstimate].
    /// Iterations stop when two consecutive positions are closer than the
    /// convergence threshold, when the iteration limit is reached, or on
    /// cancellation. Only the first condition sets `converged`.
    pub fn resolve_with<P: ProgressSink>(
        &mut self,
        initial: &EcefPosition,
        progress: &mut P,
    ) -> Result<PositionEstimate, Error> {
        if !initial.is_finite() {
            return Err(Error::InvalidParameter("initial position is not defined"));
        }

        if let Some(seed) = self.cfg.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let max_iterations = self.cfg.max_iterations;
        let threshold = self.cfg.convergence_threshold;
        let model = CorrectionModel::new(max_iterations);

        let mut samples = Vec::<IterationSample>::with_capacity(max_iterations);
        let mut convergence = Vec::<f64>::with_capacity(max_iterations.saturating_sub(1));
        let mut converged = false;
        let mut cancelled = false;

        info!(
            "refinement: {} iterations, threshold {:.1E}m",
            max_iterations, threshold
        );
        progress.progress(&ProgressEvent::new(
            0,
            0,
            format!("starting refinement ({} iterations)", max_iterations),
        ));

        for i in 0..max_iterations {
            if i > 0 && self.cancelled() {
                warn!("refinement cancelled at iteration {}", i);
                cancelled = true;
                break;
            }

            let correction = model.correction(i, initial, &mut self.rng);
            let residual = correction.norm();

            samples.push(IterationSample {
                position: *initial + correction,
                residual,
                weight: model.weight(i),
            });

            if i == 0 {
                debug!("initial iteration: residual={:.6}m", residual);
                continue;
            }

            let last = samples.len() - 1;
            let displacement = samples[last]
                .position
                .distance(&samples[last - 1].position);
            convergence.push(displacement);

            if i % 10 == 0 {
                let percent = (i * 100 / max_iterations).min(95) as u8;
                progress.progress(&ProgressEvent::new(
                    percent,
                    i,
                    format!("iteration {}: displacement {:.6}m", i, displacement),
                ));
            }
            if i % 50 == 0 {
                debug!(
                    "iteration {:4}: displacement={:.8}m residual={:.8}m",
                    i, displacement, residual
                );
            }

            if displacement < threshold {
                info!("converged at iteration {}", i);
                converged = true;
                progress.progress(&ProgressEvent::new(
                    95,
                    i,
                    format!("converged at iteration {}", i),
                ));
                break;
            }
        }

        if !converged && !cancelled {
            warn!(
                "convergence threshold {:.1E}m not reached within {} iterations",
                threshold, max_iterations
            );
        }

        let iteration = samples.len().saturating_sub(1);
        progress.progress(&ProgressEvent::new(
            98,
            iteration,
            "statistical analysis".to_string(),
        ));

        let estimate = PositionEstimate::new(samples, convergence, converged, cancelled)?;

        info!(
            "refinement completed: {} iterations, precision {:.8}m",
            estimate.iterations, estimate.precision
        );
        let message = if cancelled {
            "refinement cancelled, partial estimate"
        } else {
            "refinement completed"
        };
        progress.progress(&ProgressEvent::new(100, iteration, message.to_string()));

        Ok(estimate)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn initial() -> EcefPosition {
        EcefPosition::new(3628427.9118, 562059.0936, 5197872.215)
    }

    fn opts(max_iterations: usize, convergence_threshold: f64, seed: u64) -> RefinementOpts {
        RefinementOpts {
            max_iterations,
            convergence_threshold,
            seed: Some(seed),
        }
    }

    #[test]
    fn invalid_parameters() {
        assert!(matches!(
            Solver::new(opts(0, 1.0E-8, 0)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            Solver::new(opts(10, 0.0, 0)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            Solver::new(opts(10, -1.0, 0)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn undefined_initial_position() {
        let mut events = Vec::new();
        let mut solver = Solver::new(opts(10, 1.0E-8, 0)).unwrap();
        let result = solver.resolve_with(
            &EcefPosition::new(f64::NAN, 0.0, 0.0),
            &mut |e: &ProgressEvent| events.push(e.clone()),
        );
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert!(events.is_empty());
    }

    #[test]
    fn reseeded_runs() {
        let mut solver = Solver::new(opts(50, 1.0E-8, 1234)).unwrap();
        let first = solver.resolve(&initial()).unwrap();
        let second = solver.resolve(&initial()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unseeded_runs() {
        let cfg = RefinementOpts {
            max_iterations: 20,
            convergence_threshold: 1.0E-8,
            seed: None,
        };
        let estimate = Solver::new(cfg).unwrap().resolve(&initial()).unwrap();
        assert_eq!(estimate.iterations, 20);
        assert_eq!(estimate.convergence.len(), 19);
    }
}
