use crate::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn default_conversion_iterations() -> usize {
    100
}

fn default_conversion_tolerance() -> f64 {
    1.0E-15
}

fn default_refinement_iterations() -> usize {
    500
}

fn default_convergence_threshold() -> f64 {
    1.0E-8
}

/// Latitude solver settings, used when converting ECEF to Geodetic coordinates
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConversionOpts {
    /// Maximal number of fixed point iterations
    #[cfg_attr(feature = "serde", serde(default = "default_conversion_iterations"))]
    pub max_iterations: usize,
    /// Latitude convergence criteria [rad]
    #[cfg_attr(feature = "serde", serde(default = "default_conversion_tolerance"))]
    pub tolerance: f64,
}

impl Default for ConversionOpts {
    fn default() -> Self {
        Self {
            max_iterations: default_conversion_iterations(),
            tolerance: default_conversion_tolerance(),
        }
    }
}

impl ConversionOpts {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.max_iterations < 1 {
            return Err(Error::InvalidParameter("max_iterations must be at least 1"));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(Error::InvalidParameter(
                "tolerance must be a strictly positive number",
            ));
        }
        Ok(())
    }
}

/// Position refinement settings
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefinementOpts {
    /// Maximal number of refinement iterations
    #[cfg_attr(feature = "serde", serde(default = "default_refinement_iterations"))]
    pub max_iterations: usize,
    /// Iterations stop as soon as the position moves less than this [m]
    #[cfg_attr(feature = "serde", serde(default = "default_convergence_threshold"))]
    pub convergence_threshold: f64,
    /// Random generator seed. Two runs with the same seed and settings
    /// produce identical results. Seeded by the OS when omitted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
}

impl Default for RefinementOpts {
    fn default() -> Self {
        Self {
            max_iterations: default_refinement_iterations(),
            convergence_threshold: default_convergence_threshold(),
            seed: None,
        }
    }
}

impl RefinementOpts {
    /// Copies and returns [RefinementOpts] with desired seed
    pub fn with_seed(&self, seed: u64) -> Self {
        let mut s = *self;
        s.seed = Some(seed);
        s
    }
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.max_iterations < 1 {
            return Err(Error::InvalidParameter("max_iterations must be at least 1"));
        }
        if !(self.convergence_threshold > 0.0 && self.convergence_threshold.is_finite()) {
            return Err(Error::InvalidParameter(
                "convergence threshold must be a strictly positive number",
            ));
        }
        Ok(())
    }
}

/// Complete processing configuration
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Geodetic conversion settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub conversion: ConversionOpts,
    /// Refinement settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub refinement: RefinementOpts,
}

impl Config {
    /// Verifies all settings are usable
    pub fn validate(&self) -> Result<(), Error> {
        self.conversion.validate()?;
        self.refinement.validate()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.conversion.max_iterations, 100);
        assert_eq!(cfg.conversion.tolerance, 1.0E-15);
        assert_eq!(cfg.refinement.max_iterations, 500);
        assert_eq!(cfg.refinement.convergence_threshold, 1.0E-8);
        assert!(cfg.refinement.seed.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_config() {
        let mut cfg = Config::default();
        cfg.refinement.convergence_threshold = -1.0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidParameter(_))));

        let mut cfg = Config::default();
        cfg.conversion.max_iterations = 0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidParameter(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_deserialization() {
        let cfg: Config =
            serde_json::from_str(r#"{ "refinement": { "max_iterations": 42, "seed": 7 } }"#)
                .unwrap();
        assert_eq!(cfg.refinement.max_iterations, 42);
        assert_eq!(cfg.refinement.seed, Some(7));
        assert_eq!(cfg.refinement.convergence_threshold, 1.0E-8);
        assert_eq!(cfg.conversion, ConversionOpts::default());
    }
}
