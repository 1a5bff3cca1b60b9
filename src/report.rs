//! Text reports
use std::fmt;

use crate::{
    geodetic::{decimal_degrees_to_dms, Converter},
    position::{EcefPosition, GeodeticPosition},
    solutions::PositionEstimate,
};

/// Renders conversion and refinement results as text.
/// Quick reports print 6 decimals, refined reports print 8.
#[derive(Debug, Clone)]
pub enum Report<'a> {
    /// Plain conversion of the initial position
    Quick {
        ecef: EcefPosition,
        geodetic: GeodeticPosition,
    },
    /// Initial position and its refined estimate
    Refined {
        initial: GeodeticPosition,
        refined: GeodeticPosition,
        estimate: &'a PositionEstimate,
    },
}

impl<'a> Report<'a> {
    /// Builds a quick [Report] of this initial position
    pub fn quick(converter: &Converter, ecef: &EcefPosition) -> Self {
        Self::Quick {
            ecef: *ecef,
            geodetic: converter.ecef_to_geodetic(ecef),
        }
    }
    /// Builds a refined [Report], comparing the estimate to the initial position
    pub fn refined(
        converter: &Converter,
        initial: &EcefPosition,
        estimate: &'a PositionEstimate,
    ) -> Self {
        Self::Refined {
            initial: converter.ecef_to_geodetic(initial),
            refined: estimate.geodetic(converter),
            estimate,
        }
    }
}

fn write_geodetic(
    f: &mut fmt::Formatter,
    geo: &GeodeticPosition,
    decimals: usize,
) -> fmt::Result {
    writeln!(
        f,
        "  Latitude : {:.*}° ({})",
        decimals,
        geo.latitude_ddeg,
        decimal_degrees_to_dms(geo.latitude_ddeg)
    )?;
    writeln!(
        f,
        "  Longitude: {:.*}° ({})",
        decimals,
        geo.longitude_ddeg,
        decimal_degrees_to_dms(geo.longitude_ddeg)
    )?;
    writeln!(f, "  Height   : {:.*} m", decimals.min(4), geo.height_m)?;
    if !geo.converged {
        writeln!(f, "  (latitude tolerance not reached)")?;
    }
    Ok(())
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Quick { ecef, geodetic } => {
                writeln!(f, "ECEF position:")?;
                writeln!(f, "  X: {:.4} m", ecef.x())?;
                writeln!(f, "  Y: {:.4} m", ecef.y())?;
                writeln!(f, "  Z: {:.4} m", ecef.z())?;
                writeln!(f, "Geodetic position ({} iterations):", geodetic.iterations)?;
                write_geodetic(f, geodetic, 6)
            },
            Self::Refined {
                initial,
                refined,
                estimate,
            } => {
                let p = estimate.position;
                let status = if estimate.cancelled {
                    "cancelled"
                } else if estimate.converged {
                    "converged"
                } else {
                    "iteration limit reached"
                };
                writeln!(f, "Refinement: {} iterations ({})", estimate.iterations, status)?;
                writeln!(f, "  Final residual: {:.8} m", estimate.final_residual)?;
                writeln!(f, "  Precision     : {:.8} m", estimate.precision)?;
                writeln!(f, "Refined ECEF position:")?;
                writeln!(f, "  X: {:14.4} ± {:.4} m", p.x(), estimate.std_dev[0])?;
                writeln!(f, "  Y: {:14.4} ± {:.4} m", p.y(), estimate.std_dev[1])?;
                writeln!(f, "  Z: {:14.4} ± {:.4} m", p.z(), estimate.std_dev[2])?;
                writeln!(f, "Refined geodetic position:")?;
                write_geodetic(f, refined, 8)?;
                writeln!(f, "Initial geodetic position:")?;
                write_geodetic(f, initial, 8)?;
                writeln!(f, "Quality:")?;
                writeln!(
                    f,
                    "  Position stability: {:.8} m",
                    estimate.quality.position_stability
                )?;
                writeln!(
                    f,
                    "  Convergence rate  : {:.8}",
                    estimate.quality.convergence_rate
                )?;
                writeln!(
                    f,
                    "  Residual reduction: {:.2} %",
                    estimate.quality.residual_reduction * 100.0
                )?;
                let stats = &estimate.convergence_stats;
                writeln!(
                    f,
                    "  Displacement min/mean/max: {:.8} / {:.8} / {:.8} m",
                    stats.min, stats.mean, stats.max
                )
            },
        }
    }
}
