//! Atmospheric signal delays
pub(crate) mod iono;
pub(crate) mod tropo;

pub use iono::IonosphereModel;
pub use tropo::TroposphereModel;

use log::debug;

use crate::{geodetic::Converter, position::EcefPosition, prelude::Epoch};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Atmospheric delays along one line of sight, in meters of delay
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AtmosphericCorrection {
    /// Tropospheric delay [m]
    pub tropospheric_m: f64,
    /// Ionospheric delay [m]
    pub ionospheric_m: f64,
}

impl AtmosphericCorrection {
    /// Total delay [m]
    pub fn total(&self) -> f64 {
        self.tropospheric_m + self.ionospheric_m
    }
}

/// Atmospheric delay estimator
#[derive(Default, Debug, Copy, Clone)]
pub struct AtmosphericModel {
    /// Troposphere model
    pub troposphere: TroposphereModel,
    /// Ionosphere model
    pub ionosphere: IonosphereModel,
    /// Resolves the receiver height
    converter: Converter,
}

impl AtmosphericModel {
    /// Builds [AtmosphericModel] from desired models, receiver heights
    /// are resolved with given [Converter].
    pub fn new(
        troposphere: TroposphereModel,
        ionosphere: IonosphereModel,
        converter: Converter,
    ) -> Self {
        Self {
            troposphere,
            ionosphere,
            converter,
        }
    }
    /// Evaluates [AtmosphericCorrection] for a signal observed at `elevation`
    /// and `azimuth` [ddeg] by `receiver` at instant `t`.
    /// Signals below the horizon are not corrected.
    pub fn corrections(
        &self,
        elevation: f64,
        azimuth: f64,
        receiver: &EcefPosition,
        t: Epoch,
    ) -> AtmosphericCorrection {
        if elevation <= 0.0 {
            return AtmosphericCorrection::default();
        }

        let h = self.converter.ecef_to_geodetic(receiver).height_m;

        let corrections = AtmosphericCorrection {
            tropospheric_m: self.troposphere.bias(elevation, h),
            ionospheric_m: self.ionosphere.bias(elevation, azimuth, receiver, t),
        };

        debug!(
            "{:?} - elev={:.3}° azim={:.3}° h={:.3}m tropo={:.3}m iono={:.3}m",
            t, elevation, azimuth, h, corrections.tropospheric_m, corrections.ionospheric_m
        );

        corrections
    }
}
