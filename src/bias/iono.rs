use crate::{position::EcefPosition, prelude::Epoch, Error};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ionosphere delay model
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IonosphereModel {
    /// Constant zenith delay [m], projected along the line of sight with a
    /// `1/sin(elevation)` mapping function. This approximation ignores
    /// azimuth, receiver location and time of day.
    MappedZenith(f64),
}

impl Default for IonosphereModel {
    fn default() -> Self {
        Self::MappedZenith(Self::DEFAULT_ZENITH_DELAY)
    }
}

impl IonosphereModel {
    /// Zenith delay [m] of the default model
    pub const DEFAULT_ZENITH_DELAY: f64 = 5.0;

    /// Returns the slant delay [m] for a signal observed at `elevation` [ddeg].
    pub fn bias(&self, elevation: f64, _azimuth: f64, _receiver: &EcefPosition, _t: Epoch) -> f64 {
        if elevation <= 0.0 {
            return 0.0;
        }
        match self {
            Self::MappedZenith(zenith_delay) => {
                let mapping = 1.0 / elevation.to_radians().sin();
                zenith_delay * mapping
            },
        }
    }
}

impl std::str::FromStr for IonosphereModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<IonosphereModel, Error> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "mapped-zenith" | "zenith" => Ok(IonosphereModel::default()),
            _ => Err(Error::UnknownIonoModel(c.to_string())),
        }
    }
}
