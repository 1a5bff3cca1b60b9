use crate::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TroposphereModel {
    /// Saastamoinen model, driven by a standard atmosphere
    /// (1013.25 hPa, 291.15 K, 50% relative humidity at sea level)
    #[default]
    Saastamoinen,
}

impl TroposphereModel {
    /// Returns the slant delay [m] for given elevation [ddeg]
    /// and receiver height above the ellipsoid [m].
    pub fn bias(&self, elevation: f64, h: f64) -> f64 {
        match self {
            Self::Saastamoinen => Self::saastamoinen_model(elevation, h),
        }
    }
    fn saastamoinen_model(elevation: f64, h: f64) -> f64 {
        const RH_0: f64 = 0.5;

        let elev = elevation.to_radians();
        if elev <= 0.0 {
            return 0.0;
        }

        let p_0 = 1013.25 * (-h / 8400.0).exp();
        let t_0 = 291.15 - 0.0065 * h;

        0.002277 / elev.sin() * (p_0 + (1255.0 / t_0 + 0.05) * RH_0 * (-h / 2200.0).exp())
    }
}

impl std::str::FromStr for TroposphereModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<TroposphereModel, Error> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "saastamoinen" => Ok(TroposphereModel::Saastamoinen),
            _ => Err(Error::UnknownTropoModel(c.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn saastamoinen() {
        let model = TroposphereModel::Saastamoinen;
        let zenith = model.bias(90.0, 0.0);
        assert!((zenith - 2.3125).abs() < 1.0E-3, "zenith delay {}", zenith);
        // ~1/sin(30°) mapping
        assert!((model.bias(30.0, 0.0) - 2.0 * zenith).abs() < 1.0E-9);
        // delay decreases with altitude
        assert!(model.bias(90.0, 2000.0) < zenith);
        assert_eq!(model.bias(0.0, 0.0), 0.0);
    }

    #[test]
    fn from_str() {
        assert_eq!(
            TroposphereModel::from_str(" Saastamoinen ").unwrap(),
            TroposphereModel::Saastamoinen
        );
        assert!(TroposphereModel::from_str("niel").is_err());
    }
}
