//! Reference ellipsoid and per-constellation constants
use gnss::prelude::Constellation;

/// Reference ellipsoid, fully derived from its semi major axis and flattening.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipsoid {
    /// Semi major axis [m]
    pub a: f64,
    /// Flattening
    pub f: f64,
    /// Eccentricity squared
    pub e2: f64,
    /// Semi minor axis [m]
    pub b: f64,
    /// Earth rotation rate [rad/s]
    pub omega_e: f64,
}

/// WGS84 reference ellipsoid
pub const WGS84: Ellipsoid = Ellipsoid::new(6378137.0, 1.0 / 298.257223563, 7.2921151467E-5);

impl Default for Ellipsoid {
    fn default() -> Self {
        WGS84
    }
}

impl Ellipsoid {
    /// Builds a new [Ellipsoid] from semi major axis [m], flattening
    /// and rotation rate [rad/s].
    pub const fn new(a: f64, f: f64, omega_e: f64) -> Self {
        Self {
            a,
            f,
            e2: 2.0 * f - f * f,
            b: a * (1.0 - f),
            omega_e,
        }
    }
    /// Radius of curvature in the prime vertical, at given latitude [rad]
    pub fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        self.a / (1.0 - self.e2 * lat_rad.sin().powi(2)).sqrt()
    }
}

/// Gravitational and rotational constants used by a given constellation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SystemConstants {
    /// Earth mass * gravitational constant [m^3/s^2]
    pub gm: f64,
    /// Earth rotation rate [rad/s]
    pub omega_e: f64,
}

impl SystemConstants {
    const EARTH_GM_CONSTANT: f64 = 3.986004418E14_f64;

    /// Returns the constants for a supported [Constellation].
    /// GPS, Glonass, Galileo and BeiDou currently all share the WGS84
    /// values: this is a known approximation, the per-system frames differ
    /// slightly in reality.
    pub fn from_constellation(constellation: Constellation) -> Option<Self> {
        match constellation {
            Constellation::GPS
            | Constellation::Glonass
            | Constellation::Galileo
            | Constellation::BeiDou => Some(Self {
                gm: Self::EARTH_GM_CONSTANT,
                omega_e: WGS84.omega_e,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wgs84_derived_values() {
        let f = 1.0 / 298.257223563;
        assert_eq!(WGS84.e2, 2.0 * f - f * f);
        assert_eq!(WGS84.b, 6378137.0 * (1.0 - f));
        assert!((WGS84.b - 6356752.314245).abs() < 1.0E-6);
        assert!((WGS84.e2 - 6.69437999014E-3).abs() < 1.0E-12);
    }

    #[test]
    fn prime_vertical_radius() {
        assert_eq!(WGS84.prime_vertical_radius(0.0), WGS84.a);
        let n_pole = WGS84.prime_vertical_radius(std::f64::consts::FRAC_PI_2);
        assert!((n_pole - WGS84.a * WGS84.a / WGS84.b).abs() < 1.0E-6);
    }

    #[test]
    fn system_constants() {
        let gps = SystemConstants::from_constellation(Constellation::GPS).unwrap();
        for constellation in [
            Constellation::Glonass,
            Constellation::Galileo,
            Constellation::BeiDou,
        ] {
            let constants = SystemConstants::from_constellation(constellation).unwrap();
            assert_eq!(constants, gps);
        }
        assert_eq!(gps.gm, 3.986004418E14);
        assert_eq!(gps.omega_e, 7.2921151467E-5);
        assert!(SystemConstants::from_constellation(Constellation::QZSS).is_none());
    }
}
