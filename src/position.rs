//! ECEF and Geodetic coordinates
use crate::prelude::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Earth Centered Earth Fixed position, in meters.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EcefPosition {
    ecef: Vector3<f64>,
}

impl EcefPosition {
    /// Builds new [EcefPosition] from coordinates in meters
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            ecef: Vector3::new(x, y, z),
        }
    }
    /// Builds new [EcefPosition] from coordinates vector in meters
    pub fn from_ecef(ecef: Vector3<f64>) -> Self {
        Self { ecef }
    }
    /// Returns coordinates in ECEF [m]
    pub fn ecef(&self) -> Vector3<f64> {
        self.ecef
    }
    pub fn x(&self) -> f64 {
        self.ecef[0]
    }
    pub fn y(&self) -> f64 {
        self.ecef[1]
    }
    pub fn z(&self) -> f64 {
        self.ecef[2]
    }
    /// Distance to Earth center [m]
    pub fn norm(&self) -> f64 {
        self.ecef.norm()
    }
    /// True if all coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.ecef.iter().all(|v| v.is_finite())
    }
    /// Euclidean distance between two positions [m]
    pub fn distance(&self, rhs: &Self) -> f64 {
        (rhs.ecef - self.ecef).norm()
    }
}

impl From<(f64, f64, f64)> for EcefPosition {
    fn from(xyz: (f64, f64, f64)) -> Self {
        Self::new(xyz.0, xyz.1, xyz.2)
    }
}

impl std::ops::Add<Vector3<f64>> for EcefPosition {
    type Output = Self;
    fn add(self, rhs: Vector3<f64>) -> Self {
        Self::from_ecef(self.ecef + rhs)
    }
}

/// Geodetic coordinates, as resolved by a [crate::prelude::Converter].
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodeticPosition {
    /// Latitude in decimal degrees
    pub latitude_ddeg: f64,
    /// Longitude in decimal degrees
    pub longitude_ddeg: f64,
    /// Height above the ellipsoid [m]
    pub height_m: f64,
    /// Number of iterations the latitude solver consumed
    pub iterations: usize,
    /// False when the solver hit its iteration limit before
    /// reaching the requested tolerance.
    pub converged: bool,
}

impl GeodeticPosition {
    /// Returns (latitude, longitude) in radians
    pub fn lat_lon_rad(&self) -> (f64, f64) {
        (
            self.latitude_ddeg.to_radians(),
            self.longitude_ddeg.to_radians(),
        )
    }
}
