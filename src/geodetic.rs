//! ECEF / Geodetic transforms on a reference [Ellipsoid]
use log::{debug, warn};
use std::f64::consts::PI;

use crate::{
    cfg::ConversionOpts,
    ellipsoid::{Ellipsoid, WGS84},
    position::{EcefPosition, GeodeticPosition},
    prelude::{Matrix3, Vector3},
    Error,
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Coordinates converter
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Converter {
    /// Reference ellipsoid
    ellipsoid: Ellipsoid,
    /// Latitude solver settings
    opts: ConversionOpts,
}

impl Default for Converter {
    /// WGS84 converter, 100 iterations at most, 1E-15 rad tolerance
    fn default() -> Self {
        Self {
            ellipsoid: WGS84,
            opts: ConversionOpts::default(),
        }
    }
}

impl Converter {
    /// Builds a new [Converter] for given [Ellipsoid].
    /// Fails when the latitude solver settings are not usable.
    pub fn new(ellipsoid: Ellipsoid, opts: ConversionOpts) -> Result<Self, Error> {
        opts.validate()?;
        Ok(Self { ellipsoid, opts })
    }
    /// WGS84 [Converter] with custom solver settings
    pub fn wgs84(max_iterations: usize, tolerance: f64) -> Result<Self, Error> {
        Self::new(
            WGS84,
            ConversionOpts {
                max_iterations,
                tolerance,
            },
        )
    }
    /// Returns reference [Ellipsoid]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
    /// Converts ECEF coordinates to [GeodeticPosition].
    ///
    /// Longitude is `atan2(y, x)` folded into [-180°, 180°): the antimeridian
    /// resolves to -180°. On the polar axis (x = y = 0) it resolves to 0°
    /// (-180° for negative zero x), latitude to ±90°.
    /// Latitude and height are obtained by fixed point iteration. Reaching the
    /// iteration limit is not an error: the last estimate is returned with
    /// `converged` set to false.
    pub fn ecef_to_geodetic(&self, position: &EcefPosition) -> GeodeticPosition {
        let (x, y, z) = (position.x(), position.y(), position.z());
        let Ellipsoid { a, e2, .. } = self.ellipsoid;

        let mut lon = y.atan2(x);
        if lon >= PI {
            lon -= 2.0 * PI;
        }
        let p = (x * x + y * y).sqrt();

        if p == 0.0 && z == 0.0 {
            debug!("geodetic conversion of earth center");
            return GeodeticPosition {
                latitude_ddeg: 0.0,
                longitude_ddeg: lon.to_degrees(),
                height_m: -a,
                iterations: 0,
                converged: true,
            };
        }

        let mut lat = z.atan2(p * (1.0 - e2));
        let mut h = 0.0_f64;
        let mut iterations = 0;
        let mut converged = false;

        for i in 0..self.opts.max_iterations {
            iterations = i + 1;
            let n = self.ellipsoid.prime_vertical_radius(lat);
            h = self.height(p, z, lat, n);
            let lat_new = z.atan2(p * (1.0 - e2 * n / (n + h)));
            let delta = (lat_new - lat).abs();
            lat = lat_new;
            if delta < self.opts.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                "geodetic conversion: tolerance {:.1E} not reached within {} iterations",
                self.opts.tolerance, self.opts.max_iterations
            );
        }

        GeodeticPosition {
            latitude_ddeg: lat.to_degrees(),
            longitude_ddeg: lon.to_degrees(),
            height_m: h,
            iterations,
            converged,
        }
    }
    /// Ellipsoidal height at given latitude. Above 45° the polar form is
    /// used, `p / cos(lat)` is singular on the polar axis.
    fn height(&self, p: f64, z: f64, lat: f64, n: f64) -> f64 {
        if p >= z.abs() {
            p / lat.cos() - n
        } else {
            z / lat.sin() - n * (1.0 - self.ellipsoid.e2)
        }
    }
    /// Converts geodetic coordinates (latitude [ddeg], longitude [ddeg],
    /// height above ellipsoid [m]) to ECEF. Closed form.
    pub fn geodetic_to_ecef(&self, lat_ddeg: f64, lon_ddeg: f64, h: f64) -> EcefPosition {
        let (lat, lon) = (lat_ddeg.to_radians(), lon_ddeg.to_radians());
        let n = self.ellipsoid.prime_vertical_radius(lat);
        let e2 = self.ellipsoid.e2;
        EcefPosition::new(
            (n + h) * lat.cos() * lon.cos(),
            (n + h) * lat.cos() * lon.sin(),
            (n * (1.0 - e2) + h) * lat.sin(),
        )
    }
    /// Euclidean distance between two ECEF positions [m]
    pub fn distance(&self, p1: &EcefPosition, p2: &EcefPosition) -> f64 {
        p1.distance(p2)
    }
}

/// Formats decimal degrees as `DD° MM' SS.SSS"`.
/// Degrees are truncated toward zero. Negative angles below one degree
/// keep their sign on the degree field (`-00° 30' 00.000"`).
pub fn decimal_degrees_to_dms(value: f64) -> String {
    let degrees = value.trunc() as i64;
    let minutes_ddeg = (value - value.trunc()).abs() * 60.0;
    let minutes = minutes_ddeg.trunc() as i64;
    let seconds = (minutes_ddeg - minutes_ddeg.trunc()) * 60.0;

    let degrees = if degrees == 0 && value < 0.0 {
        "-00".to_string()
    } else {
        format!("{:02}", degrees)
    };

    format!("{}° {:02}' {:06.3}\"", degrees, minutes, seconds)
}

/// Error ellipsoid, as described by a 3x3 covariance matrix
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ErrorEllipsoid {
    /// Semi axes [m], one per eigenvector
    pub semi_axes: Vector3<f64>,
    /// Orthonormal eigenvectors, stored as columns
    pub eigenvectors: Matrix3<f64>,
    /// Ellipsoid volume [m^3]
    pub volume: f64,
    /// Largest semi axis [m]
    pub max_error: f64,
    /// Smallest semi axis [m]
    pub min_error: f64,
}

impl ErrorEllipsoid {
    /// Builds [ErrorEllipsoid] from a symmetric covariance matrix.
    /// Negative eigenvalues (numerical noise) are clamped to zero.
    pub fn from_covariance(covariance: &Matrix3<f64>) -> Self {
        let eigen = covariance.symmetric_eigen();
        let semi_axes = eigen.eigenvalues.map(|lambda| lambda.max(0.0).sqrt());

        let volume = 4.0 / 3.0 * PI * semi_axes.iter().product::<f64>();
        let max_error = semi_axes.iter().copied().fold(f64::MIN, f64::max);
        let min_error = semi_axes.iter().copied().fold(f64::MAX, f64::min);

        Self {
            semi_axes,
            eigenvectors: eigen.eigenvectors,
            volume,
            max_error,
            min_error,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(45.0, 7.0, 150.0)]
    #[case(0.0, 0.0, 0.0)]
    #[case(-33.8688, 151.2093, 58.0)]
    #[case(89.5, -179.99, 3000.0)]
    #[case(-89.999, 120.0, -1000.0)]
    #[case(12.3456789, -45.987654, 100000.0)]
    #[case(60.0, -180.0, 25.0)]
    fn round_trip(#[case] lat: f64, #[case] lon: f64, #[case] h: f64) {
        let converter = Converter::default();
        let ecef = converter.geodetic_to_ecef(lat, lon, h);
        let geo = converter.ecef_to_geodetic(&ecef);

        let lon_err = (geo.longitude_ddeg - lon).abs();
        assert!(
            (geo.latitude_ddeg - lat).abs() < 1.0E-9,
            "lat error too large {}",
            geo.latitude_ddeg - lat
        );
        assert!(lon_err < 1.0E-9, "lon error too large {}", lon_err);
        assert!((geo.height_m - h).abs() < 1.0E-6, "h error too large {}", geo.height_m - h);
        assert!(geo.iterations <= 100);
    }

    #[rstest]
    #[case(0.0)]
    #[case(45.0)]
    #[case(-120.0)]
    #[case(179.0)]
    fn equator(#[case] lon: f64) {
        let ecef = Converter::default().geodetic_to_ecef(0.0, lon, 0.0);
        assert_eq!(ecef.z(), 0.0);
        assert!((ecef.ecef().norm() - WGS84.a).abs() < 1.0E-6);
    }

    #[rstest]
    #[case(10.0, 0.0)]
    #[case(-42.0, 1500.0)]
    #[case(0.0, 0.0)]
    fn antimeridian(#[case] lat: f64, #[case] h: f64) {
        let converter = Converter::default();
        let ecef = converter.geodetic_to_ecef(lat, 180.0, h);
        let geo = converter.ecef_to_geodetic(&ecef);
        assert_eq!(geo.longitude_ddeg, -180.0);
        assert!((geo.latitude_ddeg - lat).abs() < 1.0E-9);
        assert!((geo.height_m - h).abs() < 1.0E-6);
    }

    #[test]
    fn negative_x_axis() {
        let converter = Converter::default();
        let geo = converter.ecef_to_geodetic(&EcefPosition::new(-WGS84.a, 0.0, 0.0));
        assert_eq!(geo.longitude_ddeg, -180.0);
        assert_eq!(geo.latitude_ddeg, 0.0);
        assert!(geo.height_m.abs() < 1.0E-6);

        let center = converter.ecef_to_geodetic(&EcefPosition::new(-0.0, 0.0, 0.0));
        assert_eq!(center.longitude_ddeg, -180.0);
    }

    #[test]
    fn poles() {
        let converter = Converter::default();
        let north = converter.ecef_to_geodetic(&EcefPosition::new(0.0, 0.0, WGS84.b + 10.0));
        assert_eq!(north.latitude_ddeg, 90.0);
        assert!(north.longitude_ddeg.is_finite());
        assert!((north.height_m - 10.0).abs() < 1.0E-6);
        assert!(north.converged);

        let south = converter.ecef_to_geodetic(&EcefPosition::new(0.0, 0.0, -WGS84.b));
        assert_eq!(south.latitude_ddeg, -90.0);
        assert!(south.height_m.abs() < 1.0E-6);
    }

    #[test]
    fn earth_center() {
        let geo = Converter::default().ecef_to_geodetic(&EcefPosition::default());
        assert_eq!(geo.latitude_ddeg, 0.0);
        assert_eq!(geo.height_m, -WGS84.a);
    }

    #[test]
    fn precision_not_reached() {
        let converter = Converter::wgs84(1, 1.0E-15).unwrap();
        let ecef = converter.geodetic_to_ecef(45.0, 10.0, 2000.0);
        let geo = converter.ecef_to_geodetic(&ecef);
        assert!(!geo.converged);
        assert_eq!(geo.iterations, 1);
        assert!((geo.latitude_ddeg - 45.0).abs() < 1.0E-3);
    }

    #[test]
    fn invalid_settings() {
        assert!(matches!(
            Converter::wgs84(0, 1.0E-15),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            Converter::wgs84(10, 0.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            Converter::wgs84(10, f64::NAN),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn ecef_reference_point() {
        // Paris observatory area
        let geo = Converter::default()
            .ecef_to_geodetic(&EcefPosition::new(4201575.0, 189944.0, 4779065.0));
        assert!((geo.latitude_ddeg - 48.8410).abs() < 1.0E-3);
        assert!((geo.longitude_ddeg - 2.5884).abs() < 1.0E-3);
        assert!(geo.converged);
    }

    #[rstest]
    #[case(45.5, "45° 30' 00.000\"")]
    #[case(-45.5, "-45° 30' 00.000\"")]
    #[case(2.25, "02° 15' 00.000\"")]
    #[case(0.5, "00° 30' 00.000\"")]
    #[case(-0.5, "-00° 30' 00.000\"")]
    #[case(0.0, "00° 00' 00.000\"")]
    #[case(-123.0, "-123° 00' 00.000\"")]
    fn dms(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(decimal_degrees_to_dms(value), expected);
    }

    #[test]
    fn dms_seconds() {
        // 10° 10' 10" = 10.169444..
        let dms = decimal_degrees_to_dms(10.0 + 10.0 / 60.0 + 10.0 / 3600.0);
        assert_eq!(dms, "10° 10' 10.000\"");
    }

    #[test]
    fn isotropic_error_ellipsoid() {
        let s = 0.25_f64;
        let ellipsoid = ErrorEllipsoid::from_covariance(&(Matrix3::identity() * s * s));
        for axis in ellipsoid.semi_axes.iter() {
            assert!((axis - s).abs() < 1.0E-12);
        }
        assert!((ellipsoid.volume - 4.0 / 3.0 * PI * s.powi(3)).abs() < 1.0E-12);
        assert!((ellipsoid.max_error - s).abs() < 1.0E-12);
        assert!((ellipsoid.min_error - s).abs() < 1.0E-12);
    }

    #[test]
    fn anisotropic_error_ellipsoid() {
        let cov = Matrix3::new(4.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0E-18);
        let ellipsoid = ErrorEllipsoid::from_covariance(&cov);
        assert!((ellipsoid.max_error - 2.0).abs() < 1.0E-12);
        assert_eq!(ellipsoid.min_error, 0.0);
        assert_eq!(ellipsoid.volume, 0.0);

        let v = ellipsoid.eigenvectors;
        assert!(((v.transpose() * v) - Matrix3::identity()).norm() < 1.0E-9);
    }
}
