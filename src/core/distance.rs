//! Geodesic distance on an oblate spheroid using Vincenty's inverse formula.

use crate::domain::model::{Coordinate, Kilometres};
use crate::utils::error::{FlightError, Result};
use crate::utils::validation::{config_error, validate_range, Validate};

pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

pub const MAX_ITERATIONS: usize = 200;
pub const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_axis_m: f64,
    pub flattening: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis_m: WGS84_SEMI_MAJOR_AXIS_M,
        flattening: WGS84_FLATTENING,
    };

    pub fn new(semi_major_axis_m: f64, flattening: f64) -> Result<Self> {
        let ellipsoid = Self {
            semi_major_axis_m,
            flattening,
        };
        ellipsoid.validate()?;
        Ok(ellipsoid)
    }

    pub fn semi_minor_axis_m(&self) -> f64 {
        self.semi_major_axis_m * (1.0 - self.flattening)
    }

    /// Distance in metres, not truncated.
    pub fn inverse_m(&self, from: &Coordinate, to: &Coordinate) -> Result<f64> {
        if from == to {
            return Ok(0.0);
        }

        let a = self.semi_major_axis_m;
        let f = self.flattening;
        let b = self.semi_minor_axis_m();

        let u1 = ((1.0 - f) * from.lat().to_radians().tan()).atan();
        let u2 = ((1.0 - f) * to.lat().to_radians().tan()).atan();
        let l = (to.lon() - from.lon()).to_radians();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        let mut converged = false;
        let (mut sin_sigma, mut cos_sigma, mut sigma) = (0.0, 0.0, 0.0);
        let (mut cos_sq_alpha, mut cos_2sigma_m) = (0.0, 0.0);

        for _ in 0..MAX_ITERATIONS {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            sin_sigma = ((cos_u2 * sin_lambda).powi(2)
                + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
            .sqrt();
            if sin_sigma == 0.0 {
                // 重合點
                return Ok(0.0);
            }
            cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            cos_sq_alpha = 1.0 - sin_alpha.powi(2);
            // equatorial line
            cos_2sigma_m = if cos_sq_alpha == 0.0 {
                0.0
            } else {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            };
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let lambda_prev = lambda;
            lambda = l
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));
            if (lambda - lambda_prev).abs() < CONVERGENCE_THRESHOLD {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(FlightError::DistanceComputationError {
                iterations: MAX_ITERATIONS,
            });
        }

        let u_sq = cos_sq_alpha * (a.powi(2) - b.powi(2)) / b.powi(2);
        let big_a =
            1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let delta_sigma = big_b
            * sin_sigma
            * (cos_2sigma_m
                + big_b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                        - big_b / 6.0
                            * cos_2sigma_m
                            * (-3.0 + 4.0 * sin_sigma.powi(2))
                            * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

        Ok(b * big_a * (sigma - delta_sigma))
    }

    /// Distance in whole kilometres.
    ///
    /// The kilometre value is rounded to six decimals (micrometre noise between
    /// `a -> b` and `b -> a`) and then truncated, never rounded up.
    pub fn distance_km(&self, from: &Coordinate, to: &Coordinate) -> Result<Kilometres> {
        let km = self.inverse_m(from, to)? / 1000.0;
        let km = (km * 1e6).round() / 1e6;
        Ok(km.trunc() as Kilometres)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl Validate for Ellipsoid {
    fn validate(&self) -> Result<()> {
        if !(self.semi_major_axis_m.is_finite() && self.semi_major_axis_m > 0.0) {
            return Err(FlightError::InvalidConfigValueError {
                field: "ellipsoid.semi_major_axis_m".to_string(),
                value: self.semi_major_axis_m.to_string(),
                reason: "must be a positive number of metres".to_string(),
            });
        }
        validate_range("ellipsoid.flattening", self.flattening, 0.0, 0.5).map_err(config_error)?;
        Ok(())
    }
}

/// Distance between two coordinates on the WGS-84 ellipsoid.
pub fn distance(from: &Coordinate, to: &Coordinate) -> Result<Kilometres> {
    Ellipsoid::WGS84.distance_km(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_sfo_to_syd() {
        let sfo = coord(37.6213, -122.3790);
        let syd = coord(-33.9461, 151.1772);
        assert_eq!(distance(&sfo, &syd).unwrap(), 11936);
        assert_eq!(distance(&syd, &sfo).unwrap(), 11936);
    }

    #[test]
    fn test_distance_is_truncated() {
        // 1351.0958... km
        let fkb = coord(48.7794, 8.0805);
        let abc = coord(38.9485, -1.8635);
        assert_eq!(distance(&fkb, &abc).unwrap(), 1351);

        // 347.448... km
        let lhr = coord(51.4700, -0.4543);
        let cdg = coord(49.0097, 2.5479);
        let metres = Ellipsoid::WGS84.inverse_m(&lhr, &cdg).unwrap();
        assert!((metres - 347_448.0).abs() < 1.0);
        assert_eq!(distance(&lhr, &cdg).unwrap(), 347);
    }

    #[test]
    fn test_same_point_is_zero() {
        let sfo = coord(37.6213, -122.3790);
        assert_eq!(distance(&sfo, &sfo).unwrap(), 0);
    }

    #[test]
    fn test_pole_to_pole() {
        let north = coord(90.0, 0.0);
        let south = coord(-90.0, 0.0);
        assert_eq!(distance(&north, &south).unwrap(), 20003);
    }

    #[test]
    fn test_antipodal_points_fail_to_converge() {
        let origin = coord(0.0, 0.0);
        let antipode = coord(0.0, 180.0);
        let err = distance(&origin, &antipode).unwrap_err();
        assert!(matches!(
            err,
            FlightError::DistanceComputationError {
                iterations: MAX_ITERATIONS
            }
        ));

        let near_antipode = coord(0.5, 179.7);
        assert!(distance(&origin, &near_antipode).is_err());
    }

    #[test]
    fn test_ellipsoid_validation() {
        assert!(Ellipsoid::new(WGS84_SEMI_MAJOR_AXIS_M, WGS84_FLATTENING).is_ok());
        assert!(Ellipsoid::new(-1.0, WGS84_FLATTENING).is_err());
        assert!(Ellipsoid::new(WGS84_SEMI_MAJOR_AXIS_M, 0.9).is_err());
        assert!((Ellipsoid::WGS84.semi_minor_axis_m() - 6_356_752.314_245).abs() < 1e-3);
    }

    #[test]
    fn test_sphere_matches_great_circle() {
        let sphere = Ellipsoid::new(6_371_000.0, 0.0).unwrap();
        let from = coord(0.0, 0.0);
        let to = coord(0.0, 90.0);
        let expected = 6_371_000.0 * std::f64::consts::FRAC_PI_2;
        assert!((sphere.inverse_m(&from, &to).unwrap() - expected).abs() < 1e-6);
    }
}
