//! Inverse Krovak projection onto the Bessel 1841 ellipsoid.

use super::datum::Cartesian;
use super::{ConversionError, ProjectedPoint};

/// Bessel 1841 semi-major axis in metres.
const BESSEL_A: f64 = 6_377_397.155_08;
/// Bessel 1841 inverse flattening.
const BESSEL_INV_F: f64 = 299.152_812_853;
/// First eccentricity of the Bessel ellipsoid.
const E: f64 = 0.081_696_831_215_303;
/// Cone constant of the projection.
const N: f64 = 0.979_924_704_620_83;
/// Radius of the reference parallel scaled by the pole distance.
const RHO_0: f64 = 12_310_230.127_970_36;
/// Sine and cosine of the oblique pole latitude.
const SIN_UQ: f64 = 0.863_499_969_506_341;
const COS_UQ: f64 = 0.504_348_889_819_882;
/// Sine and cosine of the oblique pole longitude.
const SIN_VQ: f64 = 0.420_215_144_586_493;
const COS_VQ: f64 = 0.907_424_504_992_097;
/// Gaussian sphere exponent.
const ALPHA: f64 = 1.000_597_498_371_542;
/// Gaussian sphere scale constant.
const K: f64 = 1.003_419_163_966_575;

/// Convergence threshold for the latitude solve.
const LATITUDE_TOLERANCE: f64 = 1e-15;
/// Upper bound on latitude solve iterations. Valid grid points settle in
/// about six.
pub(crate) const MAX_LATITUDE_ITERATIONS: u32 = 100;

/// Geodetic position on the Bessel ellipsoid, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BesselGeodetic {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

impl BesselGeodetic {
    /// Lift the position at ellipsoidal height `h` to Bessel Cartesian axes.
    #[expect(
        clippy::float_arithmetic,
        reason = "geodetic to Cartesian conversion is floating-point geometry"
    )]
    pub(crate) fn to_cartesian(self, h: f64) -> Cartesian {
        let e2 = first_eccentricity_squared(BESSEL_INV_F);
        let (sin_b, cos_b) = self.latitude.sin_cos();
        let (sin_l, cos_l) = self.longitude.sin_cos();
        let normal = BESSEL_A / (1.0 - e2 * sin_b * sin_b).sqrt();
        Cartesian {
            x: (normal + h) * cos_b * cos_l,
            y: (normal + h) * cos_b * sin_l,
            z: ((1.0 - e2) * normal + h) * sin_b,
        }
    }
}

/// Squared first eccentricity for an ellipsoid with inverse flattening `inv_f`.
#[expect(
    clippy::float_arithmetic,
    reason = "eccentricity follows from flattening"
)]
pub(crate) fn first_eccentricity_squared(inv_f: f64) -> f64 {
    let one_minus_f = 1.0 - 1.0 / inv_f;
    1.0 - one_minus_f * one_minus_f
}

/// Invert the projection for a validated grid point.
#[expect(
    clippy::float_arithmetic,
    reason = "the projection inverse is closed-form trigonometry"
)]
pub(crate) fn grid_to_bessel(point: ProjectedPoint) -> Result<BesselGeodetic, ConversionError> {
    let x = -point.x;
    let y = -point.y;

    // Polar coordinates in the projection plane.
    let rho = (x * x + y * y).sqrt();
    let epsilon = 2.0 * (y / (rho + x)).atan();
    let d = epsilon / N;
    let s = 2.0 * (1.0 / N * (RHO_0 / rho).ln()).exp().atan() - std::f64::consts::FRAC_PI_2;

    // Oblique cartographic sphere to the Gaussian sphere.
    let (sin_s, cos_s) = s.sin_cos();
    let (sin_d, cos_d) = d.sin_cos();
    let sin_u = SIN_UQ * sin_s - COS_UQ * cos_s * cos_d;
    let cos_u = (1.0 - sin_u * sin_u).sqrt();
    let sin_dv = sin_d * cos_s / cos_u;
    let cos_dv = (1.0 - sin_dv * sin_dv).sqrt();
    let sin_v = SIN_VQ * cos_dv - COS_VQ * sin_dv;
    let cos_v = COS_VQ * cos_dv + SIN_VQ * sin_dv;
    let longitude = 2.0 * (sin_v / (1.0 + cos_v)).atan() / ALPHA;

    let t = (2.0 / ALPHA * ((1.0 + sin_u) / cos_u / K).ln()).exp();
    let sin_b = solve_sin_latitude(t)?;
    let latitude = (sin_b / (1.0 - sin_b * sin_b).sqrt()).atan();

    Ok(BesselGeodetic {
        latitude,
        longitude,
    })
}

/// Fixed-point solve for the sine of the ellipsoidal latitude.
///
/// NaN never satisfies the tolerance check, so degenerate input exhausts the
/// cap and is reported as non-convergence.
#[expect(
    clippy::float_arithmetic,
    reason = "the conformal latitude inverse is an iterative float solve"
)]
fn solve_sin_latitude(t: f64) -> Result<f64, ConversionError> {
    let mut current = (t - 1.0) / (t + 1.0);
    for _ in 0..MAX_LATITUDE_ITERATIONS {
        let previous = current;
        let ratio = (1.0 + E * previous) / (1.0 - E * previous);
        let scaled = t * (E * ratio.ln()).exp();
        current = (scaled - 1.0) / (scaled + 1.0);
        if (current - previous).abs() <= LATITUDE_TOLERANCE {
            return Ok(current);
        }
    }
    Err(ConversionError::NonConvergence {
        iterations: MAX_LATITUDE_ITERATIONS,
    })
}
