//! Helmert datum shift from S-JTSK/Bessel into WGS-84.

use super::krovak::first_eccentricity_squared;

/// WGS-84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 inverse flattening.
const WGS84_INV_F: f64 = 298.257_223_563;

/// Translation in metres.
const DX: f64 = 570.69;
const DY: f64 = 85.69;
const DZ: f64 = 462.84;
/// Rotations in arc-seconds.
const WX_ARCSEC: f64 = -4.998_21;
const WY_ARCSEC: f64 = -1.586_76;
const WZ_ARCSEC: f64 = -5.2611;
/// Scale change.
const M: f64 = 3.543e-6;

/// Earth-centred Cartesian coordinates in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cartesian {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) z: f64,
}

/// WGS-84 geodetic coordinates; angles in radians, height in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Wgs84Geodetic {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) height: f64,
}

impl Wgs84Geodetic {
    pub(crate) fn latitude_deg(&self) -> f64 {
        self.latitude.to_degrees()
    }

    pub(crate) fn longitude_deg(&self) -> f64 {
        self.longitude.to_degrees()
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "rotations are published in arc-seconds"
)]
fn arcsec_to_rad(arcsec: f64) -> f64 {
    (arcsec / 3600.0).to_radians()
}

/// Apply the seven-parameter small-angle Helmert transform.
#[expect(
    clippy::float_arithmetic,
    reason = "the Helmert transform is a linear float map"
)]
pub(crate) fn helmert(point: Cartesian) -> Cartesian {
    let wx = arcsec_to_rad(WX_ARCSEC);
    let wy = arcsec_to_rad(WY_ARCSEC);
    let wz = arcsec_to_rad(WZ_ARCSEC);
    let scale = 1.0 + M;
    let Cartesian { x, y, z } = point;
    Cartesian {
        x: DX + scale * (x + wz * y - wy * z),
        y: DY + scale * (-wz * x + y + wx * z),
        z: DZ + scale * (wy * x - wx * y + z),
    }
}

/// Recover WGS-84 geodetic coordinates with a single Bowring step.
#[expect(
    clippy::float_arithmetic,
    reason = "Bowring's method is closed-form trigonometry"
)]
pub(crate) fn cartesian_to_wgs84(point: Cartesian) -> Wgs84Geodetic {
    let Cartesian { x, y, z } = point;
    let a_over_b = WGS84_INV_F / (WGS84_INV_F - 1.0);
    let p = (x * x + y * y).sqrt();
    let e2 = first_eccentricity_squared(WGS84_INV_F);
    let theta = (z * a_over_b / p).atan();
    let (sin_t, cos_t) = theta.sin_cos();
    let tan_b = (z + e2 * a_over_b * WGS84_A * sin_t * sin_t * sin_t)
        / (p - e2 * WGS84_A * cos_t * cos_t * cos_t);
    let latitude = tan_b.atan();
    let longitude = 2.0 * (y / (p + x)).atan();
    let height =
        (1.0 + tan_b * tan_b).sqrt() * (p - WGS84_A / (1.0 + (1.0 - e2) * tan_b * tan_b).sqrt());
    Wgs84Geodetic {
        latitude,
        longitude,
        height,
    }
}

/// Shift Bessel Cartesian coordinates into WGS-84 geodetic coordinates.
pub(crate) fn bessel_to_wgs84(point: Cartesian) -> Wgs84Geodetic {
    cartesian_to_wgs84(helmert(point))
}
