//! S-JTSK to WGS-84 coordinate conversion.
//!
//! The conversion runs in two stages:
//! - [`krovak`] inverts the Krovak oblique conformal conic projection onto the
//!   Bessel 1841 ellipsoid and lifts the result to Cartesian coordinates.
//! - [`datum`] applies the seven-parameter Helmert shift into WGS-84 and
//!   recovers geodetic coordinates on the WGS-84 ellipsoid.
//!
//! Heights are carried with a fixed 45 m offset that is added before the datum
//! shift and removed afterwards. Outputs are rounded to three decimal places of
//! a degree and to whole metres.

mod datum;
mod error;
mod krovak;

use geo::Point;

pub use error::{ConversionError, GridAxis};

/// Offset applied to heights around the datum shift.
pub(crate) const HEIGHT_OFFSET: f64 = 45.0;

/// A point in the S-JTSK (EPSG:5514) national grid.
///
/// Both coordinates are expected to be non-positive, as EPSG:5514 encodes
/// the Czech territory with negated axes.
///
/// # Examples
/// ```
/// use wdbot_core::ProjectedPoint;
///
/// # fn main() -> Result<(), wdbot_core::ConversionError> {
/// let old_town = ProjectedPoint::new(-743_000.0, -1_043_000.0);
/// let wgs = old_town.to_wgs84(200.0)?;
/// assert!((wgs.latitude - 50.087).abs() < 0.001);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectedPoint {
    /// Grid `Y` coordinate in metres.
    pub y: f64,
    /// Grid `X` coordinate in metres.
    pub x: f64,
}

impl ProjectedPoint {
    /// Construct a grid point from its `Y` and `X` coordinates.
    #[must_use]
    pub const fn new(y: f64, x: f64) -> Self {
        Self { y, x }
    }

    /// Convert this point, at height `height` metres, to WGS-84.
    ///
    /// # Errors
    /// See [`convert_to_wgs84`].
    pub fn to_wgs84(self, height: f64) -> Result<GeodeticPoint, ConversionError> {
        convert_to_wgs84(self.y, self.x, height)
    }
}

/// A WGS-84 position as produced by [`convert_to_wgs84`].
///
/// Latitude and longitude are decimal degrees rounded to three places; height
/// is rounded to whole metres.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticPoint {
    /// Latitude in decimal degrees.
    pub latitude: f32,
    /// Longitude in decimal degrees.
    pub longitude: f32,
    /// Height in metres.
    pub height: f32,
}

impl GeodeticPoint {
    /// Planar view of the position with `x = longitude` and `y = latitude`.
    ///
    /// # Examples
    /// ```
    /// use wdbot_core::GeodeticPoint;
    ///
    /// let point = GeodeticPoint { latitude: 50.087, longitude: 14.419, height: 245.0 };
    /// let planar = point.to_point();
    /// assert!((planar.y() - 50.087).abs() < 1e-4);
    /// ```
    #[must_use]
    pub fn to_point(self) -> Point<f64> {
        Point::new(f64::from(self.longitude), f64::from(self.latitude))
    }
}

impl From<GeodeticPoint> for Point<f64> {
    fn from(value: GeodeticPoint) -> Self {
        value.to_point()
    }
}

/// Convert an S-JTSK grid coordinate with height `h` to WGS-84.
///
/// `y` and `x` must both be finite and non-positive. The function is pure:
/// identical inputs yield bit-identical outputs.
///
/// # Errors
/// - [`ConversionError::NonFiniteInput`] when any input is NaN or infinite.
/// - [`ConversionError::PositiveCoordinate`] when `y` or `x` is positive.
/// - [`ConversionError::NonConvergence`] when the latitude solve exceeds its
///   iteration cap, including degenerate input such as the grid origin.
/// - [`ConversionError::NonFiniteResult`] when the datum shift yields a
///   non-finite position.
///
/// # Examples
/// ```
/// use wdbot_core::{ConversionError, convert_to_wgs84};
///
/// let brno = convert_to_wgs84(-598_000.0, -1_160_000.0, 300.0)?;
/// assert!((brno.longitude - 16.609).abs() < 0.001);
///
/// assert!(convert_to_wgs84(1.0, -1.0, 0.0).is_err());
/// # Ok::<(), ConversionError>(())
/// ```
pub fn convert_to_wgs84(y: f64, x: f64, h: f64) -> Result<GeodeticPoint, ConversionError> {
    validate_input(y, x, h)?;
    let bessel = krovak::grid_to_bessel(ProjectedPoint::new(y, x))?;
    let cartesian = bessel.to_cartesian(offset_height(h));
    let wgs = datum::bessel_to_wgs84(cartesian);
    finish(wgs.latitude_deg(), wgs.longitude_deg(), wgs.height)
}

fn validate_input(y: f64, x: f64, h: f64) -> Result<(), ConversionError> {
    for (name, value) in [("y", y), ("x", x), ("height", h)] {
        if !value.is_finite() {
            return Err(ConversionError::NonFiniteInput { name });
        }
    }
    if y > 0.0 {
        return Err(ConversionError::PositiveCoordinate {
            axis: GridAxis::Y,
            value: y,
        });
    }
    if x > 0.0 {
        return Err(ConversionError::PositiveCoordinate {
            axis: GridAxis::X,
            value: x,
        });
    }
    Ok(())
}

#[expect(
    clippy::float_arithmetic,
    reason = "heights carry a fixed offset through the datum shift"
)]
fn offset_height(h: f64) -> f64 {
    h + HEIGHT_OFFSET
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "outputs are rounded and narrowed to the published precision"
)]
fn finish(latitude: f64, longitude: f64, height: f64) -> Result<GeodeticPoint, ConversionError> {
    let height_above = height - HEIGHT_OFFSET;
    if !(latitude.is_finite() && longitude.is_finite() && height_above.is_finite()) {
        return Err(ConversionError::NonFiniteResult);
    }
    Ok(GeodeticPoint {
        latitude: round_to_thousandths(latitude) as f32,
        longitude: round_to_thousandths(longitude) as f32,
        height: height_above.round_ties_even() as f32,
    })
}

#[expect(
    clippy::float_arithmetic,
    reason = "decimal rounding scales by a power of ten"
)]
fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}
