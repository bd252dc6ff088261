use thiserror::Error;

/// Axis of an S-JTSK grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAxis {
    /// Easting-like `Y` axis.
    Y,
    /// Northing-like `X` axis.
    X,
}

impl std::fmt::Display for GridAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Y => f.write_str("y"),
            Self::X => f.write_str("x"),
        }
    }
}

/// Errors from [`crate::geodesy::convert_to_wgs84`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// A grid coordinate was positive.
    ///
    /// EPSG:5514 encodes the Czech national grid with both coordinates
    /// negative; positive values usually mean the axes or signs were swapped.
    #[error("{axis} coordinate {value} must not be positive")]
    PositiveCoordinate {
        /// Offending axis.
        axis: GridAxis,
        /// Value supplied by the caller.
        value: f64,
    },
    /// An input was NaN or infinite.
    #[error("{name} must be a finite number")]
    NonFiniteInput {
        /// Name of the offending input.
        name: &'static str,
    },
    /// The ellipsoidal latitude solve did not settle within the iteration cap.
    #[error("latitude did not converge after {iterations} iterations")]
    NonConvergence {
        /// Number of iterations attempted.
        iterations: u32,
    },
    /// The transformation produced a NaN or infinite component.
    #[error("conversion produced a non-finite result")]
    NonFiniteResult,
}
