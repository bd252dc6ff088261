use thiserror::Error;

/// Errors raised when constructing a [`crate::TransitRoute`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The route identifier was empty.
    #[error("route identifier must not be empty")]
    MissingRouteId,
}

/// Errors raised when building a [`crate::StopRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopRegistryError {
    /// A GTFS stop id was claimed by two named stops.
    #[error("GTFS id {gtfs_id} belongs to both {first} and {second}")]
    DuplicateGtfsId {
        /// Offending GTFS id.
        gtfs_id: String,
        /// Name of the stop registered first.
        first: String,
        /// Name of the stop that tried to claim the id again.
        second: String,
    },
    /// Two stops shared a display name.
    #[error("stop name {name} is registered twice")]
    DuplicateName {
        /// Offending name.
        name: String,
    },
}
