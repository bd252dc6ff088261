//! Facade crate for wdbot.
//!
//! This crate re-exports the coordinate conversion and tram neighbour types
//! and exposes the file adapters behind the `data` feature.

#![forbid(unsafe_code)]

pub use wdbot_core::{
    ConversionError, GeodeticPoint, GridAxis, NeighbourPair, ProjectedPoint, RouteError,
    StopNameLookup, StopNeighbours, StopRegistry, StopRegistryError, TransitRoute, TransitStop,
    compute_neighbours, convert_to_wgs84,
};

#[cfg(feature = "data")]
pub use wdbot_data::{
    CadastralPoints, GtfsError, GtfsRoutes, NetworkError, RouteTypeFilter, RuianError,
    StopsDocument, StopsError, TramNetwork, TramStop,
};
