//! Ingestion adapters feeding the wdbot cores.
//!
//! Responsibilities:
//! - Read GTFS route sequences, the PID stop list and RÚIAN cadastral dumps.
//! - Convert raw records into `wdbot-core` types.
//! - Assemble the tram network and its neighbour graph.
//!
//! Boundaries:
//! - Geodesy and graph rules live in `wdbot-core`.
//! - No network access; callers provide files already downloaded.
//!
//! Invariants:
//! - Malformed structure is an error; individual unusable records are logged
//!   and skipped.
//! - No global mutable state.

pub mod gtfs;
pub mod network;
pub mod ruian;
pub mod stops;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use gtfs::{
    GtfsError, GtfsRoutes, RouteTypeFilter, open_routes, open_tram_routes, read_routes,
    read_tram_routes,
};
pub use network::{NetworkError, TramNetwork};
pub use ruian::{
    CadastralPoints, DEFAULT_HEIGHT, RuianError, open_cadastral_points, read_cadastral_points,
};
pub use stops::{LineAtStop, StopsDocument, StopsError, TramStop, open_tram_stops, read_tram_stops};
