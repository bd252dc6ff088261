//! Tram network assembled from the stop list and the GTFS feed.

use camino::Utf8Path;
use chrono::NaiveDate;
use log::info;
use thiserror::Error;
use wdbot_core::{StopNeighbours, StopRegistry, StopRegistryError, TransitRoute, compute_neighbours};

use crate::{GtfsError, RouteTypeFilter, StopsDocument, StopsError, gtfs, stops};

/// Errors raised while assembling a tram network.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetworkError {
    /// The stop list could not be read.
    #[error(transparent)]
    Stops(#[from] StopsError),
    /// The GTFS feed could not be read.
    #[error(transparent)]
    Gtfs(#[from] GtfsError),
    /// The stop list maps one platform to two stops.
    #[error("inconsistent stop list")]
    Registry(#[from] StopRegistryError),
}

/// Stops, routes and the neighbour graph of one network.
#[derive(Debug, Clone)]
pub struct TramNetwork {
    stops: StopsDocument,
    registry: StopRegistry,
    routes: Vec<TransitRoute>,
    gtfs_published: Option<NaiveDate>,
    neighbours: StopNeighbours,
}

impl TramNetwork {
    /// Index `stops` and derive neighbours from `routes`.
    ///
    /// # Errors
    /// Returns [`NetworkError::Registry`] when two stops share a platform id.
    pub fn assemble(stops: StopsDocument, routes: Vec<TransitRoute>) -> Result<Self, NetworkError> {
        let registry = stops.registry()?;
        let neighbours = compute_neighbours(&routes, &registry);
        info!(
            "Assembled network of {} stops and {} route directions",
            registry.len(),
            routes.len()
        );
        Ok(Self {
            stops,
            registry,
            routes,
            gtfs_published: None,
            neighbours,
        })
    }

    /// Load the stop list and the tram routes of a GTFS feed.
    ///
    /// # Errors
    /// Propagates stop-list, GTFS and registry failures.
    pub fn load(stops_path: &Utf8Path, gtfs_path: &Utf8Path) -> Result<Self, NetworkError> {
        Self::load_filtered(stops_path, gtfs_path, &RouteTypeFilter::default())
    }

    /// Load the stop list and the routes of a GTFS feed passing `filter`.
    ///
    /// # Errors
    /// Propagates stop-list, GTFS and registry failures.
    pub fn load_filtered(
        stops_path: &Utf8Path,
        gtfs_path: &Utf8Path,
        filter: &RouteTypeFilter,
    ) -> Result<Self, NetworkError> {
        let document = stops::open_tram_stops(stops_path)?;
        let registry = document.registry()?;
        let feed = gtfs::open_routes(gtfs_path, filter, &registry)?;
        Ok(Self::assemble(document, feed.routes)?.with_gtfs_published(feed.published))
    }

    /// Record the publish date of the GTFS feed the routes came from.
    #[must_use]
    pub fn with_gtfs_published(mut self, published: Option<NaiveDate>) -> Self {
        self.gtfs_published = published;
        self
    }

    /// Tram stops of the network.
    #[must_use]
    pub fn stops(&self) -> &StopsDocument {
        &self.stops
    }

    /// Platform-to-stop index.
    #[must_use]
    pub fn registry(&self) -> &StopRegistry {
        &self.registry
    }

    /// Route directions the neighbours were derived from.
    #[must_use]
    pub fn routes(&self) -> &[TransitRoute] {
        &self.routes
    }

    /// Publish date of the GTFS feed, when known.
    #[must_use]
    pub fn gtfs_published(&self) -> Option<NaiveDate> {
        self.gtfs_published
    }

    /// Neighbour pairs of every stop.
    #[must_use]
    pub fn neighbours(&self) -> &StopNeighbours {
        &self.neighbours
    }
}
