//! Core computations behind the wdbot import tasks.
//!
//! The crate holds the two pieces of self-contained numeric and graph logic
//! the Wikidata import tasks depend on:
//! - [`geodesy`] converts S-JTSK (EPSG:5514) grid coordinates into WGS-84
//!   latitude, longitude and height.
//! - [`transit`] derives, for every pair of neighbouring stops in a transit
//!   network, the furthest unambiguous stop in that direction (the terminus
//!   used as a direction label).
//!
//! Everything here is pure and synchronous. Fallible operations return
//! `Result` so batch callers can log the failing item and move on.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod geodesy;
pub mod transit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use geodesy::{ConversionError, GeodeticPoint, GridAxis, ProjectedPoint, convert_to_wgs84};
pub use transit::{
    NeighbourPair, RouteError, StopNameLookup, StopNeighbours, StopRegistry, StopRegistryError,
    TransitRoute, TransitStop, compute_neighbours,
};
