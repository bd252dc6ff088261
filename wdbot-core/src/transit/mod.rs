//! Transit stops, routes and the neighbour graph derived from them.
//!
//! Stops are keyed by display name; a single named stop usually groups several
//! GTFS platform ids. Routes are ordered sequences of GTFS ids.
//! [`compute_neighbours`] folds routes into adjacency maps and labels every
//! neighbouring pair with its effective terminus.

mod error;
mod neighbours;

use std::collections::{BTreeMap, BTreeSet, HashMap, btree_map::Entry};
use std::hash::BuildHasher;

pub use error::{RouteError, StopRegistryError};
pub use neighbours::{NeighbourPair, StopNeighbours, compute_neighbours};

/// A named stop and the GTFS ids of its platforms.
///
/// # Examples
/// ```
/// use wdbot_core::TransitStop;
///
/// let stop = TransitStop::new("Malostranské náměstí", ["U1", "U2"]);
/// assert_eq!(stop.gtfs_ids.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitStop {
    /// Display name; unique across a network.
    pub name: String,
    /// GTFS ids of the platforms belonging to this stop.
    pub gtfs_ids: BTreeSet<String>,
}

impl TransitStop {
    /// Construct a stop from its name and platform ids.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, gtfs_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            gtfs_ids: gtfs_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// One direction of a GTFS route as an ordered list of stop ids.
///
/// Sequences shorter than two stops are valid but contribute no adjacency.
///
/// # Examples
/// ```
/// use wdbot_core::{RouteError, TransitRoute};
///
/// let route = TransitRoute::new("L22", "0", ["A", "B", "C"])?;
/// assert_eq!(route.stops(), ["A", "B", "C"]);
/// assert_eq!(TransitRoute::new("", "0", ["A"]), Err(RouteError::MissingRouteId));
/// # Ok::<(), RouteError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitRoute {
    route_id: String,
    direction_id: String,
    stops: Vec<String>,
}

impl TransitRoute {
    /// Build a route from its id, direction and ordered GTFS stop ids.
    ///
    /// # Errors
    /// Returns [`RouteError::MissingRouteId`] when `id` is empty.
    pub fn new<I, S>(
        id: impl Into<String>,
        direction_id: impl Into<String>,
        stops: I,
    ) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let route_id = id.into();
        if route_id.is_empty() {
            return Err(RouteError::MissingRouteId);
        }
        Ok(Self {
            route_id,
            direction_id: direction_id.into(),
            stops: stops.into_iter().map(Into::into).collect(),
        })
    }

    /// GTFS route identifier.
    #[must_use]
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    /// GTFS direction identifier.
    #[must_use]
    pub fn direction_id(&self) -> &str {
        &self.direction_id
    }

    /// Ordered GTFS stop ids.
    #[must_use]
    pub fn stops(&self) -> &[String] {
        &self.stops
    }

    /// Consecutive `(from, to)` stop id pairs.
    pub fn legs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.stops
            .windows(2)
            .filter_map(|pair| match pair {
                [from, to] => Some((from.as_str(), to.as_str())),
                _ => None,
            })
    }
}

/// Resolve GTFS stop ids to stop display names.
pub trait StopNameLookup {
    /// Return the display name of the stop owning `gtfs_id`, if known.
    fn stop_name(&self, gtfs_id: &str) -> Option<&str>;

    /// Whether `gtfs_id` belongs to a known stop.
    fn contains(&self, gtfs_id: &str) -> bool {
        self.stop_name(gtfs_id).is_some()
    }
}

impl<H: BuildHasher> StopNameLookup for HashMap<String, String, H> {
    fn stop_name(&self, gtfs_id: &str) -> Option<&str> {
        self.get(gtfs_id).map(String::as_str)
    }
}

impl StopNameLookup for BTreeMap<String, String> {
    fn stop_name(&self, gtfs_id: &str) -> Option<&str> {
        self.get(gtfs_id).map(String::as_str)
    }
}

/// Stops indexed by name and by GTFS id.
///
/// # Examples
/// ```
/// use wdbot_core::{StopNameLookup, StopRegistry, StopRegistryError, TransitStop};
///
/// let registry = StopRegistry::from_stops([
///     TransitStop::new("Anděl", ["U1"]),
///     TransitStop::new("Bertramka", ["U2"]),
/// ])?;
/// assert_eq!(registry.stop_name("U2"), Some("Bertramka"));
/// # Ok::<(), StopRegistryError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopRegistry {
    stops: BTreeMap<String, TransitStop>,
    names_by_gtfs_id: BTreeMap<String, String>,
}

impl StopRegistry {
    /// Index `stops`, rejecting duplicate names and shared GTFS ids.
    ///
    /// # Errors
    /// - [`StopRegistryError::DuplicateName`] when two stops share a name.
    /// - [`StopRegistryError::DuplicateGtfsId`] when two stops claim one id.
    pub fn from_stops<I>(stops: I) -> Result<Self, StopRegistryError>
    where
        I: IntoIterator<Item = TransitStop>,
    {
        stops
            .into_iter()
            .try_fold(Self::default(), |mut registry, stop| {
                registry.insert(stop)?;
                Ok(registry)
            })
    }

    fn insert(&mut self, stop: TransitStop) -> Result<(), StopRegistryError> {
        if self.stops.contains_key(&stop.name) {
            return Err(StopRegistryError::DuplicateName { name: stop.name });
        }
        for gtfs_id in &stop.gtfs_ids {
            match self.names_by_gtfs_id.entry(gtfs_id.clone()) {
                Entry::Occupied(existing) => {
                    return Err(StopRegistryError::DuplicateGtfsId {
                        gtfs_id: gtfs_id.clone(),
                        first: existing.get().clone(),
                        second: stop.name.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(stop.name.clone());
                }
            }
        }
        self.stops.insert(stop.name.clone(), stop);
        Ok(())
    }

    /// Look up a stop by display name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TransitStop> {
        self.stops.get(name)
    }

    /// Iterate stops in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TransitStop> + '_ {
        self.stops.values()
    }

    /// Number of named stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the registry holds no stops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

impl StopNameLookup for StopRegistry {
    fn stop_name(&self, gtfs_id: &str) -> Option<&str> {
        self.names_by_gtfs_id.get(gtfs_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn route_requires_an_identifier() {
        assert_eq!(
            TransitRoute::new("", "1", ["A", "B"]),
            Err(RouteError::MissingRouteId)
        );
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&["A"], 0)]
    #[case(&["A", "B"], 1)]
    #[case(&["A", "B", "C", "D"], 3)]
    fn legs_pair_consecutive_stops(#[case] stops: &[&str], #[case] expected: usize) {
        let route = TransitRoute::new("L1", "0", stops.iter().copied())
            .unwrap_or_else(|err| panic!("route construction failed: {err}"));
        assert_eq!(route.legs().count(), expected);
    }

    #[rstest]
    fn legs_preserve_order() {
        let route = TransitRoute::new("L1", "0", ["A", "B", "C"])
            .unwrap_or_else(|err| panic!("route construction failed: {err}"));
        let legs: Vec<_> = route.legs().collect();
        assert_eq!(legs, vec![("A", "B"), ("B", "C")]);
    }

    #[rstest]
    fn registry_resolves_every_platform() {
        let registry = StopRegistry::from_stops([
            TransitStop::new("Anděl", ["U1", "U2"]),
            TransitStop::new("Bertramka", ["U3"]),
        ])
        .unwrap_or_else(|err| panic!("registry construction failed: {err}"));
        assert_eq!(registry.stop_name("U1"), Some("Anděl"));
        assert_eq!(registry.stop_name("U2"), Some("Anděl"));
        assert_eq!(registry.stop_name("U3"), Some("Bertramka"));
        assert!(!registry.contains("U4"));
        assert_eq!(registry.len(), 2);
    }

    #[rstest]
    fn registry_rejects_shared_gtfs_id() {
        let err = StopRegistry::from_stops([
            TransitStop::new("Anděl", ["U1"]),
            TransitStop::new("Bertramka", ["U1"]),
        ])
        .err();
        assert_eq!(
            err,
            Some(StopRegistryError::DuplicateGtfsId {
                gtfs_id: "U1".into(),
                first: "Anděl".into(),
                second: "Bertramka".into(),
            })
        );
    }

    #[rstest]
    fn registry_rejects_duplicate_name() {
        let err = StopRegistry::from_stops([
            TransitStop::new("Anděl", ["U1"]),
            TransitStop::new("Anděl", ["U2"]),
        ])
        .err();
        assert_eq!(
            err,
            Some(StopRegistryError::DuplicateName {
                name: "Anděl".into()
            })
        );
    }

    #[rstest]
    fn map_lookups_resolve_names() {
        let map = HashMap::from([("U1".to_owned(), "Anděl".to_owned())]);
        assert_eq!(map.stop_name("U1"), Some("Anděl"));
        assert_eq!(map.stop_name("U9"), None);
    }
}
