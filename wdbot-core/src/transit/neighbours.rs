//! Stop adjacency and terminus labelling.
//!
//! For a stop `S` and a neighbour `N`, the terminus is found by walking from
//! `N` away from `S` for as long as the next stop is unambiguous. Candidates at
//! each step are the name-level neighbours of the current stop, minus the stop
//! we came from and minus every neighbour of that stop. Parallel platforms and
//! short loops therefore do not count as branches.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use super::{StopNameLookup, TransitRoute};

/// A neighbour of a stop together with the furthest unambiguous stop
/// reachable through it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighbourPair {
    /// Name of the adjacent stop.
    pub neighbour: String,
    /// Name of the stop at which the walk through `neighbour` ends.
    pub terminus: String,
}

impl NeighbourPair {
    /// Pair a neighbour with its terminus.
    #[must_use]
    pub fn new(neighbour: impl Into<String>, terminus: impl Into<String>) -> Self {
        Self {
            neighbour: neighbour.into(),
            terminus: terminus.into(),
        }
    }
}

/// Neighbour pairs keyed by stop name, in deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct StopNeighbours {
    entries: BTreeMap<String, BTreeSet<NeighbourPair>>,
}

impl StopNeighbours {
    /// Neighbour pairs recorded for `name`.
    ///
    /// # Examples
    /// ```
    /// use wdbot_core::{StopRegistry, TransitRoute, TransitStop, compute_neighbours};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let registry = StopRegistry::from_stops([
    ///     TransitStop::new("A", ["a"]),
    ///     TransitStop::new("B", ["b"]),
    /// ])?;
    /// let routes = [TransitRoute::new("L1", "0", ["a", "b"])?];
    /// let neighbours = compute_neighbours(&routes, &registry);
    /// let pairs: Vec<_> = neighbours.neighbours_of("A").collect();
    /// assert_eq!(pairs[0].terminus, "B");
    /// assert_eq!(neighbours.neighbours_of("Z").count(), 0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn neighbours_of<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a NeighbourPair> + 'a {
        self.entries.get(name).into_iter().flatten()
    }

    /// Number of stops with at least one neighbour.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no stop has a neighbour.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate stops and their neighbour pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<NeighbourPair>)> + '_ {
        self.entries
            .iter()
            .map(|(name, pairs)| (name.as_str(), pairs))
    }

    fn record(&mut self, stop: &str, pair: NeighbourPair) {
        self.entries.entry(stop.to_owned()).or_default().insert(pair);
    }
}

impl<'a> IntoIterator for &'a StopNeighbours {
    type Item = (&'a String, &'a BTreeSet<NeighbourPair>);
    type IntoIter = std::collections::btree_map::Iter<'a, String, BTreeSet<NeighbourPair>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Directed GTFS-level adjacency: stop id to the ids that follow it on any route.
#[derive(Debug, Default)]
struct PhysicalAdjacency<'r> {
    successors: BTreeMap<&'r str, BTreeSet<&'r str>>,
}

impl<'r> PhysicalAdjacency<'r> {
    fn from_routes(routes: &'r [TransitRoute]) -> Self {
        routes
            .iter()
            .flat_map(TransitRoute::legs)
            .fold(Self::default(), |mut adjacency, (from, to)| {
                adjacency.successors.entry(from).or_default().insert(to);
                adjacency
            })
    }

    fn edges(&self) -> impl Iterator<Item = (&'r str, &'r str)> + '_ {
        self.successors
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (*from, *to)))
    }
}

/// Name-level adjacency: the union of successor names over every platform of a
/// stop. A name may list itself when a route visits two platforms in a row.
#[derive(Debug, Default)]
struct NameAdjacency<'n> {
    neighbours: BTreeMap<&'n str, BTreeSet<&'n str>>,
}

impl<'n> NameAdjacency<'n> {
    fn project<L>(physical: &PhysicalAdjacency<'_>, names: &'n L) -> Self
    where
        L: StopNameLookup + ?Sized,
    {
        physical
            .edges()
            .filter_map(|(from, to)| Some((names.stop_name(from)?, names.stop_name(to)?)))
            .fold(Self::default(), |mut adjacency, (from, to)| {
                adjacency.neighbours.entry(from).or_default().insert(to);
                adjacency
            })
    }

    fn of(&self, name: &str) -> Option<&BTreeSet<&'n str>> {
        self.neighbours.get(name)
    }

    /// Walk from `neighbour` away from `stop` while the next stop is unique.
    ///
    /// The walk state is the pair of the previous and the current stop, since
    /// the excluded set follows from the previous stop. A repeated state means
    /// the walk would never end; it then stops and reports `neighbour`.
    fn terminus(&self, stop: &'n str, neighbour: &'n str) -> &'n str {
        let empty = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut current = neighbour;
        let mut came_from = stop;
        loop {
            if !visited.insert((came_from, current)) {
                warn!("Stopped terminus walk from {stop} via {neighbour} at {current}: route loops");
                return neighbour;
            }
            let excluded = self.of(came_from).unwrap_or(&empty);
            let current_neighbours = self.of(current).unwrap_or(&empty);
            let mut candidates = current_neighbours
                .iter()
                .copied()
                .filter(|name| *name != came_from && !excluded.contains(name));
            let (Some(next), None) = (candidates.next(), candidates.next()) else {
                return current;
            };
            came_from = current;
            current = next;
        }
    }
}

/// Derive neighbour pairs and their termini from `routes`.
///
/// Every consecutive pair of stop ids on every route is an edge. Edges whose
/// endpoints resolve to the same name are skipped. Ids unknown to
/// `stop_names` are skipped with a warning. Empty input yields an empty map.
/// A walk that can never end, such as around a ring line, reports the
/// neighbour itself as the terminus.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use wdbot_core::{NeighbourPair, RouteError, TransitRoute, compute_neighbours};
///
/// let names: HashMap<String, String> = ["A", "B", "C", "D"]
///     .into_iter()
///     .map(|n| (n.to_lowercase(), n.to_owned()))
///     .collect();
/// let routes = [TransitRoute::new("L1", "0", ["a", "b", "c", "d"])?];
/// let neighbours = compute_neighbours(&routes, &names);
/// let from_a: Vec<_> = neighbours.neighbours_of("A").cloned().collect();
/// assert_eq!(from_a, vec![NeighbourPair::new("B", "D")]);
/// # Ok::<(), RouteError>(())
/// ```
#[must_use]
pub fn compute_neighbours<L>(routes: &[TransitRoute], stop_names: &L) -> StopNeighbours
where
    L: StopNameLookup + ?Sized,
{
    let physical = PhysicalAdjacency::from_routes(routes);
    let by_name = NameAdjacency::project(&physical, stop_names);

    let mut result = StopNeighbours::default();
    for (from, to) in physical.edges() {
        let Some(stop) = stop_names.stop_name(from) else {
            warn!("Skipped edge {from} -> {to}: unknown stop id {from}");
            continue;
        };
        let Some(neighbour) = stop_names.stop_name(to) else {
            warn!("Skipped edge {from} -> {to}: unknown stop id {to}");
            continue;
        };
        if stop == neighbour {
            debug!("Multiple platforms of {stop} visited consecutively ({from} -> {to})");
            continue;
        }
        let terminus = by_name.terminus(stop, neighbour);
        result.record(stop, NeighbourPair::new(neighbour, terminus));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{NameTable, routes_from};
    use crate::{StopRegistry, TransitStop};
    use rstest::{fixture, rstest};

    /// Each lowercase id maps to its uppercase name; `a2` is a second platform of `A`.
    #[fixture]
    fn registry() -> StopRegistry {
        StopRegistry::from_stops([
            TransitStop::new("A", ["a", "a2"]),
            TransitStop::new("B", ["b"]),
            TransitStop::new("C", ["c"]),
            TransitStop::new("D", ["d"]),
            TransitStop::new("E", ["e"]),
        ])
        .unwrap_or_else(|err| panic!("registry construction failed: {err}"))
    }

    fn pairs_of(neighbours: &StopNeighbours, name: &str) -> Vec<NeighbourPair> {
        neighbours.neighbours_of(name).cloned().collect()
    }

    #[rstest]
    fn empty_input_yields_empty_map(registry: StopRegistry) {
        assert!(compute_neighbours(&[], &registry).is_empty());
    }

    #[rstest]
    fn single_stop_routes_contribute_nothing(registry: StopRegistry) {
        let routes = routes_from(&[&["a"], &[]]);
        assert!(compute_neighbours(&routes, &registry).is_empty());
    }

    #[rstest]
    fn linear_route_reaches_the_end(registry: StopRegistry) {
        let routes = routes_from(&[&["a", "b", "c", "d"]]);
        let neighbours = compute_neighbours(&routes, &registry);
        assert_eq!(pairs_of(&neighbours, "A"), vec![NeighbourPair::new("B", "D")]);
        assert_eq!(pairs_of(&neighbours, "B"), vec![NeighbourPair::new("C", "D")]);
        assert_eq!(pairs_of(&neighbours, "C"), vec![NeighbourPair::new("D", "D")]);
        assert!(pairs_of(&neighbours, "D").is_empty());
    }

    #[rstest]
    fn branch_stops_the_walk(registry: StopRegistry) {
        let routes = routes_from(&[&["a", "b", "c"], &["a", "b", "e"]]);
        let neighbours = compute_neighbours(&routes, &registry);
        assert_eq!(pairs_of(&neighbours, "A"), vec![NeighbourPair::new("B", "B")]);
    }

    #[rstest]
    fn adjacency_is_not_symmetric(registry: StopRegistry) {
        let routes = routes_from(&[&["a", "b"]]);
        let neighbours = compute_neighbours(&routes, &registry);
        assert_eq!(pairs_of(&neighbours, "A").len(), 1);
        assert!(pairs_of(&neighbours, "B").is_empty());
    }

    #[rstest]
    fn shared_name_produces_no_self_entry(registry: StopRegistry) {
        let routes = routes_from(&[&["a", "a2", "b"]]);
        let neighbours = compute_neighbours(&routes, &registry);
        let from_a = pairs_of(&neighbours, "A");
        assert_eq!(from_a, vec![NeighbourPair::new("B", "B")]);
        assert!(from_a.iter().all(|pair| pair.neighbour != "A"));
    }

    #[rstest]
    fn two_way_line_terminates_at_both_ends(registry: StopRegistry) {
        let routes = routes_from(&[&["a", "b", "c", "d"], &["d", "c", "b", "a"]]);
        let neighbours = compute_neighbours(&routes, &registry);
        assert_eq!(pairs_of(&neighbours, "B"), vec![
            NeighbourPair::new("A", "A"),
            NeighbourPair::new("C", "D"),
        ]);
    }

    #[rstest]
    fn unknown_ids_are_skipped(registry: StopRegistry) {
        let routes = routes_from(&[&["a", "x", "b", "c"]]);
        let neighbours = compute_neighbours(&routes, &registry);
        assert!(pairs_of(&neighbours, "A").is_empty());
        assert_eq!(pairs_of(&neighbours, "B"), vec![NeighbourPair::new("C", "C")]);
    }

    #[rstest]
    fn ring_route_reports_the_neighbour(registry: StopRegistry) {
        let routes = routes_from(&[&["a", "b", "c", "d", "a"]]);
        let neighbours = compute_neighbours(&routes, &registry);
        assert_eq!(pairs_of(&neighbours, "A"), vec![NeighbourPair::new("B", "B")]);
        assert_eq!(pairs_of(&neighbours, "C"), vec![NeighbourPair::new("D", "D")]);
        for (stop, pairs) in &neighbours {
            assert!(pairs.iter().all(|pair| pair.terminus != *stop));
        }
    }

    #[rstest]
    fn walk_through_a_cycle_reaches_its_end() {
        let names = NameTable::identity(["N0", "N2", "N4", "N6"]);
        let routes = routes_from(&[&["N2", "N4", "N0", "N2"], &["N0", "N4", "N6", "N2", "N6"]]);
        let neighbours = compute_neighbours(&routes, &names);
        assert_eq!(pairs_of(&neighbours, "N0"), vec![
            NeighbourPair::new("N2", "N6"),
            NeighbourPair::new("N4", "N6"),
        ]);
        assert!(pairs_of(&neighbours, "N4").contains(&NeighbourPair::new("N6", "N6")));
        assert!(
            pairs_of(&neighbours, "N0")
                .iter()
                .all(|pair| pair.terminus != "N0")
        );
    }

    #[rstest]
    fn platforms_share_their_stop_name() {
        let names = NameTable::identity(["A", "B", "C"]).with_platform("A2", "A");
        let routes = routes_from(&[&["A", "B", "C"], &["C", "B", "A2"]]);
        let neighbours = compute_neighbours(&routes, &names);
        assert_eq!(pairs_of(&neighbours, "B"), vec![
            NeighbourPair::new("A", "A"),
            NeighbourPair::new("C", "C"),
        ]);
    }

    #[rstest]
    fn results_are_ordered_by_name(registry: StopRegistry) {
        let routes = routes_from(&[&["d", "c", "b", "a"]]);
        let neighbours = compute_neighbours(&routes, &registry);
        let names: Vec<_> = neighbours.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["B", "C", "D"]);
    }
}
