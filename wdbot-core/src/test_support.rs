//! Test-only helpers for building stop lookups and route sets.

use std::collections::BTreeMap;

use crate::{StopNameLookup, TransitRoute};

/// In-memory `StopNameLookup` mapping GTFS ids to names.
///
/// # Examples
/// ```
/// use wdbot_core::StopNameLookup;
/// use wdbot_core::test_support::NameTable;
///
/// let names = NameTable::identity(["A", "B"]).with_platform("A2", "A");
/// assert_eq!(names.stop_name("A2"), Some("A"));
/// assert_eq!(names.stop_name("B"), Some("B"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: BTreeMap<String, String>,
}

impl NameTable {
    /// Create a table in which every id names itself.
    #[must_use]
    pub fn identity<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| {
                    let owned: String = name.into();
                    (owned.clone(), owned)
                })
                .collect(),
        }
    }

    /// Register `gtfs_id` as another platform of `name`.
    #[must_use]
    pub fn with_platform(mut self, gtfs_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(gtfs_id.into(), name.into());
        self
    }
}

impl StopNameLookup for NameTable {
    fn stop_name(&self, gtfs_id: &str) -> Option<&str> {
        self.names.get(gtfs_id).map(String::as_str)
    }
}

/// Build one route per stop sequence, numbered `T0`, `T1`, and so on.
///
/// # Examples
/// ```
/// use wdbot_core::test_support::routes_from;
///
/// let routes = routes_from(&[&["A", "B"], &["B", "C"]]);
/// assert_eq!(routes.len(), 2);
/// assert_eq!(routes[1].route_id(), "T1");
/// ```
#[must_use]
pub fn routes_from(sequences: &[&[&str]]) -> Vec<TransitRoute> {
    sequences
        .iter()
        .enumerate()
        .filter_map(|(index, stops)| {
            TransitRoute::new(format!("T{index}"), "0", stops.iter().copied()).ok()
        })
        .collect()
}
