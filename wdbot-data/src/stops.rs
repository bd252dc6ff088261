//! Tram stops from the PID stop-list JSON document.
//!
//! The document groups physical stops (platforms) under a named stop group.
//! A group is a tram stop when at least one of its platforms is served by a
//! tram line; every other group is skipped.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{self, BufReader, Read},
};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use geo::{Centroid, MultiPoint, Point};
use log::info;
use serde::Deserialize;
use thiserror::Error;
use wdbot_core::{StopRegistry, StopRegistryError, TransitStop};

/// Supported value of `dataFormatVersion`.
pub const SUPPORTED_FORMAT_VERSION: &str = "3";

const TRAM_LINE_TYPE: &str = "tram";
const TRAM_MUNICIPALITY: &str = "Praha";
const TRAM_DISTRICT_CODE: &str = "AB";

/// Errors raised while reading the stop list.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StopsError {
    /// The stop list could not be opened.
    #[error("failed to open stop list at {path}")]
    Open {
        /// Location of the stop list.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The document is not valid JSON of the expected shape.
    #[error("malformed stop list")]
    Json {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The document declares a format version other than the supported one.
    #[error("unsupported stop list format version {version}")]
    UnsupportedVersion {
        /// Declared version.
        version: String,
    },
    /// `generatedAt` does not start with a calendar date.
    #[error("invalid generatedAt timestamp {value}")]
    InvalidTimestamp {
        /// Raw timestamp.
        value: String,
        /// Underlying parse error.
        #[source]
        source: chrono::ParseError,
    },
    /// A tram stop lies outside Prague.
    #[error("tram stop {name} lies in {municipality} ({district_code})")]
    UnexpectedLocation {
        /// Stop group name.
        name: String,
        /// Municipality reported for the group.
        municipality: String,
        /// District code reported for the group.
        district_code: String,
    },
    /// Two tram stop groups share a name.
    #[error("tram stop {name} appears twice")]
    DuplicateStop {
        /// Duplicated name.
        name: String,
    },
}

/// A tram line serving a stop, with the direction it is heading.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineAtStop {
    /// Public line name, such as `22`.
    pub line: String,
    /// Direction shown for the line at this stop.
    pub direction: String,
}

/// A named tram stop aggregated from its platforms.
#[derive(Debug, Clone, PartialEq)]
pub struct TramStop {
    /// Display name; unique among tram stops.
    pub name: String,
    /// Name used by the national timetable system.
    pub idos_name: String,
    /// Name including the municipality.
    pub full_name: String,
    /// Name disambiguated across the whole network.
    pub unique_name: String,
    /// National stop number.
    pub cis: u64,
    /// Network node number.
    pub node: u64,
    /// Mean position of the tram platforms (`x = longitude`, `y = latitude`).
    pub location: Point<f64>,
    /// GTFS ids of every platform in the group.
    pub gtfs_ids: BTreeSet<String>,
    /// Tram lines serving the stop.
    pub lines: BTreeSet<LineAtStop>,
}

impl TramStop {
    /// Alternative names differing from [`TramStop::name`].
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeSet;
    /// use geo::Point;
    /// use wdbot_data::TramStop;
    ///
    /// let stop = TramStop {
    ///     name: "Anděl".into(),
    ///     idos_name: "Anděl".into(),
    ///     full_name: "Praha, Anděl".into(),
    ///     unique_name: "Anděl".into(),
    ///     cis: 58_791,
    ///     node: 1_040,
    ///     location: Point::new(14.403, 50.071),
    ///     gtfs_ids: BTreeSet::new(),
    ///     lines: BTreeSet::new(),
    /// };
    /// assert_eq!(stop.aliases(), BTreeSet::from(["Praha, Anděl"]));
    /// ```
    #[must_use]
    pub fn aliases(&self) -> BTreeSet<&str> {
        [
            self.full_name.as_str(),
            self.idos_name.as_str(),
            self.unique_name.as_str(),
        ]
        .into_iter()
        .filter(|alias| *alias != self.name)
        .collect()
    }

    /// Name and platform ids as a [`TransitStop`].
    #[must_use]
    pub fn to_transit_stop(&self) -> TransitStop {
        TransitStop::new(self.name.clone(), self.gtfs_ids.iter().cloned())
    }
}

/// Tram stops from one stop-list document.
#[derive(Debug, Clone, PartialEq)]
pub struct StopsDocument {
    generated_at: NaiveDate,
    stops: BTreeMap<String, TramStop>,
}

impl StopsDocument {
    /// Day the document was generated.
    #[must_use]
    pub fn generated_at(&self) -> NaiveDate {
        self.generated_at
    }

    /// Look up a tram stop by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TramStop> {
        self.stops.get(name)
    }

    /// Iterate tram stops in name order.
    pub fn stops(&self) -> impl Iterator<Item = &TramStop> + '_ {
        self.stops.values()
    }

    /// Number of tram stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the document holds no tram stops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Index the stops by name and GTFS id.
    ///
    /// # Errors
    /// Returns [`StopRegistryError::DuplicateGtfsId`] when two groups list the
    /// same platform id.
    pub fn registry(&self) -> Result<StopRegistry, StopRegistryError> {
        StopRegistry::from_stops(self.stops().map(TramStop::to_transit_stop))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawDocument {
    generated_at: String,
    data_format_version: String,
    stop_groups: Vec<RawStopGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStopGroup {
    name: String,
    district_code: String,
    idos_name: String,
    full_name: String,
    unique_name: String,
    node: u64,
    cis: u64,
    municipality: String,
    stops: Vec<RawStop>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStop {
    lat: f64,
    lon: f64,
    #[serde(default)]
    gtfs_ids: Vec<String>,
    lines: Vec<RawLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawLine {
    #[serde(rename = "id")]
    _id: i64,
    name: String,
    #[serde(rename = "type")]
    line_type: String,
    direction: String,
    #[serde(default, rename = "direction2")]
    _direction2: Option<String>,
    #[serde(default, rename = "isNight")]
    _is_night: Option<bool>,
}

impl RawStop {
    fn tram_lines(&self) -> impl Iterator<Item = LineAtStop> + '_ {
        self.lines
            .iter()
            .filter(|line| line.line_type == TRAM_LINE_TYPE)
            .map(|line| LineAtStop {
                line: line.name.clone(),
                direction: line.direction.clone(),
            })
    }
}

impl RawStopGroup {
    /// Convert a group into a tram stop, or `None` when no tram serves it.
    fn into_tram_stop(self) -> Result<Option<TramStop>, StopsError> {
        let tram_platforms: Vec<&RawStop> = self
            .stops
            .iter()
            .filter(|stop| stop.tram_lines().next().is_some())
            .collect();
        let Some(location) = MultiPoint::from(
            tram_platforms
                .iter()
                .map(|stop| Point::new(stop.lon, stop.lat))
                .collect::<Vec<_>>(),
        )
        .centroid() else {
            return Ok(None);
        };

        if self.municipality != TRAM_MUNICIPALITY || self.district_code != TRAM_DISTRICT_CODE {
            return Err(StopsError::UnexpectedLocation {
                name: self.name,
                municipality: self.municipality,
                district_code: self.district_code,
            });
        }
        if self.name != self.unique_name {
            info!(
                "Tram stop name {} differs from its unique name {}",
                self.name, self.unique_name
            );
        }

        let lines = tram_platforms
            .iter()
            .flat_map(|stop| stop.tram_lines())
            .collect();
        let gtfs_ids = self
            .stops
            .iter()
            .flat_map(|stop| stop.gtfs_ids.iter().cloned())
            .collect();
        Ok(Some(TramStop {
            name: self.name,
            idos_name: self.idos_name,
            full_name: self.full_name,
            unique_name: self.unique_name,
            cis: self.cis,
            node: self.node,
            location,
            gtfs_ids,
            lines,
        }))
    }
}

/// Read tram stops from a stop-list document.
///
/// # Errors
/// - [`StopsError::Json`] when the document is malformed.
/// - [`StopsError::UnsupportedVersion`] unless `dataFormatVersion` is `"3"`.
/// - [`StopsError::InvalidTimestamp`] when `generatedAt` is not a date.
/// - [`StopsError::UnexpectedLocation`] for tram stops outside Prague.
/// - [`StopsError::DuplicateStop`] when two tram groups share a name.
///
/// # Examples
/// ```
/// use wdbot_data::read_tram_stops;
///
/// # fn main() -> Result<(), wdbot_data::StopsError> {
/// let json = r#"{"generatedAt": "2023-12-15T03:00:00", "dataFormatVersion": "3", "stopGroups": []}"#;
/// let document = read_tram_stops(json.as_bytes())?;
/// assert!(document.is_empty());
/// assert_eq!(document.generated_at().to_string(), "2023-12-15");
/// # Ok(())
/// # }
/// ```
pub fn read_tram_stops(reader: impl Read) -> Result<StopsDocument, StopsError> {
    let raw: RawDocument =
        serde_json::from_reader(reader).map_err(|source| StopsError::Json { source })?;
    if raw.data_format_version != SUPPORTED_FORMAT_VERSION {
        return Err(StopsError::UnsupportedVersion {
            version: raw.data_format_version,
        });
    }
    let generated_at = parse_generated_at(&raw.generated_at)?;

    let mut stops = BTreeMap::new();
    for group in raw.stop_groups {
        let Some(stop) = group.into_tram_stop()? else {
            continue;
        };
        if stops.contains_key(&stop.name) {
            return Err(StopsError::DuplicateStop { name: stop.name });
        }
        stops.insert(stop.name.clone(), stop);
    }
    Ok(StopsDocument {
        generated_at,
        stops,
    })
}

/// Open and read the stop list at `path`.
///
/// # Errors
/// Returns [`StopsError::Open`] when the file cannot be opened, otherwise see
/// [`read_tram_stops`].
pub fn open_tram_stops(path: &Utf8Path) -> Result<StopsDocument, StopsError> {
    let file = File::open(path).map_err(|source| StopsError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_tram_stops(BufReader::new(file))
}

fn parse_generated_at(value: &str) -> Result<NaiveDate, StopsError> {
    NaiveDate::parse_and_remainder(value, "%Y-%m-%d")
        .map(|(date, _)| date)
        .map_err(|source| StopsError::InvalidTimestamp {
            value: value.to_owned(),
            source,
        })
}
